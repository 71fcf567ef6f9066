//! Loading of model weights and class vocabularies.

use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use once_cell::sync::OnceCell;
use safetensors::SafeTensors;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

type Loader<T> = Box<dyn Fn() -> Result<T> + Send + Sync>;

/// A model that is loaded on first use and then shared.
///
/// The first load attempt is cached, including its failure, so every later
/// request sees the same outcome without touching the filesystem again.
pub struct LazyModel<T> {
    loader: Loader<T>,
    model: OnceCell<Result<T, String>>,
}

impl<T: Send + Sync> LazyModel<T> {
    /// Creates a lazy model around a loading function.
    #[must_use]
    pub fn new(loader: impl Fn() -> Result<T> + Send + Sync + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            model: OnceCell::new(),
        }
    }

    /// Gets the model, loading it if necessary.
    ///
    /// # Errors
    ///
    /// Returns the message of the load failure, formatted with its causes.
    pub fn get(&self) -> Result<&T, String> {
        self.model
            .get_or_init(|| {
                (self.loader)().map_err(|e| {
                    warn!("Model load failed: {e:#}");
                    format!("{e:#}")
                })
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Returns true if a load has been attempted and succeeded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self.model.get(), Some(Ok(_)))
    }
}

/// Loads a safetensors file and creates a `VarBuilder` for the model.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The safetensors data is invalid
/// - A tensor has an unsupported dtype
pub fn load_safetensors(path: impl AsRef<Path>, device: &Device) -> Result<VarBuilder<'static>> {
    let path = path.as_ref();
    debug!("Loading weights from {}", path.display());

    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read model file: {}", path.display()))?;

    let tensors = SafeTensors::deserialize(&data)
        .with_context(|| format!("Failed to parse safetensors: {}", path.display()))?;

    let mut tensor_map: HashMap<String, Tensor> = HashMap::new();

    for name in tensors.names() {
        let view = tensors
            .tensor(name)
            .with_context(|| format!("Failed to get tensor '{name}'"))?;

        let dtype = candle_dtype(view.dtype())?;
        let tensor = Tensor::from_raw_buffer(view.data(), dtype, view.shape(), device)
            .with_context(|| format!("Failed to create tensor '{name}'"))?;

        tensor_map.insert(name.clone(), tensor);
    }

    debug!("Loaded {} tensors", tensor_map.len());
    Ok(VarBuilder::from_tensors(tensor_map, DType::F32, device))
}

/// Reads a class vocabulary with one label per line.
///
/// Surrounding whitespace is trimmed and blank lines are skipped.
///
/// # Errors
///
/// Returns an error if the file cannot be read or holds no labels.
pub fn load_labels(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read labels file: {}", path.display()))?;

    let labels: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();

    if labels.is_empty() {
        anyhow::bail!("Labels file is empty: {}", path.display());
    }

    debug!("Loaded {} labels from {}", labels.len(), path.display());
    Ok(labels)
}

fn candle_dtype(dtype: safetensors::Dtype) -> Result<DType> {
    use safetensors::Dtype as S;
    match dtype {
        S::F32 => Ok(DType::F32),
        S::F64 => Ok(DType::F64),
        S::F16 => Ok(DType::F16),
        S::BF16 => Ok(DType::BF16),
        S::I64 => Ok(DType::I64),
        S::U8 => Ok(DType::U8),
        S::U32 => Ok(DType::U32),
        other => anyhow::bail!("Unsupported dtype: {other:?}"),
    }
}
