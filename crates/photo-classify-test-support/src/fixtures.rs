//! Generated model files for end-to-end tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use photo_classify_core::inference::STAGE_CHANNELS;
use safetensors::tensor::TensorView;
use safetensors::Dtype;

/// Logit given to the favored class.
const FAVORED_LOGIT: f32 = 4.0;

/// Offset of the center tap in a flattened 3x3 kernel.
const CENTER_TAP: usize = 4;

type NamedTensor = (&'static str, Vec<usize>, Vec<f32>);

/// A `CompactNet` weights file plus labels whose prediction is known.
#[derive(Debug, Clone)]
pub struct ModelFixture {
    /// Path to the written safetensors file.
    pub model_path: PathBuf,
    /// Path to the written labels file.
    pub labels_path: PathBuf,
    classes: usize,
}

impl ModelFixture {
    /// Writes `classifier.safetensors` and `labels.txt` into `dir`.
    ///
    /// Every convolution is zeroed, so the logits equal the head bias and
    /// `labels[favored]` wins for any input image.
    ///
    /// # Errors
    ///
    /// Returns an error if `favored` is out of range or a file cannot be written.
    pub fn write(dir: impl AsRef<Path>, labels: &[&str], favored: usize) -> Result<Self> {
        if favored >= labels.len() {
            anyhow::bail!("favored index {favored} out of range for {} labels", labels.len());
        }

        let n = labels.len();
        let [c1, c2, c3] = STAGE_CHANNELS;
        let mut head_bias = vec![0.0f32; n];
        head_bias[favored] = FAVORED_LOGIT;

        let tensors = vec![
            ("conv1.weight", vec![c1, 3, 3, 3], vec![0.0; c1 * 3 * 9]),
            ("conv1.bias", vec![c1], vec![0.0; c1]),
            ("conv2.weight", vec![c2, c1, 3, 3], vec![0.0; c2 * c1 * 9]),
            ("conv2.bias", vec![c2], vec![0.0; c2]),
            ("conv3.weight", vec![c3, c2, 3, 3], vec![0.0; c3 * c2 * 9]),
            ("conv3.bias", vec![c3], vec![0.0; c3]),
            ("head.weight", vec![n, c3], vec![0.0; n * c3]),
            ("head.bias", vec![n], head_bias),
        ];

        Self::save(dir.as_ref(), labels, &tensors)
    }

    /// Writes a model whose prediction follows the dominant color channel.
    ///
    /// Each convolution passes the red, green and blue planes through on its
    /// first three channels via the kernel center, and the head maps them to
    /// `labels[0]`, `labels[1]` and `labels[2]`. A saturated red image is
    /// therefore classified as `labels[0]`, and so on.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than three labels are given or a file cannot
    /// be written.
    pub fn write_color_sensitive(dir: impl AsRef<Path>, labels: &[&str]) -> Result<Self> {
        if labels.len() < 3 {
            anyhow::bail!("color-sensitive model needs 3 labels, got {}", labels.len());
        }

        let n = labels.len();
        let [c1, c2, c3] = STAGE_CHANNELS;
        let mut head_weight = vec![0.0f32; n * c3];
        for channel in 0..3 {
            head_weight[channel * c3 + channel] = 1.0;
        }

        let tensors = vec![
            ("conv1.weight", vec![c1, 3, 3, 3], passthrough(c1, 3)),
            ("conv1.bias", vec![c1], vec![0.0; c1]),
            ("conv2.weight", vec![c2, c1, 3, 3], passthrough(c2, c1)),
            ("conv2.bias", vec![c2], vec![0.0; c2]),
            ("conv3.weight", vec![c3, c2, 3, 3], passthrough(c3, c2)),
            ("conv3.bias", vec![c3], vec![0.0; c3]),
            ("head.weight", vec![n, c3], head_weight),
            ("head.bias", vec![n], vec![0.0; n]),
        ];

        Self::save(dir.as_ref(), labels, &tensors)
    }

    fn save(dir: &Path, labels: &[&str], tensors: &[NamedTensor]) -> Result<Self> {
        let model_path = dir.join("classifier.safetensors");
        let labels_path = dir.join("labels.txt");

        let mut views = HashMap::new();
        for (name, shape, data) in tensors {
            let view = TensorView::new(Dtype::F32, shape.clone(), bytemuck::cast_slice(data))
                .with_context(|| format!("Invalid tensor '{name}'"))?;
            views.insert((*name).to_string(), view);
        }
        let bytes = safetensors::serialize(&views, &None).context("Failed to serialize weights")?;

        std::fs::write(&model_path, bytes)
            .with_context(|| format!("Failed to write {}", model_path.display()))?;
        std::fs::write(&labels_path, labels.join("\n"))
            .with_context(|| format!("Failed to write {}", labels_path.display()))?;

        Ok(Self {
            model_path,
            labels_path,
            classes: labels.len(),
        })
    }

    /// Softmax probability of the favored label of a model from [`Self::write`].
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn favored_confidence(&self) -> f32 {
        let others = (self.classes - 1) as f32;
        let e = FAVORED_LOGIT.exp();
        e / (e + others)
    }
}

/// Kernel of shape `(out, in, 3, 3)` copying input channel `k` to output
/// channel `k` for the first three channels.
fn passthrough(out_channels: usize, in_channels: usize) -> Vec<f32> {
    let mut weights = vec![0.0f32; out_channels * in_channels * 9];
    for channel in 0..3 {
        weights[(channel * in_channels + channel) * 9 + CENTER_TAP] = 1.0;
    }
    weights
}
