//! Candle binding of the model ports.

// Allow common ML/image code patterns
#![allow(clippy::cast_precision_loss)]

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;
use candle_core::{Device, Module, Tensor, D};
use tracing::debug;

use super::{get_device, load_labels, load_safetensors, rank, CompactNet, LazyModel};
use super::{IMAGENET_MEAN, IMAGENET_STD};
use crate::domain::{Classification, InferenceBuffer, InferenceError, NormalizedImage};
use crate::pipeline::RESIZE_FILTER;
use crate::ports::{ImageClassifier, ScoreModel};

/// Configuration for the candle classifier.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Path to the safetensors weights.
    pub model_path: PathBuf,
    /// Path to the labels file, one class per line in output order.
    pub labels_path: PathBuf,
    /// Model input width in pixels.
    pub input_width: u32,
    /// Model input height in pixels.
    pub input_height: u32,
    /// Per-channel RGB mean used for normalization.
    pub mean: [f32; 3],
    /// Per-channel RGB standard deviation used for normalization.
    pub std: [f32; 3],
}

impl ClassifierConfig {
    /// Creates a config with a 224x224 input and ImageNet statistics.
    #[must_use]
    pub fn new(model_path: impl Into<PathBuf>, labels_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            labels_path: labels_path.into(),
            input_width: 224,
            input_height: 224,
            mean: IMAGENET_MEAN,
            std: IMAGENET_STD,
        }
    }

    /// Sets a square input size.
    #[must_use]
    pub const fn with_input_size(mut self, size: u32) -> Self {
        self.input_width = size;
        self.input_height = size;
        self
    }
}

struct LoadedModel {
    net: CompactNet,
    labels: Vec<String>,
}

/// Pretrained classifier running on candle.
///
/// Implements both [`ImageClassifier`] (resizes internally) and
/// [`ScoreModel`] (expects a buffer already at the input size).
pub struct CandleClassifier {
    config: ClassifierConfig,
    device: Device,
    model: LazyModel<LoadedModel>,
}

impl CandleClassifier {
    /// Creates a classifier on the best available device.
    ///
    /// Weights and labels are loaded on the first classification.
    #[must_use]
    pub fn new(config: ClassifierConfig) -> Self {
        Self::with_device(config, get_device())
    }

    /// Creates a classifier on a specific device.
    #[must_use]
    pub fn with_device(config: ClassifierConfig, device: Device) -> Self {
        let model_path = config.model_path.clone();
        let labels_path = config.labels_path.clone();
        let load_device = device.clone();

        let model = LazyModel::new(move || {
            let labels = load_labels(&labels_path)?;
            let vb = load_safetensors(&model_path, &load_device)?;
            let net = CompactNet::new(vb, labels.len()).with_context(|| {
                format!(
                    "Weights in {} do not match {} labels",
                    model_path.display(),
                    labels.len()
                )
            })?;
            Ok(LoadedModel { net, labels })
        });

        Self {
            config,
            device,
            model,
        }
    }

    fn loaded(&self) -> Result<&LoadedModel, InferenceError> {
        self.model.get().map_err(InferenceError::Load)
    }

    /// Builds a normalized `(1, 3, H, W)` tensor from row-major RGB pixels.
    fn input_tensor(
        &self,
        pixels: impl Iterator<Item = [u8; 3]>,
        width: u32,
        height: u32,
    ) -> Result<Tensor, InferenceError> {
        let (w, h) = (width as usize, height as usize);
        let plane = w * h;
        let mut data = vec![0f32; 3 * plane];

        let mut count = 0;
        for (i, px) in pixels.enumerate().take(plane) {
            for c in 0..3 {
                let v = f32::from(px[c]) / 255.0;
                data[c * plane + i] = (v - self.config.mean[c]) / self.config.std[c];
            }
            count += 1;
        }
        if count != plane {
            return Err(InferenceError::Execution(format!(
                "expected {plane} pixels, got {count}"
            )));
        }

        Tensor::from_vec(data, (1, 3, h, w), &self.device).map_err(execution)
    }

    /// Runs the network and returns softmax probabilities per class.
    fn probabilities(&self, model: &LoadedModel, input: &Tensor) -> Result<Vec<f32>, InferenceError> {
        let logits = model.net.forward(input).map_err(execution)?;
        let probs = candle_nn::ops::softmax(&logits, D::Minus1).map_err(execution)?;
        probs.squeeze(0).and_then(|p| p.to_vec1::<f32>()).map_err(execution)
    }
}

fn execution(err: candle_core::Error) -> InferenceError {
    InferenceError::Execution(err.to_string())
}

impl ImageClassifier for CandleClassifier {
    fn classify(&self, image: &NormalizedImage) -> Result<Vec<Classification>, InferenceError> {
        let model = self.loaded()?;
        let (w, h) = (self.config.input_width, self.config.input_height);

        let scaled = image.image().resize_exact(w, h, RESIZE_FILTER).to_rgb8();
        let input = self.input_tensor(scaled.pixels().map(|p| p.0), w, h)?;
        let probs = self.probabilities(model, &input)?;

        debug!("Classified {} over {} classes", image.source(), probs.len());
        Ok(rank(&model.labels, &probs))
    }
}

impl ScoreModel for CandleClassifier {
    fn predict(&self, buffer: &InferenceBuffer) -> Result<HashMap<String, f32>, InferenceError> {
        let model = self.loaded()?;
        let expected = (self.config.input_width, self.config.input_height);
        if (buffer.width(), buffer.height()) != expected {
            return Err(InferenceError::Execution(format!(
                "input buffer is {}x{}, model expects {}x{}",
                buffer.width(),
                buffer.height(),
                expected.0,
                expected.1
            )));
        }

        let input = self.input_tensor(buffer.rgb_pixels(), buffer.width(), buffer.height())?;
        let probs = self.probabilities(model, &input)?;

        Ok(model
            .labels
            .iter()
            .cloned()
            .zip(probs)
            .collect())
    }
}
