//! Image-to-prediction pipeline.
//!
//! Two inference paths are supported:
//! - mediated: the upright bitmap goes to an [`ImageClassifier`] that handles
//!   its own preprocessing and returns a ranked list
//! - direct: the pipeline resizes and packs an [`InferenceBuffer`] itself and
//!   feeds it to a raw [`ScoreModel`]

mod orientation;
mod projection;
mod resize;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{ClassifyError, InferenceBuffer, InputSpec, PredictionResult, RawImage};
use crate::ports::{ImageClassifier, ScoreModel};

pub use orientation::{apply_orientation, normalize_orientation};
pub use projection::{display_text, INITIAL_LABEL};
pub use resize::RESIZE_FILTER;

/// Which inference path a pipeline uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InferencePath {
    /// High-level classifier with internal preprocessing.
    #[default]
    Mediated,
    /// Manual preprocessing into a raw model.
    Direct,
}

enum Backend {
    Mediated(Arc<dyn ImageClassifier>),
    Direct {
        model: Arc<dyn ScoreModel>,
        input: InputSpec,
    },
}

/// Runs one raw image through normalization and inference.
pub struct Pipeline {
    backend: Backend,
}

impl Pipeline {
    /// Creates a pipeline on the mediated path.
    #[must_use]
    pub fn mediated(classifier: Arc<dyn ImageClassifier>) -> Self {
        Self {
            backend: Backend::Mediated(classifier),
        }
    }

    /// Creates a pipeline on the direct buffer path.
    #[must_use]
    pub fn direct(model: Arc<dyn ScoreModel>, input: InputSpec) -> Self {
        Self {
            backend: Backend::Direct { model, input },
        }
    }

    /// Returns the inference path of this pipeline.
    #[must_use]
    pub const fn path(&self) -> InferencePath {
        match self.backend {
            Backend::Mediated(_) => InferencePath::Mediated,
            Backend::Direct { .. } => InferencePath::Direct,
        }
    }

    /// Classifies one image.
    ///
    /// # Errors
    ///
    /// Returns the [`ClassifyError`] describing the stage that failed. Empty
    /// images fail with [`ClassifyError::InvalidImage`] before any model call.
    pub fn run(&self, raw: RawImage) -> Result<PredictionResult, ClassifyError> {
        if raw.is_empty() {
            warn!("No pixel data in {}", raw.source);
            return Err(ClassifyError::InvalidImage);
        }

        let normalized = normalize_orientation(raw);

        match &self.backend {
            Backend::Mediated(classifier) => {
                let ranked = classifier.classify(&normalized)?;
                debug!("{} ranked classes for {}", ranked.len(), normalized.source());
                ranked
                    .into_iter()
                    .next()
                    .map(PredictionResult::from)
                    .ok_or(ClassifyError::NoPrediction)
            }
            Backend::Direct { model, input } => {
                let resized = normalized
                    .resize(input.width, input.height)
                    .ok_or(ClassifyError::Resize)?;
                let buffer = InferenceBuffer::from_image(resized.image(), input.layout)
                    .ok_or(ClassifyError::BufferConversion)?;
                let scores = model.predict(&buffer)?;
                select_top(&scores).ok_or(ClassifyError::OutputProcessing)
            }
        }
    }
}

/// Picks a maximal entry of a label-to-score mapping.
///
/// Non-finite scores are ignored. Returns `None` if no finite score remains.
#[must_use]
pub fn select_top(scores: &HashMap<String, f32>) -> Option<PredictionResult> {
    scores
        .iter()
        .filter(|(_, score)| score.is_finite())
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(label, score)| PredictionResult::new(label.as_str(), *score))
}
