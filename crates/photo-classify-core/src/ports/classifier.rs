//! Model ports: the pretrained classifier seen as an opaque capability.

use std::collections::HashMap;

use crate::domain::{Classification, InferenceBuffer, InferenceError, NormalizedImage};

/// High-level classifier that does its own resizing and format conversion.
pub trait ImageClassifier: Send + Sync {
    /// Classifies an upright bitmap.
    ///
    /// Returns entries ranked by descending confidence. An empty list means
    /// the model produced no observation.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::Load`] if the model is unavailable and
    /// [`InferenceError::Execution`] if the request fails.
    fn classify(&self, image: &NormalizedImage) -> Result<Vec<Classification>, InferenceError>;
}

/// Raw model interface fed with a prepared pixel buffer.
pub trait ScoreModel: Send + Sync {
    /// Runs the model and returns a score per class label.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::Load`] if the model is unavailable and
    /// [`InferenceError::Execution`] if the prediction fails.
    fn predict(&self, buffer: &InferenceBuffer) -> Result<HashMap<String, f32>, InferenceError>;
}
