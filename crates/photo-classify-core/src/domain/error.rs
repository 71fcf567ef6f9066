//! Failure outcomes of a classification request.

use thiserror::Error;

/// Terminal failure of a single classification request.
///
/// The `Display` text is the exact message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    /// The source had no decodable pixel data.
    #[error("Invalid image.")]
    InvalidImage,
    /// The model could not be loaded. Carries the underlying cause.
    #[error("Failed to load model.")]
    ModelLoad(String),
    /// The model failed while running.
    #[error("Error: {0}")]
    Execution(String),
    /// The model returned an empty ranked list.
    #[error("No prediction found.")]
    NoPrediction,
    /// Resizing to the model input size failed.
    #[error("Failed to resize image.")]
    Resize,
    /// Packing the pixel buffer failed.
    #[error("Failed to convert image to pixel buffer.")]
    BufferConversion,
    /// The raw score mapping had no usable maximum.
    #[error("Failed to process output dictionary.")]
    OutputProcessing,
}

/// Errors raised at the model boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    /// Weights or vocabulary could not be loaded.
    #[error("model load failed: {0}")]
    Load(String),
    /// The forward pass or post-processing failed.
    #[error("{0}")]
    Execution(String),
}

impl From<InferenceError> for ClassifyError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::Load(cause) => Self::ModelLoad(cause),
            InferenceError::Execution(msg) => Self::Execution(msg),
        }
    }
}
