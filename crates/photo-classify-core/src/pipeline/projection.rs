//! Projection of outcomes into display text.

use crate::domain::{ClassifyError, PredictionResult};

/// Label shown before any image has been classified.
pub const INITIAL_LABEL: &str = "Select an image to classify";

/// Formats a request outcome for display.
#[must_use]
pub fn display_text(outcome: &Result<PredictionResult, ClassifyError>) -> String {
    match outcome {
        Ok(prediction) => prediction.to_string(),
        Err(err) => err.to_string(),
    }
}
