//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the domain core and external adapters.

mod classifier;
mod image_source;
mod result_output;

pub use classifier::{ImageClassifier, ScoreModel};
pub use image_source::ImageSource;
pub use result_output::ResultOutput;
