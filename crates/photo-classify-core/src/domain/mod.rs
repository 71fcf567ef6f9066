//! Core domain types for photo classification.

mod bitmap;
mod buffer;
mod error;
mod result;

pub use bitmap::{NormalizedImage, Orientation, RawImage};
pub use buffer::{AlphaMode, ChannelOrder, InferenceBuffer, InputSpec, PixelLayout};
pub use error::{ClassifyError, InferenceError};
pub use result::{Classification, ClassificationRecord, PredictionResult, RecordStatus};
