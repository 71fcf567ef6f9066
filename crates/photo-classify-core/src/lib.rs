//! Photo Classify Core - Domain logic and inference pipeline
//!
//! This crate contains the core domain types, model ports, the
//! orientation/resize/buffer pipeline, the background classification service,
//! and a candle-based classifier binding.

pub mod domain;
pub mod inference;
pub mod pipeline;
pub mod ports;
pub mod service;

pub use domain::{
    AlphaMode, ChannelOrder, Classification, ClassificationRecord, ClassifyError,
    InferenceBuffer, InferenceError, InputSpec, NormalizedImage, Orientation, PixelLayout,
    PredictionResult, RawImage, RecordStatus,
};
pub use inference::{CandleClassifier, ClassifierConfig};
pub use pipeline::{display_text, normalize_orientation, InferencePath, Pipeline, INITIAL_LABEL};
pub use ports::{ImageClassifier, ImageSource, ResultOutput, ScoreModel};
pub use service::{ClassificationService, LabelState, LabelUpdate, RequestId};
