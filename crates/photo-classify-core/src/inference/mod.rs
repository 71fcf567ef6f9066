//! ML inference engine using Candle.
//!
//! Provides the pretrained classifier binding used by both pipeline paths:
//! - [`CompactNet`], a small convolutional classifier loaded from safetensors
//! - [`CandleClassifier`], which adapts it to the model ports

mod classifier;
mod compact_net;
mod device;
mod loader;
mod utils;

pub use classifier::{CandleClassifier, ClassifierConfig};
pub use compact_net::{CompactNet, STAGE_CHANNELS};
pub use device::get_device;
pub use loader::{load_labels, load_safetensors, LazyModel};
pub use utils::{rank, IMAGENET_MEAN, IMAGENET_STD};
