//! Photo Classify Adapters - External adapters for photo-classify.
//!
//! This crate provides adapters for:
//! - Filesystem image acquisition with EXIF orientation
//! - Model downloading and caching

pub mod fs;
pub mod models;

pub use fs::{decode_raw_image, read_orientation, FsImageSource};
pub use models::{model_path, models_dir, set_models_dir};
