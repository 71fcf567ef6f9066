//! Resizing to a model's fixed input size.

use image::imageops::FilterType;

use crate::domain::NormalizedImage;

/// Resampling filter used for model inputs.
pub const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

impl NormalizedImage {
    /// Scales the image to exactly `width` x `height`.
    ///
    /// Aspect ratio is not preserved. Returns `None` if the source or the
    /// target size is empty.
    #[must_use]
    pub fn resize(&self, width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 || self.width() == 0 || self.height() == 0 {
            return None;
        }
        if (self.width(), self.height()) == (width, height) {
            return Some(self.clone());
        }

        let resized = self.image().resize_exact(width, height, RESIZE_FILTER);
        (resized.width() == width && resized.height() == height)
            .then(|| Self::new(self.source(), resized))
    }
}
