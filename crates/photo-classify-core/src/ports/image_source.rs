//! Acquisition port: where raw images come from.

use crate::domain::RawImage;

/// Port for acquiring images to classify.
pub trait ImageSource: Send + Sync {
    /// Returns an iterator over acquired images.
    ///
    /// # Errors
    ///
    /// Individual items may be errors if an image cannot be read or decoded.
    fn images(&self) -> Box<dyn Iterator<Item = anyhow::Result<RawImage>> + Send + '_>;

    /// Returns the total number of images, if known.
    fn count_hint(&self) -> Option<usize>;
}
