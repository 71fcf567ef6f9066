//! Orientation normalization.

use image::DynamicImage;
use tracing::debug;

use crate::domain::{NormalizedImage, Orientation, RawImage};

/// Re-renders a raw image so its pixels are stored upright.
///
/// Upright input is moved through without copying pixel data.
#[must_use]
pub fn normalize_orientation(raw: RawImage) -> NormalizedImage {
    let RawImage {
        source,
        orientation,
        image,
        ..
    } = raw;

    if orientation != Orientation::Up {
        debug!("Normalizing {source} from {orientation:?}");
    }

    NormalizedImage::new(source, apply_orientation(image, orientation))
}

/// Applies the transform that brings `orientation` to upright.
#[must_use]
pub fn apply_orientation(image: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Up => image,
        Orientation::UpMirrored => image.fliph(),
        Orientation::Down => image.rotate180(),
        Orientation::DownMirrored => image.flipv(),
        Orientation::LeftMirrored => image.rotate90().fliph(),
        Orientation::Right => image.rotate90(),
        Orientation::RightMirrored => image.rotate270().fliph(),
        Orientation::Left => image.rotate270(),
    }
}
