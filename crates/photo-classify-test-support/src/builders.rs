//! Synthetic image builders for testing.

use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use photo_classify_core::domain::{Orientation, RawImage};

/// Builder for creating synthetic raw images.
pub struct SyntheticImageBuilder;

impl SyntheticImageBuilder {
    // === Plain Images ===

    /// Creates an upright single-color image.
    #[must_use]
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> RawImage {
        let img = RgbImage::from_pixel(width, height, Rgb(rgb));
        RawImage::new("synthetic://solid", DynamicImage::ImageRgb8(img))
    }

    /// Creates a raw image with no pixels.
    #[must_use]
    pub fn empty() -> RawImage {
        RawImage::new("synthetic://empty", DynamicImage::new_rgb8(0, 0))
    }

    /// Creates a horizontal red gradient.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn gradient(width: u32, height: u32) -> RawImage {
        let img = RgbImage::from_fn(width, height, |x, _| {
            let val = ((u32::from(u8::MAX) * x) / width.max(1)) as u8;
            Rgb([val, 0, 0])
        });
        RawImage::new("synthetic://gradient", DynamicImage::ImageRgb8(img))
    }

    /// Creates a semi-transparent RGBA image.
    #[must_use]
    pub fn translucent(width: u32, height: u32, rgba: [u8; 4]) -> RawImage {
        let img = RgbaImage::from_pixel(width, height, Rgba(rgba));
        RawImage::new("synthetic://translucent", DynamicImage::ImageRgba8(img))
    }

    // === Orientation Images ===

    /// Creates an upright image with four colored quadrants.
    ///
    /// Top-left red, top-right green, bottom-left blue, bottom-right white.
    /// Any rotation or mirroring moves at least one color.
    #[must_use]
    pub fn quadrants(width: u32, height: u32) -> DynamicImage {
        let img = RgbImage::from_fn(width, height, |x, y| {
            match (x < width / 2, y < height / 2) {
                (true, true) => Rgb([255, 0, 0]),
                (false, true) => Rgb([0, 255, 0]),
                (true, false) => Rgb([0, 0, 255]),
                (false, false) => Rgb([255, 255, 255]),
            }
        });
        DynamicImage::ImageRgb8(img)
    }

    /// Stores `upright` the way a camera would for `orientation`.
    ///
    /// Applying `orientation` to the result yields `upright` again.
    #[must_use]
    pub fn stored_as(upright: &DynamicImage, orientation: Orientation) -> RawImage {
        let stored = match orientation {
            Orientation::Up => upright.clone(),
            Orientation::UpMirrored => upright.fliph(),
            Orientation::Down => upright.rotate180(),
            Orientation::DownMirrored => upright.flipv(),
            Orientation::LeftMirrored => upright.rotate90().fliph(),
            Orientation::Right => upright.rotate270(),
            Orientation::RightMirrored => upright.rotate270().fliph(),
            Orientation::Left => upright.rotate90(),
        };
        RawImage::with_orientation("synthetic://oriented", stored, orientation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadrant_colors() {
        let img = SyntheticImageBuilder::quadrants(4, 4).to_rgb8();
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(3, 0).0, [0, 255, 0]);
        assert_eq!(img.get_pixel(0, 3).0, [0, 0, 255]);
        assert_eq!(img.get_pixel(3, 3).0, [255, 255, 255]);
    }

    #[test]
    fn test_stored_dimensions() {
        let upright = SyntheticImageBuilder::quadrants(6, 4);
        let raw = SyntheticImageBuilder::stored_as(&upright, Orientation::Right);
        assert_eq!((raw.width, raw.height), (4, 6));
        assert_eq!(raw.orientation, Orientation::Right);
    }

    #[test]
    fn test_empty_has_no_pixels() {
        assert!(SyntheticImageBuilder::empty().is_empty());
    }
}
