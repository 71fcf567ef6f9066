//! Bitmap types flowing through the pipeline.

use image::DynamicImage;

/// Orientation tag of a captured bitmap, as stored in EXIF tag `0x0112`.
///
/// Names describe where the top row of the stored pixels ends up when the
/// image is displayed upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Orientation {
    /// Stored upright (EXIF 1).
    #[default]
    Up,
    /// Mirrored horizontally (EXIF 2).
    UpMirrored,
    /// Rotated 180° (EXIF 3).
    Down,
    /// Mirrored vertically (EXIF 4).
    DownMirrored,
    /// Transposed: mirrored, then rotated 90° clockwise (EXIF 5).
    LeftMirrored,
    /// Needs a 90° clockwise rotation (EXIF 6).
    Right,
    /// Transversed: mirrored, then rotated 90° counter-clockwise (EXIF 7).
    RightMirrored,
    /// Needs a 90° counter-clockwise rotation (EXIF 8).
    Left,
}

impl Orientation {
    /// All orientations in EXIF order.
    pub const ALL: [Self; 8] = [
        Self::Up,
        Self::UpMirrored,
        Self::Down,
        Self::DownMirrored,
        Self::LeftMirrored,
        Self::Right,
        Self::RightMirrored,
        Self::Left,
    ];

    /// Maps an EXIF orientation value. Out-of-range values read as `Up`.
    #[must_use]
    pub const fn from_exif(value: u32) -> Self {
        match value {
            2 => Self::UpMirrored,
            3 => Self::Down,
            4 => Self::DownMirrored,
            5 => Self::LeftMirrored,
            6 => Self::Right,
            7 => Self::RightMirrored,
            8 => Self::Left,
            _ => Self::Up,
        }
    }

    /// Returns the EXIF value for this orientation.
    #[must_use]
    pub const fn exif_value(self) -> u32 {
        match self {
            Self::Up => 1,
            Self::UpMirrored => 2,
            Self::Down => 3,
            Self::DownMirrored => 4,
            Self::LeftMirrored => 5,
            Self::Right => 6,
            Self::RightMirrored => 7,
            Self::Left => 8,
        }
    }

    /// True when displaying the image swaps its width and height.
    #[must_use]
    pub const fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Self::LeftMirrored | Self::Right | Self::RightMirrored | Self::Left
        )
    }
}

/// An unprocessed bitmap handed over by the acquisition surface.
#[derive(Debug, Clone)]
pub struct RawImage {
    /// Where the image came from (file path or synthetic label).
    pub source: String,
    /// Stored pixel width.
    pub width: u32,
    /// Stored pixel height.
    pub height: u32,
    /// Orientation tag read from metadata.
    pub orientation: Orientation,
    /// Decoded pixel data in its stored orientation.
    pub image: DynamicImage,
}

impl RawImage {
    /// Wraps a decoded image stored upright.
    #[must_use]
    pub fn new(source: impl Into<String>, image: DynamicImage) -> Self {
        Self::with_orientation(source, image, Orientation::Up)
    }

    /// Wraps a decoded image with an explicit orientation tag.
    #[must_use]
    pub fn with_orientation(
        source: impl Into<String>,
        image: DynamicImage,
        orientation: Orientation,
    ) -> Self {
        Self {
            source: source.into(),
            width: image.width(),
            height: image.height(),
            orientation,
            image,
        }
    }

    /// True if there are no pixels to classify.
    ///
    /// Reads the pixel data itself, not the recorded dimensions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }
}

/// A bitmap whose pixels are stored upright.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    source: String,
    image: DynamicImage,
}

impl NormalizedImage {
    /// Wraps pixels that are already upright.
    #[must_use]
    pub fn new(source: impl Into<String>, image: DynamicImage) -> Self {
        Self {
            source: source.into(),
            image,
        }
    }

    /// Orientation of the stored pixels, always `Up`.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        Orientation::Up
    }

    /// Source label inherited from the raw image.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrowed pixel data.
    #[must_use]
    pub const fn image(&self) -> &DynamicImage {
        &self.image
    }
}
