//! Fixed-layout pixel buffers matching a model's input tensor.

use std::fmt;
use std::str::FromStr;

use image::DynamicImage;

/// Byte order of the four channels in each pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelOrder {
    /// Blue, green, red, alpha.
    #[default]
    Bgra,
    /// Alpha, red, green, blue.
    Argb,
    /// Red, green, blue, alpha.
    Rgba,
}

impl ChannelOrder {
    /// Byte offsets of red, green, blue and alpha within a pixel.
    #[must_use]
    pub const fn offsets(self) -> [usize; 4] {
        match self {
            Self::Bgra => [2, 1, 0, 3],
            Self::Argb => [1, 2, 3, 0],
            Self::Rgba => [0, 1, 2, 3],
        }
    }
}

impl FromStr for ChannelOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bgra" => Ok(Self::Bgra),
            "argb" => Ok(Self::Argb),
            "rgba" => Ok(Self::Rgba),
            other => Err(format!(
                "unknown channel order '{other}', expected bgra, argb or rgba"
            )),
        }
    }
}

impl fmt::Display for ChannelOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bgra => "bgra",
            Self::Argb => "argb",
            Self::Rgba => "rgba",
        })
    }
}

/// How the alpha channel is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaMode {
    /// Alpha is forced to 255 and color is stored as-is.
    #[default]
    Opaque,
    /// Color channels are premultiplied by alpha.
    Premultiplied,
}

/// Complete description of a 32-bit sRGB pixel layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelLayout {
    /// Channel byte order.
    pub order: ChannelOrder,
    /// Alpha handling.
    pub alpha: AlphaMode,
}

impl PixelLayout {
    /// Bytes per pixel for every supported layout.
    pub const BYTES_PER_PIXEL: usize = 4;

    /// Creates a layout.
    #[must_use]
    pub const fn new(order: ChannelOrder, alpha: AlphaMode) -> Self {
        Self { order, alpha }
    }
}

/// Fixed input geometry and layout expected by a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSpec {
    /// Input width in pixels.
    pub width: u32,
    /// Input height in pixels.
    pub height: u32,
    /// Pixel layout of the input buffer.
    pub layout: PixelLayout,
}

impl InputSpec {
    /// Default square input edge used by common ImageNet classifiers.
    pub const DEFAULT_SIZE: u32 = 224;

    /// Square input with the default layout.
    #[must_use]
    pub fn square(size: u32) -> Self {
        Self {
            width: size,
            height: size,
            layout: PixelLayout::default(),
        }
    }

    /// Replaces the pixel layout.
    #[must_use]
    pub const fn with_layout(mut self, layout: PixelLayout) -> Self {
        self.layout = layout;
        self
    }
}

impl Default for InputSpec {
    fn default() -> Self {
        Self::square(Self::DEFAULT_SIZE)
    }
}

/// Packed 32-bit pixel buffer handed to a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceBuffer {
    width: u32,
    height: u32,
    bytes_per_row: usize,
    layout: PixelLayout,
    data: Vec<u8>,
}

impl InferenceBuffer {
    /// Packs an image into the given layout.
    ///
    /// Returns `None` if the image is empty or its byte size overflows.
    #[must_use]
    pub fn from_image(image: &DynamicImage, layout: PixelLayout) -> Option<Self> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return None;
        }

        let bytes_per_row = (width as usize).checked_mul(PixelLayout::BYTES_PER_PIXEL)?;
        let len = bytes_per_row.checked_mul(height as usize)?;
        let [r, g, b, a] = layout.order.offsets();

        let rgba = image.to_rgba8();
        let mut data = vec![0u8; len];
        for (dst, px) in data
            .chunks_exact_mut(PixelLayout::BYTES_PER_PIXEL)
            .zip(rgba.pixels())
        {
            let [pr, pg, pb, pa] = px.0;
            match layout.alpha {
                AlphaMode::Opaque => {
                    dst[r] = pr;
                    dst[g] = pg;
                    dst[b] = pb;
                    dst[a] = u8::MAX;
                }
                AlphaMode::Premultiplied => {
                    dst[r] = premultiply(pr, pa);
                    dst[g] = premultiply(pg, pa);
                    dst[b] = premultiply(pb, pa);
                    dst[a] = pa;
                }
            }
        }

        Some(Self {
            width,
            height,
            bytes_per_row,
            layout,
            data,
        })
    }

    /// Buffer width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Buffer height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Row stride in bytes.
    #[must_use]
    pub const fn bytes_per_row(&self) -> usize {
        self.bytes_per_row
    }

    /// Pixel layout of the packed data.
    #[must_use]
    pub const fn layout(&self) -> PixelLayout {
        self.layout
    }

    /// Raw packed bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Straight (non-premultiplied) RGB channels of the pixel at `(x, y)`.
    #[must_use]
    pub fn rgb_at(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = y as usize * self.bytes_per_row + x as usize * PixelLayout::BYTES_PER_PIXEL;
        let px = self.data.get(start..start + PixelLayout::BYTES_PER_PIXEL)?;
        let [r, g, b, a] = self.layout.order.offsets();
        let rgb = [px[r], px[g], px[b]];

        Some(match self.layout.alpha {
            AlphaMode::Opaque => rgb,
            AlphaMode::Premultiplied => rgb.map(|c| unpremultiply(c, px[a])),
        })
    }

    /// Iterates straight RGB pixels in row-major order.
    pub fn rgb_pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).filter_map(move |x| self.rgb_at(x, y))
        })
    }
}

#[allow(clippy::cast_possible_truncation)]
fn premultiply(c: u8, a: u8) -> u8 {
    ((u16::from(c) * u16::from(a) + 127) / 255) as u8
}

#[allow(clippy::cast_possible_truncation)]
fn unpremultiply(c: u8, a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    ((u16::from(c) * 255 + u16::from(a) / 2) / u16::from(a)).min(255) as u8
}
