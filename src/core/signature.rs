//! Color-frequency signatures
//!
//! A signature counts how many pixels of an image fall on each quantized
//! color. Pixel positions are discarded; only the color distribution remains.

use std::collections::HashMap;

use image::{ImageBuffer, Rgb, Rgba, RgbImage, RgbaImage};
use serde::Serialize;

/// 16-bit RGBA raster, the uniform layout every decoded image is converted to.
pub type Rgba16Image = ImageBuffer<Rgba<u16>, Vec<u16>>;

/// Read access to a rectangular pixel grid with 16-bit color samples.
pub trait PixelGrid {
    fn dimensions(&self) -> (u32, u32);

    /// Red, green and blue samples in the 0..=65535 range. Alpha is not exposed.
    fn rgb16(&self, x: u32, y: u32) -> [u16; 3];
}

impl PixelGrid for Rgba16Image {
    fn dimensions(&self) -> (u32, u32) {
        ImageBuffer::dimensions(self)
    }

    fn rgb16(&self, x: u32, y: u32) -> [u16; 3] {
        let Rgba([r, g, b, _]) = *self.get_pixel(x, y);
        [r, g, b]
    }
}

// 8-bit sources are widened the same way the decoder does (v * 257),
// so both paths quantize to identical keys.
impl PixelGrid for RgbImage {
    fn dimensions(&self) -> (u32, u32) {
        ImageBuffer::dimensions(self)
    }

    fn rgb16(&self, x: u32, y: u32) -> [u16; 3] {
        let Rgb([r, g, b]) = *self.get_pixel(x, y);
        [widen(r), widen(g), widen(b)]
    }
}

impl PixelGrid for RgbaImage {
    fn dimensions(&self) -> (u32, u32) {
        ImageBuffer::dimensions(self)
    }

    fn rgb16(&self, x: u32, y: u32) -> [u16; 3] {
        let Rgba([r, g, b, _]) = *self.get_pixel(x, y);
        [widen(r), widen(g), widen(b)]
    }
}

#[inline]
fn widen(v: u8) -> u16 {
    v as u16 * 257
}

/// Quantized 8-bit-per-channel color used as a signature key
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize)]
pub struct ColorKey {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ColorKey {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Drop the low 8 bits of each 16-bit channel.
    #[inline]
    pub fn from_rgb16([r, g, b]: [u16; 3]) -> Self {
        Self {
            r: (r >> 8) as u8,
            g: (g >> 8) as u8,
            b: (b >> 8) as u8,
        }
    }
}

/// Frequency of each quantized color over every pixel of one image.
///
/// Immutable once built; the sum of all counts equals width * height.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Signature {
    counts: HashMap<ColorKey, u64>,
    total: u64,
}

impl Signature {
    pub fn build<G: PixelGrid + ?Sized>(image: &G) -> Self {
        let (width, height) = image.dimensions();
        let mut counts: HashMap<ColorKey, u64> = HashMap::new();

        for x in 0..width {
            for y in 0..height {
                let key = ColorKey::from_rgb16(image.rgb16(x, y));
                *counts.entry(key).or_insert(0) += 1;
            }
        }

        Self {
            counts,
            total: width as u64 * height as u64,
        }
    }

    /// Count for `key`, zero when the color never occurs.
    pub fn count(&self, key: &ColorKey) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn distinct_colors(&self) -> usize {
        self.counts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ColorKey, &u64)> {
        self.counts.iter()
    }

    /// The `n` most frequent colors, highest count first, ties by key.
    pub fn most_frequent(&self, n: usize) -> Vec<(ColorKey, u64)> {
        let mut entries: Vec<(ColorKey, u64)> = self.counts.iter().map(|(k, c)| (*k, *c)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        entries.truncate(n);
        entries
    }
}
