//! In-memory image source and raster builders for unit tests

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use image::Rgba;

use super::signature::Rgba16Image;
use crate::decoder::{DecodeError, ImageSource};

/// Single-row 16-bit raster from 8-bit colors
pub fn row(colors: &[[u8; 3]]) -> Rgba16Image {
    grid(colors.len() as u32, 1, |x, _| colors[x as usize])
}

pub fn solid(width: u32, height: u32, color: [u8; 3]) -> Rgba16Image {
    grid(width, height, |_, _| color)
}

pub fn grid(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 3]) -> Rgba16Image {
    Rgba16Image::from_fn(width, height, |x, y| {
        let [r, g, b] = f(x, y);
        Rgba([r as u16 * 257, g as u16 * 257, b as u16 * 257, u16::MAX])
    })
}

pub const RED: [u8; 3] = [255, 0, 0];
pub const BLUE: [u8; 3] = [0, 0, 255];
pub const GREEN: [u8; 3] = [0, 255, 0];

#[derive(Default)]
pub struct MemorySource {
    images: HashMap<PathBuf, Option<Rgba16Image>>,
    decodes: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, path: &str, image: Rgba16Image) -> Self {
        self.images.insert(PathBuf::from(path), Some(image));
        self
    }

    pub fn with_failure(mut self, path: &str) -> Self {
        self.images.insert(PathBuf::from(path), None);
        self
    }

    pub fn decode_count(&self) -> usize {
        self.decodes.load(Ordering::SeqCst)
    }
}

impl ImageSource for MemorySource {
    fn decode(&self, path: &Path) -> Result<Rgba16Image, DecodeError> {
        self.decodes.fetch_add(1, Ordering::SeqCst);
        match self.images.get(path) {
            Some(Some(image)) => Ok(image.clone()),
            Some(None) => Err(io::Error::new(io::ErrorKind::InvalidData, "corrupt").into()),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "missing").into()),
        }
    }
}
