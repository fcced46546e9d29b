use std::path::Path;

use image::io::Reader as ImageReader;
use thiserror::Error;

use crate::core::signature::Rgba16Image;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("cannot read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported or corrupt image: {0}")]
    Format(#[from] image::ImageError),
}

/// Supplies decoded rasters for image identifiers.
///
/// Must be `Sync`: reference images are decoded from worker threads.
pub trait ImageSource: Sync {
    fn decode(&self, path: &Path) -> Result<Rgba16Image, DecodeError>;
}

/// Decodes image files from disk with the `image` crate
#[derive(Clone, Copy, Debug, Default)]
pub struct FileImageSource;

impl ImageSource for FileImageSource {
    fn decode(&self, path: &Path) -> Result<Rgba16Image, DecodeError> {
        // Format is sniffed from the content, not the extension
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let decoded = reader.decode()?;
        Ok(decoded.into_rgba16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::signature::PixelGrid;
    use image::{Rgb, RgbImage};
    use std::fs;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("flag_match_decoder_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_decode_png_widens_channels() {
        let dir = scratch_dir("png");
        let path = dir.join("tile.png");
        RgbImage::from_pixel(3, 2, Rgb([12, 200, 255])).save(&path).unwrap();

        let img = FileImageSource.decode(&path).unwrap();
        assert_eq!(PixelGrid::dimensions(&img), (3, 2));
        assert_eq!(img.rgb16(2, 1), [12 * 257, 200 * 257, 65535]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = scratch_dir("missing");
        let err = FileImageSource.decode(&dir.join("nope.png")).unwrap_err();
        assert!(matches!(err, DecodeError::Io(_)));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_garbage_is_format_error() {
        let dir = scratch_dir("garbage");
        let path = dir.join("notes.txt");
        fs::write(&path, b"definitely not an image").unwrap();

        let err = FileImageSource.decode(&path).unwrap_err();
        assert!(matches!(err, DecodeError::Format(_)));
        fs::remove_dir_all(&dir).unwrap();
    }
}
