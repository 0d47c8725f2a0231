//! Car and driver photos: loading from disk and preparing for display.

use anyhow::{bail, Context, Result};
use image::imageops::FilterType;
use log::warn;
use std::fs;
use std::path::Path;

pub const NO_PHOTO: &str = "No photo";
pub const PHOTO_LOAD_FAILED: &str = "Photo failed to load";

const ACCEPTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// What the photo frame should show
#[derive(Debug, Clone, PartialEq)]
pub enum PhotoView {
    /// RGBA pixels scaled to fit the frame, aspect ratio kept
    Image {
        width: u32,
        height: u32,
        rgba: Vec<u8>,
    },
    Placeholder(&'static str),
}

/// Read a photo chosen by the user; only PNG and JPEG files are accepted
pub fn read_photo_file(path: &Path) -> Result<Vec<u8>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if !ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
        bail!("Unsupported photo format: {}", path.display());
    }

    fs::read(path).with_context(|| format!("Failed to read photo {}", path.display()))
}

/// Decode stored photo bytes and fit them into a `max_width` x `max_height` frame
pub fn photo_view(data: Option<&[u8]>, max_width: u32, max_height: u32) -> PhotoView {
    let Some(bytes) = data.filter(|b| !b.is_empty()) else {
        return PhotoView::Placeholder(NO_PHOTO);
    };

    match image::load_from_memory(bytes) {
        Ok(decoded) => {
            let scaled = decoded
                .resize(max_width, max_height, FilterType::Triangle)
                .to_rgba8();
            PhotoView::Image {
                width: scaled.width(),
                height: scaled.height(),
                rgba: scaled.into_raw(),
            }
        }
        Err(e) => {
            warn!("Stored photo could not be decoded: {}", e);
            PhotoView::Placeholder(PHOTO_LOAD_FAILED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 255]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_photo_is_scaled_keeping_aspect_ratio() {
        let bytes = png_bytes(40, 20);
        match photo_view(Some(&bytes), 300, 300) {
            PhotoView::Image {
                width,
                height,
                rgba,
            } => {
                assert_eq!((width, height), (300, 150));
                assert_eq!(rgba.len(), 300 * 150 * 4);
            }
            other => panic!("expected an image, got {:?}", other),
        }
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(photo_view(None, 100, 100), PhotoView::Placeholder(NO_PHOTO));
        assert_eq!(
            photo_view(Some(b"not an image"), 100, 100),
            PhotoView::Placeholder(PHOTO_LOAD_FAILED)
        );
    }

    #[test]
    fn test_read_photo_file_checks_extension() {
        let temp_dir = TempDir::new().unwrap();
        let png = temp_dir.path().join("car.PNG");
        fs::write(&png, png_bytes(2, 2)).unwrap();
        assert!(read_photo_file(&png).is_ok());

        let gif = temp_dir.path().join("car.gif");
        fs::write(&gif, b"GIF89a").unwrap();
        assert!(read_photo_file(&gif).is_err());
    }
}
