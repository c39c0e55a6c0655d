//! Image upload: raw file bytes to a placeable image reference.
//!
//! Decoding runs outside the editor. The editor hands out a [`PendingImage`]
//! ticket and inserts the result only when the caller completes it, so a
//! failed or abandoned upload never leaves a partial image on a page.

use crate::objects::{ImageFormat, ImageSource};
use crate::storage::{BoxFuture, MaybeSendSync};
use kurbo::Point;
use thiserror::Error;

/// Why an upload produced no image.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Failed to read file: {0}")]
    Read(String),
    #[error("Empty file")]
    Empty,
}

/// A decoded image ready to be placed.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedImage {
    pub source: ImageSource,
    /// Natural size in pixels.
    pub width: u32,
    pub height: u32,
}

/// Turns file contents into an image reference.
pub trait ImageUploader: MaybeSendSync {
    /// `name` is the original file name, used as a format hint.
    fn upload(&self, name: &str, data: Vec<u8>) -> BoxFuture<'_, Result<UploadedImage, UploadError>>;
}

/// Embeds the bytes in the document as base64.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddingUploader;

impl EmbeddingUploader {
    pub fn new() -> Self {
        Self
    }
}

/// Detect the format from content, falling back to the file extension.
fn detect_format(name: &str, data: &[u8]) -> Result<ImageFormat, UploadError> {
    ImageFormat::from_magic_bytes(data)
        .or_else(|| {
            name.rsplit_once('.')
                .and_then(|(_, ext)| ImageFormat::from_extension(ext))
        })
        .ok_or_else(|| UploadError::UnsupportedFormat(name.to_string()))
}

impl ImageUploader for EmbeddingUploader {
    fn upload(&self, name: &str, data: Vec<u8>) -> BoxFuture<'_, Result<UploadedImage, UploadError>> {
        let name = name.to_string();
        Box::pin(async move {
            if data.is_empty() {
                return Err(UploadError::Empty);
            }
            let format = detect_format(&name, &data)?;
            let decoded =
                image::load_from_memory(&data).map_err(|e| UploadError::Decode(e.to_string()))?;
            let (width, height) = (decoded.width(), decoded.height());
            log::debug!("Decoded {name} as {format:?} ({width}x{height})");
            Ok(UploadedImage {
                source: ImageSource::embed(format, &data),
                width,
                height,
            })
        })
    }
}

/// Read an image file from disk.
#[cfg(not(target_arch = "wasm32"))]
pub fn read_image_file(path: &std::path::Path) -> Result<Vec<u8>, UploadError> {
    std::fs::read(path).map_err(|e| UploadError::Read(format!("{}: {e}", path.display())))
}

/// Ticket for an upload in flight. Carries where the image will go.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingImage {
    pub ticket: u64,
    pub page: usize,
    /// Top-left corner in page coordinates.
    pub position: Point,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollster::block_on;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 0, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_embed_png() {
        let uploader = EmbeddingUploader::new();
        let data = png_bytes(6, 3);
        let uploaded = block_on(uploader.upload("photo.png", data.clone())).unwrap();
        assert_eq!((uploaded.width, uploaded.height), (6, 3));
        assert_eq!(uploaded.source.data().unwrap().unwrap(), data);
        assert!(uploaded.source.href().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_empty_file() {
        let result = block_on(EmbeddingUploader.upload("photo.png", Vec::new()));
        assert!(matches!(result, Err(UploadError::Empty)));
    }

    #[test]
    fn test_unknown_format() {
        let result = block_on(EmbeddingUploader.upload("notes.txt", b"hello world".to_vec()));
        assert!(matches!(result, Err(UploadError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_corrupt_data_with_image_extension() {
        let result = block_on(EmbeddingUploader.upload("broken.jpg", b"not a jpeg".to_vec()));
        assert!(matches!(result, Err(UploadError::Decode(_))));
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_image_file(std::path::Path::new("/definitely/not/here.png"));
        assert!(matches!(result, Err(UploadError::Read(_))));
    }
}
