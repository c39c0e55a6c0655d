//! Image objects for embedded or linked raster images.

use super::{ObjectId, ObjectTrait};
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Image format for stored image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }

        None
    }
}

/// Where the pixels of an image come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImageSource {
    /// A reference resolved by the host (URL, asset key).
    Url(String),
    /// Bytes carried inside the document.
    Embedded {
        format: ImageFormat,
        /// Base64 keeps the JSON document self-contained.
        data_base64: String,
    },
}

impl ImageSource {
    /// Embed raw bytes.
    pub fn embed(format: ImageFormat, data: &[u8]) -> Self {
        ImageSource::Embedded {
            format,
            data_base64: STANDARD.encode(data),
        }
    }

    /// Decode embedded bytes; `None` for URL sources.
    pub fn data(&self) -> Option<Result<Vec<u8>, base64::DecodeError>> {
        match self {
            ImageSource::Url(_) => None,
            ImageSource::Embedded { data_base64, .. } => Some(STANDARD.decode(data_base64)),
        }
    }

    /// A `data:` URL or the plain reference, usable by a browser renderer.
    pub fn href(&self) -> String {
        match self {
            ImageSource::Url(url) => url.clone(),
            ImageSource::Embedded {
                format,
                data_base64,
            } => format!("data:{};base64,{}", format.mime_type(), data_base64),
        }
    }
}

/// An image placed on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub(crate) id: ObjectId,
    /// Top-left corner position.
    pub position: Point,
    /// Display width.
    pub width: f64,
    /// Display height.
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
    pub source: ImageSource,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub locked: bool,
    #[serde(default = "super::text::default_visible")]
    pub visible: bool,
}

fn default_opacity() -> f64 {
    1.0
}

impl Image {
    pub fn new(position: Point, source: ImageSource, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width,
            height,
            rotation: 0.0,
            source,
            opacity: 1.0,
            locked: false,
            visible: true,
        }
    }

    /// Scale down (never up) so neither side exceeds `max_side`.
    pub fn fit_within(mut self, max_side: f64) -> Self {
        let largest = self.width.max(self.height);
        if largest > max_side && largest > 0.0 {
            let scale = max_side / largest;
            self.width *= scale;
            self.height *= scale;
        }
        self
    }
}

impl ObjectTrait for Image {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, (self.width, self.height))
    }

    fn is_locked(&self) -> bool {
        self.locked
    }

    fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_bytes() {
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D]),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF89a"), None);
    }

    #[test]
    fn test_extension() {
        assert_eq!(ImageFormat::from_extension("JPG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("bmp"), None);
    }

    #[test]
    fn test_embedded_data_roundtrip() {
        let source = ImageSource::embed(ImageFormat::Png, &[1, 2, 3]);
        let image = Image::new(Point::ZERO, source, 10.0, 20.0);
        assert_eq!(image.source.data().unwrap().unwrap(), vec![1, 2, 3]);
        assert!(image.source.href().starts_with("data:image/png;base64,"));
        assert_eq!(image.bounds(), Rect::new(0.0, 0.0, 10.0, 20.0));
    }

    #[test]
    fn test_url_source_has_no_data() {
        let source = ImageSource::Url("https://example.com/a.png".into());
        assert!(source.data().is_none());
        assert_eq!(source.href(), "https://example.com/a.png");
    }

    #[test]
    fn test_fit_within_keeps_aspect() {
        let image = Image::new(Point::ZERO, ImageSource::Url("a".into()), 800.0, 400.0)
            .fit_within(400.0);
        assert!((image.width - 400.0).abs() < 1e-9);
        assert!((image.height - 200.0).abs() < 1e-9);

        let small = Image::new(Point::ZERO, ImageSource::Url("a".into()), 40.0, 20.0)
            .fit_within(400.0);
        assert!((small.width - 40.0).abs() < 1e-9);
    }
}
