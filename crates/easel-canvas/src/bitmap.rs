//! Images
//!
//! Decoded RGBA images, the async image loader and PNG / data URL export.

use std::{fmt, io::Cursor, path::PathBuf, sync::Arc};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use easel_filters::PixelBuffer;
use image::{ImageFormat, RgbaImage};

use crate::{CanvasError, Result};

/// A decoded image, cheap to clone
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pixels: Arc<PixelBuffer>,
}

impl Image {
    pub fn new(pixels: PixelBuffer) -> Self {
        Self {
            pixels: Arc::new(pixels),
        }
    }

    /// Non-premultiplied RGBA bytes
    pub fn from_rgba(data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        Ok(Self::new(PixelBuffer::from_data(data, width, height)?))
    }

    /// Decode PNG, JPEG, GIF or WebP bytes
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        decode_pixels(bytes)
            .map(Self::new)
            .map_err(|reason| CanvasError::ImageLoad {
                source_id: ImageSource::bytes_id(bytes.len()),
                reason,
            })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }
}

impl From<PixelBuffer> for Image {
    fn from(pixels: PixelBuffer) -> Self {
        Self::new(pixels)
    }
}

/// Where an image comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
    /// `data:[<mediatype>][;base64],<data>`
    DataUrl(String),
}

impl ImageSource {
    /// Identifier reported in load errors
    pub fn id(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Bytes(bytes) => Self::bytes_id(bytes.len()),
            Self::DataUrl(url) => {
                let head: String = url.chars().take(40).collect();
                if head.len() < url.len() { format!("{head}...") } else { head }
            }
        }
    }

    fn bytes_id(len: usize) -> String {
        format!("<{len} bytes>")
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

impl From<&str> for ImageSource {
    fn from(s: &str) -> Self {
        if s.starts_with("data:") {
            Self::DataUrl(s.to_string())
        } else {
            Self::Path(PathBuf::from(s))
        }
    }
}

impl From<String> for ImageSource {
    fn from(s: String) -> Self {
        if s.starts_with("data:") {
            Self::DataUrl(s)
        } else {
            Self::Path(PathBuf::from(s))
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// Load and decode an image; decoding runs on the blocking pool
pub async fn resolve_image(source: impl Into<ImageSource>) -> Result<Image> {
    let source = source.into();
    let source_id = source.id();
    let load_error = |reason: String| CanvasError::ImageLoad {
        source_id: source_id.clone(),
        reason,
    };

    let bytes = match source {
        ImageSource::Path(path) => smol::fs::read(&path)
            .await
            .map_err(|e| load_error(e.to_string()))?,
        ImageSource::Bytes(bytes) => bytes,
        ImageSource::DataUrl(url) => decode_data_url(&url).map_err(load_error)?,
    };

    let pixels = smol::unblock(move || decode_pixels(&bytes))
        .await
        .map_err(load_error)?;

    tracing::debug!(
        source = %source_id,
        width = pixels.width(),
        height = pixels.height(),
        "image loaded"
    );
    Ok(Image::new(pixels))
}

fn decode_pixels(bytes: &[u8]) -> std::result::Result<PixelBuffer, String> {
    let decoded = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
    let rgba = decoded.into_rgba8();
    let (width, height) = rgba.dimensions();
    PixelBuffer::from_data(rgba.into_raw(), width, height).map_err(|e| e.to_string())
}

fn decode_data_url(url: &str) -> std::result::Result<Vec<u8>, String> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| "not a data URL".to_string())?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| "data URL has no payload".to_string())?;

    if meta.ends_with(";base64") {
        STANDARD.decode(payload.trim()).map_err(|e| e.to_string())
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

/// Encode non-premultiplied RGBA pixels as PNG
pub fn encode_png(pixels: &PixelBuffer) -> Result<Vec<u8>> {
    let (width, height) = (pixels.width(), pixels.height());
    let image = RgbaImage::from_raw(width, height, pixels.data().to_vec())
        .ok_or_else(|| CanvasError::Encode(format!("buffer does not match {width}x{height}")))?;

    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| CanvasError::Encode(e.to_string()))?;
    Ok(out.into_inner())
}

/// Encode as a `data:image/png;base64,` URL
pub fn to_data_url(pixels: &PixelBuffer) -> Result<String> {
    let png = encode_png(pixels)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PixelBuffer {
        let mut buf = PixelBuffer::new(2, 2);
        buf.set_pixel(0, 0, [255, 0, 0, 255]);
        buf.set_pixel(1, 1, [0, 0, 255, 128]);
        buf
    }

    #[test]
    fn test_png_round_trip_through_data_url() {
        let url = to_data_url(&sample()).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));

        let image = smol::block_on(resolve_image(url.as_str())).unwrap();
        assert_eq!(image.pixels(), &sample());
    }

    #[test]
    fn test_source_detection() {
        assert!(matches!(ImageSource::from("data:image/png;base64,AA"), ImageSource::DataUrl(_)));
        assert!(matches!(ImageSource::from("./cat.png"), ImageSource::Path(_)));
    }

    #[test]
    fn test_load_error_carries_source() {
        let err = smol::block_on(resolve_image("/definitely/missing/image.png")).unwrap_err();
        match err {
            CanvasError::ImageLoad { source_id, .. } => {
                assert_eq!(source_id, "/definitely/missing/image.png")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_garbage_bytes() {
        let err = Image::decode(b"not an image").unwrap_err();
        assert!(matches!(err, CanvasError::ImageLoad { .. }));
    }
}
