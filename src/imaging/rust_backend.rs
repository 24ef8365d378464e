//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP, GIF, BMP) | `image::ImageReader` with content sniffing |
//! | Normalize | `DynamicImage::to_rgb8` (drops alpha, expands palette/gray) |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` at the configured quality |
//! | Encode → other | `DynamicImage::write_to` for any format with an encoder compiled in |

use super::backend::{BackendError, Derivative, Dimensions, ImageBackend};
use super::calculations::target_dimensions;
use super::params::{Quality, ResizeParams};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode an image from memory, guessing the format from its magic bytes.
fn load_image(data: &[u8]) -> Result<DynamicImage, BackendError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .decode()
        .map_err(|e| BackendError::Decode(e.to_string()))
}

/// Encode an image into `format`.
fn encode_image(
    img: &DynamicImage,
    format: ImageFormat,
    quality: Quality,
) -> Result<Vec<u8>, BackendError> {
    let mut buf = Cursor::new(Vec::new());

    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality.value());
            img.write_with_encoder(encoder)
                .map_err(|e| BackendError::Encode(format!("JPEG encode failed: {}", e)))?;
        }
        other if other.writing_enabled() => {
            img.write_to(&mut buf, other)
                .map_err(|e| BackendError::Encode(format!("{:?} encode failed: {}", other, e)))?;
        }
        other => {
            return Err(BackendError::UnsupportedFormat(format!("{:?}", other)));
        }
    }

    Ok(buf.into_inner())
}

impl ImageBackend for RustBackend {
    fn decode(&self, data: &[u8]) -> Result<DynamicImage, BackendError> {
        load_image(data)
    }

    fn resize(&self, params: &ResizeParams) -> Result<Derivative, BackendError> {
        let img = load_image(params.source)?;

        // RGB8 tolerates alpha, palette and 16-bit inputs that JPEG would reject
        let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

        let (width, height) = target_dimensions(params.policy, (rgb.width(), rgb.height()));
        let resized = if (width, height) == (rgb.width(), rgb.height()) {
            rgb
        } else {
            rgb.resize_exact(width, height, FilterType::Lanczos3)
        };

        let data = encode_image(&resized, params.format, params.quality)?;
        Ok(Derivative {
            data,
            dimensions: Dimensions { width, height },
        })
    }
}
