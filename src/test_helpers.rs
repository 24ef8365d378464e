//! Shared test utilities for the photo-intake test suite.
//!
//! Provides synthetic image builders, encoders that produce real upload
//! bytes, and a storage fixture wired to in-memory roots.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let part = jpeg_part("holiday.jpg", 64, 48);
//! let service = memory_service();
//! let response = service.upload(vec![part]).unwrap();
//! assert_eq!(response.count, 1);
//! ```

use image::{DynamicImage, GrayImage, ImageEncoder, ImageFormat, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

use crate::config::ServiceConfig;
use crate::imaging::RustBackend;
use crate::service::{ImageService, Layout};
use crate::storage::MemoryStorage;
use crate::types::UploadPart;

// =========================================================================
// Synthetic images
// =========================================================================

/// A grayscale image where every pixel is `value`.
pub fn uniform_gray(width: u32, height: u32, value: u8) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([value])))
}

/// An RGB image where every pixel is `rgb`.
pub fn uniform_rgb(width: u32, height: u32, rgb: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(rgb)))
}

// =========================================================================
// Encoders
// =========================================================================

/// Encode `img` in `format` and return the bytes.
pub fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

/// A small valid JPEG with a gradient, so it is not trivially compressible.
pub fn encode_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// A PNG with a translucent alpha channel.
pub fn encode_rgba_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, _| Rgba([200, 100, 50, (x % 256) as u8]));
    encode(&DynamicImage::ImageRgba8(img), ImageFormat::Png)
}

/// A lossless PNG of uniform gray `value` (PNG keeps the exact pixel values).
pub fn encode_gray_png(width: u32, height: u32, value: u8) -> Vec<u8> {
    encode(&uniform_gray(width, height, value), ImageFormat::Png)
}

// =========================================================================
// Upload parts
// =========================================================================

pub fn jpeg_part(name: &str, width: u32, height: u32) -> UploadPart {
    UploadPart::new(encode_test_jpeg(width, height), name, "image/jpeg")
}

pub fn gray_png_part(name: &str, value: u8) -> UploadPart {
    UploadPart::new(encode_gray_png(16, 16, value), name, "image/png")
}

/// A 16x16 lossless PNG of uniform color `rgb`.
pub fn rgb_png_part(name: &str, rgb: [u8; 3]) -> UploadPart {
    UploadPart::new(encode(&uniform_rgb(16, 16, rgb), ImageFormat::Png), name, "image/png")
}

pub fn text_part(name: &str) -> UploadPart {
    UploadPart::new(b"hello".to_vec(), name, "text/plain")
}

// =========================================================================
// Service fixture
// =========================================================================

/// A service over four empty in-memory roots with default config.
pub fn memory_service() -> ImageService<MemoryStorage, RustBackend> {
    let config = ServiceConfig::default();
    ImageService::new(Layout::in_memory(), RustBackend::new(), &config)
}
