//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations every backend must
//! support: decode (for classification) and resize (for derivatives). Both work
//! on encoded bytes in memory, never on paths, so storage stays behind the
//! [`StorageRoot`](crate::storage::StorageRoot) seam.
//!
//! The production implementation,
//! [`RustBackend`](super::rust_backend::RustBackend), is pure Rust and built
//! on the `image` crate.

use super::params::ResizeParams;
use image::DynamicImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Failed to encode image: {0}")]
    Encode(String),
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// An encoded resized image ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derivative {
    pub data: Vec<u8>,
    pub dimensions: Dimensions,
}

/// Trait for image processing backends.
///
/// `Sync` so one backend can serve every rayon worker of a batch.
pub trait ImageBackend: Sync {
    /// Decode encoded bytes into a pixel grid, sniffing the format from content.
    fn decode(&self, data: &[u8]) -> Result<DynamicImage, BackendError>;

    /// Decode, normalize to RGB8, resize per policy, and re-encode.
    fn resize(&self, params: &ResizeParams) -> Result<Derivative, BackendError>;
}
