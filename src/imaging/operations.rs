//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, Derivative, ImageBackend};
use super::params::{Quality, ResizeParams, ResizePolicy};
use image::ImageFormat;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Configuration for derivative generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DerivativeConfig {
    pub policy: ResizePolicy,
    pub quality: Quality,
}

/// Output format for a stored filename, from its extension.
///
/// The derivative keeps the original's name, so it must also keep the
/// format that name advertises.
pub fn format_for_filename(filename: &str) -> Result<ImageFormat> {
    let ext = filename.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
    ImageFormat::from_extension(ext)
        .ok_or_else(|| BackendError::UnsupportedFormat(format!(".{}", ext)))
}

/// Plan a derivative operation without executing it.
///
/// Useful for testing parameter generation.
pub fn plan_derivative<'a>(
    source: &'a [u8],
    filename: &str,
    config: &DerivativeConfig,
) -> Result<ResizeParams<'a>> {
    Ok(ResizeParams {
        source,
        policy: config.policy,
        format: format_for_filename(filename)?,
        quality: config.quality,
    })
}

/// Create the resized derivative of an encoded image.
pub fn create_derivative(
    backend: &impl ImageBackend,
    source: &[u8],
    filename: &str,
    config: &DerivativeConfig,
) -> Result<Derivative> {
    let params = plan_derivative(source, filename, config)?;
    backend.resize(&params)
}
