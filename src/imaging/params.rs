//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides what derivative to create) and the [`backend`](super::backend)
//! (which does the actual pixel work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing operation logic.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`ResizePolicy`]: How the derivative is sized: fit-within a box, or stretch to exact dimensions.
//! - [`ResizeParams`]: Full specification for one derivative: source bytes, policy, output format, quality.

use image::ImageFormat;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Sizing rule for the resized derivative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizePolicy {
    /// Shrink to fit inside the box, preserving aspect ratio. Never upscales.
    Fit { max_width: u32, max_height: u32 },
    /// Stretch to exactly these dimensions, ignoring aspect ratio.
    Exact { width: u32, height: u32 },
}

impl ResizePolicy {
    /// Bounding box of the policy as `(width, height)`.
    pub fn bounds(self) -> (u32, u32) {
        match self {
            Self::Fit {
                max_width,
                max_height,
            } => (max_width, max_height),
            Self::Exact { width, height } => (width, height),
        }
    }
}

impl Default for ResizePolicy {
    fn default() -> Self {
        Self::Fit {
            max_width: 1280,
            max_height: 1280,
        }
    }
}

/// Parameters for producing one resized derivative.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams<'a> {
    /// Encoded source image.
    pub source: &'a [u8],
    pub policy: ResizePolicy,
    /// Format the derivative is encoded in.
    pub format: ImageFormat,
    pub quality: Quality,
}
