//! Brightness classification.
//!
//! An image passes when the mean of its 8-bit grayscale pixels lies in
//! `[MIN_LIGHT, MAX_LIGHT]`, both ends inclusive. Pixels are first brought to
//! 8-bit RGB (alpha dropped, 16-bit scaled down), then reduced to one channel
//! with the ITU-R 601-2 weights `L = R*299/1000 + G*587/1000 + B*114/1000`.
//! The score is always within `0.0..=255.0` whatever the source color mode or
//! bit depth.

use image::DynamicImage;
use serde::Serialize;

/// Darkest passing mean luminance.
pub const MIN_LIGHT: f64 = 60.0;
/// Brightest passing mean luminance.
pub const MAX_LIGHT: f64 = 200.0;

/// Score and verdict of one classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    /// Mean grayscale value, 0–255.
    pub score: f64,
    pub passed: bool,
}

impl Classification {
    pub fn from_score(score: f64) -> Self {
        Self {
            score,
            passed: (MIN_LIGHT..=MAX_LIGHT).contains(&score),
        }
    }
}

/// Classify a decoded image by its mean luminance.
pub fn classify(image: &DynamicImage) -> Classification {
    Classification::from_score(mean_luminance(image))
}

/// Arithmetic mean of the 8-bit grayscale conversion. Zero-pixel images score 0.
pub fn mean_luminance(image: &DynamicImage) -> f64 {
    let rgb = image.to_rgb8();
    let count = rgb.width() as usize * rgb.height() as usize;
    if count == 0 {
        return 0.0;
    }

    let sum: u64 = rgb.pixels().map(|p| u64::from(luma(p.0))).sum();
    sum as f64 / count as f64
}

/// ITU-R 601-2 luma with integer weights, truncated to 8 bits.
fn luma([r, g, b]: [u8; 3]) -> u8 {
    let weighted = u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114;
    // At most 255 * 1000 / 1000
    (weighted / 1000) as u8
}
