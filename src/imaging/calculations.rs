//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::ResizePolicy;

/// Calculate dimensions that fit inside a bounding box, preserving aspect ratio.
///
/// Images already inside the box keep their size: this only ever shrinks.
/// Both output edges are at least 1px.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `bounds` - Bounding box (max width, max height)
///
/// # Returns
/// * `(width, height)` - Output dimensions
///
/// # Examples
/// ```
/// # use photo_intake::imaging::fit_within;
/// // 4000x3000 landscape into 1280x1280 → width-limited
/// assert_eq!(fit_within((4000, 3000), (1280, 1280)), (1280, 960));
///
/// // Small image stays as it is
/// assert_eq!(fit_within((640, 480), (1280, 1280)), (640, 480));
/// ```
pub fn fit_within(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;

    if src_w == 0 || src_h == 0 {
        return (src_w, src_h);
    }
    if src_w <= max_w && src_h <= max_h {
        return source;
    }

    let scale = (max_w as f64 / src_w as f64).min(max_h as f64 / src_h as f64);

    // The limiting edge lands exactly on the bound; the other is rounded.
    let w = ((src_w as f64 * scale).round() as u32).clamp(1, max_w.max(1));
    let h = ((src_h as f64 * scale).round() as u32).clamp(1, max_h.max(1));
    (w, h)
}

/// Output dimensions of the derivative for a given policy.
pub fn target_dimensions(policy: ResizePolicy, source: (u32, u32)) -> (u32, u32) {
    match policy {
        ResizePolicy::Fit {
            max_width,
            max_height,
        } => fit_within(source, (max_width, max_height)),
        ResizePolicy::Exact { width, height } => (width.max(1), height.max(1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // fit_within tests
    // =========================================================================

    #[test]
    fn fit_landscape_is_width_limited() {
        assert_eq!(fit_within((4000, 3000), (1280, 1280)), (1280, 960));
    }

    #[test]
    fn fit_portrait_is_height_limited() {
        assert_eq!(fit_within((3000, 4000), (1280, 1280)), (960, 1280));
    }

    #[test]
    fn fit_square() {
        assert_eq!(fit_within((2000, 2000), (1280, 1280)), (1280, 1280));
    }

    #[test]
    fn fit_non_square_box() {
        // 4:3 photo into the historical 1280x853 box is height-limited
        assert_eq!(fit_within((4000, 3000), (1280, 853)), (1137, 853));
    }

    #[test]
    fn fit_never_upscales() {
        assert_eq!(fit_within((640, 480), (1280, 1280)), (640, 480));
        assert_eq!(fit_within((1280, 1280), (1280, 1280)), (1280, 1280));
    }

    #[test]
    fn fit_one_edge_over() {
        assert_eq!(fit_within((2560, 100), (1280, 1280)), (1280, 50));
    }

    #[test]
    fn fit_extreme_aspect_keeps_one_pixel() {
        assert_eq!(fit_within((100_000, 10), (1280, 1280)), (1280, 1));
    }

    #[test]
    fn fit_preserves_aspect_ratio() {
        let (w, h) = fit_within((3264, 2448), (1280, 1280));
        let src_ratio = 3264.0 / 2448.0;
        let out_ratio = w as f64 / h as f64;
        assert!((src_ratio - out_ratio).abs() < 0.01);
    }

    // =========================================================================
    // target_dimensions tests
    // =========================================================================

    #[test]
    fn exact_policy_ignores_source() {
        let policy = ResizePolicy::Exact {
            width: 1280,
            height: 853,
        };
        assert_eq!(target_dimensions(policy, (300, 300)), (1280, 853));
        assert_eq!(target_dimensions(policy, (4000, 6000)), (1280, 853));
    }

    #[test]
    fn fit_policy_delegates() {
        assert_eq!(
            target_dimensions(ResizePolicy::default(), (2560, 1440)),
            (1280, 720)
        );
    }
}
