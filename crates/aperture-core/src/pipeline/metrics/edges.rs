//! Edge density via Canny edge detection.

use image::GrayImage;
use imageproc::edges::canny;

/// Lower hysteresis threshold.
pub const CANNY_LOW: f32 = 100.0;

/// Upper hysteresis threshold.
pub const CANNY_HIGH: f32 = 200.0;

/// Percentage of pixels Canny marks as edges, in [0, 100].
///
/// Thresholds are fixed so the same image always yields the same density.
/// They are not OpenCV-equivalent: `imageproc`'s Canny smooths with a
/// sigma 1.4 Gaussian first and thresholds the L2 gradient magnitude,
/// while `cv2.Canny` on the raw image uses the L1 norm. Densities here run
/// lower than OpenCV's at the same 100/200 thresholds.
pub fn edge_density(gray: &GrayImage) -> f64 {
    let (width, height) = gray.dimensions();
    let total = width as u64 * height as u64;
    if total == 0 {
        return 0.0;
    }
    // Non-maximum suppression only marks interior pixels.
    if width < 3 || height < 3 {
        return 0.0;
    }

    let edges = canny(gray, CANNY_LOW, CANNY_HIGH);
    let count = edges.as_raw().iter().filter(|&&v| v > 0).count() as u64;
    count as f64 / total as f64 * 100.0
}
