//! Focus measure: variance of the discrete Laplacian.

use image::GrayImage;

/// Mirror an out-of-range index back into `0..n` without repeating the edge
/// sample (`-1 -> 1`, `n -> n - 2`).
#[inline]
fn reflect101(i: i64, n: i64) -> usize {
    if n == 1 {
        return 0;
    }
    let i = if i < 0 {
        -i
    } else if i >= n {
        2 * n - 2 - i
    } else {
        i
    };
    i as usize
}

/// Population variance of the 4-neighbour Laplacian
/// `[0 1 0; 1 -4 1; 0 1 0]` evaluated at every pixel.
///
/// Higher values mean more high-frequency detail. The score is relative and
/// unbounded.
pub fn laplacian_variance(gray: &GrayImage) -> f64 {
    let (width, height) = gray.dimensions();
    let (w, h) = (width as i64, height as i64);
    let n = w * h;
    if n == 0 {
        return 0.0;
    }

    let raw = gray.as_raw();
    let at = |x: i64, y: i64| raw[reflect101(y, h) * width as usize + reflect101(x, w)] as i64;

    let mut sum: i64 = 0;
    let mut sum_sq: i64 = 0;
    for y in 0..h {
        for x in 0..w {
            let lap = at(x, y - 1) + at(x, y + 1) + at(x - 1, y) + at(x + 1, y) - 4 * at(x, y);
            sum += lap;
            sum_sq += lap * lap;
        }
    }

    let n = n as f64;
    let mean = sum as f64 / n;
    (sum_sq as f64 / n - mean * mean).max(0.0)
}
