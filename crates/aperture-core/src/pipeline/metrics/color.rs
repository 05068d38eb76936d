//! Luma and HSV conversions over RGB buffers.

use image::{GrayImage, Luma, RgbImage};

/// Fixed-point luma weights (0.299, 0.587, 0.114) scaled by 2^14.
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;
const LUMA_SHIFT: u32 = 14;
const LUMA_ROUND: u32 = 1 << (LUMA_SHIFT - 1);

/// Grayscale value of one RGB pixel.
#[inline]
pub fn luma([r, g, b]: [u8; 3]) -> u8 {
    let y = (LUMA_R * r as u32 + LUMA_G * g as u32 + LUMA_B * b as u32 + LUMA_ROUND) >> LUMA_SHIFT;
    y as u8
}

/// Convert an RGB buffer to grayscale with the pinned luma weights.
///
/// `image`'s own `to_luma8` uses Rec. 709 weights; metrics need the
/// 0.299/0.587/0.114 convention so brightness values are comparable across
/// implementations.
pub fn to_grayscale(pixels: &RgbImage) -> GrayImage {
    let (width, height) = pixels.dimensions();
    GrayImage::from_fn(width, height, |x, y| Luma([luma(pixels.get_pixel(x, y).0)]))
}

/// Mean pixel value of a grayscale image.
pub fn mean_luma(gray: &GrayImage) -> f64 {
    let n = gray.as_raw().len();
    if n == 0 {
        return 0.0;
    }
    let sum: u64 = gray.as_raw().iter().map(|&v| v as u64).sum();
    sum as f64 / n as f64
}

/// HSV triple: hue in degrees [0, 360), saturation and value in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub hue: f64,
    pub saturation: f64,
    pub value: f64,
}

/// Convert one RGB pixel to HSV.
pub fn rgb_to_hsv([r, g, b]: [u8; 3]) -> Hsv {
    let (r, g, b) = (r as f64, g as f64, b as f64);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let value = max / 255.0;
    let saturation = if max > 0.0 { delta / max } else { 0.0 };

    let hue = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let hue = if hue < 0.0 { hue + 360.0 } else { hue };

    Hsv {
        hue,
        saturation,
        value,
    }
}

/// Per-channel means of the HSV-converted buffer.
pub fn mean_hsv(pixels: &RgbImage) -> Hsv {
    let n = (pixels.width() as u64 * pixels.height() as u64) as f64;
    if n == 0.0 {
        return Hsv {
            hue: 0.0,
            saturation: 0.0,
            value: 0.0,
        };
    }

    let (mut h, mut s, mut v) = (0.0f64, 0.0f64, 0.0f64);
    for pixel in pixels.pixels() {
        let hsv = rgb_to_hsv(pixel.0);
        h += hsv.hue;
        s += hsv.saturation;
        v += hsv.value;
    }

    Hsv {
        hue: h / n,
        saturation: s / n,
        value: v / n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luma_extremes() {
        assert_eq!(luma([0, 0, 0]), 0);
        assert_eq!(luma([255, 255, 255]), 255);
        assert_eq!(luma([128, 128, 128]), 128);
    }

    #[test]
    fn test_luma_weights() {
        // 0.299 * 255 = 76.2, 0.587 * 255 = 149.7, 0.114 * 255 = 29.1
        assert_eq!(luma([255, 0, 0]), 76);
        assert_eq!(luma([0, 255, 0]), 150);
        assert_eq!(luma([0, 0, 255]), 29);
    }

    #[test]
    fn test_grayscale_matches_luma() {
        let img = RgbImage::from_fn(4, 3, |x, y| image::Rgb([x as u8 * 60, y as u8 * 80, 17]));
        let gray = to_grayscale(&img);
        assert_eq!(gray.dimensions(), (4, 3));
        assert_eq!(gray.get_pixel(2, 1).0[0], luma([120, 80, 17]));
    }

    #[test]
    fn test_hsv_primaries() {
        let red = rgb_to_hsv([255, 0, 0]);
        assert_eq!((red.hue, red.saturation, red.value), (0.0, 1.0, 1.0));

        let green = rgb_to_hsv([0, 255, 0]);
        assert_eq!(green.hue, 120.0);

        let blue = rgb_to_hsv([0, 0, 255]);
        assert_eq!(blue.hue, 240.0);

        let magenta = rgb_to_hsv([255, 0, 255]);
        assert_eq!(magenta.hue, 300.0);
    }

    #[test]
    fn test_hsv_grays_have_no_hue() {
        for v in [0u8, 77, 255] {
            let hsv = rgb_to_hsv([v, v, v]);
            assert_eq!(hsv.hue, 0.0);
            assert_eq!(hsv.saturation, 0.0);
            assert!((hsv.value - v as f64 / 255.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_mean_hsv_averages_pixels() {
        let img = RgbImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                image::Rgb([0, 255, 0])
            } else {
                image::Rgb([0, 0, 255])
            }
        });
        let hsv = mean_hsv(&img);
        assert_eq!(hsv.hue, 180.0);
        assert_eq!(hsv.saturation, 1.0);
        assert_eq!(hsv.value, 1.0);
    }
}
