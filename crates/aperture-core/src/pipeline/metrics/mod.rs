//! Image-quality metrics over a decoded RGB buffer.
//!
//! The engine is a pure function: no I/O, no randomness. Every metric is
//! rounded to one decimal place so repeated runs produce identical reports.

pub mod color;
pub mod edges;
pub mod focus;

use crate::error::PipelineError;
use crate::types::{Brightness, Dimensions, DominantColor, MetricReport};

use super::decode::DecodedImage;

/// Computes the full [`MetricReport`] for a decoded image.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricEngine;

impl MetricEngine {
    pub fn new() -> Self {
        Self
    }

    /// Compute all metrics, or none.
    ///
    /// Fails with `AnalysisFailure` when the buffer is empty or has zero area.
    pub fn analyze(&self, image: &DecodedImage) -> Result<MetricReport, PipelineError> {
        let pixels = image.pixels();
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 || pixels.as_raw().is_empty() {
            return Err(PipelineError::AnalysisFailure {
                message: format!("Empty pixel buffer ({}x{})", width, height),
            });
        }

        let gray = color::to_grayscale(pixels);
        let hsv = color::mean_hsv(pixels);

        let mut hue = round1(hsv.hue);
        if hue >= 360.0 {
            hue -= 360.0;
        }

        Ok(MetricReport {
            dimensions: Dimensions { width, height },
            brightness: Brightness::new(round1(color::mean_luma(&gray))),
            dominant_color: DominantColor {
                hue,
                saturation: round1(hsv.saturation * 100.0),
                value: round1(hsv.value * 100.0),
            },
            edge_density: round1(edges::edge_density(&gray)),
            focus_measure: round1(focus::laplacian_variance(&gray)),
        })
    }
}

/// Round to one decimal place.
fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
