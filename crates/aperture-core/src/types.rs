//! Core data types for the Aperture ingestion pipeline.
//!
//! These types represent the input handed to the pipeline and the structured
//! result it hands back.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ErrorKind, PipelineError};

/// Raw upload as received from the caller.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// File contents
    pub bytes: Vec<u8>,

    /// Filename declared by the uploader
    pub filename: String,
}

impl UploadedImage {
    /// Create an upload from its bytes and declared filename.
    pub fn new(bytes: impl Into<Vec<u8>>, filename: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            filename: filename.into(),
        }
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Mean luma of the image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brightness {
    /// Mean grayscale value, 0-255
    pub mean: f64,

    /// Denominator for display, always 255
    pub scale: u32,
}

impl Brightness {
    pub const SCALE: u32 = 255;

    pub fn new(mean: f64) -> Self {
        Self {
            mean,
            scale: Self::SCALE,
        }
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}/{}", self.mean, self.scale)
    }
}

/// Channel means of the HSV-converted image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DominantColor {
    /// Mean hue in degrees, [0, 360)
    pub hue: f64,

    /// Mean saturation in percent, [0, 100]
    pub saturation: f64,

    /// Mean value in percent, [0, 100]
    pub value: f64,
}

impl fmt::Display for DominantColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HSV: {:.1}°, {:.1}%, {:.1}%",
            self.hue, self.saturation, self.value
        )
    }
}

/// Quantitative quality metrics for one decoded image.
///
/// Every float is rounded to one decimal place, so two reports computed from
/// the same pixels compare (and serialize) identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricReport {
    /// Decoded width and height
    pub dimensions: Dimensions,

    /// Mean grayscale brightness
    pub brightness: Brightness,

    /// Mean HSV color
    pub dominant_color: DominantColor,

    /// Percentage of pixels classified as edges, [0, 100]
    pub edge_density: f64,

    /// Variance of the Laplacian; higher is sharper, unbounded
    pub focus_measure: f64,
}

impl MetricReport {
    /// Human-readable edge summary.
    pub fn edge_summary(&self) -> String {
        format!("{:.1}% of image contains edges", self.edge_density)
    }

    /// Human-readable focus summary.
    pub fn focus_summary(&self) -> String {
        format!("{:.1} (higher is sharper)", self.focus_measure)
    }
}

/// Aggregate result of a successful pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    /// Key the original upload was stored under
    pub storage_key: String,

    /// Computed metrics
    pub metrics: MetricReport,

    /// Key of the stored thumbnail; `None` if thumbnail generation failed
    pub thumbnail_key: Option<String>,
}

/// Failure payload returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error_kind: ErrorKind,
    pub message: String,
}

impl From<&PipelineError> for ErrorResponse {
    fn from(err: &PipelineError) -> Self {
        Self {
            error_kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// One line of batch output: a success or a typed failure for a source file.
/// Internally tagged: `{"status":"ok",...}` or `{"status":"error",...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AnalysisRecord {
    Ok {
        source: String,
        #[serde(flatten)]
        outcome: AnalysisOutcome,
    },
    Error {
        source: String,
        #[serde(flatten)]
        error: ErrorResponse,
    },
}

impl AnalysisRecord {
    /// Build a record from a pipeline result.
    pub fn from_result(
        source: impl Into<String>,
        result: &Result<AnalysisOutcome, PipelineError>,
    ) -> Self {
        let source = source.into();
        match result {
            Ok(outcome) => AnalysisRecord::Ok {
                source,
                outcome: outcome.clone(),
            },
            Err(e) => AnalysisRecord::Error {
                source,
                error: ErrorResponse::from(e),
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, AnalysisRecord::Ok { .. })
    }
}
