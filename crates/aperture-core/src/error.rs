//! Error types for the Aperture ingestion pipeline.
//!
//! Errors are organized by concern: pipeline stages, artifact storage, and
//! configuration. Pipeline errors carry a stable [`ErrorKind`] that callers
//! map to their own rejection policy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error type for Aperture operations.
#[derive(Error, Debug)]
pub enum ApertureError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Artifact storage errors
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline errors, one variant per failure kind.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// No file or filename was supplied
    #[error("No file supplied")]
    EmptyInput,

    /// Filename extension is not an accepted image type
    #[error("File type not allowed: {filename}")]
    InvalidFileType { filename: String },

    /// Bytes could not be stored or decoded as an image
    #[error("Decode failed for {key}: {message}")]
    DecodeFailure { key: String, message: String },

    /// Decoded buffer is degenerate
    #[error("Analysis failed: {message}")]
    AnalysisFailure { message: String },

    /// Thumbnail could not be produced or persisted
    #[error("Thumbnail failed for {key}: {message}")]
    ThumbnailFailure { key: String, message: String },
}

impl PipelineError {
    /// The distinguishable kind of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::EmptyInput => ErrorKind::EmptyInput,
            PipelineError::InvalidFileType { .. } => ErrorKind::InvalidFileType,
            PipelineError::DecodeFailure { .. } => ErrorKind::DecodeFailure,
            PipelineError::AnalysisFailure { .. } => ErrorKind::AnalysisFailure,
            PipelineError::ThumbnailFailure { .. } => ErrorKind::ThumbnailFailure,
        }
    }
}

/// Stable failure taxonomy exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    EmptyInput,
    InvalidFileType,
    DecodeFailure,
    AnalysisFailure,
    ThumbnailFailure,
}

impl ErrorKind {
    /// Whether the failure is caused by the shape of the caller's input
    /// (as opposed to something going wrong inside analysis).
    pub fn is_input_error(self) -> bool {
        matches!(self, ErrorKind::EmptyInput | ErrorKind::InvalidFileType)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::EmptyInput => "EmptyInput",
            ErrorKind::InvalidFileType => "InvalidFileType",
            ErrorKind::DecodeFailure => "DecodeFailure",
            ErrorKind::AnalysisFailure => "AnalysisFailure",
            ErrorKind::ThumbnailFailure => "ThumbnailFailure",
        };
        f.write_str(name)
    }
}

/// Errors from the artifact store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Key is empty or would escape the store root
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// No artifact stored under the key
    #[error("Artifact not found: {0}")]
    NotFound(String),

    /// Underlying filesystem failure
    #[error("IO error for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Aperture results.
pub type Result<T> = std::result::Result<T, ApertureError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
