//! Image ingestion pipeline components.
//!
//! This module contains all the stages of the ingestion pipeline:
//! - **validate**: Filename checks and storage key derivation
//! - **storage**: Append-only artifact store for uploads and thumbnails
//! - **decode**: Signature check and decode to an RGB buffer
//! - **metrics**: Brightness, color, edge density, and focus metrics
//! - **thumbnail**: Bounded JPEG previews
//! - **processor**: Orchestrates the full pipeline
//! - **discovery**: Find uploadable image files in directories

pub mod decode;
pub mod discovery;
pub mod metrics;
pub mod processor;
pub mod storage;
pub mod thumbnail;
pub mod validate;

// Re-exports for convenient access
pub use decode::{DecodedImage, ImageDecoder};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use metrics::MetricEngine;
pub use processor::{ImageProcessor, PipelineStage};
pub use storage::{ArtifactStore, LocalStore};
pub use thumbnail::{ThumbnailGenerator, THUMBNAIL_CONTENT_TYPE};
pub use validate::Validator;
