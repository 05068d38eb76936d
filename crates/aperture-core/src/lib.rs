//! Aperture Core - photo ingestion and image-quality metrics.
//!
//! Aperture takes an uploaded photograph and returns a deterministic set of
//! quality metrics plus a downscaled preview.
//!
//! # Architecture
//!
//! ```text
//! Upload → Validate → Store → Decode → Metrics → Thumbnail → AnalysisOutcome
//! ```
//!
//! Every stage is synchronous and holds no state between uploads; the only
//! shared resource is the append-only artifact store.
//!
//! # Usage
//!
//! ```rust,ignore
//! use aperture_core::{Config, ImageProcessor, UploadedImage};
//!
//! fn main() -> aperture_core::Result<()> {
//!     let config = Config::load()?;
//!     let processor = ImageProcessor::new(&config)?;
//!
//!     let bytes = std::fs::read("./photo.jpg")?;
//!     let outcome = processor.process(&UploadedImage::new(bytes, "photo.jpg"))?;
//!     println!("Brightness: {}", outcome.metrics.brightness);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod advisor;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod output;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use advisor::{Advice, AdviceRequest, Advisor, SimulatedAdvisor};
pub use config::Config;
pub use error::{
    ApertureError, ConfigError, ErrorKind, PipelineError, PipelineResult, Result, StoreError,
};
pub use knowledge::KnowledgeBase;
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::{DiscoveredFile, FileDiscovery, ImageProcessor, THUMBNAIL_CONTENT_TYPE};
pub use types::{AnalysisOutcome, AnalysisRecord, ErrorResponse, MetricReport, UploadedImage};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
