//! Pipeline orchestration - wires together all processing stages.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::error::{ErrorKind, PipelineError, StoreError};
use crate::types::{AnalysisOutcome, UploadedImage};

use super::decode::{format_to_string, ImageDecoder};
use super::metrics::MetricEngine;
use super::storage::{ArtifactStore, LocalStore};
use super::thumbnail::ThumbnailGenerator;
use super::validate::Validator;

/// Stages an upload moves through, strictly in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Validated,
    Decoded,
    Analyzed,
    Thumbnailed,
    Completed,
    /// Terminal; reachable from any non-terminal stage
    Failed(ErrorKind),
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Received => "received",
            PipelineStage::Validated => "validated",
            PipelineStage::Decoded => "decoded",
            PipelineStage::Analyzed => "analyzed",
            PipelineStage::Thumbnailed => "thumbnailed",
            PipelineStage::Completed => "completed",
            PipelineStage::Failed(kind) => return write!(f, "failed({})", kind),
        };
        f.write_str(name)
    }
}

/// Runs uploads through validate → store → decode → analyze → thumbnail.
///
/// Holds no per-upload state, so one processor can serve any number of
/// concurrent uploads.
pub struct ImageProcessor {
    validator: Validator,
    decoder: ImageDecoder,
    engine: MetricEngine,
    thumbnail_gen: ThumbnailGenerator,
    store: Arc<dyn ArtifactStore>,
}

impl ImageProcessor {
    /// Create a processor writing into the configured upload directory.
    pub fn new(config: &Config) -> std::io::Result<Self> {
        let store = LocalStore::open(config.upload_dir())?;
        Ok(Self::with_store(config, Arc::new(store)))
    }

    /// Create a processor over an existing store.
    pub fn with_store(config: &Config, store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            validator: Validator::new(),
            decoder: ImageDecoder::new(config.limits.clone()),
            engine: MetricEngine::new(),
            thumbnail_gen: ThumbnailGenerator::new(config.thumbnail.clone()),
            store,
        }
    }

    /// Run one upload through the pipeline.
    ///
    /// Either every metric is computed or an error is returned. A failed
    /// thumbnail does not fail the upload: the outcome carries no thumbnail
    /// key instead.
    pub fn process(&self, upload: &UploadedImage) -> Result<AnalysisOutcome, PipelineError> {
        let mut stage = PipelineStage::Received;
        let result = self.run(upload, &mut stage);
        if let Err(e) = &result {
            let last = stage;
            stage = PipelineStage::Failed(e.kind());
            tracing::debug!(
                "Upload {:?} {} after stage {}: {}",
                upload.filename,
                stage,
                last,
                e
            );
        }
        result
    }

    fn run(
        &self,
        upload: &UploadedImage,
        stage: &mut PipelineStage,
    ) -> Result<AnalysisOutcome, PipelineError> {
        let start = Instant::now();
        tracing::debug!("Processing upload: {:?}", upload.filename);

        // Validate
        let storage_key = self.validator.validate(upload)?;
        *stage = PipelineStage::Validated;
        tracing::trace!("  Validate: {:?}", start.elapsed());

        // Persist, then decode from storage
        let decode_start = Instant::now();
        self.store
            .put(&storage_key, &upload.bytes)
            .map_err(|e| PipelineError::DecodeFailure {
                key: storage_key.clone(),
                message: format!("Cannot store upload: {}", e),
            })?;
        let path = self
            .store
            .path_of(&storage_key)
            .map_err(|e| PipelineError::DecodeFailure {
                key: storage_key.clone(),
                message: e.to_string(),
            })?;
        let decoded = self.decoder.decode_file(&path)?;
        *stage = PipelineStage::Decoded;
        tracing::trace!("  Decode: {:?}", decode_start.elapsed());

        // Analyze
        let analyze_start = Instant::now();
        let metrics = self.engine.analyze(&decoded)?;
        *stage = PipelineStage::Analyzed;
        tracing::trace!("  Analyze: {:?}", analyze_start.elapsed());

        // Thumbnail (non-fatal)
        let thumb_start = Instant::now();
        let thumbnail_key =
            match self
                .thumbnail_gen
                .generate(&decoded, &storage_key, self.store.as_ref())
            {
                Ok(key) => {
                    *stage = PipelineStage::Thumbnailed;
                    Some(key)
                }
                Err(e) => {
                    tracing::warn!("Continuing without thumbnail: {}", e);
                    None
                }
            };
        tracing::trace!("  Thumbnail: {:?}", thumb_start.elapsed());

        *stage = PipelineStage::Completed;
        tracing::debug!(
            "Processed {} in {:?} ({}, {}x{})",
            storage_key,
            start.elapsed(),
            format_to_string(decoded.format()),
            decoded.width(),
            decoded.height()
        );

        Ok(AnalysisOutcome {
            storage_key,
            metrics,
            thumbnail_key,
        })
    }

    /// Read back a stored thumbnail (served as [`super::THUMBNAIL_CONTENT_TYPE`]).
    pub fn fetch_thumbnail(&self, thumbnail_key: &str) -> Result<Vec<u8>, StoreError> {
        self.store.get(thumbnail_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThumbnailConfig;
    use crate::error::ErrorKind;
    use crate::pipeline::test_support::{encode, solid_rgb};
    use image::ImageFormat;

    fn processor(dir: &std::path::Path, config: &Config) -> ImageProcessor {
        let store = LocalStore::open(dir).unwrap();
        ImageProcessor::with_store(config, Arc::new(store))
    }

    fn stored_files(dir: &std::path::Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_gray_jpeg_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let processor = processor(dir.path(), &Config::default());
        let bytes = encode(&solid_rgb(100, 50, [128, 128, 128]), ImageFormat::Jpeg);

        let outcome = processor
            .process(&UploadedImage::new(bytes, "gray.jpg"))
            .unwrap();

        assert_eq!(outcome.metrics.dimensions.to_string(), "100x50");
        assert!((outcome.metrics.brightness.mean - 128.0).abs() <= 2.0);
        assert_eq!(outcome.metrics.edge_density, 0.0);
        assert!(outcome.storage_key.ends_with("_gray.jpg"));

        let thumb_key = outcome.thumbnail_key.unwrap();
        assert_eq!(thumb_key, format!("thumb_{}", outcome.storage_key));
        let thumb = processor.fetch_thumbnail(&thumb_key).unwrap();
        assert_eq!(&thumb[0..3], &[0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn test_zero_byte_jpg_is_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let processor = processor(dir.path(), &Config::default());

        let err = processor
            .process(&UploadedImage::new(Vec::new(), "photo.jpg"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeFailure);
    }

    #[test]
    fn test_gif_is_rejected_before_storage() {
        let dir = tempfile::tempdir().unwrap();
        let processor = processor(dir.path(), &Config::default());

        let err = processor
            .process(&UploadedImage::new(b"GIF89a".to_vec(), "photo.gif"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFileType);
        assert_eq!(stored_files(dir.path()), 0);
    }

    #[test]
    fn test_empty_filename() {
        let dir = tempfile::tempdir().unwrap();
        let processor = processor(dir.path(), &Config::default());

        let err = processor
            .process(&UploadedImage::new(vec![1, 2, 3], ""))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyInput);
        assert_eq!(stored_files(dir.path()), 0);
    }

    #[test]
    fn test_png_bytes_under_jpg_name_still_decode() {
        let dir = tempfile::tempdir().unwrap();
        let processor = processor(dir.path(), &Config::default());
        let bytes = encode(&solid_rgb(20, 20, [255, 255, 255]), ImageFormat::Png);

        let outcome = processor
            .process(&UploadedImage::new(bytes, "misnamed.jpg"))
            .unwrap();
        assert_eq!(outcome.metrics.brightness.mean, 255.0);
    }

    #[test]
    fn test_thumbnail_failure_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            thumbnail: ThumbnailConfig {
                size: 0,
                quality: 85,
            },
            ..Config::default()
        };
        let processor = processor(dir.path(), &config);
        let bytes = encode(&solid_rgb(30, 30, [0, 0, 0]), ImageFormat::Png);

        let outcome = processor
            .process(&UploadedImage::new(bytes, "black.png"))
            .unwrap();
        assert!(outcome.thumbnail_key.is_none());
        assert_eq!(outcome.metrics.brightness.mean, 0.0);
        // Only the original upload was written.
        assert_eq!(stored_files(dir.path()), 1);
    }

    #[test]
    fn test_long_filename_keeps_upload_and_thumbnail() {
        let dir = tempfile::tempdir().unwrap();
        let processor = processor(dir.path(), &Config::default());
        let bytes = encode(&solid_rgb(10, 10, [60, 60, 60]), ImageFormat::Png);

        for stem_len in [200, 214, 230, 250] {
            let name = format!("{}.png", "a".repeat(stem_len));
            let outcome = processor
                .process(&UploadedImage::new(bytes.clone(), name))
                .unwrap();
            assert!(outcome.storage_key.ends_with(".png"), "stem {stem_len}");
            let thumb_key = outcome.thumbnail_key.unwrap();
            assert!(processor.fetch_thumbnail(&thumb_key).is_ok());
        }
        assert_eq!(stored_files(dir.path()), 8);
    }

    #[test]
    fn test_truncated_jpeg_upload_is_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let processor = processor(dir.path(), &Config::default());
        let img = image::RgbImage::from_fn(128, 96, |x, y| {
            image::Rgb([(x * 2) as u8, (y * 2) as u8, ((x + y) % 256) as u8])
        });
        let bytes = encode(&img, ImageFormat::Jpeg);

        let err = processor
            .process(&UploadedImage::new(bytes[..bytes.len() / 2].to_vec(), "half.jpg"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeFailure);
    }

    #[test]
    fn test_upload_is_stored_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let processor = processor(dir.path(), &Config::default());
        let bytes = encode(&solid_rgb(12, 9, [5, 6, 7]), ImageFormat::Png);

        let outcome = processor
            .process(&UploadedImage::new(bytes.clone(), "small.png"))
            .unwrap();
        let stored = std::fs::read(dir.path().join(&outcome.storage_key)).unwrap();
        assert_eq!(stored, bytes);
    }

    #[test]
    fn test_fetch_missing_thumbnail() {
        let dir = tempfile::tempdir().unwrap();
        let processor = processor(dir.path(), &Config::default());
        let err = processor.fetch_thumbnail("thumb_nothing.jpg").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(PipelineStage::Thumbnailed.to_string(), "thumbnailed");
        assert_eq!(
            PipelineStage::Failed(ErrorKind::DecodeFailure).to_string(),
            "failed(DecodeFailure)"
        );
    }
}
