//! Thumbnail generation with JPEG output.

use image::codecs::jpeg::JpegEncoder;
use image::{imageops, RgbImage};

use crate::config::ThumbnailConfig;
use crate::error::PipelineError;

use super::decode::DecodedImage;
use super::storage::ArtifactStore;

/// Content type of every stored thumbnail.
pub const THUMBNAIL_CONTENT_TYPE: &str = "image/jpeg";

/// Prefix joining a thumbnail key to its upload's storage key.
pub const THUMBNAIL_PREFIX: &str = "thumb_";

/// Generates and persists bounded-size previews.
pub struct ThumbnailGenerator {
    config: ThumbnailConfig,
}

impl ThumbnailGenerator {
    /// Create a new thumbnail generator with the given configuration.
    pub fn new(config: ThumbnailConfig) -> Self {
        Self { config }
    }

    /// Key a thumbnail is stored under, derived from its upload's key.
    pub fn thumbnail_key(storage_key: &str) -> String {
        format!("{}{}", THUMBNAIL_PREFIX, storage_key)
    }

    /// Resize, encode and store the thumbnail for `storage_key`.
    ///
    /// Returns the thumbnail key.
    pub fn generate(
        &self,
        image: &DecodedImage,
        storage_key: &str,
        store: &dyn ArtifactStore,
    ) -> Result<String, PipelineError> {
        let key = Self::thumbnail_key(storage_key);
        let bytes = self.generate_bytes(image).map_err(|message| {
            PipelineError::ThumbnailFailure {
                key: key.clone(),
                message,
            }
        })?;

        store
            .put(&key, &bytes)
            .map_err(|e| PipelineError::ThumbnailFailure {
                key: key.clone(),
                message: e.to_string(),
            })?;
        Ok(key)
    }

    /// Resize and JPEG-encode without persisting.
    pub fn generate_bytes(&self, image: &DecodedImage) -> Result<Vec<u8>, String> {
        if self.config.size == 0 {
            return Err("thumbnail bound must be > 0".to_string());
        }

        let thumbnail = self.resize(image.pixels());

        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, self.config.quality);
        thumbnail
            .write_with_encoder(encoder)
            .map_err(|e| e.to_string())?;
        Ok(buffer)
    }

    fn resize(&self, pixels: &RgbImage) -> RgbImage {
        let (width, height) = pixels.dimensions();
        match fit_within(width, height, self.config.size) {
            Some((w, h)) => imageops::thumbnail(pixels, w, h),
            None => pixels.clone(),
        }
    }
}

/// Target size that fits `width x height` inside `bound x bound` with the
/// aspect ratio preserved, or `None` if it already fits.
pub fn fit_within(width: u32, height: u32, bound: u32) -> Option<(u32, u32)> {
    let longer = width.max(height);
    if longer <= bound || bound == 0 {
        return None;
    }
    let scale = |side: u32| {
        let scaled = (side as u64 * bound as u64 + longer as u64 / 2) / longer as u64;
        (scaled as u32).clamp(1, bound)
    };
    Some((scale(width), scale(height)))
}
