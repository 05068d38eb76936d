//! Upload validation and storage key derivation.

use uuid::Uuid;

use crate::error::PipelineError;
use crate::types::UploadedImage;

use super::thumbnail::THUMBNAIL_PREFIX;

/// Extensions (lowercase) accepted for upload.
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Longest sanitized name for which `thumb_<uuid>_<name>` still fits in a
/// 255-byte filesystem path component.
pub const MAX_NAME_LEN: usize =
    255 - THUMBNAIL_PREFIX.len() - uuid::fmt::Hyphenated::LENGTH - 1;

/// Validates uploads before anything touches storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Self
    }

    /// Check the upload and derive the key it will be stored under.
    ///
    /// Only the filename is inspected; the bytes are the decoder's concern.
    pub fn validate(&self, upload: &UploadedImage) -> Result<String, PipelineError> {
        Self::check_filename(&upload.filename)?;
        Ok(Self::storage_key(&upload.filename))
    }

    /// Accept filenames whose last dot-delimited extension is in the allow-set.
    pub fn check_filename(filename: &str) -> Result<(), PipelineError> {
        if filename.trim().is_empty() {
            return Err(PipelineError::EmptyInput);
        }
        if Self::is_allowed(filename) {
            Ok(())
        } else {
            Err(PipelineError::InvalidFileType {
                filename: filename.to_string(),
            })
        }
    }

    /// Whether the filename carries an accepted extension.
    pub fn is_allowed(filename: &str) -> bool {
        filename
            .rsplit_once('.')
            .map(|(_, ext)| {
                let ext = ext.to_lowercase();
                ALLOWED_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false)
    }

    /// Random token joined to the sanitized filename.
    ///
    /// UUID v4 tokens make collisions between concurrent uploads
    /// practically impossible without any shared counter.
    pub fn storage_key(filename: &str) -> String {
        format!("{}_{}", Uuid::new_v4(), sanitize_filename(filename))
    }
}

/// Reduce a client-supplied filename to a safe single path component.
///
/// Keeps the final component after any `/` or `\`, drops control characters,
/// turns whitespace into `_` and replaces anything outside `[A-Za-z0-9._-]`
/// with `_`. An accepted extension is plain ASCII and survives unchanged.
/// Names longer than [`MAX_NAME_LEN`] lose the tail of their stem, never the
/// extension.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

    let name: String = base
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    bound_length(name)
}

/// Shorten an ASCII name to [`MAX_NAME_LEN`] bytes, keeping its extension.
fn bound_length(name: String) -> String {
    if name.len() <= MAX_NAME_LEN {
        return name;
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if ext.len() < MAX_NAME_LEN => {
            format!("{}.{}", &stem[..MAX_NAME_LEN - ext.len() - 1], ext)
        }
        _ => name[..MAX_NAME_LEN].to_string(),
    }
}
