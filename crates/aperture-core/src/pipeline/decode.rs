//! Image decoding with signature checks and dimension limits.

use image::{GenericImageView, ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Decodes PNG and JPEG bytes into an 8-bit RGB pixel buffer.
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// A decoded image. Read-only once built.
///
/// Pixels are row-major with three interleaved 8-bit channels in R, G, B
/// order. Every later stage (luma, HSV, thumbnail encoding) assumes RGB.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pixels: RgbImage,
    format: ImageFormat,
}

impl DecodedImage {
    /// Wrap an existing RGB buffer, e.g. for analysis of generated images.
    pub fn from_rgb(pixels: RgbImage) -> Self {
        Self {
            pixels,
            format: ImageFormat::Png,
        }
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    /// Detected encoding.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode a previously stored file.
    pub fn decode_file(&self, path: &Path) -> Result<DecodedImage, PipelineError> {
        let key = display_key(path);
        let bytes = std::fs::read(path).map_err(|e| PipelineError::DecodeFailure {
            key: key.clone(),
            message: format!("Cannot read file: {}", e),
        })?;
        self.decode(&bytes, &key)
    }

    /// Decode an in-memory buffer.
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<DecodedImage, PipelineError> {
        self.decode(bytes, "<memory>")
    }

    fn decode(&self, bytes: &[u8], key: &str) -> Result<DecodedImage, PipelineError> {
        let fail = |message: String| PipelineError::DecodeFailure {
            key: key.to_string(),
            message,
        };

        if bytes.is_empty() {
            return Err(fail("Empty buffer".to_string()));
        }

        let format = sniff_format(bytes).ok_or_else(|| {
            fail("Unrecognized image format (invalid magic bytes)".to_string())
        })?;

        if format == ImageFormat::Jpeg && !jpeg_is_complete(bytes) {
            return Err(fail("Truncated JPEG (missing end-of-image marker)".to_string()));
        }

        let mut reader = image::ImageReader::new(Cursor::new(bytes));
        reader.set_format(format);
        let image = reader.decode().map_err(|e| fail(e.to_string()))?;

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(fail(format!("Degenerate image {}x{}", width, height)));
        }
        let max_dim = self.limits.max_image_dimension;
        if width > max_dim || height > max_dim {
            return Err(fail(format!(
                "Image too large ({}x{} > {})",
                width, height, max_dim
            )));
        }

        tracing::trace!("Decoded {} as {:?} ({}x{})", key, format, width, height);

        Ok(DecodedImage {
            pixels: image.to_rgb8(),
            format,
        })
    }
}

/// Identify the encoding from its signature.
///
/// Only the accepted upload encodings are recognized; anything else that
/// slipped past the extension check is rejected here.
pub fn sniff_format(bytes: &[u8]) -> Option<ImageFormat> {
    // JPEG: FF D8 FF
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some(ImageFormat::Jpeg);
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some(ImageFormat::Png);
    }

    None
}

/// Whether a JPEG stream ends with its EOI marker (`FF D9`).
///
/// The JPEG decoder pads a cut-off scan instead of failing, so a partial
/// upload has to be caught structurally. Trailing zero padding is allowed.
fn jpeg_is_complete(bytes: &[u8]) -> bool {
    let end = bytes
        .iter()
        .rposition(|&b| b != 0x00)
        .map_or(0, |i| i + 1);
    bytes[..end].ends_with(&[0xFF, 0xD9])
}

fn display_key(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        _ => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::pipeline::test_support::{encode, solid_rgb};

    fn decoder() -> ImageDecoder {
        ImageDecoder::new(LimitsConfig::default())
    }

    #[test]
    fn test_sniff_format() {
        assert_eq!(sniff_format(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(
            sniff_format(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]),
            Some(ImageFormat::Png)
        );
        assert_eq!(sniff_format(b"GIF89a"), None);
        assert_eq!(sniff_format(&[0x89, b'P', b'N']), None);
        assert_eq!(sniff_format(&[]), None);
    }

    #[test]
    fn test_decode_png_and_jpeg() {
        let img = solid_rgb(40, 20, [10, 200, 30]);
        for format in [ImageFormat::Png, ImageFormat::Jpeg] {
            let decoded = decoder().decode_bytes(&encode(&img, format)).unwrap();
            assert_eq!(decoded.format(), format);
            assert_eq!((decoded.width(), decoded.height()), (40, 20));
            assert_eq!(decoded.pixels().len(), 40 * 20 * 3);
        }
    }

    #[test]
    fn test_png_pixels_are_rgb_order() {
        let img = solid_rgb(2, 2, [255, 0, 0]);
        let decoded = decoder()
            .decode_bytes(&encode(&img, ImageFormat::Png))
            .unwrap();
        assert_eq!(decoded.pixels().get_pixel(0, 0).0, [255, 0, 0]);
    }

    #[test]
    fn test_rgba_png_drops_alpha() {
        let rgba = image::RgbaImage::from_pixel(3, 3, image::Rgba([1, 2, 3, 4]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(rgba)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();

        let decoded = decoder().decode_bytes(&buf).unwrap();
        assert_eq!(decoded.pixels().get_pixel(1, 1).0, [1, 2, 3]);
    }

    #[test]
    fn test_empty_buffer_fails() {
        let err = decoder().decode_bytes(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeFailure);
        assert!(err.to_string().contains("Empty"));
    }

    #[test]
    fn test_truncated_buffer_fails() {
        let bytes = encode(&solid_rgb(64, 64, [90, 90, 90]), ImageFormat::Png);
        for cut in [8, 20, bytes.len() / 2] {
            let err = decoder().decode_bytes(&bytes[..cut]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::DecodeFailure, "cut at {cut}");
        }
    }

    #[test]
    fn test_truncated_jpeg_fails() {
        let img = RgbImage::from_fn(256, 256, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x * y) % 256) as u8])
        });
        let bytes = encode(&img, ImageFormat::Jpeg);
        assert!(decoder().decode_bytes(&bytes).is_ok());

        for cut in [bytes.len() / 2, bytes.len() * 3 / 4, bytes.len() * 9 / 10, bytes.len() - 1] {
            let err = decoder().decode_bytes(&bytes[..cut]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::DecodeFailure, "cut at {cut}");
        }
    }

    #[test]
    fn test_jpeg_trailing_padding_accepted() {
        let mut bytes = encode(&solid_rgb(16, 16, [40, 80, 120]), ImageFormat::Jpeg);
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        assert!(decoder().decode_bytes(&bytes).is_ok());

        assert!(jpeg_is_complete(&[0xFF, 0xD8, 0xFF, 0xD9]));
        assert!(!jpeg_is_complete(&[0xFF, 0xD8, 0xFF, 0xDA, 0x12]));
        assert!(!jpeg_is_complete(&[0x00, 0x00]));
    }

    #[test]
    fn test_smuggled_format_fails() {
        let gif = b"GIF89a\x01\x00\x01\x00\x00\x00\x00;";
        let err = decoder().decode_bytes(gif).unwrap_err();
        assert!(err.to_string().contains("magic bytes"));
    }

    #[test]
    fn test_dimension_limit() {
        let decoder = ImageDecoder::new(LimitsConfig {
            max_image_dimension: 16,
        });
        let bytes = encode(&solid_rgb(32, 8, [0, 0, 0]), ImageFormat::Png);
        let err = decoder.decode_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn test_decode_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stored.png");
        std::fs::write(&path, encode(&solid_rgb(5, 7, [1, 1, 1]), ImageFormat::Png)).unwrap();

        let decoded = decoder().decode_file(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (5, 7));

        let err = decoder().decode_file(&dir.path().join("missing.png")).unwrap_err();
        assert!(err.to_string().contains("missing.png"));
    }

    #[test]
    fn test_format_to_string() {
        assert_eq!(format_to_string(ImageFormat::Jpeg), "jpeg");
        assert_eq!(format_to_string(ImageFormat::Png), "png");
        assert_eq!(format_to_string(ImageFormat::Gif), "unknown");
    }
}
