//! Grayscale image decoding with format-specific fast paths.
//!
//! Uses zune-jpeg for JPEG files (1.5-2x faster than image crate),
//! falls back to image crate for other formats or when zune-jpeg fails.

use crate::error::FingerprintError;
use image::{GrayImage, ImageBuffer, ImageReader, Luma};
use std::io::Cursor;
use std::path::Path;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

/// Fast image decoder producing 8-bit grayscale rasters
pub struct FastDecoder;

impl FastDecoder {
    /// Decode already-read file bytes to grayscale.
    ///
    /// `path` is used for the format fast path and for error messages only.
    pub fn decode_luma(bytes: &[u8], path: &Path) -> Result<GrayImage, FingerprintError> {
        if is_jpeg(path) {
            if let Ok(image) = Self::decode_jpeg(bytes, path) {
                return Ok(image);
            }
        }
        Self::decode_fallback(bytes, path)
    }

    fn decode_jpeg(bytes: &[u8], path: &Path) -> Result<GrayImage, FingerprintError> {
        let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::Luma);
        let mut decoder = JpegDecoder::new_with_options(bytes, options);

        let pixels = decoder.decode().map_err(|e| FingerprintError::Decode {
            path: path.to_path_buf(),
            reason: format!("zune-jpeg decode failed: {:?}", e),
        })?;

        let info = decoder.info().ok_or_else(|| FingerprintError::Decode {
            path: path.to_path_buf(),
            reason: "Failed to get image info".to_string(),
        })?;

        if decoder.get_output_colorspace() != Some(ColorSpace::Luma) {
            return Err(FingerprintError::Decode {
                path: path.to_path_buf(),
                reason: "zune-jpeg did not produce a grayscale raster".to_string(),
            });
        }

        let buffer: Option<ImageBuffer<Luma<u8>, Vec<u8>>> =
            ImageBuffer::from_raw(info.width as u32, info.height as u32, pixels);
        buffer.ok_or_else(|| FingerprintError::Decode {
            path: path.to_path_buf(),
            reason: "Failed to create Luma buffer".to_string(),
        })
    }

    fn decode_fallback(bytes: &[u8], path: &Path) -> Result<GrayImage, FingerprintError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| FingerprintError::Decode {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let image = reader.decode().map_err(|e| FingerprintError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(image.to_luma8())
    }
}

fn is_jpeg(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref(),
        Some("jpg" | "jpeg")
    )
}
