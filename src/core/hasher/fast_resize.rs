//! Fast SIMD-accelerated grayscale resizing.
//!
//! Uses fast_image_resize, which picks AVX2/NEON paths when available.

use crate::error::FingerprintError;
use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{GrayImage, ImageBuffer};
use std::path::Path;

/// Fast image resizer using SIMD acceleration
pub struct FastResizer {
    resizer: Resizer,
}

impl FastResizer {
    pub fn new() -> Self {
        Self {
            resizer: Resizer::new(),
        }
    }

    /// Resize (stretch, never crop) a grayscale raster to exactly `width` x `height`.
    pub fn resize_gray(
        &mut self,
        gray: &GrayImage,
        width: u32,
        height: u32,
        path: &Path,
    ) -> Result<GrayImage, FingerprintError> {
        let resize_error = |reason: String| FingerprintError::Resize {
            path: path.to_path_buf(),
            reason,
        };

        if gray.width() == 0 || gray.height() == 0 {
            return Err(resize_error("Invalid source dimensions".to_string()));
        }
        if width == 0 || height == 0 {
            return Err(resize_error("Invalid destination dimensions".to_string()));
        }

        let src_image = Image::from_vec_u8(
            gray.width(),
            gray.height(),
            gray.as_raw().clone(),
            PixelType::U8,
        )
        .map_err(|e| resize_error(format!("Failed to create source image: {}", e)))?;

        let mut dst_image = Image::new(width, height, PixelType::U8);

        // Plain bilinear sampling, no crop and no low-pass on shrink
        let options = ResizeOptions::new().resize_alg(ResizeAlg::Interpolation(FilterType::Bilinear));

        self.resizer
            .resize(&src_image, &mut dst_image, &options)
            .map_err(|e| resize_error(format!("Resize failed: {}", e)))?;

        ImageBuffer::from_raw(width, height, dst_image.into_vec())
            .ok_or_else(|| resize_error("Failed to create result buffer".to_string()))
    }
}

impl Default for FastResizer {
    fn default() -> Self {
        Self::new()
    }
}
