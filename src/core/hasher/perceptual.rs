//! DCT perceptual hash (64 bits).
//!
//! 1. Decode as grayscale and remember the original dimensions
//! 2. Stretch to 64x36 (16:9)
//! 3. DCT of the pixels scaled to 0..1, rescaled to 8 bits
//! 4. Keep the top-left 8x8 block (lowest frequencies)
//! 5. Bit i is set when coefficient i (row-major) is above the block mean
//!
//! Similar images end up a small Hamming distance apart.

use super::dct::dct_2d_low;
use super::fast_resize::FastResizer;
use crate::core::record::Dimensions;
use crate::error::FingerprintError;
use image::GrayImage;
use std::path::Path;

/// Canonical raster the image is stretched to before the transform
pub const HASH_SOURCE_WIDTH: u32 = 64;
pub const HASH_SOURCE_HEIGHT: u32 = 36;
/// Side of the low-frequency block; 8x8 gives 64 bits
pub const HASH_DIM: usize = 8;

/// Perceptual hash plus the dimensions of the decoded original
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageFingerprint {
    pub hash: u64,
    pub dimensions: Dimensions,
}

/// DCT-based perceptual hasher
pub struct PerceptualHasher {
    resizer: FastResizer,
}

impl PerceptualHasher {
    pub fn new() -> Self {
        Self {
            resizer: FastResizer::new(),
        }
    }

    /// Hash a decoded grayscale raster.
    pub fn hash_gray(
        &mut self,
        gray: &GrayImage,
        path: &Path,
    ) -> Result<ImageFingerprint, FingerprintError> {
        let dimensions = Dimensions::new(gray.width(), gray.height());
        let small = self
            .resizer
            .resize_gray(gray, HASH_SOURCE_WIDTH, HASH_SOURCE_HEIGHT, path)?;

        let scaled: Vec<f64> = small.as_raw().iter().map(|&p| p as f64 / 255.0).collect();
        let block = dct_2d_low(
            &scaled,
            HASH_SOURCE_WIDTH as usize,
            HASH_SOURCE_HEIGHT as usize,
            HASH_DIM,
        );

        let coefficients: Vec<u8> = block.iter().map(|&c| to_byte(c * 255.0)).collect();

        Ok(ImageFingerprint {
            hash: hash_from_coefficients(&coefficients),
            dimensions,
        })
    }
}

impl Default for PerceptualHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Float to unsigned 8-bit: truncate toward zero, keep the low 8 bits.
fn to_byte(value: f64) -> u8 {
    value.trunc() as i64 as u8
}

/// Pack one bit per coefficient: set when strictly above the mean.
///
/// Bit `i` carries weight `2^i`, with `i` the row-major position in the block.
pub fn hash_from_coefficients(coefficients: &[u8]) -> u64 {
    debug_assert!(coefficients.len() <= 64);
    if coefficients.is_empty() {
        return 0;
    }

    let mean = coefficients.iter().map(|&c| c as f64).sum::<f64>() / coefficients.len() as f64;

    coefficients
        .iter()
        .enumerate()
        .filter(|(_, &c)| c as f64 > mean)
        .fold(0u64, |hash, (i, _)| hash | (1u64 << i))
}

/// Hamming distance between two hashes
pub fn hamming(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}
