//! # Hasher Module
//!
//! Computes the fingerprint of a single file: a CRC-32 checksum for every
//! file, and for raster images a 64-bit DCT perceptual hash together with
//! the original pixel dimensions.
//!
//! ## Performance Optimizations
//! - Uses `zune-jpeg` for faster JPEG decoding
//! - Uses `fast_image_resize` for SIMD-accelerated resizing
//!
//! ## Example
//! ```rust,ignore
//! let mut fingerprinter = Fingerprinter::new();
//! let record = fingerprinter.fingerprint(&root.join("a.jpg"), "a.jpg".into())?;
//! ```

mod checksum;
mod dct;
pub mod fast_decode;
pub mod fast_resize;
mod perceptual;

pub use checksum::{checksum_file, compute_checksum, READ_BUFFER_SIZE};
pub use perceptual::{
    hamming, hash_from_coefficients, ImageFingerprint, PerceptualHasher, HASH_DIM,
    HASH_SOURCE_HEIGHT, HASH_SOURCE_WIDTH,
};

use crate::core::record::FileRecord;
use crate::error::FingerprintError;
use fast_decode::FastDecoder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extensions that receive a perceptual hash
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif"];

/// Whether the file extension marks a supported raster image
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Computes full file records from scratch
pub struct Fingerprinter {
    perceptual: PerceptualHasher,
}

impl Fingerprinter {
    pub fn new() -> Self {
        Self {
            perceptual: PerceptualHasher::new(),
        }
    }

    /// Perceptual hash and dimensions of an image file.
    ///
    /// Returns `Ok(None)` for non-images and for images that fail to decode;
    /// only a failure to read the file at all is an error.
    pub fn perceptual_hash(
        &mut self,
        path: &Path,
    ) -> Result<Option<ImageFingerprint>, FingerprintError> {
        if !is_supported_image(path) {
            return Ok(None);
        }

        let bytes = fs::read(path).map_err(|source| FingerprintError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let fingerprint = FastDecoder::decode_luma(&bytes, path)
            .and_then(|gray| self.perceptual.hash_gray(&gray, path));

        match fingerprint {
            Ok(fingerprint) => Ok(Some(fingerprint)),
            Err(e) => {
                debug!("No perceptual hash for {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    /// Compute every attribute of `absolute`, recorded under `relative`.
    pub fn fingerprint(
        &mut self,
        absolute: &Path,
        relative: PathBuf,
    ) -> Result<FileRecord, FingerprintError> {
        let image = self.perceptual_hash(absolute)?;
        let checksum = checksum_file(absolute)?;

        Ok(FileRecord {
            path: relative,
            perceptual_hash: image.map(|i| i.hash),
            dimensions: image.map(|i| i.dimensions),
            checksum,
        })
    }
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::Dimensions;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    fn pattern(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 3 % 256) as u8, ((x + y) % 256) as u8])
        })
    }

    #[test]
    fn supported_extensions_are_case_insensitive() {
        assert!(is_supported_image(Path::new("a/B.JPG")));
        assert!(is_supported_image(Path::new("scan.tif")));
        assert!(!is_supported_image(Path::new("clip.mp4")));
        assert!(!is_supported_image(Path::new("README")));
    }

    #[test]
    fn non_image_gets_checksum_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, b"123456789").unwrap();

        let record = Fingerprinter::new()
            .fingerprint(&path, PathBuf::from("notes.txt"))
            .unwrap();

        assert_eq!(record.checksum, "cbf43926");
        assert_eq!(record.perceptual_hash, None);
        assert_eq!(record.dimensions, None);
    }

    #[test]
    fn undecodable_image_is_still_tracked() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.jpg");
        fs::write(&path, b"this is not a valid image file").unwrap();

        let record = Fingerprinter::new()
            .fingerprint(&path, PathBuf::from("broken.jpg"))
            .unwrap();

        assert_eq!(record.perceptual_hash, None);
        assert_eq!(record.dimensions, None);
        assert_eq!(record.checksum.len(), 8);
    }

    #[test]
    fn lossless_copies_in_different_formats_hash_identically() {
        let dir = TempDir::new().unwrap();
        let png = dir.path().join("copy.png");
        let bmp = dir.path().join("copy.bmp");
        let image = pattern(200, 120);
        image.save(&png).unwrap();
        image.save(&bmp).unwrap();

        let mut fingerprinter = Fingerprinter::new();
        let a = fingerprinter.fingerprint(&png, PathBuf::from("copy.png")).unwrap();
        let b = fingerprinter.fingerprint(&bmp, PathBuf::from("copy.bmp")).unwrap();

        assert!(a.perceptual_hash.is_some());
        assert_eq!(a.perceptual_hash, b.perceptual_hash);
        assert_eq!(a.dimensions, Some(Dimensions::new(200, 120)));
        assert_ne!(a.checksum, b.checksum);
    }
}
