//! Per-file attributes gathered during a run.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Pixel dimensions of the original (pre-resize) image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Pixel area, used to pick the best copy of an image
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// One scanned file.
///
/// `path` is relative to the target folder and unique within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: PathBuf,
    /// DCT perceptual hash; only present for decodable images
    pub perceptual_hash: Option<u64>,
    pub dimensions: Option<Dimensions>,
    /// CRC-32 as 8 lowercase hex digits
    pub checksum: String,
}

impl FileRecord {
    /// File name component, used as the key in filename mode
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Pixel area, zero when the file is not a decodable image
    pub fn area(&self) -> u64 {
        self.dimensions.map(|d| d.area()).unwrap_or(0)
    }
}

/// Normalize a relative path into the `/`-separated form used as a cache key.
pub fn cache_key(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "/")
        .trim_start_matches("./")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_is_zero_without_dimensions() {
        let record = FileRecord {
            path: PathBuf::from("notes.txt"),
            perceptual_hash: None,
            dimensions: None,
            checksum: "00000000".to_string(),
        };
        assert_eq!(record.area(), 0);
    }

    #[test]
    fn area_does_not_overflow() {
        let dims = Dimensions::new(100_000, 100_000);
        assert_eq!(dims.area(), 10_000_000_000);
    }

    #[test]
    fn cache_key_uses_forward_slashes() {
        assert_eq!(cache_key(Path::new("./2019/beach.jpg")), "2019/beach.jpg");
        assert_eq!(cache_key(Path::new("2019\\beach.jpg")), "2019/beach.jpg");
    }
}
