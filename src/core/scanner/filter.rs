//! Entry filtering for the directory walk.

use crate::core::hasher::is_supported_image;
use crate::core::record::Dimensions;
use image::ImageReader;
use std::ffi::OsStr;
use std::path::Path;
use tracing::debug;

/// Folders that are never walked, at any depth
pub const EXCLUDED_DIRS: &[&str] = &["[Junk]", "[Dupes]", "$RECYCLE.BIN", ".Trash"];

/// Decides which directories are walked and which files are kept
#[derive(Debug, Clone)]
pub struct EntryFilter {
    excluded_dirs: Vec<String>,
    skipped_file: Option<String>,
    images_only: bool,
}

impl EntryFilter {
    pub fn new() -> Self {
        Self {
            excluded_dirs: EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
            skipped_file: None,
            images_only: false,
        }
    }

    /// Never report files with this name (the cache file)
    pub fn with_skipped_file(mut self, name: impl Into<String>) -> Self {
        self.skipped_file = Some(name.into());
        self
    }

    /// Only keep files with a supported image extension
    pub fn with_images_only(mut self, images_only: bool) -> Self {
        self.images_only = images_only;
        self
    }

    /// Whether a directory with this name should be walked
    pub fn should_descend(&self, name: &OsStr) -> bool {
        let name = name.to_string_lossy();
        !self.excluded_dirs.iter().any(|d| *d == name)
    }

    /// Whether a file should be part of the run
    pub fn should_include(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };

        if self.skipped_file.as_deref() == Some(&*name.to_string_lossy()) {
            return false;
        }

        !self.images_only || is_supported_image(path)
    }
}

impl Default for EntryFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Pixel dimensions read from the image header, or `None` for non-images.
pub fn header_dimensions(path: &Path) -> Option<Dimensions> {
    let reader = ImageReader::open(path).ok()?.with_guessed_format().ok()?;
    match reader.into_dimensions() {
        Ok((width, height)) => Some(Dimensions::new(width, height)),
        Err(e) => {
            debug!("No image header in {}: {}", path.display(), e);
            None
        }
    }
}

/// Whether the file is an image narrower or shorter than the minimum.
///
/// Files that are not images are never too small.
pub fn is_too_small(path: &Path, min: Dimensions) -> bool {
    header_dimensions(path)
        .map(|d| d.width < min.width || d.height < min.height)
        .unwrap_or(false)
}
