//! # Scanner Module
//!
//! Discovers the files of a cleanup run.
//!
//! Paths are reported relative to the target folder, sorted by name within
//! each directory so that runs are deterministic. `[Junk]`, `[Dupes]`,
//! `$RECYCLE.BIN` and `.Trash` are never walked, and the fingerprint cache
//! file is never reported.
//!
//! ## Example
//! ```rust,ignore
//! use photo_cleanup::core::scanner::{FileScanner, ScanConfig, WalkDirScanner};
//!
//! let scanner = WalkDirScanner::new(ScanConfig::default());
//! let result = scanner.scan(Path::new("/Users/photos"))?;
//! ```

mod filter;
mod walker;

pub use filter::{header_dimensions, is_too_small, EntryFilter, EXCLUDED_DIRS};
pub use walker::{ScanConfig, WalkDirScanner};

use crate::error::ScanError;
use crate::events::EventSender;
use std::path::{Path, PathBuf};

/// Result of a scan operation
#[derive(Debug)]
pub struct ScanResult {
    /// Discovered files, relative to the root
    pub files: Vec<PathBuf>,
    /// Errors that occurred during scanning (non-fatal)
    pub errors: Vec<ScanError>,
}

/// Trait for file scanners
///
/// Implement this trait to create custom scanners (e.g., for testing).
pub trait FileScanner: Send + Sync {
    /// Scan the target folder
    fn scan(&self, root: &Path) -> Result<ScanResult, ScanError>;

    /// Scan with progress reporting via events
    fn scan_with_events(&self, root: &Path, events: &EventSender) -> Result<ScanResult, ScanError>;
}
