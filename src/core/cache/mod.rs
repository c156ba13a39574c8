//! # Cache Module
//!
//! Persists fingerprints between runs so that unchanged files are not
//! decoded and checksummed again.
//!
//! ## Invalidation
//! An entry is trusted only while the file's mtime (whole seconds) equals
//! the stored one. Any difference recomputes every attribute of that file.
//!
//! ## Backends
//! - `TextFileCache` - tab-separated `fingerprint.db` in the target folder
//! - `InMemoryCache` - For testing

mod memory;
mod text;
mod traits;

pub use memory::InMemoryCache;
pub use text::{format_line, parse_line, parse_table, TextFileCache, CACHE_FILE_NAME};
pub use traits::{CacheBackend, CacheLookup};

use crate::core::hasher::Fingerprinter;
use crate::core::record::{cache_key, Dimensions, FileRecord};
use crate::error::{FingerprintError, Result};
use crate::events::ComputeReason;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::{debug, warn};

/// A cached fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Normalized relative path (see [`cache_key`])
    pub path: String,
    /// File modification time, whole seconds since the epoch
    pub mtime: i64,
    pub perceptual_hash: Option<u64>,
    pub dimensions: Option<Dimensions>,
    pub checksum: String,
}

impl CacheEntry {
    /// Capture a record together with the file's mtime
    pub fn from_record(record: &FileRecord, mtime: i64) -> Self {
        Self {
            path: cache_key(&record.path),
            mtime,
            perceptual_hash: record.perceptual_hash,
            dimensions: record.dimensions,
            checksum: record.checksum.clone(),
        }
    }

    /// Check if this entry is still valid for a file
    pub fn is_valid_for(&self, current_mtime: i64) -> bool {
        self.mtime == current_mtime
    }

    /// Rebuild the record for `path` from the cached attributes
    pub fn to_record(&self, path: PathBuf) -> FileRecord {
        FileRecord {
            path,
            perceptual_hash: self.perceptual_hash,
            dimensions: self.dimensions,
            checksum: self.checksum.clone(),
        }
    }
}

/// Shared lookup rule for every backend.
pub(crate) fn classify(entry: Option<&CacheEntry>, current_mtime: i64) -> CacheLookup {
    match entry {
        Some(entry) if entry.is_valid_for(current_mtime) => CacheLookup::Hit(entry.clone()),
        Some(_) => CacheLookup::Stale,
        None => CacheLookup::Miss,
    }
}

/// Where a record's attributes came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Computed(ComputeReason),
}

/// Modification time in whole seconds since the epoch, truncated toward zero.
pub fn file_mtime(path: &Path) -> io::Result<i64> {
    let modified = path.metadata()?.modified()?;
    Ok(match modified.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_secs() as i64,
        Err(before) => -(before.duration().as_secs() as i64),
    })
}

/// Build the record for `relative` (under `root`), reusing the cache when valid.
pub fn lookup_or_compute(
    cache: &dyn CacheBackend,
    fingerprinter: &mut Fingerprinter,
    root: &Path,
    relative: &Path,
) -> Result<(FileRecord, CacheOutcome)> {
    let absolute = root.join(relative);
    let mtime = file_mtime(&absolute).map_err(|source| FingerprintError::Io {
        path: absolute.clone(),
        source,
    })?;

    let reason = match cache.get(&cache_key(relative), mtime)? {
        CacheLookup::Hit(entry) => {
            debug!("Cache hit for {}", relative.display());
            return Ok((entry.to_record(relative.to_path_buf()), CacheOutcome::Hit));
        }
        CacheLookup::Stale => ComputeReason::Stale,
        CacheLookup::Miss => ComputeReason::New,
    };

    let record = fingerprinter.fingerprint(&absolute, relative.to_path_buf())?;
    Ok((record, CacheOutcome::Computed(reason)))
}

/// Cache entries for `records`, stamped with each file's mtime as of now.
///
/// Records whose file can no longer be read are left out.
pub fn entries_for_save(root: &Path, records: &[FileRecord]) -> Vec<CacheEntry> {
    records
        .iter()
        .filter_map(|record| match file_mtime(&root.join(&record.path)) {
            Ok(mtime) => Some(CacheEntry::from_record(record, mtime)),
            Err(e) => {
                warn!("Not caching {}: {}", record.path.display(), e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        PathBuf::from(name)
    }

    #[test]
    fn entry_valid_only_for_exact_mtime() {
        let entry = CacheEntry {
            path: "photo.jpg".to_string(),
            mtime: 1690000000,
            perceptual_hash: Some(1234),
            dimensions: Some(Dimensions::new(1920, 1080)),
            checksum: "ab12cd34".to_string(),
        };

        assert!(entry.is_valid_for(1690000000));
        assert!(!entry.is_valid_for(1690000500));
        assert!(!entry.is_valid_for(1689999999));
    }

    #[test]
    fn hit_reuses_cached_attributes_without_recomputing() {
        let dir = TempDir::new().unwrap();
        let relative = write_file(&dir, "photo.jpg", b"not really a jpeg");
        let mtime = file_mtime(&dir.path().join(&relative)).unwrap();

        // Cached values that could never be computed from the real bytes
        let cache = InMemoryCache::with_entries(vec![CacheEntry {
            path: "photo.jpg".to_string(),
            mtime,
            perceptual_hash: Some(1234),
            dimensions: Some(Dimensions::new(1920, 1080)),
            checksum: "ab12cd34".to_string(),
        }]);

        let (record, outcome) =
            lookup_or_compute(&cache, &mut Fingerprinter::new(), dir.path(), &relative).unwrap();

        assert_eq!(outcome, CacheOutcome::Hit);
        assert_eq!(record.perceptual_hash, Some(1234));
        assert_eq!(record.dimensions, Some(Dimensions::new(1920, 1080)));
        assert_eq!(record.checksum, "ab12cd34");
    }

    #[test]
    fn stale_entry_recomputes_every_attribute() {
        let dir = TempDir::new().unwrap();
        let relative = write_file(&dir, "photo.jpg", b"123456789");
        let mtime = file_mtime(&dir.path().join(&relative)).unwrap();

        let cache = InMemoryCache::with_entries(vec![CacheEntry {
            path: "photo.jpg".to_string(),
            mtime: mtime - 500,
            perceptual_hash: Some(1234),
            dimensions: Some(Dimensions::new(1920, 1080)),
            checksum: "ab12cd34".to_string(),
        }]);

        let (record, outcome) =
            lookup_or_compute(&cache, &mut Fingerprinter::new(), dir.path(), &relative).unwrap();

        assert_eq!(outcome, CacheOutcome::Computed(ComputeReason::Stale));
        assert_eq!(record.checksum, "cbf43926");
        assert_eq!(record.perceptual_hash, None);
        assert_eq!(record.dimensions, None);
    }

    #[test]
    fn unseen_path_is_computed_as_new() {
        let dir = TempDir::new().unwrap();
        let relative = write_file(&dir, "a.txt", b"123456789");

        let (_, outcome) = lookup_or_compute(
            &InMemoryCache::new(),
            &mut Fingerprinter::new(),
            dir.path(),
            &relative,
        )
        .unwrap();

        assert_eq!(outcome, CacheOutcome::Computed(ComputeReason::New));
    }

    #[test]
    fn save_skips_vanished_files() {
        let dir = TempDir::new().unwrap();
        let kept = write_file(&dir, "kept.txt", b"x");
        let records = vec![
            FileRecord {
                path: kept,
                perceptual_hash: None,
                dimensions: None,
                checksum: "8cdc1683".to_string(),
            },
            FileRecord {
                path: PathBuf::from("gone.txt"),
                perceptual_hash: None,
                dimensions: None,
                checksum: "00000000".to_string(),
            },
        ];

        let entries = entries_for_save(dir.path(), &records);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "kept.txt");
    }
}
