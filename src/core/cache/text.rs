//! Tab-separated text file cache backend.
//!
//! One line per file:
//! `path<TAB>mtime<TAB>hash<TAB>width<TAB>height<TAB>checksum`, with the
//! hash and dimensions left empty when absent.

use super::{CacheBackend, CacheEntry, CacheLookup};
use crate::core::record::Dimensions;
use crate::error::CacheError;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{info, warn};

/// Name of the cache file kept in the target folder
pub const CACHE_FILE_NAME: &str = "fingerprint.db";

const FIELD_COUNT: usize = 6;

/// Text-file backed persistent cache
pub struct TextFileCache {
    path: PathBuf,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl TextFileCache {
    /// Load the cache at `path`.
    ///
    /// A missing or unreadable file yields an empty cache; malformed lines
    /// are skipped with a warning.
    pub fn load(path: &Path) -> Self {
        let entries = match fs::read_to_string(path) {
            Ok(contents) => {
                let entries = parse_table(&contents);
                info!("Loaded {} cached fingerprints from {}", entries.len(), path.display());
                entries
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No fingerprint cache at {}, starting fresh", path.display());
                HashMap::new()
            }
            Err(e) => {
                warn!("Error reading cache file {}; ignoring: {}", path.display(), e);
                HashMap::new()
            }
        };

        Self {
            path: path.to_path_buf(),
            entries: RwLock::new(entries),
        }
    }

    /// Location of the cache file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn poisoned(&self) -> CacheError {
        CacheError::Poisoned {
            path: self.path.clone(),
        }
    }

    fn write_file(&self, entries: &[CacheEntry]) -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(&self.path)?);
        for entry in entries {
            writeln!(writer, "{}", format_line(entry))?;
        }
        writer.flush()
    }
}

impl CacheBackend for TextFileCache {
    fn get(&self, key: &str, current_mtime: i64) -> Result<CacheLookup, CacheError> {
        let entries = self.entries.read().map_err(|_| self.poisoned())?;
        Ok(super::classify(entries.get(key), current_mtime))
    }

    fn replace_all(&self, entries: Vec<CacheEntry>) -> Result<(), CacheError> {
        let entries: Vec<CacheEntry> = entries
            .into_iter()
            .filter(|e| {
                let storable = !e.path.contains(['\t', '\n', '\r']);
                if !storable {
                    warn!("Not caching {:?}: path contains a tab or line break", e.path);
                }
                storable
            })
            .collect();

        self.write_file(&entries)
            .map_err(|source| CacheError::WriteFailed {
                path: self.path.clone(),
                source,
            })?;

        let mut stored = self.entries.write().map_err(|_| self.poisoned())?;
        *stored = entries.into_iter().map(|e| (e.path.clone(), e)).collect();
        Ok(())
    }
}

/// Parse a whole cache file, skipping malformed lines.
pub fn parse_table(contents: &str) -> HashMap<String, CacheEntry> {
    let mut entries = HashMap::new();
    for (number, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line) {
            Ok(entry) => {
                entries.insert(entry.path.clone(), entry);
            }
            Err(reason) => warn!("Failed to read cache line {}: {} ({:?})", number + 1, reason, line),
        }
    }
    entries
}

/// Parse one cache line.
pub fn parse_line(line: &str) -> Result<CacheEntry, String> {
    let fields: Vec<&str> = line.trim_end_matches('\r').split('\t').collect();
    if fields.len() != FIELD_COUNT {
        return Err(format!("expected {} fields, found {}", FIELD_COUNT, fields.len()));
    }

    let path = fields[0];
    if path.is_empty() {
        return Err("empty path".to_string());
    }

    let mtime = fields[1]
        .parse::<i64>()
        .map_err(|e| format!("bad mtime {:?}: {}", fields[1], e))?;
    let perceptual_hash = optional::<u64>(fields[2], "hash")?;
    let width = optional::<u32>(fields[3], "width")?;
    let height = optional::<u32>(fields[4], "height")?;

    let dimensions = match (width, height) {
        (Some(w), Some(h)) => Some(Dimensions::new(w, h)),
        (None, None) => None,
        _ => return Err("width and height must be set together".to_string()),
    };

    let checksum = fields[5];
    if checksum.len() != 8 || !checksum.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(format!("bad checksum {:?}", checksum));
    }

    Ok(CacheEntry {
        path: path.to_string(),
        mtime,
        perceptual_hash,
        dimensions,
        checksum: checksum.to_ascii_lowercase(),
    })
}

fn optional<T: std::str::FromStr>(field: &str, name: &str) -> Result<Option<T>, String>
where
    T::Err: std::fmt::Display,
{
    if field.is_empty() {
        return Ok(None);
    }
    field
        .parse::<T>()
        .map(Some)
        .map_err(|e| format!("bad {} {:?}: {}", name, field, e))
}

/// Render one entry as a cache line (without the trailing newline).
pub fn format_line(entry: &CacheEntry) -> String {
    let hash = entry.perceptual_hash.map(|h| h.to_string()).unwrap_or_default();
    let (width, height) = entry
        .dimensions
        .map(|d| (d.width.to_string(), d.height.to_string()))
        .unwrap_or_default();

    format!(
        "{}\t{}\t{}\t{}\t{}\t{}",
        entry.path, entry.mtime, hash, width, height, entry.checksum
    )
}
