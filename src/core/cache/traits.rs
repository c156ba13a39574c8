//! Cache backend trait definition.

use super::CacheEntry;
use crate::error::CacheError;

/// Result of looking a path up in the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// Entry exists and its mtime matches the live file
    Hit(CacheEntry),
    /// Entry exists but the file was modified since it was computed
    Stale,
    /// Path has never been cached
    Miss,
}

/// Trait for cache backends
pub trait CacheBackend: Send + Sync {
    /// Look up `key`, trusting the entry only when `current_mtime` matches exactly.
    fn get(&self, key: &str, current_mtime: i64) -> Result<CacheLookup, CacheError>;

    /// Replace the whole cache with `entries`.
    ///
    /// Persistent backends rewrite their storage from scratch; nothing from a
    /// previous save survives unless it is part of `entries`.
    fn replace_all(&self, entries: Vec<CacheEntry>) -> Result<(), CacheError>;
}
