//! In-memory cache backend for testing.

use super::{CacheBackend, CacheEntry, CacheLookup};
use crate::error::CacheError;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

/// In-memory cache backend
///
/// Useful for testing and scenarios where persistence isn't needed.
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Seed the cache with existing entries
    pub fn with_entries(entries: Vec<CacheEntry>) -> Self {
        Self {
            entries: RwLock::new(entries.into_iter().map(|e| (e.path.clone(), e)).collect()),
        }
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> CacheError {
    CacheError::Poisoned {
        path: PathBuf::from("memory"),
    }
}

impl CacheBackend for InMemoryCache {
    fn get(&self, key: &str, current_mtime: i64) -> Result<CacheLookup, CacheError> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(super::classify(entries.get(key), current_mtime))
    }

    fn replace_all(&self, entries: Vec<CacheEntry>) -> Result<(), CacheError> {
        let mut stored = self.entries.write().map_err(|_| poisoned())?;
        *stored = entries.into_iter().map(|e| (e.path.clone(), e)).collect();
        Ok(())
    }
}
