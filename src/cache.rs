//! Build cache storage.
//!
//! Caches are namespaced string-to-string stores. Renderers address them
//! through [`CacheStore`] so tests can swap in a [`MemoryCache`]; the real
//! build uses a [`JsonFileCache`] that loads eagerly on open and persists
//! only when [`JsonFileCache::persist`] is called, so a crashed build
//! never writes a half-updated cache file.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::{self},
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to read cache file {0}")]
    Read(PathBuf, #[source] io::Error),

    #[error("failed to write cache file {0}")]
    Write(PathBuf, #[source] io::Error),

    #[error("cache file {0} is corrupt")]
    Corrupt(PathBuf, #[source] serde_json::Error),
}

/// A namespaced key-value store for build artifacts.
///
/// Implementations must be safe to share across rayon workers.
pub trait CacheStore: Send + Sync {
    /// Look up a value. `None` means a miss.
    fn get(&self, namespace: &str, key: &str) -> Option<String>;

    /// Store a value. `None` removes the entry.
    fn set(&self, namespace: &str, key: &str, value: Option<String>);
}

// ============================================================================
// In-Memory Cache
// ============================================================================

/// Volatile cache, used in tests and for cache-less builds.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<FxHashMap<String, FxHashMap<String, String>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in one namespace.
    pub fn len(&self, namespace: &str) -> usize {
        self.entries
            .read()
            .get(namespace)
            .map_or(0, FxHashMap::len)
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, namespace: &str, key: &str) -> Option<String> {
        self.entries.read().get(namespace)?.get(key).cloned()
    }

    fn set(&self, namespace: &str, key: &str, value: Option<String>) {
        let mut entries = self.entries.write();
        match value {
            Some(value) => {
                entries
                    .entry(namespace.to_string())
                    .or_default()
                    .insert(key.to_string(), value);
            }
            None => {
                if let Some(ns) = entries.get_mut(namespace) {
                    ns.remove(key);
                }
            }
        }
    }
}

// ============================================================================
// JSON File Cache
// ============================================================================

#[derive(Default, Serialize, Deserialize)]
struct CacheFile {
    namespaces: FxHashMap<String, FxHashMap<String, String>>,
}

/// File-backed cache, loaded fully into memory on open.
///
/// Writes are in-memory only until [`persist`](Self::persist) runs, which
/// the build calls exactly once after a successful pass.
pub struct JsonFileCache {
    path: PathBuf,
    entries: RwLock<CacheFile>,
    dirty: RwLock<bool>,
}

impl JsonFileCache {
    /// Open a cache file, creating an empty cache if it does not exist.
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        let entries = if path.exists() {
            let raw =
                fs::read_to_string(path).map_err(|e| CacheError::Read(path.to_path_buf(), e))?;
            serde_json::from_str(&raw).map_err(|e| CacheError::Corrupt(path.to_path_buf(), e))?
        } else {
            CacheFile::default()
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries: RwLock::new(entries),
            dirty: RwLock::new(false),
        })
    }

    /// Write the cache back to disk if anything changed.
    pub fn persist(&self) -> Result<(), CacheError> {
        if !*self.dirty.read() {
            return Ok(());
        }
        let entries = self.entries.read();
        let json = serde_json::to_string(&*entries)
            .map_err(|e| CacheError::Corrupt(self.path.clone(), e))?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| CacheError::Write(self.path.clone(), e))?;
        }
        fs::write(&self.path, json).map_err(|e| CacheError::Write(self.path.clone(), e))?;
        *self.dirty.write() = false;
        Ok(())
    }
}

impl CacheStore for JsonFileCache {
    fn get(&self, namespace: &str, key: &str) -> Option<String> {
        self.entries
            .read()
            .namespaces
            .get(namespace)?
            .get(key)
            .cloned()
    }

    fn set(&self, namespace: &str, key: &str, value: Option<String>) {
        let mut entries = self.entries.write();
        match value {
            Some(value) => {
                entries
                    .namespaces
                    .entry(namespace.to_string())
                    .or_default()
                    .insert(key.to_string(), value);
            }
            None => {
                if let Some(ns) = entries.namespaces.get_mut(namespace) {
                    ns.remove(key);
                }
            }
        }
        *self.dirty.write() = true;
    }
}
