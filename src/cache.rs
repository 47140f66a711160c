//! # Result Caching
//!
//! Repeated inventory runs reuse the last fetched repository list instead of
//! searching again. [`resolve`] implements the get-or-populate contract on
//! top of any [`CacheStore`]:
//!
//! - caching disabled: always fetch, never touch the store;
//! - caching enabled: return a stored value unless a refresh is forced,
//!   otherwise fetch and store the result.
//!
//! Store failures never fail a run. A failed read counts as a miss and a
//! failed write is logged while the fetched value is still returned. A stored
//! empty list is a hit like any other value; only a missing or expired entry
//! is a miss.
//!
//! Two stores are provided: [`MemoryCache`] for a single process and
//! [`JsonFileCache`], which persists entries as JSON files with a timeout.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Key/value storage for cached results.
pub trait CacheStore<T>: Send + Sync {
    /// Returns the stored value, or `Ok(None)` when the key is missing or
    /// expired.
    fn get(&self, key: &str) -> Result<Option<T>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &T) -> Result<()>;
}

/// Returns the cached value for `key` or fetches and stores a fresh one.
///
/// `fetch` is not called on a cache hit. When it fails, its error is returned
/// and nothing is written.
pub fn resolve<T, F, S>(key: &str, force_refresh: bool, enabled: bool, fetch: F, store: &S) -> Result<T>
where
    F: FnOnce() -> Result<T>,
    S: CacheStore<T> + ?Sized,
{
    if !enabled {
        debug!("Cache disabled, fetching");
        return fetch();
    }

    if force_refresh {
        debug!("Cache refresh forced for {}", key);
    } else {
        match store.get(key) {
            Ok(Some(value)) => {
                debug!("Cache hit for {}", key);
                return Ok(value);
            }
            Ok(None) => debug!("Cache miss for {}", key),
            Err(e) => warn!("Cache read failed for {}, fetching instead: {}", key, e),
        }
    }

    let value = fetch()?;
    if let Err(e) = store.set(key, &value) {
        warn!("Cache write failed for {}: {}", key, e);
    }
    Ok(value)
}

/// In-process cache store.
#[derive(Debug)]
pub struct MemoryCache<T> {
    entries: Mutex<HashMap<String, T>>,
}

impl<T> MemoryCache<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, T>>> {
        self.entries.lock().map_err(|_| Error::LockPoisoned {
            context: "memory cache".to_string(),
        })
    }

    /// Get the number of cached entries
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    /// Clear all cached entries
    pub fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }
}

impl<T> Default for MemoryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send> CacheStore<T> for MemoryCache<T> {
    fn get(&self, key: &str) -> Result<Option<T>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &T) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.clone());
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct CacheFile<T> {
    /// Seconds since the Unix epoch.
    written_at: u64,
    value: T,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// One file of a [`JsonFileCache`].
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Sanitized key, the file stem.
    pub key: String,
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

/// File-backed cache store.
///
/// Each key is one JSON file under the cache root. Entries older than the
/// timeout are treated as missing; a timeout of `None` never expires.
#[derive(Debug, Clone)]
pub struct JsonFileCache {
    root: PathBuf,
    timeout: Option<Duration>,
}

impl JsonFileCache {
    pub fn new(root: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            root: root.into(),
            timeout,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The file holding `key`.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.root.join(format!("{}.json", safe))
    }

    fn is_expired(&self, written_at: u64) -> bool {
        match self.timeout {
            Some(timeout) => now_secs().saturating_sub(written_at) > timeout.as_secs(),
            None => false,
        }
    }

    /// Removes the entry for `key`. Returns whether there was one.
    pub fn remove(&self, key: &str) -> Result<bool> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Cache files under the root, sorted by key.
    pub fn entries(&self) -> Result<Vec<CacheEntry>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            let metadata = fs::metadata(&path)?;
            entries.push(CacheEntry {
                key,
                size: metadata.len(),
                modified: metadata.modified().ok(),
                path,
            });
        }
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    /// Removes every cache file under the root. Returns how many were removed.
    pub fn clear(&self) -> Result<usize> {
        if !self.root.exists() {
            return Ok(0);
        }
        let mut removed = 0;
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

impl<T> CacheStore<T> for JsonFileCache
where
    T: Serialize + DeserializeOwned,
{
    fn get(&self, key: &str) -> Result<Option<T>> {
        let path = self.entry_path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::Cache {
                    message: format!("failed to read {}: {}", path.display(), e),
                })
            }
        };

        let file: CacheFile<T> = serde_json::from_str(&content).map_err(|e| Error::Cache {
            message: format!("corrupt cache entry {}: {}", path.display(), e),
        })?;

        if self.is_expired(file.written_at) {
            debug!("Cache entry {} expired", path.display());
            return Ok(None);
        }
        Ok(Some(file.value))
    }

    fn set(&self, key: &str, value: &T) -> Result<()> {
        let path = self.entry_path(key);
        let to_cache_error = |e: std::io::Error| Error::Cache {
            message: format!("failed to write {}: {}", path.display(), e),
        };

        fs::create_dir_all(&self.root).map_err(to_cache_error)?;
        let file = CacheFile {
            written_at: now_secs(),
            value,
        };
        let content = serde_json::to_string(&file)?;

        // Write-then-rename so readers never see a partial entry
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(to_cache_error)?;
        fs::rename(&tmp, &path).map_err(to_cache_error)?;
        Ok(())
    }
}
