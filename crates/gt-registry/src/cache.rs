//! On-disk response cache
//!
//! One JSON file per key under the cache directory. Keys are the SHA-256
//! of a call description, so identical calls share an entry across runs.
//! Reads treat expired or unreadable entries as misses and delete them;
//! writes never fail the caller.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default time-to-live for cached responses
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Default cache directory
pub const DEFAULT_DIRECTORY: &str = ".golden-thread-cache";

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries on disk
    pub entry_count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEnvelope {
    written_at_ms: i64,
    payload: Value,
}

/// File-backed response cache with time-based expiration
#[derive(Debug, Clone)]
pub struct ResponseCache {
    directory: PathBuf,
    ttl: Duration,
    enabled: bool,
}

impl ResponseCache {
    /// Create cache rooted at `directory`
    ///
    /// The directory is created if missing; failure to create it is logged
    /// and every later write degrades to a no-op.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>, ttl: Duration) -> Self {
        let directory = directory.into();
        if let Err(e) = fs::create_dir_all(&directory) {
            tracing::warn!("cannot create cache directory {}: {e}", directory.display());
        }
        Self {
            directory,
            ttl,
            enabled: true,
        }
    }

    /// Cache that never stores anything
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            directory: PathBuf::new(),
            ttl: Duration::ZERO,
            enabled: false,
        }
    }

    /// Whether the cache stores anything
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Cache directory
    #[inline]
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Deterministic key for a call description
    #[must_use]
    pub fn key(description: &str) -> String {
        hex::encode(Sha256::digest(description.as_bytes()))
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{key}.json"))
    }

    /// Fresh payload for `key`, if any
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        if !self.is_enabled() {
            return None;
        }
        let path = self.entry_path(key);
        let bytes = fs::read(&path).ok()?;

        let envelope = match serde_json::from_slice::<CacheEnvelope>(&bytes) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::debug!(key, "discarding corrupt cache entry: {e}");
                remove(&path);
                return None;
            }
        };

        let age_ms = chrono::Utc::now().timestamp_millis() - envelope.written_at_ms;
        let ttl_ms = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        if age_ms > ttl_ms {
            tracing::debug!(key, age_ms, "cache entry expired");
            remove(&path);
            return None;
        }

        tracing::debug!(key, "cache hit");
        Some(envelope.payload)
    }

    /// Store `payload` under `key`; failures are logged and ignored
    pub fn put(&self, key: &str, payload: &Value) {
        if !self.is_enabled() {
            return;
        }
        let envelope = CacheEnvelope {
            written_at_ms: chrono::Utc::now().timestamp_millis(),
            payload: payload.clone(),
        };
        let result = serde_json::to_vec(&envelope)
            .map_err(std::io::Error::other)
            .and_then(|bytes| fs::write(self.entry_path(key), bytes));
        if let Err(e) = result {
            tracing::warn!(key, "failed to write cache entry: {e}");
        }
    }

    /// Delete every cached entry
    pub fn clear(&self) {
        if !self.is_enabled() {
            return;
        }
        for path in self.entry_files() {
            remove(&path);
        }
    }

    /// Get cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.entry_files().len() as u64,
        }
    }

    fn entry_files(&self) -> Vec<PathBuf> {
        let Ok(entries) = fs::read_dir(&self.directory) else {
            return Vec::new();
        };
        entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect()
    }
}

fn remove(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        tracing::warn!("failed to remove cache entry {}: {e}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keys_are_stable_sha256_hex() {
        let key = ResponseCache::key("page_abc");
        assert_eq!(key.len(), 64);
        assert_eq!(key, ResponseCache::key("page_abc"));
        assert_ne!(key, ResponseCache::key("page_abd"));
    }

    #[test]
    fn round_trip_before_expiry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path(), DEFAULT_TTL);
        let payload = json!([{"id": "p1"}, {"id": "p2"}]);

        cache.put("k", &payload);
        assert_eq!(cache.get("k"), Some(payload));
        assert_eq!(cache.stats().entry_count, 1);
    }

    #[test]
    fn expired_entry_is_a_miss_and_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path(), Duration::from_secs(60));
        let stale = json!({"written_at_ms": 0, "payload": {"id": "old"}});
        fs::write(dir.path().join("k.json"), stale.to_string()).unwrap();

        assert_eq!(cache.get("k"), None);
        assert!(!dir.path().join("k.json").exists());
    }

    #[test]
    fn corrupt_entry_is_a_miss_and_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path(), DEFAULT_TTL);
        fs::write(dir.path().join("k.json"), "{not json").unwrap();

        assert_eq!(cache.get("k"), None);
        assert!(!dir.path().join("k.json").exists());
    }

    #[test]
    fn clear_removes_all_entries() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path(), DEFAULT_TTL);
        cache.put("a", &json!(1));
        cache.put("b", &json!(2));

        cache.clear();
        assert_eq!(cache.stats().entry_count, 0);
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn disabled_cache_stores_nothing() {
        let cache = ResponseCache::disabled();
        assert!(!cache.is_enabled());
        cache.put("a", &json!(1));
        assert_eq!(cache.get("a"), None);
        cache.clear();
    }

    #[test]
    fn write_failure_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path().join("gone"), DEFAULT_TTL);
        fs::remove_dir_all(dir.path().join("gone")).unwrap();
        cache.put("a", &json!(1));
        assert_eq!(cache.get("a"), None);
    }
}
