// Cache store for upstream responses.
// One JSON document holds every entry; it is loaded once and rewritten on each put.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;

/// Default lifetime of a cached response: 1 hour.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Wrapper for cached data with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    /// The cached data.
    pub data: T,
    /// When the data was cached.
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    /// Create a new cached data entry stamped with the current time.
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    /// Check if this cached data has expired based on TTL.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        let elapsed = Utc::now()
            .signed_duration_since(self.cached_at)
            .to_std()
            .unwrap_or(Duration::MAX);

        elapsed >= ttl
    }

    /// Check if this cached data is still valid (not expired).
    pub fn is_valid(&self, ttl: Duration) -> bool {
        !self.is_expired(ttl)
    }
}

/// Time-bounded key/value store for raw upstream payloads.
///
/// Expired entries stay in the document until the same key is written again.
#[derive(Debug)]
pub struct ResponseCache {
    path: PathBuf,
    ttl: Duration,
    entries: BTreeMap<String, CachedData<Value>>,
}

impl ResponseCache {
    /// Load the cache document at `path`. A missing or unreadable document yields an empty cache.
    pub fn open(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        let path = path.into();
        let entries = match load_entries(&path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable cache document");
                BTreeMap::new()
            }
        };

        Self { path, ttl, entries }
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries held, including expired ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Payload stored under `key`, if it is younger than the TTL.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self.entries.get(key) {
            Some(cached) if cached.is_valid(self.ttl) => Some(&cached.data),
            Some(_) => {
                debug!(key, "cache entry expired");
                None
            }
            None => None,
        }
    }

    /// Store `payload` under `key`, replacing any previous entry, and rewrite the document.
    ///
    /// A failed rewrite is logged; the in-memory entry is kept for this process.
    pub fn put(&mut self, key: impl Into<String>, payload: Value) {
        self.entries.insert(key.into(), CachedData::new(payload));

        if let Err(e) = self.persist() {
            warn!(path = %self.path.display(), error = %e, "failed to write cache document");
        }
    }

    fn persist(&self) -> Result<()> {
        let json = serde_json::to_string(&self.entries)?;
        write_text(&self.path, &json)
    }
}

fn load_entries(path: &Path) -> Result<BTreeMap<String, CachedData<Value>>> {
    match read_text(path)? {
        Some(contents) => Ok(serde_json::from_str(&contents)?),
        None => Ok(BTreeMap::new()),
    }
}

/// Write text to `path` atomically via a temp file.
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(text.as_bytes())?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Read text from `path`, or `None` if it does not exist.
pub fn read_text(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path)?;
    Ok(Some(contents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn backdate(cache: &mut ResponseCache, key: &str, seconds: i64) {
        let entry = cache.entries.get_mut(key).unwrap();
        entry.cached_at = Utc::now() - chrono::Duration::seconds(seconds);
    }

    #[test]
    fn test_put_then_get_returns_payload() {
        let temp_dir = TempDir::new().unwrap();
        let mut cache = ResponseCache::open(temp_dir.path().join(".cache.json"), DEFAULT_TTL);

        let payload = json!({"login": "octocat", "followers": 10});
        cache.put("user:octocat:no_token", payload.clone());

        assert_eq!(cache.get("user:octocat:no_token"), Some(&payload));
        assert_eq!(cache.get("user:other:no_token"), None);
    }

    #[test]
    fn test_entries_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".cache.json");

        let mut cache = ResponseCache::open(&path, DEFAULT_TTL);
        cache.put("a", json!([1, 2, 3]));
        cache.put("b", json!({"x": true}));

        let reopened = ResponseCache::open(&path, DEFAULT_TTL);
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.get("a"), Some(&json!([1, 2, 3])));
    }

    #[test]
    fn test_expired_entry_is_a_miss_but_stays_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".cache.json");
        let ttl = Duration::from_secs(300);

        let mut cache = ResponseCache::open(&path, ttl);
        cache.put("stale", json!("old"));
        backdate(&mut cache, "stale", 600);
        cache.persist().unwrap();

        assert_eq!(cache.get("stale"), None);

        let reopened = ResponseCache::open(&path, ttl);
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.get("stale"), None);
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("stale"));
    }

    #[test]
    fn test_put_overwrites_and_refreshes() {
        let temp_dir = TempDir::new().unwrap();
        let ttl = Duration::from_secs(300);
        let mut cache = ResponseCache::open(temp_dir.path().join(".cache.json"), ttl);

        cache.put("k", json!(1));
        backdate(&mut cache, "k", 600);
        assert_eq!(cache.get("k"), None);

        cache.put("k", json!(2));
        assert_eq!(cache.get("k"), Some(&json!(2)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_corrupt_document_is_empty_cache() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".cache.json");
        fs::write(&path, "{not json").unwrap();

        let mut cache = ResponseCache::open(&path, DEFAULT_TTL);
        assert!(cache.is_empty());

        cache.put("k", json!("v"));
        let reopened = ResponseCache::open(&path, DEFAULT_TTL);
        assert_eq!(reopened.get("k"), Some(&json!("v")));
    }

    #[test]
    fn test_unwritable_document_fails_open() {
        let temp_dir = TempDir::new().unwrap();
        // A directory where the document should be makes every rewrite fail.
        let path = temp_dir.path().join("blocked");
        fs::create_dir(path.with_extension("tmp")).unwrap();

        let mut cache = ResponseCache::open(&path, DEFAULT_TTL);
        cache.put("k", json!("v"));
        assert_eq!(cache.get("k"), Some(&json!("v")));
    }

    #[test]
    fn test_is_expired_boundaries() {
        let mut data = CachedData::new("test");
        assert!(data.is_valid(Duration::from_secs(300)));
        assert!(data.is_expired(Duration::ZERO));

        data.cached_at = Utc::now() - chrono::Duration::seconds(600);
        assert!(data.is_expired(Duration::from_secs(300)));
    }

    #[test]
    fn test_write_and_read_text() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("report.html");

        write_text(&path, "<html></html>").unwrap();
        assert_eq!(read_text(&path).unwrap(), Some("<html></html>".to_string()));
        assert_eq!(read_text(&temp_dir.path().join("missing")).unwrap(), None);
    }
}
