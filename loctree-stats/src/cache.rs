//! TTL cache for computed per-file statistics
//!
//! Maps a repository identity to the full unfiltered statistics list from a
//! previous analysis. Entries expire after a per-insert TTL; a background
//! sweep reclaims expired entries, but correctness never depends on it having
//! run: the read path re-checks expiry every time.

use loctree_core::FileStat;
use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
    time::{Duration, Instant},
};
use tracing::{debug, info};

/// Build the cache key for a repository and optional branch.
///
/// An empty branch means "unspecified/default" and yields a key distinct from
/// every named branch of the same repository.
pub fn cache_key(repo_url: &str, branch: &str) -> String {
    format!("{}|{}", repo_url, branch)
}

#[derive(Debug)]
struct CacheEntry {
    value: Arc<Vec<FileStat>>,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory TTL cache for unfiltered analysis results.
///
/// All state lives behind a single reader/writer lock; `get` takes the read
/// lock only, so concurrent lookups never serialize against each other.
/// Stored lists are shared out as `Arc` clones and must not be mutated by
/// callers.
#[derive(Debug, Default)]
pub struct StatsCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl StatsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditionally insert or replace the entry for `key`, returning a
    /// handle to the stored list.
    ///
    /// A zero TTL installs an entry that is already expired; that is accepted
    /// behavior, the next `get` simply misses.
    pub fn set(&self, key: &str, value: Vec<FileStat>, ttl: Duration) -> Arc<Vec<FileStat>> {
        let value = Arc::new(value);
        let mut entries = self.entries.write().unwrap();
        entries.insert(
            key.to_string(),
            CacheEntry {
                value: Arc::clone(&value),
                expires_at: Instant::now() + ttl,
            },
        );
        value
    }

    /// Look up `key`, treating expired entries as absent even when the sweep
    /// has not reclaimed them yet.
    pub fn get(&self, key: &str) -> Option<Arc<Vec<FileStat>>> {
        let entries = self.entries.read().unwrap();
        match entries.get(key) {
            Some(entry) if !entry.is_expired() => Some(Arc::clone(&entry.value)),
            _ => None,
        }
    }

    /// Discard all entries. Used when a configuration change invalidates
    /// previously cached results.
    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap();
        entries.clear();
        info!("Stats cache cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start the background sweep that deletes expired entries on a fixed
    /// interval, independent of request traffic.
    pub fn spawn_sweeper(&self, interval: Duration) {
        let entries = Arc::clone(&self.entries);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;

                let mut entries = entries.write().unwrap();
                let before = entries.len();
                entries.retain(|_, entry| !entry.is_expired());

                let removed = before - entries.len();
                if removed > 0 {
                    debug!(removed, "Cache sweep reclaimed expired entries");
                }
            }
        });
    }
}
