//! Time-boxed response cache
//!
//! Memoizes decoded API responses keyed by the full request URL. An entry
//! is readable only while younger than the configured TTL; stale entries
//! are indistinguishable from absent ones and get overwritten by the next
//! successful fetch for the same key. There is no eviction bound and no
//! persistence across runs.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;

/// Default entry lifetime (5 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

struct CacheEntry {
    payload: Value,
    stored_at: Instant,
}

/// In-memory response cache with time-based expiry.
///
/// Owned by the API client; constructed explicitly so tests can run with
/// their own instance (and their own TTL) without cross-contamination.
pub struct ResponseCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
    hits: u64,
    misses: u64,
}

impl ResponseCache {
    /// Create a cache with the default 5 minute TTL
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Create a cache with a custom TTL
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            hits: 0,
            misses: 0,
        }
    }

    /// Return the cached payload for `key` if it exists and is still fresh.
    ///
    /// Absence is a normal outcome, not an error. A stale entry counts as a
    /// miss but is left in place; it will be replaced by the next `store`.
    pub fn lookup(&mut self, key: &str) -> Option<Value> {
        match self.entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                self.hits += 1;
                log::debug!("cache hit: {}", key);
                Some(entry.payload.clone())
            }
            Some(_) => {
                self.misses += 1;
                log::debug!("cache stale: {}", key);
                None
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Insert or replace the entry for `key`, stamped with the current time
    pub fn store(&mut self, key: impl Into<String>, payload: Value) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                payload,
                stored_at: Instant::now(),
            },
        );
    }

    /// Remove all entries. Not part of the steady-state request path.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hit/miss counters since construction
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entry_count: usize,
    pub hits: u64,
    pub misses: u64,
}
