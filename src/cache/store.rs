//! Cache Store Module
//!
//! TTL cache combining HashMap storage with LRU capacity bounding and lazy expiry.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, LruTracker};
use crate::error::{GateError, Result};

// == TTL Cache ==
/// In-memory cache with a single TTL shared by every entry.
///
/// Expired entries are treated as absent. They are removed lazily when read
/// and in bulk by [`TtlCache::cleanup_expired`]. When `max_entries` is
/// reached, inserting a new key evicts the least recently used one.
#[derive(Debug)]
pub struct TtlCache<T> {
    entries: HashMap<String, CacheEntry<T>>,
    lru: LruTracker,
    stats: CacheStats,
    ttl: Duration,
    max_entries: usize,
}

impl<T: Clone> TtlCache<T> {
    // == Constructor ==
    /// Creates a cache whose entries live for `ttl`, holding at most
    /// `max_entries` values.
    ///
    /// Fails when either is zero: such a cache would expire every entry
    /// immediately or could never hold one.
    pub fn new(ttl: Duration, max_entries: usize) -> Result<Self> {
        if ttl.is_zero() {
            return Err(GateError::InvalidConfig(
                "cache TTL must be greater than zero".to_string(),
            ));
        }
        if max_entries == 0 {
            return Err(GateError::InvalidConfig(
                "cache capacity must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            ttl,
            max_entries,
        })
    }

    // == Get ==
    /// Returns the value if present and unexpired.
    pub fn get(&mut self, key: &str) -> Option<T> {
        self.get_at(key, Instant::now())
    }

    pub(crate) fn get_at(&mut self, key: &str, now: Instant) -> Option<T> {
        let Some(entry) = self.entries.get(key) else {
            self.stats.record_miss();
            return None;
        };

        if entry.is_expired(self.ttl, now) {
            self.entries.remove(key);
            self.lru.remove(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            debug!(key, "cache entry expired on read");
            return None;
        }

        let value = entry.value.clone();
        self.stats.record_hit();
        self.lru.touch(key);
        Some(value)
    }

    // == Set ==
    /// Stores or overwrites `key` with a fresh timestamp.
    pub fn set(&mut self, key: impl Into<String>, value: T) {
        self.set_at(key.into(), value, Instant::now());
    }

    pub(crate) fn set_at(&mut self, key: String, value: T, now: Instant) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            if let Some(evicted) = self.lru.evict_oldest() {
                self.entries.remove(&evicted);
                self.stats.record_eviction();
                debug!(key = %evicted, "cache at capacity, evicted least recently used");
            }
        }

        self.lru.touch(&key);
        self.entries.insert(key, CacheEntry::new(value, now));
    }

    // == Should Refresh ==
    /// True when `get` would return nothing right now.
    pub fn should_refresh(&self, key: &str) -> bool {
        self.should_refresh_at(key, Instant::now())
    }

    pub(crate) fn should_refresh_at(&self, key: &str, now: Instant) -> bool {
        self.entries
            .get(key)
            .map_or(true, |entry| entry.is_expired(self.ttl, now))
    }

    // == Remove ==
    /// Invalidates a single key. Returns whether anything was stored under it.
    pub fn remove(&mut self, key: &str) -> bool {
        self.lru.remove(key);
        self.entries.remove(key).is_some()
    }

    // == Clear ==
    /// Drops every entry. Statistics are kept.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.lru.clear();
        removed
    }

    // == Reset ==
    /// Drops every entry and zeroes the statistics.
    pub fn reset(&mut self) {
        self.clear();
        self.stats = CacheStats::new();
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, returning how many were dropped.
    pub fn cleanup_expired(&mut self) -> usize {
        self.cleanup_expired_at(Instant::now())
    }

    pub(crate) fn cleanup_expired_at(&mut self, now: Instant) -> usize {
        let ttl = self.ttl;
        let lru = &mut self.lru;
        let before = self.entries.len();

        self.entries.retain(|key, entry| {
            let keep = !entry.is_expired(ttl, now);
            if !keep {
                lru.remove(key);
            }
            keep
        });

        let removed = before - self.entries.len();
        self.stats.record_expirations(removed);
        removed
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.entries.len(),
            ..self.stats.clone()
        }
    }

    /// Remaining lifetime of `key`, if it is stored and fresh.
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired(self.ttl, now))
            .map(|entry| entry.ttl_remaining(self.ttl, now))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
