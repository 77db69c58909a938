//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// Represents a single cached value and the instant it was stored.
///
/// The TTL is owned by the cache, not the entry, so every entry in one
/// cache expires after the same duration.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The stored value
    pub value: T,
    /// Insertion instant (monotonic)
    pub stored_at: Instant,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new cache entry stamped with `now`.
    pub fn new(value: T, now: Instant) -> Self {
        Self {
            value,
            stored_at: now,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has outlived `ttl` at instant `now`.
    ///
    /// Boundary condition: an entry is still valid when exactly `ttl` has
    /// elapsed and becomes expired strictly after that.
    pub fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) > ttl
    }

    // == Time To Live ==
    /// Returns the remaining lifetime at `now`, zero once expired.
    pub fn ttl_remaining(&self, ttl: Duration, now: Instant) -> Duration {
        ttl.saturating_sub(now.saturating_duration_since(self.stored_at))
    }
}

/// Builds a namespaced cache key in the `{kind}_{id}` convention.
pub fn cache_key(kind: &str, id: &str) -> String {
    format!("{}_{}", kind, id)
}
