//! Cache Statistics Module
//!
//! Counters describing how effective the cache is at avoiding outbound calls.

use serde::Serialize;

// == Cache Stats ==
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Reads served from a fresh entry
    pub hits: u64,
    /// Reads that found nothing usable (absent or expired)
    pub misses: u64,
    /// Entries dropped because the cache was at capacity
    pub evictions: u64,
    /// Entries dropped because their TTL had elapsed
    pub expirations: u64,
    /// Current number of stored entries, expired ones included until swept
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 before any read.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(CacheStats::new().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_expirations_accumulate() {
        let mut stats = CacheStats::new();
        stats.record_expirations(3);
        stats.record_expirations(0);
        stats.record_expirations(2);
        stats.record_eviction();
        assert_eq!(stats.expirations, 5);
        assert_eq!(stats.evictions, 1);
    }
}
