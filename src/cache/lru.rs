//! LRU Tracker Module
//!
//! Recency ordering used to cap the cache at a fixed number of entries.

use std::collections::{BTreeMap, HashMap};

// == LRU Tracker ==
/// Tracks access recency for capacity eviction.
///
/// Every touch stamps the key with a fresh, strictly increasing tick.
/// `by_tick` keeps ticks ordered so the least recently used key is the
/// first entry, making touch and eviction O(log n).
#[derive(Debug, Default)]
pub(crate) struct LruTracker {
    /// Latest tick per key
    ticks: HashMap<String, u64>,
    /// Keys ordered by the tick of their last touch
    by_tick: BTreeMap<u64, String>,
    /// Next tick to hand out
    next_tick: u64,
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as most recently used.
    pub fn touch(&mut self, key: &str) {
        let tick = self.next_tick;
        self.next_tick += 1;

        match self.ticks.get_mut(key) {
            Some(old) => {
                let owned = self.by_tick.remove(old).unwrap_or_else(|| key.to_string());
                *old = tick;
                self.by_tick.insert(tick, owned);
            }
            None => {
                self.ticks.insert(key.to_string(), tick);
                self.by_tick.insert(tick, key.to_string());
            }
        }
    }

    // == Remove ==
    /// Stops tracking a key. Unknown keys are ignored.
    pub fn remove(&mut self, key: &str) {
        if let Some(tick) = self.ticks.remove(key) {
            self.by_tick.remove(&tick);
        }
    }

    // == Evict Oldest ==
    /// Returns and forgets the least recently used key.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.by_tick.pop_first()?;
        self.ticks.remove(&key);
        Some(key)
    }

    /// Forgets every key.
    pub fn clear(&mut self) {
        self.ticks.clear();
        self.by_tick.clear();
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lru_new() {
        let mut lru = LruTracker::new();
        assert!(lru.ticks.is_empty());
        assert_eq!(lru.evict_oldest(), None);
    }

    #[test]
    fn test_touch_existing_key_moves_it_last() {
        let mut lru = LruTracker::new();
        lru.touch("sheet_1");
        lru.touch("sheet_2");
        lru.touch("sheet_3");

        lru.touch("sheet_1");

        assert_eq!(lru.ticks.len(), 3);
        assert_eq!(lru.by_tick.len(), 3, "stale tick dropped on re-touch");
        assert_eq!(lru.evict_oldest().as_deref(), Some("sheet_2"));
    }

    #[test]
    fn test_evict_in_recency_order() {
        let mut lru = LruTracker::new();
        for key in ["a", "b", "c"] {
            lru.touch(key);
        }
        lru.touch("a");
        lru.touch("c");
        lru.touch("b");

        assert_eq!(lru.evict_oldest().as_deref(), Some("a"));
        assert_eq!(lru.evict_oldest().as_deref(), Some("c"));
        assert_eq!(lru.evict_oldest().as_deref(), Some("b"));
        assert_eq!(lru.evict_oldest(), None);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut lru = LruTracker::new();
        lru.touch("k1");
        lru.touch("k2");

        lru.remove("k1");
        lru.remove("missing");
        assert_eq!(lru.evict_oldest().as_deref(), Some("k2"));
        assert_eq!(lru.evict_oldest(), None);

        lru.touch("k3");
        lru.clear();
        assert!(lru.ticks.is_empty() && lru.by_tick.is_empty());
        assert_eq!(lru.evict_oldest(), None);
    }

    #[test]
    fn test_repeated_touch_single_entry() {
        let mut lru = LruTracker::new();
        lru.touch("key1");
        lru.touch("key1");
        lru.touch("key1");

        assert_eq!(lru.ticks.len(), 1);
        assert_eq!(lru.evict_oldest().as_deref(), Some("key1"));
        assert_eq!(lru.evict_oldest(), None);
    }
}
