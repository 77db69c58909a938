//! Cache Module
//!
//! In-memory TTL caching for idempotent lookups against external APIs.

mod entry;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use entry::{cache_key, CacheEntry};
pub(crate) use lru::LruTracker;
pub use stats::CacheStats;
pub use store::TtlCache;
