//! Limiter Statistics Module
//!
//! Throttling counters, so blocking waits stay observable.

use serde::Serialize;

// == Limiter Stats ==
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LimiterStats {
    /// Requests admitted through `try_admit`
    pub granted: u64,
    /// Admission attempts refused for lack of capacity
    pub throttled: u64,
    /// Requests appended through the split `record_request` call
    pub recorded: u64,
    /// Identities swept for inactivity
    pub idle_evictions: u64,
    /// Identities currently holding a window
    pub tracked_identities: usize,
}

impl LimiterStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of admission attempts that were refused.
    pub fn throttle_rate(&self) -> f64 {
        let total = self.granted + self.throttled;
        if total == 0 {
            0.0
        } else {
            self.throttled as f64 / total as f64
        }
    }
}
