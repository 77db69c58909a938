//! Rate Window Module
//!
//! Per-identity sliding window of request instants.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

// == Rate Window ==
/// Request instants issued by one identity, oldest first.
///
/// Instants only ever come from the monotonic clock and are appended at the
/// back, so the deque stays sorted and pruning only looks at the front.
#[derive(Debug, Clone)]
pub(crate) struct RateWindow {
    timestamps: VecDeque<Instant>,
    last_seen: Instant,
}

impl RateWindow {
    pub fn new(now: Instant) -> Self {
        Self {
            timestamps: VecDeque::new(),
            last_seen: now,
        }
    }

    // == Prune ==
    /// Drops instants that are `window` or more in the past.
    pub fn prune(&mut self, window: Duration, now: Instant) {
        while let Some(&oldest) = self.timestamps.front() {
            if now.saturating_duration_since(oldest) < window {
                break;
            }
            self.timestamps.pop_front();
        }
    }

    // == Record ==
    /// Appends `now`. A `now` earlier than the newest instant is clamped so
    /// the deque stays ordered.
    pub fn record(&mut self, now: Instant) {
        let stamp = match self.timestamps.back() {
            Some(&newest) if newest > now => newest,
            _ => now,
        };
        self.timestamps.push_back(stamp);
        self.touch(now);
    }

    /// Marks the window as queried at `now`.
    pub fn touch(&mut self, now: Instant) {
        if now > self.last_seen {
            self.last_seen = now;
        }
    }

    // == Retry After ==
    /// Time until the oldest instant leaves the window, zero if it already has.
    pub fn retry_after(&self, window: Duration, now: Instant) -> Option<Duration> {
        self.timestamps
            .front()
            .map(|&oldest| window.saturating_sub(now.saturating_duration_since(oldest)))
    }

    /// True once the window has gone unqueried for longer than `idle`.
    pub fn is_idle(&self, idle: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.last_seen) > idle
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}
