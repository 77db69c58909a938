//! Admission decisions and wait policies.

use std::time::Duration;

use serde::Serialize;

// == Wait Policy ==
/// How a blocked caller waits for capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitPolicy {
    /// Sleep exactly until the oldest request leaves the window.
    #[default]
    Precise,
    /// Sleep a fixed poll interval and re-check.
    Poll,
}

impl WaitPolicy {
    /// Picks the next sleep. Falls back to polling when no precise
    /// retry time is known or it rounds down to nothing.
    pub fn next_delay(self, retry_after: Option<Duration>, poll_interval: Duration) -> Duration {
        match (self, retry_after) {
            (WaitPolicy::Precise, Some(delay)) if !delay.is_zero() => delay,
            _ => poll_interval,
        }
    }
}

// == Admission ==
/// Outcome of an atomic check-and-record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The request was counted against the window.
    Granted,
    /// No capacity. `retry_after` is the precise wait, when known.
    Throttled { retry_after: Option<Duration> },
}

impl Admission {
    pub fn is_granted(&self) -> bool {
        matches!(self, Admission::Granted)
    }
}
