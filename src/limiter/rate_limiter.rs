//! Rate Limiter Module
//!
//! Sliding-window admission control keyed by caller identity.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::{GateError, Result};
use crate::limiter::{Admission, LimiterStats, RateWindow, WaitPolicy};

/// Identity used by call sites that do not scope their limit.
pub const DEFAULT_IDENTITY: &str = "global";

fn resolve(identity: Option<&str>) -> &str {
    identity.unwrap_or(DEFAULT_IDENTITY)
}

// == Window Status ==
/// Snapshot of one identity's window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowStatus {
    pub identity: String,
    pub in_window: usize,
    pub max_requests: usize,
    pub remaining: usize,
    /// Milliseconds until the next slot frees, absent while capacity remains
    pub retry_after_ms: Option<u64>,
}

// == Rate Limiter ==
/// Sliding-window limiter allowing `max_requests` per `window` per identity.
///
/// Windows are created on first record and swept by
/// [`RateLimiter::cleanup_idle`] once empty and idle for `idle_windows`
/// window lengths.
#[derive(Debug)]
pub struct RateLimiter {
    windows: HashMap<String, RateWindow>,
    max_requests: usize,
    window: Duration,
    policy: WaitPolicy,
    poll_interval: Duration,
    idle_windows: u32,
    stats: LimiterStats,
}

impl RateLimiter {
    // == Constructor ==
    /// Creates a limiter with the precise wait policy and a one second poll
    /// fallback.
    ///
    /// Fails when `max_requests` or `window` is zero, since such a limiter
    /// would either never admit or never limit.
    pub fn new(max_requests: usize, window: Duration) -> Result<Self> {
        if max_requests == 0 {
            return Err(GateError::InvalidConfig(
                "max requests per window must be greater than zero".to_string(),
            ));
        }
        if window.is_zero() {
            return Err(GateError::InvalidConfig(
                "rate window must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            windows: HashMap::new(),
            max_requests,
            window,
            policy: WaitPolicy::Precise,
            poll_interval: Duration::from_secs(1),
            idle_windows: 10,
            stats: LimiterStats::new(),
        })
    }

    /// Sets how blocked callers wait.
    ///
    /// A zero `poll_interval` is rejected: a poll wait would spin on it.
    pub fn with_policy(mut self, policy: WaitPolicy, poll_interval: Duration) -> Result<Self> {
        if poll_interval.is_zero() {
            return Err(GateError::InvalidConfig(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        self.policy = policy;
        self.poll_interval = poll_interval;
        Ok(self)
    }

    /// Sets how many window lengths an empty window may sit unused before
    /// it is swept. Must be at least one.
    pub fn with_idle_windows(mut self, idle_windows: u32) -> Result<Self> {
        if idle_windows == 0 {
            return Err(GateError::InvalidConfig(
                "idle windows must be greater than zero".to_string(),
            ));
        }
        self.idle_windows = idle_windows;
        Ok(self)
    }

    // == Can Make Request ==
    /// Prunes the identity's window and reports whether one more request fits.
    ///
    /// Pair with [`RateLimiter::record_request`] only when no other task can
    /// interleave; otherwise use [`RateLimiter::try_admit`].
    pub fn can_make_request(&mut self, identity: Option<&str>) -> bool {
        self.can_make_request_at(identity, Instant::now())
    }

    pub(crate) fn can_make_request_at(&mut self, identity: Option<&str>, now: Instant) -> bool {
        let window = self.window;
        match self.windows.get_mut(resolve(identity)) {
            Some(state) => {
                state.prune(window, now);
                state.touch(now);
                state.len() < self.max_requests
            }
            None => true,
        }
    }

    // == Record Request ==
    /// Counts a request issued now, without checking admission.
    pub fn record_request(&mut self, identity: Option<&str>) {
        self.record_request_at(identity, Instant::now());
    }

    pub(crate) fn record_request_at(&mut self, identity: Option<&str>, now: Instant) {
        self.window_mut(resolve(identity), now).record(now);
        self.stats.recorded += 1;
    }

    // == Try Admit ==
    /// Prunes, checks and records in one step.
    pub fn try_admit(&mut self, identity: Option<&str>) -> Admission {
        self.try_admit_at(identity, Instant::now())
    }

    pub(crate) fn try_admit_at(&mut self, identity: Option<&str>, now: Instant) -> Admission {
        let identity = resolve(identity);
        let (window, max_requests) = (self.window, self.max_requests);
        let state = self.window_mut(identity, now);

        state.prune(window, now);
        state.touch(now);

        if state.len() < max_requests {
            state.record(now);
            self.stats.granted += 1;
            Admission::Granted
        } else {
            let retry_after = state.retry_after(window, now);
            self.stats.throttled += 1;
            debug!(identity, ?retry_after, "request throttled");
            Admission::Throttled { retry_after }
        }
    }

    /// Like [`RateLimiter::try_admit`], also returning the window as left by
    /// the decision. Both come from the same critical section.
    pub fn try_admit_with_status(&mut self, identity: Option<&str>) -> (Admission, WindowStatus) {
        self.try_admit_with_status_at(identity, Instant::now())
    }

    pub(crate) fn try_admit_with_status_at(
        &mut self,
        identity: Option<&str>,
        now: Instant,
    ) -> (Admission, WindowStatus) {
        let admission = self.try_admit_at(identity, now);
        (admission, self.status_at(identity, now))
    }

    // == Retry After ==
    /// Precise time until the identity can be admitted, `None` if it can now.
    pub fn retry_after(&mut self, identity: Option<&str>) -> Option<Duration> {
        self.retry_after_at(identity, Instant::now())
    }

    pub(crate) fn retry_after_at(&mut self, identity: Option<&str>, now: Instant) -> Option<Duration> {
        if self.can_make_request_at(identity, now) {
            return None;
        }
        self.windows
            .get(resolve(identity))
            .and_then(|state| state.retry_after(self.window, now))
    }

    // == Status ==
    pub fn status(&mut self, identity: Option<&str>) -> WindowStatus {
        self.status_at(identity, Instant::now())
    }

    pub(crate) fn status_at(&mut self, identity: Option<&str>, now: Instant) -> WindowStatus {
        let retry_after = self.retry_after_at(identity, now);
        let in_window = self
            .windows
            .get(resolve(identity))
            .map_or(0, RateWindow::len);

        WindowStatus {
            identity: resolve(identity).to_string(),
            in_window,
            max_requests: self.max_requests,
            remaining: self.max_requests.saturating_sub(in_window),
            retry_after_ms: retry_after.map(|d| d.as_millis() as u64),
        }
    }

    // == Cleanup Idle ==
    /// Forgets identities whose window is empty and that have not been
    /// queried for `idle_windows` window lengths.
    pub fn cleanup_idle(&mut self) -> usize {
        self.cleanup_idle_at(Instant::now())
    }

    pub(crate) fn cleanup_idle_at(&mut self, now: Instant) -> usize {
        let window = self.window;
        let idle = window.saturating_mul(self.idle_windows);
        let before = self.windows.len();

        self.windows.retain(|_, state| {
            state.prune(window, now);
            !(state.is_empty() && state.is_idle(idle, now))
        });

        let removed = before - self.windows.len();
        self.stats.idle_evictions += removed as u64;
        removed
    }

    // == Reset ==
    /// Drops every window and zeroes the statistics.
    pub fn reset(&mut self) {
        let dropped = self.windows.len();
        self.windows.clear();
        self.stats = LimiterStats::new();
        info!(dropped, "rate limiter reset");
    }

    /// Sleep a blocked caller should take before retrying.
    pub fn next_delay(&self, retry_after: Option<Duration>) -> Duration {
        self.policy.next_delay(retry_after, self.poll_interval)
    }

    pub fn stats(&self) -> LimiterStats {
        LimiterStats {
            tracked_identities: self.windows.len(),
            ..self.stats.clone()
        }
    }

    fn window_mut(&mut self, identity: &str, now: Instant) -> &mut RateWindow {
        self.windows
            .entry(identity.to_string())
            .or_insert_with(|| RateWindow::new(now))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);

    fn limiter(max: usize) -> RateLimiter {
        RateLimiter::new(max, WINDOW).unwrap()
    }

    fn identities(limiter: &RateLimiter) -> Vec<String> {
        let mut identities: Vec<String> = limiter.windows.keys().cloned().collect();
        identities.sort();
        identities
    }

    #[test]
    fn test_rejects_zero_configuration() {
        assert!(matches!(
            RateLimiter::new(0, WINDOW),
            Err(GateError::InvalidConfig(_))
        ));
        assert!(matches!(
            RateLimiter::new(5, Duration::ZERO),
            Err(GateError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_admission_boundary() {
        let mut limiter = limiter(3);
        let start = Instant::now();

        for i in 0..3 {
            assert!(limiter.can_make_request_at(Some("sheets"), start));
            limiter.record_request_at(Some("sheets"), start + Duration::from_secs(i));
        }
        assert!(!limiter.can_make_request_at(Some("sheets"), start + Duration::from_secs(5)));

        // Oldest leaves the window, no new record needed
        assert!(limiter.can_make_request_at(Some("sheets"), start + WINDOW));
    }

    #[test]
    fn test_default_identity() {
        let mut limiter = limiter(1);
        let now = Instant::now();

        limiter.record_request_at(None, now);

        assert!(!limiter.can_make_request_at(Some(DEFAULT_IDENTITY), now));
        assert_eq!(identities(&limiter), vec![DEFAULT_IDENTITY.to_string()]);
    }

    #[test]
    fn test_independent_identities() {
        let mut limiter = limiter(2);
        let now = Instant::now();

        limiter.record_request_at(Some("a"), now);
        limiter.record_request_at(Some("a"), now);

        assert!(!limiter.can_make_request_at(Some("a"), now));
        assert!(limiter.can_make_request_at(Some("b"), now));
    }

    #[test]
    fn test_try_admit_records_and_throttles() {
        let mut limiter = limiter(2);
        let start = Instant::now();

        assert_eq!(limiter.try_admit_at(Some("bot"), start), Admission::Granted);
        assert_eq!(
            limiter.try_admit_at(Some("bot"), start + Duration::from_secs(20)),
            Admission::Granted
        );

        let third = limiter.try_admit_at(Some("bot"), start + Duration::from_secs(45));
        assert_eq!(
            third,
            Admission::Throttled {
                retry_after: Some(Duration::from_secs(15))
            }
        );

        let stats = limiter.stats();
        assert_eq!(stats.granted, 2);
        assert_eq!(stats.throttled, 1);
        assert_eq!(stats.tracked_identities, 1);
    }

    #[test]
    fn test_retry_after_none_when_admissible() {
        let mut limiter = limiter(1);
        let now = Instant::now();

        assert_eq!(limiter.retry_after_at(Some("x"), now), None);
        limiter.record_request_at(Some("x"), now);
        assert_eq!(
            limiter.retry_after_at(Some("x"), now + Duration::from_secs(10)),
            Some(Duration::from_secs(50))
        );
    }

    #[test]
    fn test_status_snapshot() {
        let mut limiter = limiter(5);
        let now = Instant::now();
        limiter.record_request_at(Some("geo"), now);
        limiter.record_request_at(Some("geo"), now);

        let status = limiter.status_at(Some("geo"), now);
        assert_eq!(status.in_window, 2);
        assert_eq!(status.remaining, 3);
        assert_eq!(status.retry_after_ms, None);

        let unknown = limiter.status_at(Some("nobody"), now);
        assert_eq!(unknown.in_window, 0);
        assert_eq!(unknown.remaining, 5);
    }

    #[test]
    fn test_cleanup_idle_keeps_active_windows() {
        let mut limiter = limiter(5).with_idle_windows(2).unwrap();
        let start = Instant::now();

        limiter.record_request_at(Some("stale"), start);
        limiter.record_request_at(Some("active"), start + WINDOW * 3);

        let removed = limiter.cleanup_idle_at(start + WINDOW * 3);
        assert_eq!(removed, 1);
        assert_eq!(identities(&limiter), vec!["active".to_string()]);
        assert_eq!(limiter.stats().idle_evictions, 1);
    }

    #[test]
    fn test_reset_forgets_everything() {
        let mut limiter = limiter(1);
        let now = Instant::now();
        limiter.try_admit_at(Some("a"), now);

        limiter.reset();

        assert!(limiter.can_make_request_at(Some("a"), now));
        assert_eq!(limiter.stats(), LimiterStats::default());
    }

    #[test]
    fn test_rejects_zero_poll_interval_and_idle_windows() {
        assert!(matches!(
            limiter(1).with_policy(WaitPolicy::Poll, Duration::ZERO),
            Err(GateError::InvalidConfig(_))
        ));
        assert!(matches!(
            limiter(1).with_idle_windows(0),
            Err(GateError::InvalidConfig(_))
        ));

        let limiter = limiter(1)
            .with_policy(WaitPolicy::Poll, Duration::from_millis(250))
            .unwrap();
        assert_eq!(limiter.next_delay(None), Duration::from_millis(250));
    }

    #[test]
    fn test_admit_with_status_reflects_decision() {
        let mut limiter = limiter(2);
        let start = Instant::now();

        let (first, status) = limiter.try_admit_with_status_at(Some("bot"), start);
        assert_eq!(first, Admission::Granted);
        assert_eq!(status.in_window, 1);
        assert_eq!(status.remaining, 1);
        assert_eq!(status.retry_after_ms, None);

        limiter.try_admit_at(Some("bot"), start);
        let later = start + Duration::from_secs(20);
        let (third, status) = limiter.try_admit_with_status_at(Some("bot"), later);
        assert_eq!(
            third,
            Admission::Throttled {
                retry_after: Some(Duration::from_secs(40))
            }
        );
        assert_eq!(status.remaining, 0);
        assert_eq!(status.retry_after_ms, Some(40_000));
        assert_eq!(limiter.stats().granted, 2);
    }
}
