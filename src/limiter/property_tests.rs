//! Property-Based Tests for Limiter Module
//!
//! Drives the limiter with explicit instants and checks the sliding-window
//! guarantees against arbitrary request schedules.

use proptest::prelude::*;
use std::time::Duration;
use tokio::time::Instant;

use crate::limiter::{Admission, RateLimiter};

const WINDOW_MS: u64 = 1_000;

fn limiter(max: usize) -> RateLimiter {
    RateLimiter::new(max, Duration::from_millis(WINDOW_MS)).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // No WINDOW-length interval ever contains more than MAX admissions.
    #[test]
    fn prop_no_window_exceeds_max(
        max in 1..8usize,
        gaps in prop::collection::vec(0..400u64, 1..120),
    ) {
        let mut limiter = limiter(max);
        let start = Instant::now();
        let mut offset = 0u64;
        let mut admitted: Vec<u64> = Vec::new();

        for gap in gaps {
            offset += gap;
            let now = start + Duration::from_millis(offset);
            if limiter.try_admit_at(Some("id"), now) == Admission::Granted {
                admitted.push(offset);
            }
        }

        for (i, &first) in admitted.iter().enumerate() {
            let in_window = admitted[i..]
                .iter()
                .take_while(|&&t| t < first + WINDOW_MS)
                .count();
            prop_assert!(in_window <= max, "{} admissions within one window", in_window);
        }
    }

    // A burst at the end of one fixed bucket and the start of the next is not
    // admitted twice over.
    #[test]
    fn prop_no_double_burst_at_boundary(max in 1..20usize, edge_ms in 1..100u64) {
        let mut limiter = limiter(max);
        let start = Instant::now();
        let late = start + Duration::from_millis(WINDOW_MS - edge_ms);
        let early_next = start + Duration::from_millis(WINDOW_MS + edge_ms / 2);

        let first_burst = (0..max)
            .filter(|_| limiter.try_admit_at(None, late).is_granted())
            .count();
        let second_burst = (0..max)
            .filter(|_| limiter.try_admit_at(None, early_next).is_granted())
            .count();

        prop_assert_eq!(first_burst, max);
        prop_assert_eq!(second_burst, 0);
    }

    // Filling one identity never affects another.
    #[test]
    fn prop_independent_identities(max in 1..30usize) {
        let mut limiter = limiter(max);
        let now = Instant::now();

        for _ in 0..max {
            limiter.record_request_at(Some("a"), now);
        }

        prop_assert!(!limiter.can_make_request_at(Some("a"), now));
        prop_assert!(limiter.can_make_request_at(Some("b"), now));
    }

    // Capacity comes back purely by the passage of time.
    #[test]
    fn prop_capacity_recovers_after_window(max in 1..30usize, spread in 0..WINDOW_MS) {
        let mut limiter = limiter(max);
        let start = Instant::now();

        for i in 0..max {
            let offset = spread * i as u64 / max as u64;
            limiter.record_request_at(Some("id"), start + Duration::from_millis(offset));
        }
        prop_assert!(!limiter.can_make_request_at(Some("id"), start + Duration::from_millis(spread)));

        let oldest_out = start + Duration::from_millis(WINDOW_MS);
        prop_assert!(limiter.can_make_request_at(Some("id"), oldest_out));
    }
}
