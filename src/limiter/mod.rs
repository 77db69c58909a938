//! Limiter Module
//!
//! Sliding-window rate limiting for outbound API calls, scoped per identity.

mod policy;
mod rate_limiter;
mod stats;
mod window;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use policy::{Admission, WaitPolicy};
pub use rate_limiter::{RateLimiter, WindowStatus, DEFAULT_IDENTITY};
pub use stats::LimiterStats;
pub(crate) use window::RateWindow;
