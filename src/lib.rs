//! SincroGoo Gate - cache and rate-limit gating for outbound API calls
//!
//! Wraps calls to spreadsheet, slides, geocoding and messaging providers
//! with a TTL cache and a per-identity sliding-window rate limiter.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod gate;
pub mod limiter;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::TtlCache;
pub use config::Config;
pub use error::{GateError, Result};
pub use gate::{ApiGate, GateStats, SweepReport};
pub use limiter::{Admission, RateLimiter, WaitPolicy, DEFAULT_IDENTITY};
pub use tasks::spawn_sweep_task;
