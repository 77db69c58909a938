//! Configuration Module
//!
//! Handles loading and validating gate configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{GateError, Result};
use crate::limiter::WaitPolicy;

/// Gate configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
/// Durations are kept in milliseconds to match the environment surface.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache time-to-live in milliseconds
    pub cache_ttl_ms: u64,
    /// Maximum number of cached entries before LRU eviction
    pub cache_max_entries: usize,
    /// Sliding window length in milliseconds
    pub rate_window_ms: u64,
    /// Admissions allowed per identity per window
    pub max_requests_per_window: usize,
    /// Poll wait increment in milliseconds
    pub poll_interval_ms: u64,
    /// Wait policy name, `precise` or `poll`
    pub wait_policy: String,
    /// Windows of inactivity after which an identity is forgotten
    pub idle_windows: u32,
    /// Background sweep interval in milliseconds
    pub cleanup_interval_ms: u64,
    /// Admin HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// Missing or unparsable values fall back to the defaults. Call
    /// [`Config::validate`] before using the result.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL_MS` - Cache TTL (default: 300000)
    /// - `CACHE_MAX_ENTRIES` - Cache capacity (default: 10000)
    /// - `RATE_WINDOW_MS` - Sliding window length (default: 60000)
    /// - `MAX_REQUESTS_PER_WINDOW` - Admissions per window (default: 60)
    /// - `POLL_INTERVAL_MS` - Poll wait increment (default: 1000)
    /// - `WAIT_POLICY` - `precise` or `poll` (default: precise)
    /// - `IDLE_WINDOWS` - Idle windows before identity eviction (default: 10)
    /// - `CLEANUP_INTERVAL_MS` - Sweep frequency (default: 30000)
    /// - `SERVER_PORT` - Admin HTTP port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_ttl_ms: parse_var("CACHE_TTL_MS").unwrap_or(defaults.cache_ttl_ms),
            cache_max_entries: parse_var("CACHE_MAX_ENTRIES")
                .unwrap_or(defaults.cache_max_entries),
            rate_window_ms: parse_var("RATE_WINDOW_MS").unwrap_or(defaults.rate_window_ms),
            max_requests_per_window: parse_var("MAX_REQUESTS_PER_WINDOW")
                .unwrap_or(defaults.max_requests_per_window),
            poll_interval_ms: parse_var("POLL_INTERVAL_MS").unwrap_or(defaults.poll_interval_ms),
            wait_policy: env::var("WAIT_POLICY").unwrap_or(defaults.wait_policy),
            idle_windows: parse_var("IDLE_WINDOWS").unwrap_or(defaults.idle_windows),
            cleanup_interval_ms: parse_var("CLEANUP_INTERVAL_MS")
                .unwrap_or(defaults.cleanup_interval_ms),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }

    // == Validate ==
    /// Rejects values that would make the gate silently misbehave
    /// (never admitting, never expiring, spinning on zero-length sleeps).
    pub fn validate(&self) -> Result<()> {
        let zero_checks = [
            ("CACHE_TTL_MS", self.cache_ttl_ms == 0),
            ("CACHE_MAX_ENTRIES", self.cache_max_entries == 0),
            ("RATE_WINDOW_MS", self.rate_window_ms == 0),
            ("MAX_REQUESTS_PER_WINDOW", self.max_requests_per_window == 0),
            ("POLL_INTERVAL_MS", self.poll_interval_ms == 0),
            ("IDLE_WINDOWS", self.idle_windows == 0),
            ("CLEANUP_INTERVAL_MS", self.cleanup_interval_ms == 0),
        ];

        if let Some((name, _)) = zero_checks.iter().find(|(_, is_zero)| *is_zero) {
            return Err(GateError::InvalidConfig(format!(
                "{} must be greater than zero",
                name
            )));
        }

        self.wait_policy()?;
        Ok(())
    }

    // == Accessors ==
    /// Cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    /// Sliding window length as a Duration.
    pub fn rate_window(&self) -> Duration {
        Duration::from_millis(self.rate_window_ms)
    }

    /// Poll increment as a Duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Sweep period as a Duration.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.cleanup_interval_ms)
    }

    /// Parses the configured wait policy.
    pub fn wait_policy(&self) -> Result<WaitPolicy> {
        match self.wait_policy.trim().to_ascii_lowercase().as_str() {
            "precise" => Ok(WaitPolicy::Precise),
            "poll" => Ok(WaitPolicy::Poll),
            other => Err(GateError::InvalidConfig(format!(
                "WAIT_POLICY must be 'precise' or 'poll', got '{}'",
                other
            ))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_ttl_ms: 300_000,
            cache_max_entries: 10_000,
            rate_window_ms: 60_000,
            max_requests_per_window: 60,
            poll_interval_ms: 1_000,
            wait_policy: "precise".to_string(),
            idle_windows: 10,
            cleanup_interval_ms: 30_000,
            server_port: 3000,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
