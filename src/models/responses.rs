//! Response DTOs for the admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;
use crate::gate::GateStats;
use crate::limiter::{LimiterStats, WaitPolicy, WindowStatus};

/// Response body for GET /cache/:key
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub key: String,
    pub value: Value,
    /// Milliseconds until the entry expires
    pub ttl_remaining_ms: Option<u64>,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, value: Value, ttl_remaining: Option<Duration>) -> Self {
        Self {
            key: key.into(),
            value,
            ttl_remaining_ms: ttl_remaining.map(|d| d.as_millis() as u64),
        }
    }
}

/// Response body for single-key mutations (PUT /cache, DELETE /cache/:key)
#[derive(Debug, Clone, Serialize)]
pub struct KeyResponse {
    /// Success message
    pub message: String,
    pub key: String,
}

impl KeyResponse {
    pub fn stored(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' cached successfully", key),
            key,
        }
    }

    pub fn invalidated(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' invalidated successfully", key),
            key,
        }
    }
}

/// Response body for DELETE /cache and POST /reset
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
    /// Cache entries dropped
    pub removed: usize,
}

impl ClearResponse {
    pub fn new(message: impl Into<String>, removed: usize) -> Self {
        Self {
            message: message.into(),
            removed,
        }
    }
}

/// Response body for GET /stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub cache: CacheStats,
    pub limiter: LimiterStats,
    /// Cache hits / (hits + misses)
    pub hit_rate: f64,
    /// Throttled / (granted + throttled)
    pub throttle_rate: f64,
    pub cache_ttl_ms: u64,
    pub rate_window_ms: u64,
    pub max_requests_per_window: usize,
    pub wait_policy: WaitPolicy,
}

impl StatsResponse {
    pub fn new(stats: GateStats, limits: &LimitSettings) -> Self {
        Self {
            hit_rate: stats.cache.hit_rate(),
            throttle_rate: stats.limiter.throttle_rate(),
            cache: stats.cache,
            limiter: stats.limiter,
            cache_ttl_ms: limits.cache_ttl_ms,
            rate_window_ms: limits.rate_window_ms,
            max_requests_per_window: limits.max_requests_per_window,
            wait_policy: limits.wait_policy,
        }
    }
}

/// Static settings echoed back by the stats endpoint.
#[derive(Debug, Clone, Copy)]
pub struct LimitSettings {
    pub cache_ttl_ms: u64,
    pub rate_window_ms: u64,
    pub max_requests_per_window: usize,
    pub wait_policy: WaitPolicy,
}

/// Response body for POST /limits/:identity/admit
#[derive(Debug, Clone, Serialize)]
pub struct AdmitResponse {
    pub identity: String,
    pub granted: bool,
    /// Slots left in the window after this admission
    pub remaining: usize,
}

impl AdmitResponse {
    pub fn granted(status: WindowStatus) -> Self {
        Self {
            identity: status.identity,
            granted: true,
            remaining: status.remaining,
        }
    }
}

/// Response body for GET /health
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
