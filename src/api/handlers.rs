//! API Handlers
//!
//! HTTP request handlers for the gate's admin endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::config::Config;
use crate::error::{GateError, Result};
use crate::gate::ApiGate;
use crate::limiter::{Admission, WindowStatus};
use crate::models::{
    AdmitResponse, ClearResponse, GetResponse, HealthResponse, KeyResponse, LimitSettings,
    SetRequest, StatsResponse,
};

/// Application state shared across all handlers.
///
/// The gate caches raw JSON payloads so any external API response can be
/// inspected or seeded over HTTP.
#[derive(Clone)]
pub struct AppState {
    pub gate: ApiGate<Value>,
    pub limits: LimitSettings,
}

impl AppState {
    pub fn new(gate: ApiGate<Value>, limits: LimitSettings) -> Self {
        Self { gate, limits }
    }

    /// Creates a new AppState from configuration, failing on invalid values.
    pub fn from_config(config: &Config) -> Result<Self> {
        let gate = ApiGate::from_config(config)?;
        let limits = LimitSettings {
            cache_ttl_ms: config.cache_ttl_ms,
            rate_window_ms: config.rate_window_ms,
            max_requests_per_window: config.max_requests_per_window,
            wait_policy: config.wait_policy()?,
        };
        Ok(Self::new(gate, limits))
    }
}

/// Handler for PUT /cache
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<KeyResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(GateError::InvalidRequest(error_msg));
    }

    state.gate.store(req.key.clone(), req.value).await;
    Ok(Json(KeyResponse::stored(req.key)))
}

/// Handler for GET /cache/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let value = state
        .gate
        .get_cached(&key)
        .await
        .ok_or_else(|| GateError::NotFound(key.clone()))?;
    let ttl_remaining = state.gate.ttl_remaining(&key).await;

    Ok(Json(GetResponse::new(key, value, ttl_remaining)))
}

/// Handler for DELETE /cache/:key
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<KeyResponse>> {
    if !state.gate.invalidate(&key).await {
        return Err(GateError::NotFound(key));
    }
    Ok(Json(KeyResponse::invalidated(key)))
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let removed = state.gate.clear_cache().await;
    Json(ClearResponse::new("Cache cleared", removed))
}

/// Handler for GET /limits/:identity
pub async fn limit_status_handler(
    State(state): State<AppState>,
    Path(identity): Path<String>,
) -> Json<WindowStatus> {
    Json(state.gate.window_status(Some(identity.as_str())).await)
}

/// Handler for POST /limits/:identity/admit
///
/// Fail-fast admission for callers that would rather back off themselves
/// than block. Answers 429 with the precise wait when throttled.
pub async fn admit_handler(
    State(state): State<AppState>,
    Path(identity): Path<String>,
) -> Result<Json<AdmitResponse>> {
    let (admission, status) = state.gate.admit(Some(identity.as_str())).await;
    match admission {
        Admission::Granted => Ok(Json(AdmitResponse::granted(status))),
        Admission::Throttled { retry_after } => Err(GateError::Throttled {
            identity,
            retry_after_ms: retry_after.map_or(0, |d| d.as_millis() as u64),
        }),
    }
}

/// Handler for POST /reset
pub async fn reset_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let removed = state.gate.stats().await.cache.total_entries;
    state.gate.reset().await;
    Json(ClearResponse::new("Cache and rate windows reset", removed))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.gate.stats().await;
    Json(StatsResponse::new(stats, &state.limits))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_state(max_requests: usize) -> AppState {
        let config = Config {
            max_requests_per_window: max_requests,
            ..Config::default()
        };
        AppState::from_config(&config).unwrap()
    }

    #[tokio::test]
    async fn test_set_and_get_handler() {
        let state = test_state(10);

        let req = SetRequest {
            key: "sheet_1".to_string(),
            value: json!({"title": "Budget"}),
        };
        assert!(set_handler(State(state.clone()), Json(req)).await.is_ok());

        let response = get_handler(State(state), Path("sheet_1".to_string()))
            .await
            .unwrap();
        assert_eq!(response.value, json!({"title": "Budget"}));
        let ttl_ms = response.ttl_remaining_ms.unwrap();
        assert!(ttl_ms > 0 && ttl_ms <= 300_000);
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let state = test_state(10);
        let result = get_handler(State(state), Path("nonexistent".to_string())).await;
        assert!(matches!(result, Err(GateError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_invalidate_handler() {
        let state = test_state(10);
        state.gate.store("slide_9", json!(9)).await;

        assert!(invalidate_handler(State(state.clone()), Path("slide_9".to_string()))
            .await
            .is_ok());
        let again = invalidate_handler(State(state), Path("slide_9".to_string())).await;
        assert!(matches!(again, Err(GateError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_admit_handler_throttles() {
        let state = test_state(1);

        let first = admit_handler(State(state.clone()), Path("bot".to_string()))
            .await
            .unwrap();
        assert!(first.granted);
        assert_eq!(first.remaining, 0);

        let second = admit_handler(State(state.clone()), Path("bot".to_string())).await;
        match second {
            Err(GateError::Throttled {
                identity,
                retry_after_ms,
            }) => {
                assert_eq!(identity, "bot");
                assert!(retry_after_ms > 0 && retry_after_ms <= 60_000);
            }
            other => panic!("expected throttled, got {:?}", other.map(|r| r.0)),
        }

        let stats = state.gate.stats().await.limiter;
        assert_eq!((stats.granted, stats.throttled), (1, 1));
    }

    #[tokio::test]
    async fn test_reset_handler() {
        let state = test_state(10);
        state.gate.store("a", json!(1)).await;
        state.gate.record_request(Some("x")).await;

        let response = reset_handler(State(state.clone())).await;
        assert_eq!(response.removed, 1);

        let stats = state.gate.stats().await;
        assert_eq!(stats.cache.total_entries, 0);
        assert_eq!(stats.limiter.tracked_identities, 0);
    }

    #[tokio::test]
    async fn test_set_invalid_request() {
        let state = test_state(10);
        let req = SetRequest {
            key: "".to_string(),
            value: json!("v"),
        };
        let result = set_handler(State(state), Json(req)).await;
        assert!(matches!(result, Err(GateError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
