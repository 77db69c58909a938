//! API Routes
//!
//! Configures the Axum router with all admin endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    admit_handler, clear_handler, get_handler, health_handler, invalidate_handler,
    limit_status_handler, reset_handler, set_handler, stats_handler, AppState,
};

/// Creates the admin router.
///
/// # Endpoints
/// - `PUT /cache` - Seed a cache entry
/// - `DELETE /cache` - Clear the cache
/// - `GET /cache/:key` - Read a fresh cache entry
/// - `DELETE /cache/:key` - Invalidate one key
/// - `GET /limits/:identity` - Inspect a rate window
/// - `POST /limits/:identity/admit` - Fail-fast admission
/// - `POST /reset` - Reset cache and rate windows
/// - `GET /stats` - Cache and limiter statistics
/// - `GET /health` - Health check endpoint
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/cache", put(set_handler).delete(clear_handler))
        .route("/cache/:key", get(get_handler).delete(invalidate_handler))
        .route("/limits/:identity", get(limit_status_handler))
        .route("/limits/:identity/admit", post(admit_handler))
        .route("/reset", post(reset_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
