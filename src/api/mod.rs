//! API Module
//!
//! Admin HTTP surface for inspecting and resetting the gate.
//!
//! # Endpoints
//! - `PUT /cache`, `DELETE /cache` - Seed or clear the cache
//! - `GET /cache/:key`, `DELETE /cache/:key` - Read or invalidate one key
//! - `GET /limits/:identity` - Rate window status
//! - `POST /limits/:identity/admit` - Fail-fast admission
//! - `POST /reset` - Reset everything
//! - `GET /stats` - Statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
