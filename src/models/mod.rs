//! Models Module
//!
//! Request and response DTOs for the admin API.

mod requests;
mod responses;

pub use requests::{SetRequest, MAX_KEY_LENGTH};
pub use responses::{
    AdmitResponse, ClearResponse, GetResponse, HealthResponse, KeyResponse, LimitSettings,
    StatsResponse,
};
