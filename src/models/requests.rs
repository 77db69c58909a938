//! Request DTOs for the admin API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

/// Maximum accepted cache key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Request body for PUT /cache
///
/// Stores an arbitrary JSON payload, typically a response from an
/// external API that an operator wants to pre-seed.
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key, `{kind}_{id}` by convention
    pub key: String,
    /// The payload to cache
    pub value: Value,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.trim().is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            ));
        }
        None
    }
}
