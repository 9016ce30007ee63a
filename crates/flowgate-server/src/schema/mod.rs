//! API schema types for request/response definitions.
//!
//! Each sub-module defines the request and response types for one route
//! group. Types use serde derives for JSON serialization/deserialization.

pub mod auth;
pub mod data;
pub mod health;

use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Parses a JSON request body. An empty body reads as `T::default()`, so
/// clients may omit it on routes whose fields are all optional.
pub fn parse_body<T>(bytes: &[u8]) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(bytes)
        .map_err(|err| ApiError::BadRequest(format!("invalid request body: {}", err)))
}
