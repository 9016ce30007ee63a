//! Schema types for the health probe.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// RFC 3339 UTC time the response was produced.
    pub timestamp: String,
}
