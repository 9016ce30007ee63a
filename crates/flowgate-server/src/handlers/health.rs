//! Liveness probe.

use axum::Json;
use chrono::{SecondsFormat, Utc};

use crate::schema::health::HealthResponse;

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
