//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the unified error type for all API endpoints. It implements
//! `axum::response::IntoResponse` to produce structured JSON error responses
//! with appropriate HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use flowgate_warehouse::WarehouseError;

use crate::auth::AuthError;

/// Structured error detail in API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorDetail {
    /// Machine-readable error code (e.g., "UNAUTHORIZED", "QUERY_FAILED").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The identity provider is not configured (503).
    #[error("authentication not configured")]
    AuthNotConfigured,

    /// No usable token was presented (401).
    #[error("invalid token: {0}")]
    TokenInvalid(String),

    /// The token failed verification; the reason is returned as `details` (401).
    #[error("token rejected: {0}")]
    TokenRejected(String),

    /// No authenticated session accompanies the request (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The warehouse rejected or could not run a query (500).
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Invalid request (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Internal server error (500).
    #[error("internal error: {0}")]
    InternalError(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::AuthNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::TokenInvalid(_) | ApiError::TokenRejected(_) | ApiError::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::QueryFailed(_) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::AuthNotConfigured => "AUTH_NOT_CONFIGURED",
            ApiError::TokenInvalid(_) | ApiError::TokenRejected(_) => "TOKEN_INVALID",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::QueryFailed(_) => "QUERY_FAILED",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::TokenRejected(reason) => Some(serde_json::Value::String(reason.clone())),
            _ => None,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::AuthNotConfigured => "Azure AD authentication is not configured".to_string(),
            ApiError::TokenRejected(_) => "Invalid token".to_string(),
            ApiError::TokenInvalid(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::QueryFailed(msg)
            | ApiError::BadRequest(msg)
            | ApiError::InternalError(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = ApiErrorDetail {
            code: self.code().to_string(),
            message: self.message(),
            details: self.details(),
        };

        let body = serde_json::json!({
            "success": false,
            "error": detail,
        });

        (self.status(), axum::Json(body)).into_response()
    }
}

impl From<WarehouseError> for ApiError {
    fn from(err: WarehouseError) -> Self {
        match &err {
            WarehouseError::Core(_) => ApiError::BadRequest(err.to_string()),
            _ => ApiError::QueryFailed(err.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenInvalid(reason) | AuthError::KeyFetch(reason) => {
                ApiError::TokenRejected(reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_map_to_status_and_code() {
        let cases = [
            (ApiError::AuthNotConfigured, 503, "AUTH_NOT_CONFIGURED"),
            (ApiError::TokenInvalid("x".into()), 401, "TOKEN_INVALID"),
            (ApiError::TokenRejected("x".into()), 401, "TOKEN_INVALID"),
            (ApiError::Unauthorized("x".into()), 401, "UNAUTHORIZED"),
            (ApiError::QueryFailed("x".into()), 500, "QUERY_FAILED"),
            (ApiError::BadRequest("x".into()), 400, "BAD_REQUEST"),
            (ApiError::InternalError("x".into()), 500, "INTERNAL_ERROR"),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status().as_u16(), status);
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn warehouse_failures_are_query_failures() {
        let err: ApiError = WarehouseError::NotConfigured.into();
        assert!(matches!(err, ApiError::QueryFailed(_)));
    }

    #[test]
    fn key_fetch_failure_rejects_the_token() {
        let err: ApiError = AuthError::KeyFetch("offline".into()).into();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn rejected_token_carries_reason_as_details() {
        let err: ApiError = AuthError::TokenInvalid("InvalidAudience".into()).into();
        assert_eq!(err.message(), "Invalid token");
        assert_eq!(err.details(), Some(serde_json::json!("InvalidAudience")));
        assert_eq!(ApiError::TokenInvalid("No token provided".into()).details(), None);
    }
}
