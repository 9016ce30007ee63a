//! Schema types for the authentication routes.

use serde::{Deserialize, Serialize};

use crate::auth::UserIdentity;

/// Body of `POST /auth/token`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenRequest {
    /// Access token issued by the identity provider.
    #[serde(default)]
    pub token: Option<String>,
}

/// Successful token exchange.
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub success: bool,
    pub message: String,
    pub user: UserIdentity,
}

/// Session and configuration status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatusResponse {
    pub authenticated: bool,
    pub has_warehouse_config: bool,
    pub has_identity_config: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}
