//! Token exchange, status and logout handlers.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::ApiError;
use crate::schema::auth::{AuthStatusResponse, LogoutResponse, TokenRequest, TokenResponse};
use crate::schema::parse_body;
use crate::session::{clear_cookie, session_cookie, session_id_from_headers};
use crate::state::AppState;

/// `POST /auth/token`
///
/// Verifies a bearer token from the identity provider and opens a session.
/// Any session the request already carried is replaced.
pub async fn exchange_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let verifier = state.verifier.as_ref().ok_or(ApiError::AuthNotConfigured)?;

    let req: TokenRequest = parse_body(&body)?;
    let token = req
        .token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::TokenInvalid("No token provided".to_string()))?;

    let user = verifier.verify(token.trim()).await.map_err(|err| {
        tracing::warn!("Token rejected: {}", err);
        ApiError::from(err)
    })?;

    if let Some(previous) = session_id_from_headers(&headers) {
        state.sessions.destroy(&previous);
    }
    let id = state.sessions.create(user.clone());
    tracing::info!("Session {} opened for {}", id, user.email);

    Ok((
        [(SET_COOKIE, session_cookie(id, state.cookie_secure))],
        Json(TokenResponse {
            success: true,
            message: "Authentication successful".to_string(),
            user,
        }),
    ))
}

/// `GET /auth/status`
pub async fn auth_status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<AuthStatusResponse> {
    let authenticated = session_id_from_headers(&headers)
        .and_then(|id| state.sessions.get(&id))
        .is_some_and(|session| session.authenticated);

    Json(AuthStatusResponse {
        authenticated,
        has_warehouse_config: state.warehouse_configured,
        has_identity_config: state.verifier.is_some(),
    })
}

/// `POST /auth/logout`
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(id) = session_id_from_headers(&headers) {
        if state.sessions.destroy(&id) {
            tracing::info!("Session {} closed", id);
        }
    }

    (
        [(SET_COOKIE, clear_cookie(state.cookie_secure))],
        Json(LogoutResponse { success: true }),
    )
}
