//! Router assembly for the flowgate HTTP API.
//!
//! [`build_router`] nests every route under `/api` and adds CORS and
//! tracing middleware layers.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the complete axum router with all API routes.
///
/// CORS mirrors the request origin and allows credentials so a browser
/// client on another origin can send the session cookie.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        // Authentication
        .route("/auth/token", post(handlers::auth::exchange_token))
        .route("/auth/status", get(handlers::auth::auth_status))
        .route("/auth/logout", post(handlers::auth::logout))
        // Data gateway (session required)
        .route(
            "/filters/categories",
            get(handlers::filters::list_categories),
        )
        .route("/data/sankey", post(handlers::data::sankey_data))
        // Probe
        .route("/health", get(handlers::health::health));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}
