//! Filter option handlers.

use axum::extract::State;
use axum::Json;

use flowgate_core::CategoryRecord;

use crate::error::ApiError;
use crate::session::AuthenticatedSession;
use crate::state::AppState;

/// `GET /filters/categories`
pub async fn list_categories(
    State(state): State<AppState>,
    _session: AuthenticatedSession,
) -> Result<Json<Vec<CategoryRecord>>, ApiError> {
    let mut warehouse = state.warehouse.lock().await;
    let records = warehouse.list_categories().map_err(|err| {
        tracing::error!("Category query failed: {}", err);
        ApiError::from(err)
    })?;
    Ok(Json(records))
}
