//! Flow data handlers.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;

use flowgate_core::FlowRecord;

use crate::error::ApiError;
use crate::schema::data::SankeyRequest;
use crate::schema::parse_body;
use crate::session::AuthenticatedSession;
use crate::state::AppState;

/// `POST /data/sankey`
///
/// Runs the flow query restricted by the request's filters. A missing body
/// or missing `filters` means no restriction.
pub async fn sankey_data(
    State(state): State<AppState>,
    session: AuthenticatedSession,
    body: Bytes,
) -> Result<Json<Vec<FlowRecord>>, ApiError> {
    let req: SankeyRequest = parse_body(&body)?;
    let filters = req.filters.unwrap_or_default();

    let mut warehouse = state.warehouse.lock().await;
    let records = warehouse.query_flows(&filters).map_err(|err| {
        tracing::error!("Flow query failed: {}", err);
        ApiError::from(err)
    })?;

    tracing::debug!(
        "Returned {} flow row(s) to {} ({} filter field(s))",
        records.len(),
        session.user.email,
        filters.len()
    );
    Ok(Json(records))
}
