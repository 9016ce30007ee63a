//! Schema types for the data routes.

use serde::Deserialize;

use flowgate_core::FilterSelection;

/// Body of `POST /data/sankey`. Unknown filter fields fail deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SankeyRequest {
    #[serde(default)]
    pub filters: Option<FilterSelection>,
}
