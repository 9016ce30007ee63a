//! Error types for flowgate-warehouse.

use thiserror::Error;

/// Errors produced by warehouse operations.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// No warehouse location was configured.
    #[error("warehouse not configured")]
    NotConfigured,

    /// Opening a connection failed.
    #[error("unable to connect to warehouse at '{path}': {source}")]
    Connect {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A statement failed to prepare or execute.
    #[error("query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Applying the demo schema failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// A row violated a record invariant.
    #[error(transparent)]
    Core(#[from] flowgate_core::CoreError),
}
