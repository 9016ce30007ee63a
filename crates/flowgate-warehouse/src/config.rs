//! Warehouse connection settings.

use flowgate_core::TableName;

/// Where the warehouse lives and which table holds the flow data.
#[derive(Debug, Clone, Default)]
pub struct WarehouseConfig {
    /// Database location. `None` leaves the warehouse unconfigured.
    pub path: Option<String>,
    /// Table queried by both fixed SELECTs.
    pub table: TableName,
}

impl WarehouseConfig {
    pub fn new(path: impl Into<String>, table: TableName) -> Self {
        WarehouseConfig {
            path: Some(path.into()),
            table,
        }
    }

    /// `true` when a location is set. Reported to clients as a status flag;
    /// an incomplete configuration is not a startup failure.
    pub fn is_complete(&self) -> bool {
        self.path.as_deref().is_some_and(|p| !p.trim().is_empty())
    }
}
