//! The [`Warehouse`] trait: the read contract behind the data routes.
//!
//! Both operations run a fixed SELECT (see [`flowgate_core::query`]) and
//! return rows in the warehouse's order. Methods take `&mut self` because a
//! backend may replace a dead connection before running the statement.
//!
//! The trait is synchronous, matching the blocking client library; the
//! gateway serializes access behind an async mutex.

use flowgate_core::{CategoryRecord, FilterSelection, FlowRecord};

use crate::error::WarehouseError;

pub trait Warehouse: Send {
    /// Distinct category triples, ordered lexicographically by the three fields.
    fn list_categories(&mut self) -> Result<Vec<CategoryRecord>, WarehouseError>;

    /// Flow rows passing `selection`, ordered by source then target.
    fn query_flows(
        &mut self,
        selection: &FilterSelection,
    ) -> Result<Vec<FlowRecord>, WarehouseError>;

    /// Whether the held connection (if any) still answers.
    fn is_alive(&self) -> bool;

    /// Closes the held connection. The next query reconnects.
    fn close(&mut self) -> Result<(), WarehouseError>;
}
