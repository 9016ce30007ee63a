//! In-process implementation of [`Warehouse`].
//!
//! [`InMemoryWarehouse`] evaluates a [`FilterSelection`] directly over a
//! `Vec<FlowRow>` with the same semantics as the generated predicate, and
//! returns rows in the same order as the fixed SELECTs.

use std::collections::BTreeSet;

use flowgate_core::{CategoryRecord, FilterSelection, FlowRecord};

use crate::error::WarehouseError;
use crate::row::FlowRow;
use crate::traits::Warehouse;

/// Row-vector backed warehouse for tests and offline rendering.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWarehouse {
    rows: Vec<FlowRow>,
    open: bool,
}

impl InMemoryWarehouse {
    pub fn new(rows: Vec<FlowRow>) -> Self {
        InMemoryWarehouse { rows, open: true }
    }
}

impl Warehouse for InMemoryWarehouse {
    fn list_categories(&mut self) -> Result<Vec<CategoryRecord>, WarehouseError> {
        self.open = true;
        let distinct: BTreeSet<(String, String, String)> = self
            .rows
            .iter()
            .map(|row| {
                (
                    row.category_field_1.clone(),
                    row.category_field_2.clone(),
                    row.category_field_3.clone(),
                )
            })
            .collect();
        Ok(distinct
            .into_iter()
            .map(|(f1, f2, f3)| CategoryRecord::new(f1, f2, f3))
            .collect())
    }

    fn query_flows(
        &mut self,
        selection: &FilterSelection,
    ) -> Result<Vec<FlowRecord>, WarehouseError> {
        self.open = true;
        let mut flows: Vec<FlowRecord> = self
            .rows
            .iter()
            .filter(|row| selection.matches(|field| row.column(field)))
            .map(|row| row.flow.clone())
            .collect();
        flows.sort_by(|a, b| (&a.source, &a.target).cmp(&(&b.source, &b.target)));
        Ok(flows)
    }

    fn is_alive(&self) -> bool {
        self.open
    }

    fn close(&mut self) -> Result<(), WarehouseError> {
        self.open = false;
        Ok(())
    }
}
