//! The full warehouse row.
//!
//! The gateway only ever reads projections of this row ([`FlowRecord`],
//! [`flowgate_core::CategoryRecord`]); the whole row is needed to seed a
//! demo table and to evaluate filters in process.

use flowgate_core::{FilterField, FlowRecord};
use serde::{Deserialize, Serialize};

/// One row of the flow table: the edge plus the three category columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRow {
    #[serde(rename = "CATEGORY_FIELD_1", default)]
    pub category_field_1: String,
    #[serde(rename = "CATEGORY_FIELD_2", default)]
    pub category_field_2: String,
    #[serde(rename = "CATEGORY_FIELD_3", default)]
    pub category_field_3: String,
    #[serde(flatten)]
    pub flow: FlowRecord,
}

impl FlowRow {
    pub fn new(categories: [&str; 3], flow: FlowRecord) -> Self {
        let [c1, c2, c3] = categories;
        FlowRow {
            category_field_1: c1.to_string(),
            category_field_2: c2.to_string(),
            category_field_3: c3.to_string(),
            flow,
        }
    }

    /// Column lookup for any allow-listed field.
    pub fn column(&self, field: FilterField) -> Option<&str> {
        match field {
            FilterField::CategoryField1 => Some(&self.category_field_1),
            FilterField::CategoryField2 => Some(&self.category_field_2),
            FilterField::CategoryField3 => Some(&self.category_field_3),
            FilterField::Source => Some(&self.flow.source),
            FilterField::Target => Some(&self.flow.target),
        }
    }
}
