//! View error types.

use flowgate_core::FilterField;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewError {
    /// Layout is undefined for negative (or NaN) link weights.
    #[error("negative flow value {value} on {source_label} -> {target_label}")]
    NegativeValue {
        source_label: String,
        target_label: String,
        value: f64,
    },

    /// The flow graph has a cycle through `label`; columns cannot be assigned.
    #[error("circular link through node '{label}'")]
    CircularLink { label: String },

    /// The filter panel only offers the three category fields.
    #[error("field {field} is not offered by the filter panel")]
    NotSelectable { field: FilterField },
}
