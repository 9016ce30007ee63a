//! Core error types for flowgate-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering the
//! failure modes of filter parsing, identifier validation, and record checks.

use thiserror::Error;

/// Core errors produced by the flowgate-core crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// A filter field name outside the allow-list.
    #[error("unknown filter field: '{name}'")]
    UnknownField { name: String },

    /// A table identifier that cannot be safely interpolated into SQL.
    #[error("invalid identifier: '{name}'")]
    InvalidIdentifier { name: String },

    /// A flow record carried a negative weight.
    #[error("negative flow value {value} on {source_label} -> {target_label}")]
    NegativeValue {
        source_label: String,
        target_label: String,
        value: f64,
    },
}
