//! Node-click drill-down.
//!
//! A click on a node narrows the view to flows touching that node. The
//! node's role is detected from the records currently shown: a label that
//! appears as a source filters `SOURCE`, a label that only appears as a
//! target filters `TARGET`. The result is merged into the current selection,
//! replacing only that field.

use flowgate_core::{FilterField, FilterSelection, FlowRecord};

/// The field a click on `label` should restrict, or `None` if `label` is not
/// in `records`.
pub fn node_role(records: &[FlowRecord], label: &str) -> Option<FilterField> {
    if records.iter().any(|r| r.source == label) {
        Some(FilterField::Source)
    } else if records.iter().any(|r| r.target == label) {
        Some(FilterField::Target)
    } else {
        None
    }
}

/// The selection to load after the user confirms a click on `label`.
pub fn resolve_node_click(
    records: &[FlowRecord],
    current: &FilterSelection,
    label: &str,
) -> Option<FilterSelection> {
    let field = node_role(records, label)?;
    let mut next = current.clone();
    next.set(field, [label]);
    Some(next)
}

/// Text of the confirmation asked before applying a node-click filter.
pub fn confirmation_prompt(label: &str) -> String {
    format!(
        "Filter by: {label}?\n\nThis will update the visualization to show only data related to this node."
    )
}
