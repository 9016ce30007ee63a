//! The identifier allow-list.
//!
//! [`FilterField`] is the closed set of warehouse columns a filter may name.
//! [`TableName`] is the validated table identifier. These two are the only
//! identifiers ever interpolated into query text; everything else travels as
//! a bound parameter.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A filterable warehouse column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FilterField {
    #[serde(rename = "CATEGORY_FIELD_1")]
    CategoryField1,
    #[serde(rename = "CATEGORY_FIELD_2")]
    CategoryField2,
    #[serde(rename = "CATEGORY_FIELD_3")]
    CategoryField3,
    #[serde(rename = "SOURCE")]
    Source,
    #[serde(rename = "TARGET")]
    Target,
}

impl FilterField {
    /// Every allow-listed field, in canonical order.
    pub const ALL: [FilterField; 5] = [
        FilterField::CategoryField1,
        FilterField::CategoryField2,
        FilterField::CategoryField3,
        FilterField::Source,
        FilterField::Target,
    ];

    /// The three fields offered by the filter panel.
    pub const CATEGORIES: [FilterField; 3] = [
        FilterField::CategoryField1,
        FilterField::CategoryField2,
        FilterField::CategoryField3,
    ];

    /// The column identifier as it appears in query text.
    pub fn column(self) -> &'static str {
        match self {
            FilterField::CategoryField1 => "CATEGORY_FIELD_1",
            FilterField::CategoryField2 => "CATEGORY_FIELD_2",
            FilterField::CategoryField3 => "CATEGORY_FIELD_3",
            FilterField::Source => "SOURCE",
            FilterField::Target => "TARGET",
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for FilterField {
    type Err = CoreError;

    /// Exact, case-sensitive match against the column identifiers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterField::ALL
            .into_iter()
            .find(|field| field.column() == s)
            .ok_or_else(|| CoreError::UnknownField {
                name: s.to_string(),
            })
    }
}

/// A warehouse table identifier, optionally schema-qualified (`SCHEMA.TABLE`).
///
/// Each dot-separated segment must match `[A-Za-z_][A-Za-z0-9_$]*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TableName(String);

impl TableName {
    pub fn new(name: &str) -> Result<Self, CoreError> {
        let valid = !name.is_empty() && name.split('.').all(is_plain_identifier);
        if !valid {
            return Err(CoreError::InvalidIdentifier {
                name: name.to_string(),
            });
        }
        Ok(TableName(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TableName {
    fn default() -> Self {
        TableName("FLOW_DATA".to_string())
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TableName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TableName::new(s)
    }
}

fn is_plain_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
