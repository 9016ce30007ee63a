//! Row types returned by the warehouse.
//!
//! Both records serialize with the warehouse column names as keys, which is
//! the shape clients receive from the gateway.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::field::FilterField;

/// One weighted edge of the flow diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    #[serde(rename = "SOURCE")]
    pub source: String,
    #[serde(rename = "TARGET")]
    pub target: String,
    #[serde(rename = "VALUE")]
    pub value: f64,
    #[serde(rename = "SOURCE_ATTRIBUTE", default, skip_serializing_if = "Option::is_none")]
    pub source_attribute: Option<String>,
    #[serde(rename = "TARGET_ATTRIBUTE", default, skip_serializing_if = "Option::is_none")]
    pub target_attribute: Option<String>,
    #[serde(rename = "VALUE_SPLIT_CATEGORY", default, skip_serializing_if = "Option::is_none")]
    pub split_category: Option<String>,
}

impl FlowRecord {
    /// A record with only the required columns set.
    pub fn new(source: impl Into<String>, target: impl Into<String>, value: f64) -> Self {
        FlowRecord {
            source: source.into(),
            target: target.into(),
            value,
            source_attribute: None,
            target_attribute: None,
            split_category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.split_category = Some(category.into());
        self
    }

    /// Rejects negative weights, for which diagram layout is undefined.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.value < 0.0 || self.value.is_nan() {
            return Err(CoreError::NegativeValue {
                source_label: self.source.clone(),
                target_label: self.target.clone(),
                value: self.value,
            });
        }
        Ok(())
    }
}

/// One row of the distinct-value lookup behind the filter panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    #[serde(rename = "CATEGORY_FIELD_1", default)]
    pub field1: String,
    #[serde(rename = "CATEGORY_FIELD_2", default)]
    pub field2: String,
    #[serde(rename = "CATEGORY_FIELD_3", default)]
    pub field3: String,
}

impl CategoryRecord {
    pub fn new(
        field1: impl Into<String>,
        field2: impl Into<String>,
        field3: impl Into<String>,
    ) -> Self {
        CategoryRecord {
            field1: field1.into(),
            field2: field2.into(),
            field3: field3.into(),
        }
    }

    /// The value of one of the three category fields; `None` for
    /// `SOURCE`/`TARGET`, which are not category columns.
    pub fn get(&self, field: FilterField) -> Option<&str> {
        match field {
            FilterField::CategoryField1 => Some(&self.field1),
            FilterField::CategoryField2 => Some(&self.field2),
            FilterField::CategoryField3 => Some(&self.field3),
            FilterField::Source | FilterField::Target => None,
        }
    }
}
