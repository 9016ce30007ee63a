//! The user's filter selection.
//!
//! [`FilterSelection`] maps allow-listed [`FilterField`]s to the set of
//! accepted values. Keys are typed, so a selection can never hold an
//! identifier outside the allow-list; deserialization from JSON goes through
//! [`FilterField::from_str`](std::str::FromStr) and rejects unknown names.
//!
//! Entry order is encounter order and drives clause order in the predicate.
//! Empty value sets are never stored: an absent field means "no restriction".

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::field::FilterField;

/// Untyped wire form: field name to optional value list.
type RawSelection = IndexMap<String, Option<Vec<String>>>;

/// Ordered mapping of filter field to accepted values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "IndexMap<String, Option<Vec<String>>>",
    into = "IndexMap<FilterField, Vec<String>>"
)]
pub struct FilterSelection {
    fields: IndexMap<FilterField, Vec<String>>,
}

impl FilterSelection {
    /// An unrestricted selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`set`](Self::set).
    pub fn with<I, S>(mut self, field: FilterField, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(field, values);
        self
    }

    /// Replaces the accepted values for `field`.
    ///
    /// A field already present keeps its position. An empty value set clears
    /// the field.
    pub fn set<I, S>(&mut self, field: FilterField, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            self.clear(field);
        } else {
            self.fields.insert(field, values);
        }
    }

    /// Removes any restriction on `field`, preserving the order of the rest.
    pub fn clear(&mut self, field: FilterField) {
        self.fields.shift_remove(&field);
    }

    /// Accepted values for `field`, if it is restricted.
    pub fn get(&self, field: FilterField) -> Option<&[String]> {
        self.fields.get(&field).map(Vec::as_slice)
    }

    /// Restricted fields and their values, in encounter order.
    pub fn iter(&self) -> impl Iterator<Item = (FilterField, &[String])> {
        self.fields
            .iter()
            .map(|(field, values)| (*field, values.as_slice()))
    }

    /// Number of restricted fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `true` when no field restricts the result.
    pub fn is_unrestricted(&self) -> bool {
        self.fields.values().all(Vec::is_empty)
    }

    /// Overlays `other` onto this selection: fields in `other` replace ours,
    /// fields only in `self` are kept.
    pub fn merge(&mut self, other: &FilterSelection) {
        for (field, values) in other.iter() {
            self.set(field, values.iter().cloned());
        }
    }

    /// `true` when a row with the given column lookup passes every clause.
    ///
    /// Used by in-process evaluators that mirror the generated predicate.
    pub fn matches<'a, F>(&self, mut column: F) -> bool
    where
        F: FnMut(FilterField) -> Option<&'a str>,
    {
        self.iter().all(|(field, accepted)| {
            column(field).is_some_and(|value| accepted.iter().any(|a| a == value))
        })
    }
}

impl TryFrom<RawSelection> for FilterSelection {
    type Error = CoreError;

    fn try_from(raw: RawSelection) -> Result<Self, Self::Error> {
        let mut selection = FilterSelection::new();
        for (name, values) in raw {
            let field: FilterField = name.parse()?;
            selection.set(field, values.unwrap_or_default());
        }
        Ok(selection)
    }
}

impl From<FilterSelection> for IndexMap<FilterField, Vec<String>> {
    fn from(selection: FilterSelection) -> Self {
        selection.fields
    }
}

impl FromIterator<(FilterField, Vec<String>)> for FilterSelection {
    fn from_iter<T: IntoIterator<Item = (FilterField, Vec<String>)>>(iter: T) -> Self {
        let mut selection = FilterSelection::new();
        for (field, values) in iter {
            selection.set(field, values);
        }
        selection
    }
}
