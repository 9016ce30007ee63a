//! Filter panel state.
//!
//! [`FilterPanel`] derives the selectable options for the three category
//! fields from a categories query result and tracks one selected value per
//! field. Every change (and every reset) is pushed to subscribers as the
//! resulting [`FilterSelection`].

use indexmap::{IndexMap, IndexSet};

use flowgate_core::{CategoryRecord, FilterField, FilterSelection};

use crate::error::ViewError;

type ChangeListener = Box<dyn FnMut(&FilterSelection) + Send>;

pub struct FilterPanel {
    options: IndexMap<FilterField, Vec<String>>,
    selected: IndexMap<FilterField, String>,
    listeners: Vec<ChangeListener>,
    loaded: bool,
}

impl Default for FilterPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterPanel {
    pub fn new() -> Self {
        FilterPanel {
            options: FilterField::CATEGORIES
                .into_iter()
                .map(|field| (field, Vec::new()))
                .collect(),
            selected: IndexMap::new(),
            listeners: Vec::new(),
            loaded: false,
        }
    }

    /// Registers a listener for selection changes.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&FilterSelection) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Replaces the options with the distinct non-empty values of each
    /// category field, in first-seen order.
    pub fn on_categories_loaded(&mut self, records: &[CategoryRecord]) {
        for field in FilterField::CATEGORIES {
            let distinct: IndexSet<&str> = records
                .iter()
                .filter_map(|record| record.get(field))
                .filter(|value| !value.is_empty())
                .collect();
            self.options.insert(
                field,
                distinct.into_iter().map(str::to_string).collect(),
            );
        }
        self.loaded = true;
    }

    /// Whether categories have been loaded and at least one option exists.
    pub fn has_options(&self) -> bool {
        self.loaded && self.options.values().any(|values| !values.is_empty())
    }

    /// Selectable values for `field`; empty for non-category fields.
    pub fn options(&self, field: FilterField) -> &[String] {
        self.options.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The selected value of `field`, if any.
    pub fn selected(&self, field: FilterField) -> Option<&str> {
        self.selected.get(&field).map(String::as_str)
    }

    /// Sets (or with `None`/empty, clears) the value of one category field
    /// and notifies subscribers.
    pub fn select(
        &mut self,
        field: FilterField,
        value: Option<&str>,
    ) -> Result<FilterSelection, ViewError> {
        if !FilterField::CATEGORIES.contains(&field) {
            return Err(ViewError::NotSelectable { field });
        }
        match value.filter(|v| !v.is_empty()) {
            Some(v) => {
                self.selected.insert(field, v.to_string());
            }
            None => {
                self.selected.shift_remove(&field);
            }
        }
        Ok(self.emit())
    }

    /// Clears every field and notifies subscribers with an empty selection.
    pub fn reset(&mut self) -> FilterSelection {
        self.selected.clear();
        self.emit()
    }

    /// The active selection: one single-value entry per selected field, in
    /// field order.
    pub fn current_selection(&self) -> FilterSelection {
        FilterField::CATEGORIES
            .into_iter()
            .filter_map(|field| {
                self.selected
                    .get(&field)
                    .map(|value| (field, vec![value.clone()]))
            })
            .collect()
    }

    fn emit(&mut self) -> FilterSelection {
        let selection = self.current_selection();
        for listener in &mut self.listeners {
            listener(&selection);
        }
        selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn records() -> Vec<CategoryRecord> {
        vec![
            CategoryRecord::new("Retail", "EU", "Q1"),
            CategoryRecord::new("Online", "", "Q1"),
            CategoryRecord::new("Retail", "US", "Q2"),
        ]
    }

    #[test]
    fn options_are_distinct_non_empty_first_seen() {
        let mut panel = FilterPanel::new();
        assert!(!panel.has_options());
        panel.on_categories_loaded(&records());

        assert!(panel.has_options());
        assert_eq!(panel.options(FilterField::CategoryField1), &["Retail", "Online"]);
        assert_eq!(panel.options(FilterField::CategoryField2), &["EU", "US"]);
        assert_eq!(panel.options(FilterField::CategoryField3), &["Q1", "Q2"]);
        assert!(panel.options(FilterField::Source).is_empty());
    }

    #[test]
    fn select_emits_current_selection() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut panel = FilterPanel::new();
        panel.subscribe(move |selection| sink.lock().unwrap().push(selection.clone()));
        panel.on_categories_loaded(&records());

        panel.select(FilterField::CategoryField3, Some("Q2")).unwrap();
        let selection = panel.select(FilterField::CategoryField1, Some("Retail")).unwrap();

        let expected = FilterSelection::new()
            .with(FilterField::CategoryField1, ["Retail"])
            .with(FilterField::CategoryField3, ["Q2"]);
        assert_eq!(selection, expected);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1], expected);
    }

    #[test]
    fn selecting_empty_value_clears_field() {
        let mut panel = FilterPanel::new();
        panel.select(FilterField::CategoryField1, Some("Retail")).unwrap();
        let selection = panel.select(FilterField::CategoryField1, Some("")).unwrap();
        assert!(selection.is_unrestricted());
        assert_eq!(panel.selected(FilterField::CategoryField1), None);
    }

    #[test]
    fn reset_clears_all_and_emits_empty() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut panel = FilterPanel::new();
        panel.select(FilterField::CategoryField1, Some("Retail")).unwrap();
        panel.select(FilterField::CategoryField2, Some("EU")).unwrap();
        panel.subscribe(move |selection| sink.lock().unwrap().push(selection.clone()));

        let selection = panel.reset();
        assert!(selection.is_empty());
        assert!(panel.current_selection().is_empty());
        assert_eq!(*seen.lock().unwrap(), vec![FilterSelection::new()]);
    }

    #[test]
    fn source_and_target_are_not_selectable() {
        let mut panel = FilterPanel::new();
        assert_eq!(
            panel.select(FilterField::Source, Some("A")),
            Err(ViewError::NotSelectable {
                field: FilterField::Source
            })
        );
    }
}
