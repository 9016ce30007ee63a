//! Stable categorical colors.
//!
//! [`CategoryPalette`] is an ordinal scale over the Category10 scheme: each
//! new key takes the next color in sequence (wrapping after ten) and keeps
//! it for the palette's lifetime, so a category keeps its color across
//! re-renders.

use indexmap::IndexMap;

/// The Category10 color scheme.
pub const CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

#[derive(Debug, Clone, Default)]
pub struct CategoryPalette {
    assigned: IndexMap<String, &'static str>,
}

impl CategoryPalette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Color for `key`, assigning the next scheme entry on first use.
    pub fn color(&mut self, key: &str) -> &'static str {
        if let Some(color) = self.assigned.get(key).copied() {
            return color;
        }
        let color = CATEGORY10[self.assigned.len() % CATEGORY10.len()];
        self.assigned.insert(key.to_string(), color);
        color
    }

    /// Color already assigned to `key`, without assigning one.
    pub fn get(&self, key: &str) -> Option<&'static str> {
        self.assigned.get(key).copied()
    }

    /// Number of keys with an assigned color.
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}

/// Fixed color for a node by its index.
pub fn node_color(index: usize) -> &'static str {
    CATEGORY10[index % CATEGORY10.len()]
}
