//! `--filter FIELD=value[,value...]` argument parsing.

use flowgate_core::{FilterField, FilterSelection};

/// Builds a selection from repeated `FIELD=v1,v2` arguments. Repeating a
/// field adds to its values.
pub fn parse_filters(args: &[String]) -> Result<FilterSelection, String> {
    let mut selection = FilterSelection::new();
    for arg in args {
        let (name, values) = arg
            .split_once('=')
            .ok_or_else(|| format!("invalid filter '{}', expected FIELD=value", arg))?;
        let field: FilterField = name.trim().parse().map_err(|e| format!("{}", e))?;

        let mut merged: Vec<String> = selection
            .get(field)
            .map(<[String]>::to_vec)
            .unwrap_or_default();
        merged.extend(
            values
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
        );
        selection.set(field, merged);
    }
    Ok(selection)
}
