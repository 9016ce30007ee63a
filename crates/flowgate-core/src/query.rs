//! Filter-to-SQL translation.
//!
//! [`build`] turns a [`FilterSelection`] into a [`Predicate`]: a conjunction
//! of `FIELD IN (?, ...)` clauses plus the values to bind, in placeholder
//! order. Identifiers come only from [`FilterField::column`]; values are
//! never interpolated.
//!
//! [`categories_sql`] and [`flows_sql`] produce the two fixed SELECTs the
//! gateway runs.

use crate::error::CoreError;
use crate::field::{FilterField, TableName};
use crate::filter::FilterSelection;

/// A parameterized filter condition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    /// Condition text without the `WHERE` keyword; empty when unrestricted.
    pub text: String,
    /// Values for the `?` placeholders, in order.
    pub binds: Vec<String>,
}

impl Predicate {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// `WHERE <text>`, or the empty string for an unrestricted scan.
    pub fn where_clause(&self) -> String {
        if self.text.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.text)
        }
    }
}

/// Builds the predicate for a typed selection.
pub fn build(selection: &FilterSelection) -> Predicate {
    let mut clauses = Vec::new();
    let mut binds = Vec::new();

    for (field, values) in selection.iter() {
        if values.is_empty() {
            continue;
        }
        clauses.push(in_clause(field, values.len()));
        binds.extend(values.iter().cloned());
    }

    Predicate {
        text: clauses.join(" AND "),
        binds,
    }
}

/// Builds the predicate from untyped `(field name, values)` pairs.
///
/// Every name is checked against the allow-list before any text is emitted;
/// the first unknown name aborts the build.
pub fn build_raw<I, S>(pairs: I) -> Result<Predicate, CoreError>
where
    I: IntoIterator<Item = (S, Vec<String>)>,
    S: AsRef<str>,
{
    let mut selection = FilterSelection::new();
    for (name, values) in pairs {
        let field: FilterField = name.as_ref().parse()?;
        selection.set(field, values);
    }
    Ok(build(&selection))
}

fn in_clause(field: FilterField, count: usize) -> String {
    let placeholders = vec!["?"; count].join(", ");
    format!("{} IN ({})", field.column(), placeholders)
}

/// Distinct category triples, ordered by all three fields.
pub fn categories_sql(table: &TableName) -> String {
    format!(
        "SELECT DISTINCT CATEGORY_FIELD_1, CATEGORY_FIELD_2, CATEGORY_FIELD_3 \
         FROM {table} \
         ORDER BY CATEGORY_FIELD_1, CATEGORY_FIELD_2, CATEGORY_FIELD_3"
    )
}

/// Flow rows restricted by `predicate`, ordered by source then target.
pub fn flows_sql(table: &TableName, predicate: &Predicate) -> String {
    let mut sql = format!(
        "SELECT SOURCE, TARGET, VALUE, SOURCE_ATTRIBUTE, TARGET_ATTRIBUTE, VALUE_SPLIT_CATEGORY \
         FROM {table}"
    );
    if !predicate.is_empty() {
        sql.push(' ');
        sql.push_str(&predicate.where_clause());
    }
    sql.push_str(" ORDER BY SOURCE, TARGET");
    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn single_value_selection() {
        let selection = FilterSelection::new().with(FilterField::CategoryField1, ["Retail"]);
        let predicate = build(&selection);
        assert_eq!(predicate.text, "CATEGORY_FIELD_1 IN (?)");
        assert_eq!(predicate.binds, vec!["Retail".to_string()]);
    }

    #[test]
    fn clauses_follow_encounter_order() {
        let selection = FilterSelection::new()
            .with(FilterField::Target, ["C"])
            .with(FilterField::CategoryField2, ["x", "y"]);
        let predicate = build(&selection);
        assert_eq!(
            predicate.text,
            "TARGET IN (?) AND CATEGORY_FIELD_2 IN (?, ?)"
        );
        assert_eq!(predicate.binds, vec!["C", "x", "y"]);
    }

    #[test]
    fn empty_selection_has_no_where_clause() {
        let predicate = build(&FilterSelection::new());
        assert!(predicate.is_empty());
        assert!(predicate.binds.is_empty());
        assert_eq!(predicate.where_clause(), "");
    }

    #[test]
    fn values_are_never_interpolated() {
        let hostile = "x') OR 1=1 --";
        let predicate = build(&FilterSelection::new().with(FilterField::Source, [hostile]));
        assert!(!predicate.text.contains(hostile));
        assert_eq!(predicate.binds, vec![hostile.to_string()]);
    }

    #[test]
    fn build_raw_rejects_unknown_field_without_emitting_it() {
        let err = build_raw([
            ("CATEGORY_FIELD_1", vec!["Retail".to_string()]),
            ("1=1; DROP TABLE FLOW_DATA", vec!["x".to_string()]),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            CoreError::UnknownField {
                name: "1=1; DROP TABLE FLOW_DATA".to_string()
            }
        );
    }

    #[test]
    fn build_raw_accepts_allow_listed_names() {
        let predicate = build_raw([("SOURCE", vec!["A".to_string()])]).unwrap();
        assert_eq!(predicate.text, "SOURCE IN (?)");
    }

    #[test]
    fn flows_sql_with_and_without_predicate() {
        let table = TableName::new("FLOW_DATA").unwrap();
        let unrestricted = flows_sql(&table, &Predicate::default());
        assert!(!unrestricted.contains("WHERE"));
        assert!(unrestricted.ends_with("FROM FLOW_DATA ORDER BY SOURCE, TARGET"));

        let predicate = build(&FilterSelection::new().with(FilterField::Source, ["A"]));
        let restricted = flows_sql(&table, &predicate);
        assert!(restricted.ends_with("FROM FLOW_DATA WHERE SOURCE IN (?) ORDER BY SOURCE, TARGET"));
    }

    #[test]
    fn categories_sql_orders_by_all_fields() {
        let sql = categories_sql(&TableName::default());
        assert!(sql.starts_with("SELECT DISTINCT CATEGORY_FIELD_1"));
        assert!(sql.ends_with("ORDER BY CATEGORY_FIELD_1, CATEGORY_FIELD_2, CATEGORY_FIELD_3"));
    }

    fn arb_field() -> impl Strategy<Value = FilterField> {
        prop::sample::select(FilterField::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn placeholder_count_matches_binds(
            entries in prop::collection::vec(
                (arb_field(), prop::collection::vec("[a-zA-Z0-9 ']{0,8}", 0..5)),
                0..8,
            )
        ) {
            let selection: FilterSelection = entries.into_iter().collect();
            let predicate = build(&selection);

            prop_assert_eq!(predicate.text.matches('?').count(), predicate.binds.len());

            let expected: Vec<String> = selection
                .iter()
                .flat_map(|(_, values)| values.iter().cloned())
                .collect();
            prop_assert_eq!(&predicate.binds, &expected);

            for (field, values) in selection.iter() {
                let clause = in_clause(field, values.len());
                prop_assert!(predicate.text.contains(&clause));
            }
        }

        #[test]
        fn all_empty_values_yield_empty_predicate(
            fields in prop::collection::vec(arb_field(), 0..6)
        ) {
            let selection: FilterSelection =
                fields.into_iter().map(|f| (f, Vec::new())).collect();
            let predicate = build(&selection);
            prop_assert!(predicate.text.is_empty());
            prop_assert!(predicate.binds.is_empty());
        }
    }
}
