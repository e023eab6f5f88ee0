#![allow(dead_code)]

use oxide_schemadiff::{Change, DiffHints, Schema, SchemaError, SemanticError};

pub fn schema(sql: &str) -> Schema {
    Schema::from_sql(sql).unwrap_or_else(|e| panic!("Failed to load: {sql}\nError: {e}"))
}

pub fn schema_with(sql: &str, hints: &DiffHints) -> Schema {
    Schema::from_sql_with_hints(sql, hints.clone())
        .unwrap_or_else(|e| panic!("Failed to load: {sql}\nError: {e}"))
}

/// Semantic errors of a batch that must fail validation.
pub fn invalid(sql: &str) -> Vec<SemanticError> {
    match Schema::from_sql(sql) {
        Err(SchemaError::Invalid(errors)) => errors,
        other => panic!("Expected validation failure for: {sql}\nGot: {other:?}"),
    }
}

pub fn labels(changes: &[Change]) -> Vec<String> {
    changes.iter().map(Change::label).collect()
}

pub fn position(labels: &[String], label: &str) -> usize {
    labels
        .iter()
        .position(|l| l == label)
        .unwrap_or_else(|| panic!("'{label}' not in {labels:?}"))
}

/// Diffs `from` into `to`, applies the changes and checks that nothing is
/// left to do. Returns the applied changes.
pub fn assert_round_trip(from: &Schema, to: &Schema) -> Vec<Change> {
    let diff = from
        .diff(to)
        .unwrap_or_else(|e| panic!("Diff failed: {e}"));
    let changes = diff.into_ordered_changes();
    let applied = from
        .apply(&changes)
        .unwrap_or_else(|e| panic!("Apply failed: {e}\nChanges: {:#?}", labels(&changes)));
    let rest = applied.diff(to).expect("second diff");
    assert!(
        rest.is_empty(),
        "Round trip left changes: {:?}\nApplied: {:?}",
        rest.to_sql(),
        changes.iter().map(Change::to_sql).collect::<Vec<_>>()
    );
    changes
}
