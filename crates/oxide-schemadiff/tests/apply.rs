//! Applying change batches: cascades, rejections and batch validation.

mod common;

use std::sync::Arc;

use common::schema;
use oxide_schemadiff::{changes_from_sql, ApplyError, Schema, SemanticError};

fn apply_sql(schema: &Schema, sql: &str) -> Result<Schema, ApplyError> {
    let changes = changes_from_sql(sql).unwrap_or_else(|e| panic!("bad batch {sql}: {e}"));
    schema.apply(&changes)
}

#[test]
fn test_drop_column_shrinks_then_removes_key() {
    let base = schema("create table t (a int, b int, c int, key ab (a, b), key c_only (c))");

    let shrunk = apply_sql(&base, "alter table t drop column b").unwrap();
    let ab = shrunk.table("t").unwrap().key("ab").unwrap();
    assert_eq!(ab.columns.len(), 1);
    assert_eq!(ab.columns[0].name, "a");

    let removed = apply_sql(&shrunk, "alter table t drop column c").unwrap();
    assert_eq!(
        removed.table("t").unwrap().to_sql(),
        "CREATE TABLE t (\n    a int DEFAULT NULL,\n    KEY ab (a)\n)"
    );
}

#[test]
fn test_drop_foreign_key_column_is_rejected_and_schema_kept() {
    let base = schema(
        "create table p (id int primary key); \
         create table c (id int primary key, pid int, foreign key (pid) references p (id))",
    );
    let before = base.to_sql();
    let err = apply_sql(&base, "alter table c drop column pid").unwrap_err();
    assert!(matches!(
        err,
        ApplyError::DropColumnReferencedByForeignKey { ref table, ref column, .. }
            if table == "c" && column == "pid"
    ));
    assert_eq!(base.to_sql(), before);

    let released = apply_sql(
        &base,
        "alter table c drop foreign key c_ibfk_1; alter table c drop column pid",
    )
    .unwrap();
    assert!(released.table("c").unwrap().column("pid").is_none());
}

#[test]
fn test_transient_invalid_state_inside_batch() {
    let base = schema(
        "create table p (id int primary key, code int, key code (code)); \
         create table c (pcode int, foreign key (pcode) references p (code))",
    );
    let applied = apply_sql(
        &base,
        "alter table p drop key code; alter table p add key code_idx (code)",
    )
    .unwrap();
    assert!(applied.table("p").unwrap().key("code_idx").is_some());

    let err = apply_sql(&base, "alter table p drop key code").unwrap_err();
    assert!(matches!(
        err,
        ApplyError::Validation(ref errors)
            if matches!(errors.as_slice(), [SemanticError::MissingForeignKeyParentIndex { .. }])
    ));
}

#[test]
fn test_batch_is_validated_at_the_end() {
    let base = schema("create table t (id int primary key)");
    let err = apply_sql(&base, "create view v as select missing from t").unwrap_err();
    assert_eq!(
        err,
        ApplyError::Validation(vec![SemanticError::InvalidColumnReference {
            view: "v".into(),
            column: "missing".into(),
        }])
    );
    assert_eq!(
        err.to_string(),
        "Resulting schema is invalid:\n  - Column 'missing' in view 'v' does not resolve to any relation"
    );
}

#[test]
fn test_untouched_entities_are_shared() {
    let base = schema("create table a (id int); create table b (id int)");
    let applied = apply_sql(&base, "alter table b add column x int").unwrap();
    let before = base.entity("a").unwrap().as_table().unwrap();
    let after = applied.entity("a").unwrap().as_table().unwrap();
    assert!(Arc::ptr_eq(before, after));
    assert!(base.table("b").unwrap().column("x").is_none());
}

#[test]
fn test_printed_diff_applies_after_reparsing() {
    let from = schema(
        "create table p (id int primary key, code varchar(8), key code (code)); \
         create table c (id int primary key, pcode varchar(8), foreign key (pcode) references p (code))",
    );
    let to = schema(
        "create table p (id int primary key, label varchar(16)); \
         create table c (id int primary key, pid int, foreign key (pid) references p (id)); \
         create view named as select p.label, c.id from c join p on p.id = c.pid",
    );
    let sql = from.diff(&to).unwrap().to_sql().join(";\n");
    let applied = apply_sql(&from, &sql).unwrap();
    assert!(applied.diff(&to).unwrap().is_empty());
}
