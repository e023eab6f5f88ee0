//! Table-local rules and foreign key rules.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use oxide_ddl::ast::{
    ColumnDefinition, DataType, Expr, IndexKind, Literal, PartitionBound, PartitionSpec,
    PartitionValues,
};

use crate::entity::Table;
use crate::error::SemanticError;
use crate::schema::Schema;

pub(super) fn validate_tables(schema: &Schema) -> Vec<SemanticError> {
    schema.tables().flat_map(|t| validate_table(t)).collect()
}

/// Every table-local error of `table`: columns, keys, `AUTO_INCREMENT`,
/// generated columns, checks and partitioning.
#[must_use]
pub fn validate_table(table: &Table) -> Vec<SemanticError> {
    let mut errors = Vec::new();
    check_columns(table, &mut errors);
    check_keys(table, &mut errors);
    check_auto_increment(table, &mut errors);
    check_generated_columns(table, &mut errors);
    check_check_constraints(table, &mut errors);
    if let Some(spec) = table.partition() {
        check_partitioning(table, spec, &mut errors);
    }
    errors
}

fn position(table: &Table, column: &str) -> Option<usize> {
    table.columns().iter().position(|c| c.name == column)
}

fn check_columns(table: &Table, errors: &mut Vec<SemanticError>) {
    if table.columns().is_empty() {
        errors.push(SemanticError::NoColumns {
            table: table.name().to_string(),
        });
    }
    let mut seen = BTreeSet::new();
    let mut reported = BTreeSet::new();
    for column in table.columns() {
        if !seen.insert(column.name.as_str()) && reported.insert(column.name.as_str()) {
            errors.push(SemanticError::DuplicateColumn {
                table: table.name().to_string(),
                column: column.name.clone(),
            });
        }
    }
}

fn check_keys(table: &Table, errors: &mut Vec<SemanticError>) {
    let name = table.name();
    if table.keys().iter().filter(|k| k.is_primary()).count() > 1 {
        errors.push(SemanticError::MultiplePrimaryKeys {
            table: name.to_string(),
        });
    }

    let mut names = BTreeSet::new();
    for key in table.keys().iter().filter(|k| !k.is_primary()) {
        if let Some(key_name) = key.name.as_deref() {
            if !names.insert(key_name) {
                errors.push(SemanticError::DuplicateKeyName {
                    table: name.to_string(),
                    key: key_name.to_string(),
                });
            }
        }
    }

    for key in table.keys() {
        let key_name = key.name.clone().unwrap_or_default();
        for part in &key.columns {
            let Some(column) = table.column(&part.name) else {
                errors.push(SemanticError::UnknownKeyColumn {
                    table: name.to_string(),
                    key: key_name.clone(),
                    column: part.name.clone(),
                });
                continue;
            };
            let invalid_prefix = |reason: &str| SemanticError::InvalidKeyPrefix {
                table: name.to_string(),
                key: key_name.clone(),
                column: part.name.clone(),
                reason: reason.to_string(),
            };
            match part.length {
                Some(_) if !column.data_type.accepts_key_prefix() => {
                    errors.push(invalid_prefix("column type does not take a prefix length"));
                }
                Some(length) if declared_length(&column.data_type).is_some_and(|n| length > n) => {
                    errors.push(invalid_prefix("prefix is longer than the column"));
                }
                None if column.data_type.requires_key_prefix()
                    && key.kind != IndexKind::Fulltext =>
                {
                    errors.push(invalid_prefix("BLOB/TEXT column needs a prefix length"));
                }
                _ => {}
            }
            if key.is_primary() && column.nullable == Some(true) {
                errors.push(SemanticError::NullablePrimaryKeyColumn {
                    table: name.to_string(),
                    column: column.name.clone(),
                });
            }
        }
    }
}

const fn declared_length(data_type: &DataType) -> Option<u32> {
    match data_type {
        DataType::Char(len)
        | DataType::Varchar(len)
        | DataType::Binary(len)
        | DataType::Varbinary(len) => *len,
        _ => None,
    }
}

fn check_auto_increment(table: &Table, errors: &mut Vec<SemanticError>) {
    let invalid = |column: &ColumnDefinition, reason: &str| SemanticError::InvalidAutoIncrement {
        table: table.name().to_string(),
        column: column.name.clone(),
        reason: reason.to_string(),
    };
    for (i, column) in table
        .columns()
        .iter()
        .filter(|c| c.auto_increment)
        .enumerate()
    {
        if i > 0 {
            errors.push(invalid(column, "only one AUTO_INCREMENT column is allowed"));
        }
        let numeric = column.data_type.is_integer()
            || matches!(
                column.data_type,
                DataType::Float { .. } | DataType::Double { .. }
            );
        if !numeric {
            errors.push(invalid(column, "type does not support AUTO_INCREMENT"));
        }
        let leads_a_key = table
            .keys()
            .iter()
            .any(|k| k.columns.first().is_some_and(|p| p.name == column.name));
        if !leads_a_key {
            errors.push(invalid(column, "column must be the first column of a key"));
        }
    }
}

/// Generated columns may only read columns declared before them, never
/// themselves or an `AUTO_INCREMENT` column.
fn check_generated_columns(table: &Table, errors: &mut Vec<SemanticError>) {
    for (i, column) in table.columns().iter().enumerate() {
        let Some(generated) = &column.generated else {
            continue;
        };
        let mut reported = BTreeSet::new();
        for reference in generated.expr.column_refs() {
            let foreign_qualifier = reference.table.is_some_and(|t| t != table.name());
            let valid = !foreign_qualifier
                && position(table, reference.name)
                    .is_some_and(|j| j < i && !table.columns()[j].auto_increment);
            if !valid && reported.insert(reference.name) {
                errors.push(SemanticError::InvalidGeneratedColumnReference {
                    table: table.name().to_string(),
                    column: column.name.clone(),
                    reference: reference.name.to_string(),
                });
            }
        }
    }
}

fn check_check_constraints(table: &Table, errors: &mut Vec<SemanticError>) {
    for constraint in table.checks() {
        let Some(check) = constraint.as_check() else {
            continue;
        };
        let mut reported = BTreeSet::new();
        for reference in check.expr.column_refs() {
            let valid = table
                .column(reference.name)
                .is_some_and(|c| !c.auto_increment);
            if !valid && reported.insert(reference.name) {
                errors.push(SemanticError::InvalidCheckReference {
                    table: table.name().to_string(),
                    constraint: constraint.name.clone().unwrap_or_default(),
                    column: reference.name.to_string(),
                });
            }
        }
    }
}

// ===========================================================================
// Partitioning
// ===========================================================================

/// Integer-valued bound of a `VALUES LESS THAN` list; `None` stands for
/// `MAXVALUE`.
fn integer_bounds(bounds: &[PartitionBound]) -> Option<Vec<Option<i64>>> {
    bounds
        .iter()
        .map(|bound| match bound {
            PartitionBound::MaxValue => Some(None),
            PartitionBound::Value(Expr::Literal(Literal::Integer(v))) => Some(Some(*v)),
            PartitionBound::Value(_) => None,
        })
        .collect()
}

fn compare_bounds(a: &[Option<i64>], b: &[Option<i64>]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        let ordering = match (x, y) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => x.cmp(y),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    a.len().cmp(&b.len())
}

fn check_partitioning(table: &Table, spec: &PartitionSpec, errors: &mut Vec<SemanticError>) {
    let mut invalid = |reason: String| {
        errors.push(SemanticError::InvalidPartition {
            table: table.name().to_string(),
            reason,
        });
    };

    let method = spec.method;
    if (method.is_range() || method.is_list()) && spec.definitions.is_empty() {
        invalid(String::from(
            "RANGE and LIST partitioning need partition definitions",
        ));
    }

    let mut names = BTreeSet::new();
    let mut previous: Option<Vec<Option<i64>>> = None;
    let last = spec.definitions.len().saturating_sub(1);
    for (i, definition) in spec.definitions.iter().enumerate() {
        if !names.insert(definition.name.as_str()) {
            invalid(format!("duplicate partition name '{}'", definition.name));
        }
        let matches_method = match &definition.values {
            Some(PartitionValues::LessThan(_)) => method.is_range(),
            Some(PartitionValues::In(_)) => method.is_list(),
            None => !method.is_range() && !method.is_list(),
        };
        if !matches_method {
            invalid(format!(
                "values of partition '{}' do not match the partitioning method",
                definition.name
            ));
            continue;
        }
        let Some(PartitionValues::LessThan(bounds)) = &definition.values else {
            continue;
        };
        if i != last && matches!(bounds.as_slice(), [PartitionBound::MaxValue]) {
            invalid(String::from("MAXVALUE can only be used in the last partition"));
        }
        let current = integer_bounds(bounds);
        if let (Some(prev), Some(cur)) = (&previous, &current) {
            if compare_bounds(prev, cur) != Ordering::Less {
                invalid(format!(
                    "VALUES LESS THAN must be strictly increasing at partition '{}'",
                    definition.name
                ));
            }
        }
        previous = current;
    }

    let mut columns: Vec<&str> = spec.columns.iter().map(String::as_str).collect();
    if let Some(expr) = &spec.expr {
        columns.extend(expr.column_refs().iter().map(|r| r.name));
    }
    for column in &columns {
        if table.column(column).is_none() {
            invalid(format!("unknown column '{column}' in partitioning"));
        }
    }
    for key in table
        .keys()
        .iter()
        .filter(|k| matches!(k.kind, IndexKind::Primary | IndexKind::Unique))
    {
        if !columns.iter().all(|c| key.covers(c)) {
            invalid(format!(
                "key '{}' must include every column of the partitioning function",
                key.name.as_deref().unwrap_or_default()
            ));
        }
    }
}

// ===========================================================================
// Foreign keys
// ===========================================================================

pub(super) fn validate_foreign_keys(schema: &Schema) -> Vec<SemanticError> {
    let mut errors = Vec::new();
    for table in schema.tables() {
        for (name, fk) in table.foreign_keys() {
            let error_context = (table.name().to_string(), name.to_string());
            if fk.columns.len() != fk.referenced_columns.len() {
                errors.push(SemanticError::ForeignKeyColumnCountMismatch {
                    table: error_context.0,
                    constraint: error_context.1,
                });
                continue;
            }

            let unknown_column = |column: String| SemanticError::UnknownForeignKeyColumn {
                table: table.name().to_string(),
                constraint: name.to_string(),
                column,
            };
            let mut complete = true;
            for column in &fk.columns {
                if table.column(column).is_none() {
                    errors.push(unknown_column(column.clone()));
                    complete = false;
                }
            }

            let parent = if fk.referenced_table == table.name() {
                Some(table)
            } else {
                schema.table(&fk.referenced_table)
            };
            let Some(parent) = parent else {
                errors.push(SemanticError::UnknownForeignKeyTable {
                    table: error_context.0,
                    constraint: error_context.1,
                    referenced_table: fk.referenced_table.clone(),
                });
                continue;
            };
            for column in &fk.referenced_columns {
                if parent.column(column).is_none() {
                    errors.push(unknown_column(format!("{}.{column}", parent.name())));
                    complete = false;
                }
            }
            if !complete {
                continue;
            }

            for (local, referenced) in fk.columns.iter().zip(&fk.referenced_columns) {
                let (Some(child_column), Some(parent_column)) =
                    (table.column(local), parent.column(referenced))
                else {
                    continue;
                };
                if !compatible_columns(table, child_column, parent, parent_column) {
                    errors.push(SemanticError::ForeignKeyColumnMismatch {
                        table: table.name().to_string(),
                        constraint: name.to_string(),
                        column: local.clone(),
                        referenced_column: referenced.clone(),
                    });
                }
            }

            let indexed = parent.keys().iter().any(|key| {
                key.columns.len() >= fk.referenced_columns.len()
                    && key
                        .columns
                        .iter()
                        .zip(&fk.referenced_columns)
                        .all(|(part, column)| part.name == *column)
            });
            if !indexed {
                errors.push(SemanticError::MissingForeignKeyParentIndex {
                    table: error_context.0,
                    constraint: error_context.1,
                    referenced_table: parent.name().to_string(),
                });
            }
        }
    }
    errors
}

/// Whether a child column may reference a parent column. Integer columns
/// must agree on size and sign, decimals on precision and scale, string
/// columns on charset; other types must be identical.
fn compatible_columns(
    child_table: &Table,
    child: &ColumnDefinition,
    parent_table: &Table,
    parent: &ColumnDefinition,
) -> bool {
    match (&child.data_type, &parent.data_type) {
        (
            DataType::Integer {
                kind: a,
                unsigned: ua,
                ..
            },
            DataType::Integer {
                kind: b,
                unsigned: ub,
                ..
            },
        ) => a == b && ua == ub,
        (
            DataType::Decimal {
                precision: pa,
                scale: sa,
                unsigned: ua,
                ..
            },
            DataType::Decimal {
                precision: pb,
                scale: sb,
                unsigned: ub,
                ..
            },
        ) => pa == pb && sa == sb && ua == ub,
        (
            DataType::Char(_) | DataType::Varchar(_),
            DataType::Char(_) | DataType::Varchar(_),
        ) => {
            let charset = |table: &Table, column: &ColumnDefinition| {
                column
                    .charset
                    .clone()
                    .or_else(|| table.options().charset.clone())
            };
            charset(child_table, child) == charset(parent_table, parent)
        }
        (
            DataType::Binary(_) | DataType::Varbinary(_),
            DataType::Binary(_) | DataType::Varbinary(_),
        ) => true,
        (a, b) => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errors(sql: &str) -> Vec<SemanticError> {
        match Schema::from_sql(sql) {
            Ok(_) => Vec::new(),
            Err(err) => err.semantic_errors().to_vec(),
        }
    }

    #[test]
    fn test_duplicate_and_unknown_key_column_together() {
        let errors = errors(
            "create table invalid (id bigint, title varchar(64), title tinytext, primary key (val))",
        );
        assert_eq!(
            errors,
            vec![
                SemanticError::DuplicateColumn {
                    table: "invalid".into(),
                    column: "title".into()
                },
                SemanticError::UnknownKeyColumn {
                    table: "invalid".into(),
                    key: "PRIMARY".into(),
                    column: "val".into()
                },
            ]
        );
    }

    #[test]
    fn test_key_rules() {
        let errors = errors(
            "create table t (a int, b text, c varchar(10), d int null, \
             primary key (a), primary key (d), key k (b), key k2 (a(4)), key k3 (c(20)), \
             key k (c))",
        );
        let kinds: Vec<_> = errors
            .iter()
            .map(|e| match e {
                SemanticError::MultiplePrimaryKeys { .. } => "multiple",
                SemanticError::DuplicateKeyName { .. } => "duplicate",
                SemanticError::InvalidKeyPrefix { .. } => "prefix",
                SemanticError::NullablePrimaryKeyColumn { .. } => "nullable",
                _ => "other",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["multiple", "duplicate", "nullable", "prefix", "prefix", "prefix"]
        );
    }

    #[test]
    fn test_auto_increment_rules() {
        let errors = errors("create table t (id int auto_increment, v varchar(5) auto_increment, key (v))");
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|e| matches!(
            e,
            SemanticError::InvalidAutoIncrement { .. }
        )));
    }

    #[test]
    fn test_generated_column_references() {
        let errors = errors(
            "create table t (a int, b int as (c + 1), c int as (a * 2), d int as (d), e int as (zz))",
        );
        let refs: Vec<_> = errors
            .iter()
            .filter_map(|e| match e {
                SemanticError::InvalidGeneratedColumnReference {
                    column, reference, ..
                } => Some((column.as_str(), reference.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(refs, vec![("b", "c"), ("d", "d"), ("e", "zz")]);
    }

    #[test]
    fn test_generated_column_cannot_read_later_column() {
        assert_eq!(
            errors("create table t (a int as (b + 1), b int)"),
            vec![SemanticError::InvalidGeneratedColumnReference {
                table: "t".into(),
                column: "a".into(),
                reference: "b".into(),
            }]
        );
        assert!(errors("create table t (b int, a int as (b + 1))").is_empty());
    }

    #[test]
    fn test_check_references() {
        let errors = errors("create table t (a int, constraint c1 check (a > b))");
        assert_eq!(
            errors,
            vec![SemanticError::InvalidCheckReference {
                table: "t".into(),
                constraint: "c1".into(),
                column: "b".into()
            }]
        );
    }

    #[test]
    fn test_partition_rules() {
        let errors = errors(
            "create table t (id int, d int, primary key (id)) partition by range (d) \
             (partition p0 values less than (10), partition p0 values less than (5), \
             partition p2 values less than maxvalue)",
        );
        let reasons: Vec<_> = errors
            .iter()
            .filter_map(|e| match e {
                SemanticError::InvalidPartition { reason, .. } => Some(reason.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            reasons,
            vec![
                "duplicate partition name 'p0'",
                "VALUES LESS THAN must be strictly increasing at partition 'p0'",
                "key 'PRIMARY' must include every column of the partitioning function",
            ]
        );
    }

    #[test]
    fn test_valid_range_partitioning() {
        let errors = errors(
            "create table t (id int, d int, primary key (id, d)) partition by range (d) \
             (partition p0 values less than (10), partition p1 values less than maxvalue)",
        );
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn test_foreign_key_rules() {
        let errors = errors(
            "create table parent (id int primary key, code varchar(10), note int); \
             create table child (id int, pid bigint, code varchar(10), x int, \
             constraint fk_type foreign key (pid) references parent (id), \
             constraint fk_index foreign key (x) references parent (note), \
             constraint fk_count foreign key (id, x) references parent (id), \
             constraint fk_table foreign key (id) references nowhere (id), \
             constraint fk_column foreign key (nope) references parent (missing))",
        );
        assert_eq!(
            errors,
            vec![
                SemanticError::ForeignKeyColumnMismatch {
                    table: "child".into(),
                    constraint: "fk_type".into(),
                    column: "pid".into(),
                    referenced_column: "id".into(),
                },
                SemanticError::MissingForeignKeyParentIndex {
                    table: "child".into(),
                    constraint: "fk_index".into(),
                    referenced_table: "parent".into(),
                },
                SemanticError::ForeignKeyColumnCountMismatch {
                    table: "child".into(),
                    constraint: "fk_count".into(),
                },
                SemanticError::UnknownForeignKeyTable {
                    table: "child".into(),
                    constraint: "fk_table".into(),
                    referenced_table: "nowhere".into(),
                },
                SemanticError::UnknownForeignKeyColumn {
                    table: "child".into(),
                    constraint: "fk_column".into(),
                    column: "nope".into(),
                },
                SemanticError::UnknownForeignKeyColumn {
                    table: "child".into(),
                    constraint: "fk_column".into(),
                    column: "parent.missing".into(),
                },
            ]
        );
    }

    #[test]
    fn test_foreign_key_to_view_is_rejected() {
        let errors = errors(
            "create table t (id int primary key); create view v as select id from t; \
             create table c (id int, foreign key (id) references v (id))",
        );
        assert!(matches!(
            errors.as_slice(),
            [SemanticError::UnknownForeignKeyTable { .. }]
        ));
    }
}
