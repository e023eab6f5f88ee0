//! Property tests over small random schemas.

mod common;

use std::fmt::Write as _;

use common::labels;
use oxide_ddl::ast::{AlterTableSpec, ConstraintDefinition};
use oxide_schemadiff::{
    Change, ColumnRenameStrategy, DiffHints, Schema, SchemaError, TableRenameStrategy,
};
use proptest::prelude::*;

// ====================================================================
// Strategies
// ====================================================================

const TABLES: [&str; 3] = ["alpha", "beta", "gamma"];

/// Optional columns: a name and the two types it may take.
const COLUMNS: [(&str, [&str; 2]); 4] = [
    ("name", ["varchar(32)", "varchar(64)"]),
    ("qty", ["int", "bigint"]),
    ("note", ["varchar(16)", "varchar(24)"]),
    ("flag", ["tinyint(1)", "smallint"]),
];

const NULLABILITY: [&str; 3] = ["", " NULL", " NOT NULL"];

#[derive(Debug, Clone)]
struct ColumnSpec {
    present: bool,
    data_type: usize,
    nullability: usize,
}

#[derive(Debug, Clone)]
struct TableSpec {
    present: bool,
    columns: Vec<ColumnSpec>,
    reversed: bool,
    name_key: bool,
    /// Index into the tables declared before this one.
    parent: Option<usize>,
}

#[derive(Debug, Clone)]
struct SchemaSpec {
    tables: Vec<TableSpec>,
    /// Index into the present tables.
    view_over: Option<usize>,
}

fn column_spec() -> impl Strategy<Value = ColumnSpec> {
    (any::<bool>(), 0..2usize, 0..3usize).prop_map(|(present, data_type, nullability)| {
        ColumnSpec {
            present,
            data_type,
            nullability,
        }
    })
}

fn table_spec() -> impl Strategy<Value = TableSpec> {
    (
        any::<bool>(),
        prop::collection::vec(column_spec(), COLUMNS.len()),
        any::<bool>(),
        any::<bool>(),
        prop::option::of(0..2usize),
    )
        .prop_map(|(present, columns, reversed, name_key, parent)| TableSpec {
            present,
            columns,
            reversed,
            name_key,
            parent,
        })
}

fn schema_spec() -> impl Strategy<Value = SchemaSpec> {
    (
        prop::collection::vec(table_spec(), TABLES.len()),
        prop::option::of(0..3usize),
    )
        .prop_map(|(tables, view_over)| SchemaSpec { tables, view_over })
}

impl SchemaSpec {
    fn to_sql(&self) -> String {
        let mut sql = String::new();
        let mut present: Vec<&str> = Vec::new();
        for (table, spec) in TABLES.iter().zip(&self.tables) {
            if !spec.present {
                continue;
            }
            let mut elements = vec![String::from("id int PRIMARY KEY")];
            let mut extras: Vec<String> = COLUMNS
                .iter()
                .zip(&spec.columns)
                .filter(|(_, column)| column.present)
                .map(|((name, types), column)| {
                    format!(
                        "{name} {}{}",
                        types[column.data_type], NULLABILITY[column.nullability]
                    )
                })
                .collect();
            if spec.reversed {
                extras.reverse();
            }
            elements.extend(extras);
            if spec.name_key && spec.columns[0].present {
                elements.push(String::from("KEY name_idx (name)"));
            }
            if let Some(parent) = spec.parent.and_then(|p| present.get(p)) {
                elements.push(String::from("parent_id int"));
                elements.push(format!(
                    "FOREIGN KEY (parent_id) REFERENCES {parent} (id)"
                ));
            }
            let _ = writeln!(sql, "CREATE TABLE {table} ({});", elements.join(", "));
            present.push(table);
        }
        if let Some(table) = self.view_over.and_then(|v| present.get(v)) {
            let _ = writeln!(sql, "CREATE VIEW summary AS SELECT id FROM {table};");
        }
        sql
    }

    fn load(&self, hints: &DiffHints) -> Result<Schema, SchemaError> {
        let sql = self.to_sql();
        if sql.is_empty() {
            return Ok(Schema::new(hints.clone()));
        }
        Schema::from_sql_with_hints(&sql, hints.clone())
    }
}

fn hints() -> impl Strategy<Value = DiffHints> {
    (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(strict_index_ordering, rename_columns, rename_tables)| {
            let mut hints = DiffHints::new();
            hints.strict_index_ordering = strict_index_ordering;
            if rename_columns {
                hints.column_rename_strategy = ColumnRenameStrategy::Heuristic;
            }
            if rename_tables {
                hints.table_rename_strategy = TableRenameStrategy::Heuristic;
            }
            hints
        },
    )
}

// ====================================================================
// Helpers
// ====================================================================

/// Entities that `change` needs to exist before it runs.
fn used_entities(change: &Change) -> Vec<String> {
    match change {
        Change::CreateTable(create) => create
            .constraints
            .iter()
            .filter_map(ConstraintDefinition::as_foreign_key)
            .map(|fk| fk.referenced_table.clone())
            .collect(),
        Change::AlterTable(alter) => alter
            .specs
            .iter()
            .filter_map(|spec| match spec {
                AlterTableSpec::AddConstraint(constraint) => constraint
                    .as_foreign_key()
                    .map(|fk| fk.referenced_table.clone()),
                _ => None,
            })
            .collect(),
        Change::CreateView(create) => create.view.query.referenced_tables(),
        Change::AlterView(alter) => alter.view.query.referenced_tables(),
        _ => Vec::new(),
    }
}

fn created_entity(change: &Change) -> Option<&str> {
    match change {
        Change::CreateTable(create) => Some(&create.name),
        Change::CreateView(create) => Some(&create.view.name),
        Change::RenameTable { to, .. } => Some(to),
        _ => None,
    }
}

// ====================================================================
// Properties
// ====================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Loading the canonical text of a schema gives back the same schema.
    #[test]
    fn prop_normalization_is_idempotent(spec in schema_spec()) {
        let hints = DiffHints::default();
        let Ok(schema) = spec.load(&hints) else {
            return Ok(());
        };
        let canonical = schema.to_sql();
        let reloaded = reload(&canonical, &hints);
        prop_assert_eq!(reloaded.to_sql(), canonical);
        prop_assert_eq!(reloaded.entities(), schema.entities());
    }

    #[test]
    fn prop_diff_with_itself_is_empty(spec in schema_spec(), hints in hints()) {
        let Ok(schema) = spec.load(&hints) else {
            return Ok(());
        };
        let diff = schema.diff(&schema);
        prop_assert!(matches!(diff, Ok(ref d) if d.is_empty()), "{:?}", diff);
    }

    /// Applying the diff of `a` to `b` yields a schema with nothing left to
    /// change, whatever the hints.
    #[test]
    fn prop_apply_round_trip(from in schema_spec(), to in schema_spec(), hints in hints()) {
        let (Ok(from), Ok(to)) = (from.load(&hints), to.load(&hints)) else {
            return Ok(());
        };
        let changes = from.diff(&to).map(|d| d.into_ordered_changes());
        prop_assert!(changes.is_ok(), "{:?}", changes);
        let changes = changes.unwrap();

        let applied = from.apply(&changes);
        prop_assert!(applied.is_ok(), "{:?} applying {:?}", applied, labels(&changes));
        let applied = applied.unwrap();
        let rest = applied.diff(&to).map(|d| d.to_sql());
        prop_assert_eq!(rest, Ok(Vec::<String>::new()));
    }

    /// Nothing that uses a newly created entity runs before its creation.
    #[test]
    fn prop_creation_before_use(from in schema_spec(), to in schema_spec()) {
        let hints = DiffHints::default();
        let (Ok(from), Ok(to)) = (from.load(&hints), to.load(&hints)) else {
            return Ok(());
        };
        let Ok(diff) = from.diff(&to) else {
            return Ok(());
        };
        let changes = diff.ordered_changes();
        for (i, change) in changes.iter().enumerate() {
            for used in used_entities(change) {
                let created = changes
                    .iter()
                    .position(|c| created_entity(c) == Some(used.as_str()));
                if let Some(created) = created {
                    prop_assert!(
                        created < i,
                        "{} runs before it is created: {:?}",
                        used,
                        labels(changes)
                    );
                }
            }
        }
    }

    /// Every drop comes after the changes that stop using the dropped
    /// entity.
    #[test]
    fn prop_drop_after_use(from in schema_spec(), to in schema_spec()) {
        let hints = DiffHints::default();
        let (Ok(from), Ok(to)) = (from.load(&hints), to.load(&hints)) else {
            return Ok(());
        };
        let Ok(diff) = from.diff(&to) else {
            return Ok(());
        };
        let changes = diff.ordered_changes();
        for (i, change) in changes.iter().enumerate() {
            let (Change::DropTable { name, .. } | Change::DropView { name, .. }) = change else {
                continue;
            };
            for later in &changes[i + 1..] {
                let user = from.entity(later.entity_name());
                let still_used = user.is_some_and(|e| e.references().contains(&name.as_str()));
                prop_assert!(
                    !still_used,
                    "{} is dropped before {}: {:?}",
                    name,
                    later.label(),
                    labels(changes)
                );
            }
        }
    }
}

fn reload(sql: &str, hints: &DiffHints) -> Schema {
    if sql.is_empty() {
        return Schema::new(hints.clone());
    }
    Schema::from_sql_with_hints(sql, hints.clone())
        .unwrap_or_else(|e| panic!("canonical text failed to load: {e}\n{sql}"))
}
