//! Schema changes.
//!
//! A change is one DDL statement against one entity. Changes are what the
//! differ produces and what the applier consumes; each renders to the
//! canonical SQL of the statement it wraps.

use std::fmt;

use oxide_ddl::ast::{
    AlterTableStatement, AlterViewStatement, CreateTableStatement, CreateViewStatement,
    DropTableStatement, DropViewStatement, RenameTableStatement, Statement,
};
use oxide_ddl::parse_statements;

use crate::entity::EntityKind;
use crate::error::SchemaError;

/// A single change to a schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Create a new table.
    CreateTable(CreateTableStatement),
    /// Alter an existing table.
    AlterTable(AlterTableStatement),
    /// Drop a table.
    DropTable { name: String, if_exists: bool },
    /// Rename a table.
    RenameTable { from: String, to: String },
    /// Create a view, or replace it with `OR REPLACE`.
    CreateView(CreateViewStatement),
    /// Redefine an existing view.
    AlterView(AlterViewStatement),
    /// Drop a view.
    DropView { name: String, if_exists: bool },
}

impl Change {
    /// Creates a drop table change.
    #[must_use]
    pub fn drop_table(name: impl Into<String>) -> Self {
        Self::DropTable {
            name: name.into(),
            if_exists: false,
        }
    }

    /// Creates a drop view change.
    #[must_use]
    pub fn drop_view(name: impl Into<String>) -> Self {
        Self::DropView {
            name: name.into(),
            if_exists: false,
        }
    }

    /// Creates a rename table change.
    #[must_use]
    pub fn rename_table(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::RenameTable {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Name of the entity the change acts on. For a rename this is the
    /// current name.
    #[must_use]
    pub fn entity_name(&self) -> &str {
        match self {
            Self::CreateTable(create) => &create.name,
            Self::AlterTable(alter) => &alter.table,
            Self::DropTable { name, .. } | Self::DropView { name, .. } => name,
            Self::RenameTable { from, .. } => from,
            Self::CreateView(create) => &create.view.name,
            Self::AlterView(alter) => &alter.view.name,
        }
    }

    /// Kind of the entity the change acts on.
    #[must_use]
    pub const fn entity_kind(&self) -> EntityKind {
        match self {
            Self::CreateTable(_)
            | Self::AlterTable(_)
            | Self::DropTable { .. }
            | Self::RenameTable { .. } => EntityKind::Table,
            Self::CreateView(_) | Self::AlterView(_) | Self::DropView { .. } => EntityKind::View,
        }
    }

    /// Statement keyword(s) of the change.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::CreateTable(_) => "CREATE TABLE",
            Self::AlterTable(_) => "ALTER TABLE",
            Self::DropTable { .. } => "DROP TABLE",
            Self::RenameTable { .. } => "RENAME TABLE",
            Self::CreateView(_) => "CREATE VIEW",
            Self::AlterView(_) => "ALTER VIEW",
            Self::DropView { .. } => "DROP VIEW",
        }
    }

    /// Base position of the change kind when nothing else orders two
    /// changes: renames, table creates, table alters, view creates, view
    /// alters, view drops, table drops.
    pub(crate) const fn rank(&self) -> u8 {
        match self {
            Self::RenameTable { .. } => 0,
            Self::CreateTable(_) => 1,
            Self::AlterTable(_) => 2,
            Self::CreateView(_) => 3,
            Self::AlterView(_) => 4,
            Self::DropView { .. } => 5,
            Self::DropTable { .. } => 6,
        }
    }

    /// Short description naming the change, e.g. `ALTER TABLE t`.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::RenameTable { from, to } => format!("RENAME TABLE {from} TO {to}"),
            other => format!("{} {}", other.kind_name(), other.entity_name()),
        }
    }

    /// The statement this change wraps.
    #[must_use]
    pub fn to_statement(&self) -> Statement {
        match self {
            Self::CreateTable(create) => Statement::CreateTable(create.clone()),
            Self::AlterTable(alter) => Statement::AlterTable(alter.clone()),
            Self::DropTable { name, if_exists } => Statement::DropTable(DropTableStatement {
                names: vec![name.clone()],
                if_exists: *if_exists,
            }),
            Self::RenameTable { from, to } => Statement::RenameTable(RenameTableStatement {
                renames: vec![(from.clone(), to.clone())],
            }),
            Self::CreateView(create) => Statement::CreateView(create.clone()),
            Self::AlterView(alter) => Statement::AlterView(alter.clone()),
            Self::DropView { name, if_exists } => Statement::DropView(DropViewStatement {
                names: vec![name.clone()],
                if_exists: *if_exists,
            }),
        }
    }

    /// Canonical SQL of the change, without a trailing semicolon.
    #[must_use]
    pub fn to_sql(&self) -> String {
        self.to_statement().to_string()
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_statement())
    }
}

impl TryFrom<Statement> for Change {
    type Error = SchemaError;

    /// Converts a statement naming exactly one entity.
    fn try_from(statement: Statement) -> Result<Self, Self::Error> {
        let kind = statement.kind_name();
        let mut changes = changes_from_statement(statement)?;
        match changes.len() {
            1 => Ok(changes.remove(0)),
            count => Err(SchemaError::MultipleTargets { kind, count }),
        }
    }
}

/// Converts a statement into changes, one per entity it names.
///
/// # Errors
///
/// `SELECT` is not a change and yields
/// [`SchemaError::UnsupportedStatement`].
pub fn changes_from_statement(statement: Statement) -> Result<Vec<Change>, SchemaError> {
    Ok(match statement {
        Statement::CreateTable(create) => vec![Change::CreateTable(create)],
        Statement::AlterTable(alter) => vec![Change::AlterTable(alter)],
        Statement::CreateView(create) => vec![Change::CreateView(create)],
        Statement::AlterView(alter) => vec![Change::AlterView(alter)],
        Statement::DropTable(drop) => drop
            .names
            .into_iter()
            .map(|name| Change::DropTable {
                name,
                if_exists: drop.if_exists,
            })
            .collect(),
        Statement::DropView(drop) => drop
            .names
            .into_iter()
            .map(|name| Change::DropView {
                name,
                if_exists: drop.if_exists,
            })
            .collect(),
        Statement::RenameTable(rename) => rename
            .renames
            .into_iter()
            .map(|(from, to)| Change::RenameTable { from, to })
            .collect(),
        other @ Statement::Select(_) => {
            return Err(SchemaError::UnsupportedStatement {
                kind: other.kind_name(),
            })
        }
    })
}

/// Parses a batch of DDL statements into changes, in order.
///
/// # Errors
///
/// Returns parse errors unchanged, and [`SchemaError::UnsupportedStatement`]
/// for statements that are not changes.
pub fn changes_from_sql(sql: &str) -> Result<Vec<Change>, SchemaError> {
    let mut changes = Vec::new();
    for statement in parse_statements(sql)? {
        changes.extend(changes_from_statement(statement)?);
    }
    Ok(changes)
}

#[cfg(test)]
mod tests {
    use oxide_ddl::parse_statement;

    use super::*;

    #[test]
    fn test_multi_target_statements_split() {
        let changes =
            changes_from_sql("drop table if exists a, b; rename table c to d, e to f").unwrap();
        assert_eq!(
            changes,
            vec![
                Change::DropTable {
                    name: "a".into(),
                    if_exists: true
                },
                Change::DropTable {
                    name: "b".into(),
                    if_exists: true
                },
                Change::rename_table("c", "d"),
                Change::rename_table("e", "f"),
            ]
        );
        assert_eq!(changes[1].to_sql(), "DROP TABLE IF EXISTS b");
        assert_eq!(changes[2].label(), "RENAME TABLE c TO d");
        assert_eq!(changes[3].entity_name(), "e");
    }

    #[test]
    fn test_try_from_requires_single_target() {
        let statement = parse_statement("drop view v1, v2").unwrap();
        assert_eq!(
            Change::try_from(statement),
            Err(SchemaError::MultipleTargets {
                kind: "DROP VIEW",
                count: 2
            })
        );
        let statement = parse_statement("select 1").unwrap();
        assert_eq!(
            Change::try_from(statement),
            Err(SchemaError::UnsupportedStatement { kind: "SELECT" })
        );
    }

    #[test]
    fn test_change_text_and_kind() {
        let change =
            Change::try_from(parse_statement("alter table t drop column a, add key (b)").unwrap())
                .unwrap();
        assert_eq!(change.to_string(), "ALTER TABLE t DROP COLUMN a, ADD KEY (b)");
        assert_eq!(change.label(), "ALTER TABLE t");
        assert_eq!(change.entity_kind(), EntityKind::Table);
        assert_eq!(Change::drop_view("v").entity_kind(), EntityKind::View);
        assert!(Change::rename_table("a", "b").rank() < Change::drop_table("a").rank());
    }
}
