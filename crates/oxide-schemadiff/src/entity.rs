//! Tables and views as a schema holds them.
//!
//! Entities are always in canonical form: they can only be built through
//! normalization, and they cache their canonical text so that comparing two
//! unchanged entities is a string comparison.

use std::fmt;
use std::sync::Arc;

use oxide_ddl::ast::{
    ColumnDefinition, ConstraintDefinition, ConstraintKind, CreateTableStatement,
    CreateViewStatement,
    ForeignKeyDefinition, IndexDefinition, PartitionSpec, SelectStatement, Statement,
    TableOptions, ViewDefinition,
};

use crate::hints::DiffHints;
use crate::normalize::{fold_identifier, normalize_table, normalize_view};

/// Kind of a schema entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Table,
    View,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Table => "table",
            Self::View => "view",
        })
    }
}

// ===========================================================================
// Table
// ===========================================================================

/// A normalized table definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    statement: CreateTableStatement,
    sql: String,
}

impl Table {
    /// Normalizes `statement` into a table.
    #[must_use]
    pub fn new(statement: &CreateTableStatement, hints: &DiffHints) -> Self {
        Self::from_normalized(normalize_table(statement, hints))
    }

    /// Wraps a statement that is already in canonical form.
    pub(crate) fn from_normalized(statement: CreateTableStatement) -> Self {
        let sql = statement.to_string();
        Self { statement, sql }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.statement.name
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.statement.columns
    }

    /// Looks a column up by name, case-insensitively.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        let name = fold_identifier(name);
        self.statement.columns.iter().find(|c| c.name == name)
    }

    /// Keys in declaration order, primary key first.
    #[must_use]
    pub fn keys(&self) -> &[IndexDefinition] {
        &self.statement.indexes
    }

    /// Looks a key up by name. The primary key is named `PRIMARY`.
    #[must_use]
    pub fn key(&self, name: &str) -> Option<&IndexDefinition> {
        self.statement.indexes.iter().find(|k| {
            k.name
                .as_deref()
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
        })
    }

    #[must_use]
    pub fn primary_key(&self) -> Option<&IndexDefinition> {
        self.statement.indexes.iter().find(|k| k.is_primary())
    }

    #[must_use]
    pub fn constraints(&self) -> &[ConstraintDefinition] {
        &self.statement.constraints
    }

    /// Foreign keys with their names.
    pub fn foreign_keys(&self) -> impl Iterator<Item = (&str, &ForeignKeyDefinition)> {
        self.statement.constraints.iter().filter_map(|c| {
            c.as_foreign_key()
                .map(|fk| (c.name.as_deref().unwrap_or_default(), fk))
        })
    }

    /// Check constraints.
    pub fn checks(&self) -> impl Iterator<Item = &ConstraintDefinition> {
        self.statement
            .constraints
            .iter()
            .filter(|c| c.as_check().is_some())
    }

    #[must_use]
    pub const fn options(&self) -> &TableOptions {
        &self.statement.options
    }

    #[must_use]
    pub const fn partition(&self) -> Option<&PartitionSpec> {
        self.statement.partition.as_ref()
    }

    /// Tables this table's foreign keys point to, excluding itself, in
    /// declaration order.
    #[must_use]
    pub fn references(&self) -> Vec<&str> {
        let mut parents: Vec<&str> = Vec::new();
        for (_, fk) in self.foreign_keys() {
            let parent = fk.referenced_table.as_str();
            if parent != self.name() && !parents.contains(&parent) {
                parents.push(parent);
            }
        }
        parents
    }

    /// This table under another name, as `RENAME TABLE` leaves it:
    /// self-referencing foreign keys follow the table and engine-assigned
    /// constraint names (`<table>_ibfk_<n>`, `<table>_chk_<n>`) take the
    /// new prefix.
    #[must_use]
    pub fn renamed(&self, to: &str) -> Self {
        let old = self.statement.name.as_str();
        let new = fold_identifier(to);
        let mut statement = self.statement.clone();
        for constraint in &mut statement.constraints {
            if let ConstraintKind::ForeignKey(fk) = &mut constraint.kind {
                if fk.referenced_table == old {
                    fk.referenced_table.clone_from(&new);
                }
            }
            if let Some(name) = &mut constraint.name {
                let generated = ["_ibfk_", "_chk_"].iter().find_map(|infix| {
                    name.strip_prefix(&format!("{old}{infix}"))
                        .map(|suffix| format!("{new}{infix}{suffix}"))
                });
                if let Some(generated) = generated {
                    *name = generated;
                }
            }
        }
        statement.name = new;
        Self::from_normalized(statement)
    }

    /// This table with foreign keys to `from` pointing at `to` instead.
    #[must_use]
    pub(crate) fn with_parent_renamed(&self, from: &str, to: &str) -> Self {
        let mut statement = self.statement.clone();
        for constraint in &mut statement.constraints {
            if let ConstraintKind::ForeignKey(fk) = &mut constraint.kind {
                if fk.referenced_table == from {
                    fk.referenced_table = to.to_string();
                }
            }
        }
        Self::from_normalized(statement)
    }

    /// Whether any foreign key of this table points at `table`.
    #[must_use]
    pub fn references_table(&self, table: &str) -> bool {
        self.foreign_keys().any(|(_, fk)| fk.referenced_table == table)
    }

    /// The canonical `CREATE TABLE` statement.
    #[must_use]
    pub const fn statement(&self) -> &CreateTableStatement {
        &self.statement
    }

    /// Canonical text of the table.
    #[must_use]
    pub fn to_sql(&self) -> &str {
        &self.sql
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

// ===========================================================================
// View
// ===========================================================================

/// A normalized view definition.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    definition: ViewDefinition,
    sql: String,
    references: Vec<String>,
}

impl View {
    /// Normalizes `definition` into a view.
    #[must_use]
    pub fn new(definition: &ViewDefinition) -> Self {
        Self::from_normalized(normalize_view(definition))
    }

    pub(crate) fn from_normalized(definition: ViewDefinition) -> Self {
        let references = definition.query.referenced_tables();
        let sql = CreateViewStatement {
            or_replace: false,
            view: definition.clone(),
        }
        .to_string();
        Self {
            definition,
            sql,
            references,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    #[must_use]
    pub const fn definition(&self) -> &ViewDefinition {
        &self.definition
    }

    #[must_use]
    pub const fn query(&self) -> &SelectStatement {
        &self.definition.query
    }

    /// Explicit column-name list; empty when the query names the columns.
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.definition.columns
    }

    /// Tables and views read by the query, in first-seen order.
    #[must_use]
    pub fn references(&self) -> &[String] {
        &self.references
    }

    /// The canonical `CREATE VIEW` statement.
    #[must_use]
    pub fn statement(&self) -> CreateViewStatement {
        CreateViewStatement {
            or_replace: false,
            view: self.definition.clone(),
        }
    }

    #[must_use]
    pub fn to_sql(&self) -> &str {
        &self.sql
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

// ===========================================================================
// Entity
// ===========================================================================

/// A table or a view. Cloning shares the underlying definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Table(Arc<Table>),
    View(Arc<View>),
}

impl Entity {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Table(table) => table.name(),
            Self::View(view) => view.name(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Table(_) => EntityKind::Table,
            Self::View(_) => EntityKind::View,
        }
    }

    /// Entities this one depends on: foreign key parents for a table, read
    /// relations for a view.
    #[must_use]
    pub fn references(&self) -> Vec<&str> {
        match self {
            Self::Table(table) => table.references(),
            Self::View(view) => view.references().iter().map(String::as_str).collect(),
        }
    }

    #[must_use]
    pub fn as_table(&self) -> Option<&Arc<Table>> {
        match self {
            Self::Table(table) => Some(table),
            Self::View(_) => None,
        }
    }

    #[must_use]
    pub fn as_view(&self) -> Option<&Arc<View>> {
        match self {
            Self::View(view) => Some(view),
            Self::Table(_) => None,
        }
    }

    /// The statement that creates this entity.
    #[must_use]
    pub fn create_statement(&self) -> Statement {
        match self {
            Self::Table(table) => Statement::CreateTable(table.statement().clone()),
            Self::View(view) => Statement::CreateView(view.statement()),
        }
    }

    /// Canonical text of the entity.
    #[must_use]
    pub fn to_sql(&self) -> &str {
        match self {
            Self::Table(table) => table.to_sql(),
            Self::View(view) => view.to_sql(),
        }
    }
}

impl From<Table> for Entity {
    fn from(table: Table) -> Self {
        Self::Table(Arc::new(table))
    }
}

impl From<View> for Entity {
    fn from(view: View) -> Self {
        Self::View(Arc::new(view))
    }
}
