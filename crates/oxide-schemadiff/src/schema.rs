//! The schema: every table and view, with the hints they were normalized
//! under.

use std::sync::Arc;

use oxide_ddl::ast::Statement;
use oxide_ddl::parse_statements;
use tracing::debug;

use crate::apply::apply;
use crate::change::Change;
use crate::diff::{diff_schemas, SchemaDiff};
use crate::entity::{Entity, Table, View};
use crate::error::{ApplyError, CycleError, DiffError, SchemaError, SemanticError};
use crate::graph::{DependencyGraph, Direction};
use crate::hints::DiffHints;
use crate::normalize::fold_identifier;
use crate::validate::validate;

/// A validated set of tables and views.
///
/// A schema is immutable: applying changes produces a new schema that shares
/// every untouched entity with this one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    entities: Vec<Entity>,
    hints: DiffHints,
}

impl Schema {
    /// An empty schema.
    #[must_use]
    pub fn new(hints: DiffHints) -> Self {
        Self {
            entities: Vec::new(),
            hints,
        }
    }

    /// Builds a schema from `CREATE TABLE` and `CREATE VIEW` statements.
    ///
    /// # Errors
    ///
    /// Fails on any other statement kind, and with every semantic error of
    /// the first failing validation stage when the batch is invalid.
    pub fn from_statements(
        statements: impl IntoIterator<Item = Statement>,
    ) -> Result<Self, SchemaError> {
        Self::from_statements_with_hints(statements, DiffHints::default())
    }

    /// Like [`Schema::from_statements`], normalizing under `hints`.
    ///
    /// # Errors
    ///
    /// See [`Schema::from_statements`].
    pub fn from_statements_with_hints(
        statements: impl IntoIterator<Item = Statement>,
        hints: DiffHints,
    ) -> Result<Self, SchemaError> {
        let mut entities = Vec::new();
        for statement in statements {
            let entity = match statement {
                Statement::CreateTable(table) => Entity::from(Table::new(&table, &hints)),
                Statement::CreateView(view) => Entity::from(View::new(&view.view)),
                other => {
                    return Err(SchemaError::UnsupportedStatement {
                        kind: other.kind_name(),
                    })
                }
            };
            entities.push(entity);
        }
        let schema = Self { entities, hints };
        let errors = schema.validate();
        if !errors.is_empty() {
            return Err(SchemaError::Invalid(errors));
        }
        debug!(entities = schema.entities.len(), "schema loaded");
        Ok(schema)
    }

    /// Parses a batch of statements and builds a schema from them.
    ///
    /// # Errors
    ///
    /// Parse errors are returned unchanged; see also
    /// [`Schema::from_statements`].
    pub fn from_sql(sql: &str) -> Result<Self, SchemaError> {
        Self::from_sql_with_hints(sql, DiffHints::default())
    }

    /// Like [`Schema::from_sql`], normalizing under `hints`.
    ///
    /// # Errors
    ///
    /// See [`Schema::from_sql`].
    pub fn from_sql_with_hints(sql: &str, hints: DiffHints) -> Result<Self, SchemaError> {
        Self::from_statements_with_hints(parse_statements(sql)?, hints)
    }

    /// Wraps entities without validating them.
    pub(crate) const fn from_entities(entities: Vec<Entity>, hints: DiffHints) -> Self {
        Self { entities, hints }
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// Entities in declaration order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Looks an entity up by name, case-insensitively.
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        let name = fold_identifier(name);
        self.entities.iter().find(|e| e.name() == name)
    }

    #[must_use]
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.entity(name)
            .and_then(Entity::as_table)
            .map(Arc::as_ref)
    }

    #[must_use]
    pub fn view(&self, name: &str) -> Option<&View> {
        self.entity(name).and_then(Entity::as_view).map(Arc::as_ref)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.entities
            .iter()
            .filter_map(Entity::as_table)
            .map(Arc::as_ref)
    }

    pub fn views(&self) -> impl Iterator<Item = &View> {
        self.entities
            .iter()
            .filter_map(Entity::as_view)
            .map(Arc::as_ref)
    }

    #[must_use]
    pub const fn hints(&self) -> &DiffHints {
        &self.hints
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Semantic errors of this schema; empty when valid.
    #[must_use]
    pub fn validate(&self) -> Vec<SemanticError> {
        validate(self)
    }

    /// Graph of foreign key and view references between entities present
    /// in the schema, nodes in declaration order.
    #[must_use]
    pub fn dependency_graph(&self) -> DependencyGraph<String> {
        let mut graph = DependencyGraph::new();
        for entity in &self.entities {
            graph.add_node(entity.name().to_string());
        }
        for entity in &self.entities {
            for reference in entity.references() {
                if self.entity(reference).is_some() {
                    graph.add_dependency(entity.name().to_string(), reference.to_string());
                }
            }
        }
        graph
    }

    /// Entities ordered so that every entity comes after the ones it
    /// references; unrelated entities keep declaration order.
    ///
    /// # Errors
    ///
    /// Returns the cycle when references are circular.
    pub fn creation_order(&self) -> Result<Vec<&Entity>, CycleError> {
        Ok(self
            .dependency_graph()
            .topological_order(Direction::Create)?
            .iter()
            .filter_map(|name| self.entity(name))
            .collect())
    }

    /// Canonical `CREATE` statements for every entity in creation order,
    /// each terminated by `;` and a newline.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let ordered = self
            .creation_order()
            .unwrap_or_else(|_| self.entities.iter().collect());
        ordered
            .iter()
            .map(|entity| format!("{};\n", entity.to_sql()))
            .collect()
    }

    /// Applies `changes` in order; see [`apply`].
    ///
    /// # Errors
    ///
    /// See [`apply`].
    pub fn apply(&self, changes: &[Change]) -> Result<Self, ApplyError> {
        apply(self, changes)
    }

    /// Changes that turn this schema into `target`, under this schema's
    /// hints.
    ///
    /// # Errors
    ///
    /// See [`diff_schemas`].
    pub fn diff(&self, target: &Self) -> Result<SchemaDiff, DiffError> {
        diff_schemas(self, target, &self.hints)
    }
}
