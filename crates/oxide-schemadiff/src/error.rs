//! Error types for schema loading, validation, diffing and application.

use std::fmt;

use oxide_ddl::ParseError;

use crate::entity::EntityKind;

/// Renders a list of errors one per line, the way [`SchemaError::Invalid`]
/// and [`ApplyError::Validation`] display them.
fn bullet_list<T: fmt::Display>(errors: &[T]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A semantic rule violated by a table, a view or the schema as a whole.
///
/// Every variant names the entity it is attributed to; see
/// [`SemanticError::entity`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SemanticError {
    /// Two entities share a name (tables and views share one namespace).
    #[error("Duplicate entity name '{name}'")]
    DuplicateEntityName { name: String },

    #[error("Table '{table}' has no columns")]
    NoColumns { table: String },

    #[error("Duplicate column '{column}' in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    #[error("Duplicate key name '{key}' in table '{table}'")]
    DuplicateKeyName { table: String, key: String },

    /// A key part names a column the table does not have.
    #[error("Key '{key}' in table '{table}' references unknown column '{column}'")]
    UnknownKeyColumn {
        table: String,
        key: String,
        column: String,
    },

    #[error("Table '{table}' defines more than one primary key")]
    MultiplePrimaryKeys { table: String },

    #[error("Primary key column '{column}' in table '{table}' is declared NULL")]
    NullablePrimaryKeyColumn { table: String, column: String },

    /// Prefix length on a column type that cannot take one, a prefix longer
    /// than the column, or a BLOB/TEXT key part without a prefix.
    #[error("Invalid prefix for column '{column}' in key '{key}' of table '{table}': {reason}")]
    InvalidKeyPrefix {
        table: String,
        key: String,
        column: String,
        reason: String,
    },

    #[error("Invalid AUTO_INCREMENT column '{column}' in table '{table}': {reason}")]
    InvalidAutoIncrement {
        table: String,
        column: String,
        reason: String,
    },

    /// A generated column reads a column it may not read.
    #[error(
        "Generated column '{column}' in table '{table}' has invalid reference to '{reference}'"
    )]
    InvalidGeneratedColumnReference {
        table: String,
        column: String,
        reference: String,
    },

    #[error("Check constraint '{constraint}' in table '{table}' has invalid reference to '{column}'")]
    InvalidCheckReference {
        table: String,
        constraint: String,
        column: String,
    },

    #[error(
        "Foreign key '{constraint}' in table '{table}' references unknown table '{referenced_table}'"
    )]
    UnknownForeignKeyTable {
        table: String,
        constraint: String,
        referenced_table: String,
    },

    /// `column` is either a local column or `parent.column`.
    #[error("Foreign key '{constraint}' in table '{table}' references unknown column '{column}'")]
    UnknownForeignKeyColumn {
        table: String,
        constraint: String,
        column: String,
    },

    #[error("Foreign key '{constraint}' in table '{table}' has mismatched column counts")]
    ForeignKeyColumnCountMismatch { table: String, constraint: String },

    /// Local and referenced column types are not compatible.
    #[error(
        "Foreign key '{constraint}' in table '{table}': column '{column}' is incompatible with referenced column '{referenced_column}'"
    )]
    ForeignKeyColumnMismatch {
        table: String,
        constraint: String,
        column: String,
        referenced_column: String,
    },

    /// The referenced columns are not the leading columns of any key.
    #[error(
        "Foreign key '{constraint}' in table '{table}': no index on referenced columns of '{referenced_table}'"
    )]
    MissingForeignKeyParentIndex {
        table: String,
        constraint: String,
        referenced_table: String,
    },

    #[error("Circular foreign key dependency: {}", .tables.join(" -> "))]
    CircularForeignKey { tables: Vec<String> },

    #[error("Constraint name '{name}' is used by both '{first_table}' and '{second_table}'")]
    DuplicateConstraintName {
        name: String,
        first_table: String,
        second_table: String,
    },

    #[error("Invalid partitioning of table '{table}': {reason}")]
    InvalidPartition { table: String, reason: String },

    #[error("View '{view}' references unknown table or view '{reference}'")]
    UnknownViewReference { view: String, reference: String },

    #[error("Column '{column}' in view '{view}' is ambiguous between {}", .candidates.join(", "))]
    AmbiguousColumnReference {
        view: String,
        column: String,
        candidates: Vec<String>,
    },

    #[error("Column '{column}' in view '{view}' does not resolve to any relation")]
    InvalidColumnReference { view: String, column: String },

    #[error("Circular view reference: {}", .views.join(" -> "))]
    CircularViewReference { views: Vec<String> },

    #[error("Duplicate column '{column}' in view '{view}'")]
    DuplicateViewColumn { view: String, column: String },

    #[error("View '{view}' lists {expected} column names but its query returns {found}")]
    ViewColumnCountMismatch {
        view: String,
        expected: usize,
        found: usize,
    },
}

impl SemanticError {
    /// Name of the table or view the error is attributed to. Cycle errors
    /// report the first entity on the cycle.
    #[must_use]
    pub fn entity(&self) -> &str {
        match self {
            Self::DuplicateEntityName { name } => name,
            Self::DuplicateConstraintName { second_table, .. } => second_table,
            Self::NoColumns { table }
            | Self::DuplicateColumn { table, .. }
            | Self::DuplicateKeyName { table, .. }
            | Self::UnknownKeyColumn { table, .. }
            | Self::MultiplePrimaryKeys { table }
            | Self::NullablePrimaryKeyColumn { table, .. }
            | Self::InvalidKeyPrefix { table, .. }
            | Self::InvalidAutoIncrement { table, .. }
            | Self::InvalidGeneratedColumnReference { table, .. }
            | Self::InvalidCheckReference { table, .. }
            | Self::UnknownForeignKeyTable { table, .. }
            | Self::UnknownForeignKeyColumn { table, .. }
            | Self::ForeignKeyColumnCountMismatch { table, .. }
            | Self::ForeignKeyColumnMismatch { table, .. }
            | Self::MissingForeignKeyParentIndex { table, .. }
            | Self::InvalidPartition { table, .. } => table,
            Self::CircularForeignKey { tables } => tables.first().map_or("", String::as_str),
            Self::CircularViewReference { views } => views.first().map_or("", String::as_str),
            Self::UnknownViewReference { view, .. }
            | Self::AmbiguousColumnReference { view, .. }
            | Self::InvalidColumnReference { view, .. }
            | Self::DuplicateViewColumn { view, .. }
            | Self::ViewColumnCountMismatch { view, .. } => view,
        }
    }
}

/// A dependency cycle, carrying every node on it in traversal order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Dependency cycle: {}", .path.join(" -> "))]
pub struct CycleError {
    pub path: Vec<String>,
}

/// Errors while computing a diff between two schemas.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// The rename heuristic matched an entity to more than one candidate.
    #[error("Conflicting rename candidates for '{entity}': {}", .candidates.join(", "))]
    ConflictingRename {
        entity: String,
        candidates: Vec<String>,
    },

    /// The changes cannot be ordered.
    #[error("Cannot order changes: {0}")]
    Cycle(#[from] CycleError),
}

/// Errors while applying changes to a schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    #[error("Entity '{name}' does not exist")]
    AlterNonexistentEntity { name: String },

    #[error("Entity '{name}' already exists")]
    EntityExists { name: String },

    #[error("'{name}' is not a {expected}")]
    WrongEntityKind { name: String, expected: EntityKind },

    /// A created or altered entity refers to a table or view that is missing.
    #[error("'{entity}' references missing entity '{reference}'")]
    MissingReference { entity: String, reference: String },

    #[error("Cannot drop '{name}': still referenced by {}", .dependents.join(", "))]
    EntityHasDependents {
        name: String,
        dependents: Vec<String>,
    },

    #[error("Column '{column}' already exists in table '{table}'")]
    AddDuplicateColumn { table: String, column: String },

    #[error("Column '{column}' does not exist in table '{table}'")]
    UnknownColumn { table: String, column: String },

    /// The column is a local or referenced column of a foreign key.
    #[error(
        "Cannot drop column '{column}' of table '{table}': used by foreign key '{constraint}' of table '{referencing_table}'"
    )]
    DropColumnReferencedByForeignKey {
        table: String,
        column: String,
        constraint: String,
        referencing_table: String,
    },

    #[error("Key '{key}' already exists in table '{table}'")]
    DuplicateKey { table: String, key: String },

    #[error("Key '{key}' does not exist in table '{table}'")]
    DropNonexistentKey { table: String, key: String },

    #[error("Constraint '{constraint}' already exists in table '{table}'")]
    DuplicateConstraint { table: String, constraint: String },

    #[error("Constraint '{constraint}' does not exist in table '{table}'")]
    NonexistentConstraint { table: String, constraint: String },

    #[error("Partition '{partition}' already exists in table '{table}'")]
    DuplicatePartition { table: String, partition: String },

    #[error("Partition '{partition}' does not exist in table '{table}'")]
    NonexistentPartition { table: String, partition: String },

    #[error("Invalid partition operation on table '{table}': {reason}")]
    InvalidPartitionOperation { table: String, reason: String },

    /// The batch applied cleanly but the resulting schema is invalid.
    #[error("Resulting schema is invalid:\n{}", bullet_list(.0))]
    Validation(Vec<SemanticError>),
}

/// Errors while building a schema from statements.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    /// Surfaced unchanged from the parser.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// The statement kind cannot appear where it was given.
    #[error("Unsupported statement: {kind}")]
    UnsupportedStatement { kind: &'static str },

    /// A multi-target statement was converted into a single change.
    #[error("{kind} names {count} entities; expected exactly one")]
    MultipleTargets { kind: &'static str, count: usize },

    #[error("Schema is invalid:\n{}", bullet_list(.0))]
    Invalid(Vec<SemanticError>),
}

impl SchemaError {
    /// The semantic errors, if this is a validation failure.
    #[must_use]
    pub fn semantic_errors(&self) -> &[SemanticError] {
        match self {
            Self::Invalid(errors) => errors,
            _ => &[],
        }
    }
}

/// Any error produced by this crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Diff(#[from] DiffError),

    #[error(transparent)]
    Apply(#[from] ApplyError),

    #[error(transparent)]
    Cycle(#[from] CycleError),
}

impl From<ParseError> for Error {
    fn from(error: ParseError) -> Self {
        Self::Schema(SchemaError::Parse(error))
    }
}

/// Result type for schema operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_schema_lists_every_error() {
        let error = SchemaError::Invalid(vec![
            SemanticError::DuplicateColumn {
                table: "t".into(),
                column: "title".into(),
            },
            SemanticError::UnknownKeyColumn {
                table: "t".into(),
                key: "PRIMARY".into(),
                column: "val".into(),
            },
        ]);
        assert_eq!(
            error.to_string(),
            "Schema is invalid:\n  - Duplicate column 'title' in table 't'\n  - Key 'PRIMARY' in table 't' references unknown column 'val'"
        );
        assert_eq!(error.semantic_errors().len(), 2);
    }

    #[test]
    fn test_cycle_error_names_path() {
        let error = CycleError {
            path: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(error.to_string(), "Dependency cycle: a -> b -> a");
        let diff: DiffError = error.into();
        assert!(matches!(diff, DiffError::Cycle(_)));
    }

    #[test]
    fn test_entity_attribution() {
        let error = SemanticError::CircularViewReference {
            views: vec!["v1".into(), "v2".into(), "v1".into()],
        };
        assert_eq!(error.entity(), "v1");
        let error = SemanticError::AmbiguousColumnReference {
            view: "v".into(),
            column: "id".into(),
            candidates: vec!["a".into(), "b".into()],
        };
        assert_eq!(error.entity(), "v");
        assert_eq!(
            error.to_string(),
            "Column 'id' in view 'v' is ambiguous between a, b"
        );
    }
}
