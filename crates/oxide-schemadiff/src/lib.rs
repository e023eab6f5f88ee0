//! # oxide-schemadiff
//!
//! In-memory MySQL schema engine built on `oxide-ddl`.
//!
//! A [`Schema`] is a validated set of tables and views loaded from
//! `CREATE` statements. Every entity is normalized on the way in so that
//! two definitions MySQL would store identically compare equal. On top of
//! that the crate provides:
//!
//! - **Validation** - semantic rules for tables, views, foreign keys and
//!   the schema as a whole ([`SemanticError`])
//! - **Dependency graph** - foreign key and view references, with creation
//!   and drop orders ([`DependencyGraph`])
//! - **Diff** - ordered [`Change`]s that turn one schema into another,
//!   tuned by [`DiffHints`]
//! - **Apply** - changes applied to a schema produce a new schema, or an
//!   [`ApplyError`] without touching the input
//!
//! # Example
//!
//! ```rust
//! use oxide_schemadiff::Schema;
//!
//! let from = Schema::from_sql("CREATE TABLE t (id int PRIMARY KEY)").unwrap();
//! let to = Schema::from_sql(
//!     "CREATE TABLE t (id int PRIMARY KEY, name varchar(32) NOT NULL)",
//! )
//! .unwrap();
//!
//! let diff = from.diff(&to).unwrap();
//! assert_eq!(
//!     diff.to_sql(),
//!     vec!["ALTER TABLE t ADD COLUMN name varchar(32) NOT NULL"]
//! );
//!
//! let applied = from.apply(diff.ordered_changes()).unwrap();
//! assert!(applied.diff(&to).unwrap().is_empty());
//! ```

pub mod apply;
pub mod change;
pub mod diff;
pub mod entity;
pub mod error;
pub mod graph;
pub mod hints;
pub mod normalize;
pub mod schema;
pub mod validate;

pub use apply::apply;
pub use change::{changes_from_sql, changes_from_statement, Change};
pub use diff::{diff_schemas, diff_tables, diff_tables_structural, diff_views, SchemaDiff};
pub use entity::{Entity, EntityKind, Table, View};
pub use error::{
    ApplyError, CycleError, DiffError, Error, Result, SchemaError, SemanticError,
};
pub use graph::{DependencyGraph, Direction};
pub use hints::{
    AutoIncrementStrategy, CharsetCollateStrategy, ColumnRenameStrategy, CommentStrategy,
    ConstraintNamesStrategy, DiffHints, KeyNameScope, RangeRotationStrategy,
    TableRenameStrategy,
};
pub use schema::Schema;
pub use validate::validate_table;
