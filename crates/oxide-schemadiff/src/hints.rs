//! Diff hints: policy for the choices a schema diff cannot make on its own.
//!
//! Every field has a documented default, and [`DiffHints::default`] is the
//! strictest interpretation. Hints are plain data and derive serde so hosts
//! can load them from configuration files:
//!
//! ```rust
//! use oxide_schemadiff::{ColumnRenameStrategy, DiffHints};
//!
//! let hints = DiffHints::new().with_column_rename_strategy(ColumnRenameStrategy::Heuristic);
//! assert!(hints.preserve_boolean_display_width);
//! ```

use serde::{Deserialize, Serialize};

/// How to treat `AUTO_INCREMENT=n` table option differences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoIncrementStrategy {
    /// Never emit a change for the counter value.
    #[default]
    Ignore,
    /// Emit the target value whenever it differs.
    Apply,
    /// Emit the target value only when it is higher than the current one.
    ApplyHigher,
}

/// How to treat constraint name differences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintNamesStrategy {
    /// Constraints are matched by name.
    #[default]
    Strict,
    /// Constraints are matched by definition; names are ignored.
    IgnoreAll,
}

/// How to treat table and column comment differences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentStrategy {
    #[default]
    Strict,
    Ignore,
}

/// What to emit when a RANGE-partitioned table only rotates partitions
/// (drops leading ones and/or appends trailing ones).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeRotationStrategy {
    /// Re-specify the complete `PARTITION BY` clause.
    #[default]
    FullSpec,
    /// One `DROP PARTITION` / `ADD PARTITION` per rotated partition.
    DistinctStatements,
    /// Emit nothing for a rotation.
    Ignore,
}

/// Whether a dropped and an added column may be reported as a rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRenameStrategy {
    #[default]
    AssumeDifferent,
    /// Same definition at the same position becomes `RENAME COLUMN`.
    Heuristic,
}

/// Whether a dropped and a created table may be reported as a rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableRenameStrategy {
    #[default]
    AssumeDifferent,
    /// Identical definitions under different names become `RENAME TABLE`.
    Heuristic,
}

/// How to compare table-level charset and collation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharsetCollateStrategy {
    #[default]
    Strict,
    /// Ignore the difference when either side leaves the option unset.
    IgnoreEmpty,
    IgnoreAlways,
}

/// Scope within which key names must be unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyNameScope {
    #[default]
    Table,
    Schema,
}

/// Options consulted by normalization, validation, diffing and application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffHints {
    pub auto_increment_strategy: AutoIncrementStrategy,
    pub constraint_names_strategy: ConstraintNamesStrategy,
    pub comment_strategy: CommentStrategy,
    /// Treat a different key order as a change.
    pub strict_index_ordering: bool,
    pub range_rotation_strategy: RangeRotationStrategy,
    pub column_rename_strategy: ColumnRenameStrategy,
    pub table_rename_strategy: TableRenameStrategy,
    pub table_charset_collate_strategy: CharsetCollateStrategy,
    /// Keep the `(1)` display width of `tinyint(1)` (boolean) columns.
    pub preserve_boolean_display_width: bool,
    pub key_name_scope: KeyNameScope,
}

impl Default for DiffHints {
    fn default() -> Self {
        Self {
            auto_increment_strategy: AutoIncrementStrategy::default(),
            constraint_names_strategy: ConstraintNamesStrategy::default(),
            comment_strategy: CommentStrategy::default(),
            strict_index_ordering: false,
            range_rotation_strategy: RangeRotationStrategy::default(),
            column_rename_strategy: ColumnRenameStrategy::default(),
            table_rename_strategy: TableRenameStrategy::default(),
            table_charset_collate_strategy: CharsetCollateStrategy::default(),
            preserve_boolean_display_width: true,
            key_name_scope: KeyNameScope::default(),
        }
    }
}

impl DiffHints {
    /// Creates the default hints.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_auto_increment_strategy(mut self, strategy: AutoIncrementStrategy) -> Self {
        self.auto_increment_strategy = strategy;
        self
    }

    #[must_use]
    pub const fn with_constraint_names_strategy(
        mut self,
        strategy: ConstraintNamesStrategy,
    ) -> Self {
        self.constraint_names_strategy = strategy;
        self
    }

    #[must_use]
    pub const fn with_comment_strategy(mut self, strategy: CommentStrategy) -> Self {
        self.comment_strategy = strategy;
        self
    }

    #[must_use]
    pub const fn with_strict_index_ordering(mut self, strict: bool) -> Self {
        self.strict_index_ordering = strict;
        self
    }

    #[must_use]
    pub const fn with_range_rotation_strategy(mut self, strategy: RangeRotationStrategy) -> Self {
        self.range_rotation_strategy = strategy;
        self
    }

    #[must_use]
    pub const fn with_column_rename_strategy(mut self, strategy: ColumnRenameStrategy) -> Self {
        self.column_rename_strategy = strategy;
        self
    }

    #[must_use]
    pub const fn with_table_rename_strategy(mut self, strategy: TableRenameStrategy) -> Self {
        self.table_rename_strategy = strategy;
        self
    }

    #[must_use]
    pub const fn with_table_charset_collate_strategy(
        mut self,
        strategy: CharsetCollateStrategy,
    ) -> Self {
        self.table_charset_collate_strategy = strategy;
        self
    }

    #[must_use]
    pub const fn with_preserve_boolean_display_width(mut self, preserve: bool) -> Self {
        self.preserve_boolean_display_width = preserve;
        self
    }

    #[must_use]
    pub const fn with_key_name_scope(mut self, scope: KeyNameScope) -> Self {
        self.key_name_scope = scope;
        self
    }
}
