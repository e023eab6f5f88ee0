//! Data definition statements: tables, views and their parts.

use super::{DataType, Expr, OrderDirection, SelectStatement};

/// Storage of a generated column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeneratedStorage {
    #[default]
    Virtual,
    Stored,
}

impl GeneratedStorage {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Virtual => "VIRTUAL",
            Self::Stored => "STORED",
        }
    }
}

/// `GENERATED ALWAYS AS (expr) [VIRTUAL | STORED]`.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedColumn {
    pub expr: Expr,
    pub storage: GeneratedStorage,
}

/// A column definition inside CREATE TABLE or ALTER TABLE.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: DataType,
    /// `Some(false)` for `NOT NULL`, `Some(true)` for an explicit `NULL`.
    pub nullable: Option<bool>,
    pub default: Option<Expr>,
    pub on_update: Option<Expr>,
    pub auto_increment: bool,
    /// Inline `PRIMARY KEY` attribute.
    pub primary_key: bool,
    /// Inline `UNIQUE [KEY]` attribute.
    pub unique: bool,
    pub generated: Option<GeneratedColumn>,
    pub invisible: bool,
    pub comment: Option<String>,
    pub charset: Option<String>,
    pub collation: Option<String>,
    /// Inline `CHECK (expr)` attribute.
    pub check: Option<Expr>,
}

impl ColumnDefinition {
    /// A column with no attributes beyond its type.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: None,
            default: None,
            on_update: None,
            auto_increment: false,
            primary_key: false,
            unique: false,
            generated: None,
            invisible: false,
            comment: None,
            charset: None,
            collation: None,
            check: None,
        }
    }

    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.nullable = Some(false);
        self
    }

    #[must_use]
    pub fn default_value(mut self, expr: Expr) -> Self {
        self.default = Some(expr);
        self
    }

    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    #[must_use]
    pub const fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Where ADD/MODIFY/CHANGE COLUMN places the column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnPosition {
    First,
    After(String),
}

/// Kind of a key (index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    Primary,
    Unique,
    Plain,
    Fulltext,
    Spatial,
}

impl IndexKind {
    /// Keyword prefix used in CREATE TABLE.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "PRIMARY KEY",
            Self::Unique => "UNIQUE KEY",
            Self::Plain => "KEY",
            Self::Fulltext => "FULLTEXT KEY",
            Self::Spatial => "SPATIAL KEY",
        }
    }
}

/// One part of a key: a column with optional prefix length and direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexColumn {
    pub name: String,
    pub length: Option<u32>,
    pub direction: Option<OrderDirection>,
}

impl IndexColumn {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            length: None,
            direction: None,
        }
    }

    #[must_use]
    pub const fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }
}

/// A key (index) definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDefinition {
    /// Key name; `None` until assigned by normalization.
    pub name: Option<String>,
    pub kind: IndexKind,
    pub columns: Vec<IndexColumn>,
    pub invisible: bool,
    pub comment: Option<String>,
}

impl IndexDefinition {
    #[must_use]
    pub fn new(name: Option<String>, kind: IndexKind, columns: Vec<IndexColumn>) -> Self {
        Self {
            name,
            kind,
            columns,
            invisible: false,
            comment: None,
        }
    }

    /// `PRIMARY KEY (columns...)`.
    #[must_use]
    pub fn primary(columns: &[&str]) -> Self {
        Self::new(
            None,
            IndexKind::Primary,
            columns.iter().map(|c| IndexColumn::new(*c)).collect(),
        )
    }

    #[must_use]
    pub const fn is_primary(&self) -> bool {
        matches!(self.kind, IndexKind::Primary)
    }

    /// Whether `column` is one of the key parts.
    #[must_use]
    pub fn covers(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c.name == column)
    }
}

/// `ON DELETE` / `ON UPDATE` action of a foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferentialAction {
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
    NoAction,
}

impl ReferentialAction {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
            Self::NoAction => "NO ACTION",
        }
    }
}

/// `FOREIGN KEY (columns) REFERENCES table (columns)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyDefinition {
    pub columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    pub on_delete: Option<ReferentialAction>,
    pub on_update: Option<ReferentialAction>,
}

/// `CHECK (expr) [NOT ENFORCED]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckDefinition {
    pub expr: Expr,
    pub enforced: bool,
}

/// Body of a table constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintKind {
    ForeignKey(ForeignKeyDefinition),
    Check(CheckDefinition),
}

/// A named (or to-be-named) table constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintDefinition {
    pub name: Option<String>,
    pub kind: ConstraintKind,
}

impl ConstraintDefinition {
    #[must_use]
    pub const fn as_foreign_key(&self) -> Option<&ForeignKeyDefinition> {
        match &self.kind {
            ConstraintKind::ForeignKey(fk) => Some(fk),
            ConstraintKind::Check(_) => None,
        }
    }

    #[must_use]
    pub const fn as_check(&self) -> Option<&CheckDefinition> {
        match &self.kind {
            ConstraintKind::Check(check) => Some(check),
            ConstraintKind::ForeignKey(_) => None,
        }
    }
}

/// Table options. Fields are kept in the order `SHOW CREATE TABLE`
/// prints them; unset options are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableOptions {
    pub engine: Option<String>,
    pub auto_increment: Option<u64>,
    pub charset: Option<String>,
    pub collation: Option<String>,
    pub row_format: Option<String>,
    pub key_block_size: Option<u64>,
    pub comment: Option<String>,
}

impl TableOptions {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.engine.is_none()
            && self.auto_increment.is_none()
            && self.charset.is_none()
            && self.collation.is_none()
            && self.row_format.is_none()
            && self.key_block_size.is_none()
            && self.comment.is_none()
    }

    /// Overlays every option set in `other` onto `self`.
    pub fn merge(&mut self, other: &Self) {
        fn overlay<T: Clone>(target: &mut Option<T>, source: &Option<T>) {
            if source.is_some() {
                target.clone_from(source);
            }
        }
        overlay(&mut self.engine, &other.engine);
        overlay(&mut self.auto_increment, &other.auto_increment);
        overlay(&mut self.charset, &other.charset);
        overlay(&mut self.collation, &other.collation);
        overlay(&mut self.row_format, &other.row_format);
        overlay(&mut self.key_block_size, &other.key_block_size);
        overlay(&mut self.comment, &other.comment);
    }
}

/// Partitioning method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionMethod {
    Range,
    RangeColumns,
    List,
    ListColumns,
    Hash { linear: bool },
    Key { linear: bool },
}

impl PartitionMethod {
    /// Methods whose partition definitions carry `VALUES LESS THAN`.
    #[must_use]
    pub const fn is_range(&self) -> bool {
        matches!(self, Self::Range | Self::RangeColumns)
    }

    /// Methods whose partition definitions carry `VALUES IN`.
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List | Self::ListColumns)
    }
}

/// One bound inside `VALUES LESS THAN (...)`.
#[derive(Debug, Clone, PartialEq)]
pub enum PartitionBound {
    Value(Expr),
    MaxValue,
}

/// Values clause of a partition definition.
#[derive(Debug, Clone, PartialEq)]
pub enum PartitionValues {
    LessThan(Vec<PartitionBound>),
    In(Vec<Expr>),
}

/// `PARTITION name [VALUES ...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionDefinition {
    pub name: String,
    pub values: Option<PartitionValues>,
}

/// `PARTITION BY ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionSpec {
    pub method: PartitionMethod,
    /// Partitioning expression for RANGE, LIST and HASH.
    pub expr: Option<Expr>,
    /// Column list for RANGE COLUMNS, LIST COLUMNS and KEY.
    pub columns: Vec<String>,
    /// `PARTITIONS n`.
    pub count: Option<u32>,
    pub definitions: Vec<PartitionDefinition>,
}

/// `CREATE TABLE`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    pub name: String,
    pub if_not_exists: bool,
    pub columns: Vec<ColumnDefinition>,
    pub indexes: Vec<IndexDefinition>,
    pub constraints: Vec<ConstraintDefinition>,
    pub options: TableOptions,
    pub partition: Option<PartitionSpec>,
}

impl CreateTableStatement {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            if_not_exists: false,
            columns: Vec::new(),
            indexes: Vec::new(),
            constraints: Vec::new(),
            options: TableOptions::default(),
            partition: None,
        }
    }

    #[must_use]
    pub fn column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub fn index(mut self, index: IndexDefinition) -> Self {
        self.indexes.push(index);
        self
    }

    #[must_use]
    pub fn constraint(mut self, constraint: ConstraintDefinition) -> Self {
        self.constraints.push(constraint);
        self
    }
}

/// `ALGORITHM = ...` of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAlgorithm {
    Undefined,
    Merge,
    Temptable,
}

impl ViewAlgorithm {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Undefined => "UNDEFINED",
            Self::Merge => "MERGE",
            Self::Temptable => "TEMPTABLE",
        }
    }
}

/// `SQL SECURITY ...` of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewSecurity {
    Definer,
    Invoker,
}

impl ViewSecurity {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Definer => "DEFINER",
            Self::Invoker => "INVOKER",
        }
    }
}

/// `WITH [CASCADED | LOCAL] CHECK OPTION`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCheckOption {
    Cascaded,
    Local,
}

/// Definition shared by CREATE VIEW and ALTER VIEW.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewDefinition {
    pub name: String,
    pub algorithm: Option<ViewAlgorithm>,
    pub security: Option<ViewSecurity>,
    /// Explicit column-name list.
    pub columns: Vec<String>,
    pub query: SelectStatement,
    pub check_option: Option<ViewCheckOption>,
}

/// `CREATE [OR REPLACE] VIEW`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateViewStatement {
    pub or_replace: bool,
    pub view: ViewDefinition,
}

/// `ALTER VIEW`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterViewStatement {
    pub view: ViewDefinition,
}

/// One specification of an ALTER TABLE statement.
#[derive(Debug, Clone, PartialEq)]
pub enum AlterTableSpec {
    AddColumn {
        column: ColumnDefinition,
        position: Option<ColumnPosition>,
    },
    ModifyColumn {
        column: ColumnDefinition,
        position: Option<ColumnPosition>,
    },
    ChangeColumn {
        old_name: String,
        column: ColumnDefinition,
        position: Option<ColumnPosition>,
    },
    RenameColumn {
        old_name: String,
        new_name: String,
    },
    DropColumn {
        name: String,
    },
    AddIndex(IndexDefinition),
    DropIndex {
        name: String,
    },
    DropPrimaryKey,
    AddConstraint(ConstraintDefinition),
    DropForeignKey {
        name: String,
    },
    DropCheck {
        name: String,
    },
    TableOptions(TableOptions),
    PartitionBy(PartitionSpec),
    RemovePartitioning,
    AddPartition(Vec<PartitionDefinition>),
    DropPartition(Vec<String>),
}

/// `ALTER TABLE name spec, spec, ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterTableStatement {
    pub table: String,
    pub specs: Vec<AlterTableSpec>,
}

/// `DROP TABLE [IF EXISTS] names`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTableStatement {
    pub names: Vec<String>,
    pub if_exists: bool,
}

/// `DROP VIEW [IF EXISTS] names`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropViewStatement {
    pub names: Vec<String>,
    pub if_exists: bool,
}

/// `RENAME TABLE a TO b, c TO d`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameTableStatement {
    pub renames: Vec<(String, String)>,
}
