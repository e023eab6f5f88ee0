//! Abstract syntax tree for DDL statements and view queries.

mod ddl;
mod expression;
mod query;
mod statement;
mod types;
mod visit;

pub use ddl::{
    AlterTableSpec, AlterTableStatement, AlterViewStatement, CheckDefinition, ColumnDefinition,
    ColumnPosition, ConstraintDefinition, ConstraintKind, CreateTableStatement,
    CreateViewStatement, DropTableStatement, DropViewStatement, ForeignKeyDefinition,
    GeneratedColumn, GeneratedStorage, IndexColumn, IndexDefinition, IndexKind, PartitionBound,
    PartitionDefinition, PartitionMethod, PartitionSpec, PartitionValues, ReferentialAction,
    RenameTableStatement, TableOptions, ViewAlgorithm, ViewCheckOption, ViewDefinition,
    ViewSecurity,
};
pub use expression::{BinaryOp, Expr, FunctionCall, Literal, UnaryOp};
pub use query::{
    JoinClause, JoinType, OrderBy, OrderDirection, SelectColumn, SelectStatement, TableRef,
    UnionBranch,
};
pub use statement::Statement;
pub use types::{DataType, IntegerKind, LobSize};
pub use visit::ColumnRef;
