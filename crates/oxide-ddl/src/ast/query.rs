//! SELECT statements, as used by view definitions.

use super::Expr;

/// Order direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// An ORDER BY entry.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub expr: Expr,
    /// `None` when no direction was written.
    pub direction: Option<OrderDirection>,
}

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Cross,
    /// `STRAIGHT_JOIN`: an inner join that reads the left table first.
    Straight,
    Natural,
    NaturalLeft,
    NaturalRight,
}

impl JoinType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inner => "JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Cross => "CROSS JOIN",
            Self::Straight => "STRAIGHT_JOIN",
            Self::Natural => "NATURAL JOIN",
            Self::NaturalLeft => "NATURAL LEFT JOIN",
            Self::NaturalRight => "NATURAL RIGHT JOIN",
        }
    }

    /// Whether the join matches on every column both sides share, with no
    /// `ON` or `USING` clause.
    #[must_use]
    pub const fn is_natural(&self) -> bool {
        matches!(self, Self::Natural | Self::NaturalLeft | Self::NaturalRight)
    }
}

/// A JOIN clause.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub join_type: JoinType,
    pub table: TableRef,
    pub on: Option<Expr>,
    /// USING columns (alternative to ON).
    pub using: Vec<String>,
}

/// A table reference in a FROM clause.
#[derive(Debug, Clone, PartialEq)]
pub enum TableRef {
    Table {
        /// Database qualifier.
        schema: Option<String>,
        name: String,
        alias: Option<String>,
    },
    /// Derived table; MySQL requires the alias.
    Subquery {
        query: Box<SelectStatement>,
        alias: String,
    },
    Join {
        left: Box<TableRef>,
        join: Box<JoinClause>,
    },
}

impl TableRef {
    #[must_use]
    pub fn table(name: impl Into<String>) -> Self {
        Self::Table {
            schema: None,
            name: name.into(),
            alias: None,
        }
    }
}

/// A column in a SELECT list.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectColumn {
    pub expr: Expr,
    pub alias: Option<String>,
}

/// A `UNION [ALL]` branch following the first SELECT.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionBranch {
    pub all: bool,
    pub select: SelectStatement,
}

/// A SELECT statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub distinct: bool,
    pub columns: Vec<SelectColumn>,
    pub from: Vec<TableRef>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
    pub unions: Vec<UnionBranch>,
}

impl SelectStatement {
    /// `SELECT <columns>` with no other clause.
    #[must_use]
    pub const fn new(columns: Vec<SelectColumn>) -> Self {
        Self {
            distinct: false,
            columns,
            from: Vec::new(),
            where_clause: None,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
            unions: Vec::new(),
        }
    }
}
