//! Read-only and mutable traversal helpers over expressions and queries.

use super::{Expr, JoinClause, SelectStatement, TableRef};

/// A column reference found inside an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRef<'a> {
    pub table: Option<&'a str>,
    pub name: &'a str,
}

impl Expr {
    /// Direct child expressions. Subquery bodies are not children: they open
    /// a new scope.
    fn children(&self) -> Vec<&Self> {
        match self {
            Self::Literal(_)
            | Self::Column { .. }
            | Self::Wildcard { .. }
            | Self::Subquery(_)
            | Self::Exists { .. } => Vec::new(),
            Self::Binary { left, right, .. } => vec![&**left, &**right],
            Self::Unary { operand, .. } => vec![&**operand],
            Self::Function(call) => call.args.iter().collect(),
            Self::IsNull { expr, .. }
            | Self::InSubquery { expr, .. }
            | Self::Cast { expr, .. }
            | Self::Paren(expr) => vec![&**expr],
            Self::In { expr, list, .. } => {
                let mut out: Vec<&Self> = vec![&**expr];
                out.extend(list.iter());
                out
            }
            Self::Between {
                expr, low, high, ..
            } => vec![&**expr, &**low, &**high],
            Self::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                let mut out: Vec<&Self> = operand.iter().map(|e| &**e).collect();
                for (when, then) in when_clauses {
                    out.push(when);
                    out.push(then);
                }
                out.extend(else_clause.iter().map(|e| &**e));
                out
            }
        }
    }

    /// Visits this expression and every nested expression in pre-order,
    /// without entering subqueries.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Self)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Mutable counterpart of [`Expr::walk`]; children are visited after
    /// their parent.
    pub fn walk_mut(&mut self, visit: &mut impl FnMut(&mut Self)) {
        visit(self);
        match self {
            Self::Literal(_)
            | Self::Column { .. }
            | Self::Wildcard { .. }
            | Self::Subquery(_)
            | Self::Exists { .. } => {}
            Self::Binary { left, right, .. } => {
                left.walk_mut(visit);
                right.walk_mut(visit);
            }
            Self::Unary { operand, .. } => operand.walk_mut(visit),
            Self::Function(call) => {
                for arg in &mut call.args {
                    arg.walk_mut(visit);
                }
            }
            Self::IsNull { expr, .. }
            | Self::InSubquery { expr, .. }
            | Self::Cast { expr, .. }
            | Self::Paren(expr) => expr.walk_mut(visit),
            Self::In { expr, list, .. } => {
                expr.walk_mut(visit);
                for item in list {
                    item.walk_mut(visit);
                }
            }
            Self::Between {
                expr, low, high, ..
            } => {
                expr.walk_mut(visit);
                low.walk_mut(visit);
                high.walk_mut(visit);
            }
            Self::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                if let Some(operand) = operand {
                    operand.walk_mut(visit);
                }
                for (when, then) in when_clauses {
                    when.walk_mut(visit);
                    then.walk_mut(visit);
                }
                if let Some(else_clause) = else_clause {
                    else_clause.walk_mut(visit);
                }
            }
        }
    }

    /// Column references in this expression, outside of subqueries.
    #[must_use]
    pub fn column_refs(&self) -> Vec<ColumnRef<'_>> {
        let mut refs = Vec::new();
        self.walk(&mut |expr| {
            if let Self::Column { table, name } = expr {
                refs.push(ColumnRef {
                    table: table.as_deref(),
                    name,
                });
            }
        });
        refs
    }

    /// Subqueries directly nested in this expression.
    #[must_use]
    pub fn subqueries(&self) -> Vec<&SelectStatement> {
        let mut queries = Vec::new();
        self.walk(&mut |expr| match expr {
            Self::Subquery(query)
            | Self::Exists { query, .. }
            | Self::InSubquery { query, .. } => queries.push(query.as_ref()),
            _ => {}
        });
        queries
    }

    /// Mutable access to the subqueries directly nested in this expression.
    pub fn for_each_subquery_mut(&mut self, visit: &mut impl FnMut(&mut SelectStatement)) {
        self.walk_mut(&mut |expr| match expr {
            Self::Subquery(query)
            | Self::Exists { query, .. }
            | Self::InSubquery { query, .. } => visit(query),
            _ => {}
        });
    }
}

impl TableRef {
    /// Joined tables in left-to-right order, flattening nested joins.
    #[must_use]
    pub fn leaves(&self) -> Vec<&Self> {
        match self {
            Self::Table { .. } | Self::Subquery { .. } => vec![self],
            Self::Join { left, join } => {
                let mut out = left.leaves();
                out.extend(join.table.leaves());
                out
            }
        }
    }

    /// Join clauses in left-to-right order.
    #[must_use]
    pub fn joins(&self) -> Vec<&JoinClause> {
        match self {
            Self::Table { .. } | Self::Subquery { .. } => Vec::new(),
            Self::Join { left, join } => {
                let mut out = left.joins();
                out.extend(join.table.joins());
                out.push(join);
                out
            }
        }
    }
}

impl SelectStatement {
    /// Every expression that belongs to this query block: select list,
    /// join conditions, WHERE, GROUP BY, HAVING, ORDER BY, LIMIT.
    #[must_use]
    pub fn expressions(&self) -> Vec<&Expr> {
        let mut out: Vec<&Expr> = self.columns.iter().map(|c| &c.expr).collect();
        for table in &self.from {
            out.extend(table.joins().into_iter().filter_map(|j| j.on.as_ref()));
        }
        out.extend(self.where_clause.iter());
        out.extend(self.group_by.iter());
        out.extend(self.having.iter());
        out.extend(self.order_by.iter().map(|o| &o.expr));
        out.extend(self.limit.iter());
        out.extend(self.offset.iter());
        out
    }

    /// Names of all tables and views read by the query, at any depth, in
    /// first-seen order and without duplicates.
    #[must_use]
    pub fn referenced_tables(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        self.collect_tables(&mut names);
        names
    }

    fn collect_tables(&self, names: &mut Vec<String>) {
        for table in &self.from {
            for leaf in table.leaves() {
                match leaf {
                    TableRef::Table { name, .. } => {
                        if !names.contains(name) {
                            names.push(name.clone());
                        }
                    }
                    TableRef::Subquery { query, .. } => query.collect_tables(names),
                    TableRef::Join { .. } => {}
                }
            }
        }
        for expr in self.expressions() {
            for query in expr.subqueries() {
                query.collect_tables(names);
            }
        }
        for branch in &self.unions {
            branch.select.collect_tables(names);
        }
    }
}
