//! Canonical SQL rendering.
//!
//! Every AST node implements `Display`. The output uses upper-case keywords,
//! lower-case types and backtick-quotes identifiers only where required, and
//! parses back into the same tree (modulo redundant parentheses).

use std::borrow::Cow;
use std::fmt::{self, Display, Formatter, Write};

use crate::ast::{
    AlterTableSpec, AlterTableStatement, AlterViewStatement, BinaryOp, CheckDefinition,
    ColumnDefinition, ColumnPosition, ConstraintDefinition, ConstraintKind, CreateTableStatement,
    CreateViewStatement, DropTableStatement, DropViewStatement, Expr, ForeignKeyDefinition,
    FunctionCall, IndexColumn, IndexDefinition, Literal, OrderBy, PartitionBound,
    PartitionDefinition, PartitionMethod, PartitionSpec, PartitionValues, RenameTableStatement,
    SelectColumn, SelectStatement, Statement, TableOptions, TableRef, UnaryOp, ViewCheckOption,
    ViewDefinition,
};
use crate::lexer::Keyword;

/// Quotes an identifier with backticks when it cannot be written bare.
#[must_use]
pub fn quote_identifier(name: &str) -> Cow<'_, str> {
    let bare = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        && !Keyword::from_str(name).is_some_and(|kw| kw.is_reserved());
    if bare {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("`{}`", name.replace('`', "``")))
    }
}

/// Quotes a string literal.
#[must_use]
pub fn quote_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        match c {
            '\'' => quoted.push_str("''"),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            '\0' => quoted.push_str("\\0"),
            c => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

struct Ident<'a>(&'a str);

impl Display for Ident<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&quote_identifier(self.0))
    }
}

/// Writes `items` separated by `", "`.
fn comma_separated<T: Display>(f: &mut Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn identifier_list(f: &mut Formatter<'_>, names: &[String]) -> fmt::Result {
    let idents: Vec<Ident<'_>> = names.iter().map(|n| Ident(n)).collect();
    comma_separated(f, &idents)
}

// ===========================================================================
// Expressions
// ===========================================================================

/// Binding strength used to decide where parentheses are needed. Mirrors the
/// parser's infix binding powers.
const fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Binary { op, .. } => binary_precedence(*op),
        Expr::Unary {
            op: UnaryOp::Not, ..
        } => 7,
        Expr::IsNull { .. } | Expr::In { .. } | Expr::InSubquery { .. } | Expr::Between { .. } => {
            9
        }
        Expr::Unary { .. } => 23,
        _ => u8::MAX,
    }
}

const fn binary_precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Or => 1,
        BinaryOp::Xor => 3,
        BinaryOp::And => 5,
        BinaryOp::Eq
        | BinaryOp::NullSafeEq
        | BinaryOp::NotEq
        | BinaryOp::Lt
        | BinaryOp::LtEq
        | BinaryOp::Gt
        | BinaryOp::GtEq
        | BinaryOp::Like => 9,
        BinaryOp::BitOr => 11,
        BinaryOp::BitAnd => 13,
        BinaryOp::LeftShift | BinaryOp::RightShift => 15,
        BinaryOp::Add | BinaryOp::Sub => 17,
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::IntDiv | BinaryOp::Mod => 19,
        BinaryOp::BitXor => 21,
    }
}

/// Writes `expr`, parenthesized when it binds looser than `min`.
fn operand(f: &mut Formatter<'_>, expr: &Expr, min: u8) -> fmt::Result {
    if precedence(expr) < min {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::String(s) => f.write_str(&quote_string(s)),
            Self::Blob(bytes) => {
                f.write_str("X'")?;
                for byte in bytes {
                    write!(f, "{byte:02X}")?;
                }
                f.write_char('\'')
            }
            Self::Boolean(true) => f.write_str("TRUE"),
            Self::Boolean(false) => f.write_str("FALSE"),
            Self::Null => f.write_str("NULL"),
        }
    }
}

impl Display for FunctionCall {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        if self.distinct {
            f.write_str("DISTINCT ")?;
        }
        comma_separated(f, &self.args)?;
        f.write_char(')')
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(literal) => write!(f, "{literal}"),
            Self::Column { table, name } => {
                if let Some(table) = table {
                    write!(f, "{}.", Ident(table))?;
                }
                write!(f, "{}", Ident(name))
            }
            Self::Binary { left, op, right } => {
                let prec = binary_precedence(*op);
                operand(f, left, prec)?;
                write!(f, " {} ", op.as_str())?;
                // left-associative: an equal-precedence right operand needs parens
                operand(f, right, prec + 1)
            }
            Self::Unary { op, operand: inner } => match op {
                UnaryOp::Not => {
                    f.write_str("NOT ")?;
                    operand(f, inner, 7)
                }
                UnaryOp::Neg | UnaryOp::BitNot => {
                    f.write_str(op.as_str())?;
                    let starts_with_minus = matches!(
                        inner.as_ref(),
                        Expr::Unary {
                            op: UnaryOp::Neg,
                            ..
                        } | Expr::Literal(Literal::Integer(i64::MIN..=-1))
                    ) || matches!(inner.as_ref(), Expr::Literal(Literal::Float(x)) if *x < 0.0);
                    if starts_with_minus {
                        write!(f, "({inner})")
                    } else {
                        operand(f, inner, 23)
                    }
                }
            },
            Self::Function(call) => write!(f, "{call}"),
            Self::Subquery(query) => write!(f, "({query})"),
            Self::Exists { query, negated } => {
                if *negated {
                    f.write_str("NOT ")?;
                }
                write!(f, "EXISTS ({query})")
            }
            Self::IsNull { expr, negated } => {
                operand(f, expr, 9)?;
                f.write_str(if *negated { " IS NOT NULL" } else { " IS NULL" })
            }
            Self::In {
                expr,
                list,
                negated,
            } => {
                operand(f, expr, 9)?;
                f.write_str(if *negated { " NOT IN (" } else { " IN (" })?;
                comma_separated(f, list)?;
                f.write_char(')')
            }
            Self::InSubquery {
                expr,
                query,
                negated,
            } => {
                operand(f, expr, 9)?;
                let keyword = if *negated { "NOT IN" } else { "IN" };
                write!(f, " {keyword} ({query})")
            }
            Self::Between {
                expr,
                low,
                high,
                negated,
            } => {
                operand(f, expr, 9)?;
                f.write_str(if *negated { " NOT BETWEEN " } else { " BETWEEN " })?;
                operand(f, low, 10)?;
                f.write_str(" AND ")?;
                operand(f, high, 10)
            }
            Self::Case {
                operand: subject,
                when_clauses,
                else_clause,
            } => {
                f.write_str("CASE")?;
                if let Some(subject) = subject {
                    write!(f, " {subject}")?;
                }
                for (when, then) in when_clauses {
                    write!(f, " WHEN {when} THEN {then}")?;
                }
                if let Some(else_clause) = else_clause {
                    write!(f, " ELSE {else_clause}")?;
                }
                f.write_str(" END")
            }
            Self::Cast { expr, data_type } => write!(f, "CAST({expr} AS {data_type})"),
            Self::Paren(inner) => write!(f, "({inner})"),
            Self::Wildcard { table } => {
                if let Some(table) = table {
                    write!(f, "{}.", Ident(table))?;
                }
                f.write_char('*')
            }
        }
    }
}

// ===========================================================================
// Queries
// ===========================================================================

impl Display for SelectColumn {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {}", Ident(alias))?;
        }
        Ok(())
    }
}

impl Display for OrderBy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        if let Some(direction) = self.direction {
            write!(f, " {}", direction.as_str())?;
        }
        Ok(())
    }
}

impl Display for TableRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table {
                schema,
                name,
                alias,
            } => {
                if let Some(schema) = schema {
                    write!(f, "{}.", Ident(schema))?;
                }
                write!(f, "{}", Ident(name))?;
                if let Some(alias) = alias {
                    write!(f, " AS {}", Ident(alias))?;
                }
                Ok(())
            }
            Self::Subquery { query, alias } => write!(f, "({query}) AS {}", Ident(alias)),
            Self::Join { left, join } => {
                write!(f, "{left} {} ", join.join_type.as_str())?;
                if matches!(join.table, Self::Join { .. }) {
                    write!(f, "({})", join.table)?;
                } else {
                    write!(f, "{}", join.table)?;
                }
                if let Some(on) = &join.on {
                    write!(f, " ON {on}")?;
                } else if !join.using.is_empty() {
                    f.write_str(" USING (")?;
                    identifier_list(f, &join.using)?;
                    f.write_char(')')?;
                }
                Ok(())
            }
        }
    }
}

fn write_select_block(f: &mut Formatter<'_>, select: &SelectStatement) -> fmt::Result {
    f.write_str("SELECT ")?;
    if select.distinct {
        f.write_str("DISTINCT ")?;
    }
    comma_separated(f, &select.columns)?;
    if !select.from.is_empty() {
        f.write_str(" FROM ")?;
        comma_separated(f, &select.from)?;
    }
    if let Some(where_clause) = &select.where_clause {
        write!(f, " WHERE {where_clause}")?;
    }
    if !select.group_by.is_empty() {
        f.write_str(" GROUP BY ")?;
        comma_separated(f, &select.group_by)?;
    }
    if let Some(having) = &select.having {
        write!(f, " HAVING {having}")?;
    }
    if !select.order_by.is_empty() {
        f.write_str(" ORDER BY ")?;
        comma_separated(f, &select.order_by)?;
    }
    if let Some(limit) = &select.limit {
        write!(f, " LIMIT {limit}")?;
    }
    if let Some(offset) = &select.offset {
        write!(f, " OFFSET {offset}")?;
    }
    Ok(())
}

impl Display for SelectStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_select_block(f, self)?;
        for branch in &self.unions {
            f.write_str(if branch.all { " UNION ALL " } else { " UNION " })?;
            write_select_block(f, &branch.select)?;
        }
        Ok(())
    }
}

// ===========================================================================
// Table elements
// ===========================================================================

/// Defaults that MySQL accepts without parentheses.
fn is_bare_default(expr: &Expr) -> bool {
    match expr {
        Expr::Literal(_) => true,
        Expr::Unary {
            op: UnaryOp::Neg,
            operand,
        } => matches!(
            operand.as_ref(),
            Expr::Literal(Literal::Integer(_) | Literal::Float(_))
        ),
        Expr::Function(call) => {
            call.args.is_empty()
                || (call.args.len() == 1
                    && matches!(call.args[0], Expr::Literal(Literal::Integer(_))))
        }
        _ => false,
    }
}

impl Display for ColumnDefinition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", Ident(&self.name), self.data_type)?;
        if let Some(charset) = &self.charset {
            write!(f, " CHARACTER SET {}", Ident(charset))?;
        }
        if let Some(collation) = &self.collation {
            write!(f, " COLLATE {}", Ident(collation))?;
        }
        if let Some(generated) = &self.generated {
            write!(
                f,
                " GENERATED ALWAYS AS ({}) {}",
                generated.expr,
                generated.storage.as_str()
            )?;
        }
        match self.nullable {
            Some(false) => f.write_str(" NOT NULL")?,
            // DEFAULT NULL already implies nullability
            Some(true) if self.default.is_none() => f.write_str(" NULL")?,
            _ => {}
        }
        if let Some(default) = &self.default {
            if is_bare_default(default) {
                write!(f, " DEFAULT {default}")?;
            } else {
                write!(f, " DEFAULT ({default})")?;
            }
        }
        if let Some(on_update) = &self.on_update {
            write!(f, " ON UPDATE {on_update}")?;
        }
        if self.auto_increment {
            f.write_str(" AUTO_INCREMENT")?;
        }
        if self.primary_key {
            f.write_str(" PRIMARY KEY")?;
        }
        if self.unique {
            f.write_str(" UNIQUE KEY")?;
        }
        if self.invisible {
            f.write_str(" INVISIBLE")?;
        }
        if let Some(comment) = &self.comment {
            write!(f, " COMMENT {}", quote_string(comment))?;
        }
        if let Some(check) = &self.check {
            write!(f, " CHECK ({check})")?;
        }
        Ok(())
    }
}

impl Display for ColumnPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("FIRST"),
            Self::After(column) => write!(f, "AFTER {}", Ident(column)),
        }
    }
}

impl Display for IndexColumn {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Ident(&self.name))?;
        if let Some(length) = self.length {
            write!(f, "({length})")?;
        }
        if let Some(direction) = self.direction {
            write!(f, " {}", direction.as_str())?;
        }
        Ok(())
    }
}

impl Display for IndexDefinition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.as_str())?;
        if let (Some(name), false) = (&self.name, self.is_primary()) {
            write!(f, " {}", Ident(name))?;
        }
        f.write_str(" (")?;
        comma_separated(f, &self.columns)?;
        f.write_char(')')?;
        if let Some(comment) = &self.comment {
            write!(f, " COMMENT {}", quote_string(comment))?;
        }
        if self.invisible {
            f.write_str(" INVISIBLE")?;
        }
        Ok(())
    }
}

impl Display for ForeignKeyDefinition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("FOREIGN KEY (")?;
        identifier_list(f, &self.columns)?;
        write!(f, ") REFERENCES {} (", Ident(&self.referenced_table))?;
        identifier_list(f, &self.referenced_columns)?;
        f.write_char(')')?;
        if let Some(action) = self.on_delete {
            write!(f, " ON DELETE {}", action.as_str())?;
        }
        if let Some(action) = self.on_update {
            write!(f, " ON UPDATE {}", action.as_str())?;
        }
        Ok(())
    }
}

impl Display for CheckDefinition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "CHECK ({})", self.expr)?;
        if !self.enforced {
            f.write_str(" NOT ENFORCED")?;
        }
        Ok(())
    }
}

impl Display for ConstraintDefinition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "CONSTRAINT {} ", Ident(name))?;
        }
        match &self.kind {
            ConstraintKind::ForeignKey(fk) => write!(f, "{fk}"),
            ConstraintKind::Check(check) => write!(f, "{check}"),
        }
    }
}

impl Display for TableOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = vec![];
        if let Some(engine) = &self.engine {
            parts.push(format!("ENGINE={}", Ident(engine)));
        }
        if let Some(value) = self.auto_increment {
            parts.push(format!("AUTO_INCREMENT={value}"));
        }
        if let Some(charset) = &self.charset {
            parts.push(format!("DEFAULT CHARSET={}", Ident(charset)));
        }
        if let Some(collation) = &self.collation {
            parts.push(format!("COLLATE={}", Ident(collation)));
        }
        if let Some(row_format) = &self.row_format {
            parts.push(format!("ROW_FORMAT={row_format}"));
        }
        if let Some(size) = self.key_block_size {
            parts.push(format!("KEY_BLOCK_SIZE={size}"));
        }
        if let Some(comment) = &self.comment {
            parts.push(format!("COMMENT={}", quote_string(comment)));
        }
        f.write_str(&parts.join(" "))
    }
}

impl Display for PartitionBound {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(expr) => write!(f, "{expr}"),
            Self::MaxValue => f.write_str("MAXVALUE"),
        }
    }
}

impl Display for PartitionDefinition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "PARTITION {}", Ident(&self.name))?;
        match &self.values {
            Some(PartitionValues::LessThan(bounds)) => {
                if let [PartitionBound::MaxValue] = bounds.as_slice() {
                    f.write_str(" VALUES LESS THAN MAXVALUE")
                } else {
                    f.write_str(" VALUES LESS THAN (")?;
                    comma_separated(f, bounds)?;
                    f.write_char(')')
                }
            }
            Some(PartitionValues::In(values)) => {
                f.write_str(" VALUES IN (")?;
                comma_separated(f, values)?;
                f.write_char(')')
            }
            None => Ok(()),
        }
    }
}

fn write_partition_definitions(
    f: &mut Formatter<'_>,
    definitions: &[PartitionDefinition],
) -> fmt::Result {
    f.write_char('(')?;
    comma_separated(f, definitions)?;
    f.write_char(')')
}

impl Display for PartitionSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("PARTITION BY ")?;
        let linear = |linear: bool| if linear { "LINEAR " } else { "" };
        match self.method {
            PartitionMethod::Hash { linear: l } => write!(f, "{}HASH", linear(l))?,
            PartitionMethod::Key { linear: l } => write!(f, "{}KEY", linear(l))?,
            PartitionMethod::Range => f.write_str("RANGE")?,
            PartitionMethod::RangeColumns => f.write_str("RANGE COLUMNS")?,
            PartitionMethod::List => f.write_str("LIST")?,
            PartitionMethod::ListColumns => f.write_str("LIST COLUMNS")?,
        }
        f.write_str(" (")?;
        if let Some(expr) = &self.expr {
            write!(f, "{expr}")?;
        } else {
            identifier_list(f, &self.columns)?;
        }
        f.write_char(')')?;
        if let Some(count) = self.count {
            write!(f, " PARTITIONS {count}")?;
        }
        if !self.definitions.is_empty() {
            f.write_char(' ')?;
            write_partition_definitions(f, &self.definitions)?;
        }
        Ok(())
    }
}

// ===========================================================================
// Statements
// ===========================================================================

impl Display for CreateTableStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("CREATE TABLE ")?;
        if self.if_not_exists {
            f.write_str("IF NOT EXISTS ")?;
        }
        writeln!(f, "{} (", Ident(&self.name))?;

        let elements: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("    {c}"))
            .chain(self.indexes.iter().map(|i| format!("    {i}")))
            .chain(self.constraints.iter().map(|c| format!("    {c}")))
            .collect();
        f.write_str(&elements.join(",\n"))?;
        f.write_str("\n)")?;

        if !self.options.is_empty() {
            write!(f, " {}", self.options)?;
        }
        if let Some(partition) = &self.partition {
            write!(f, "\n{partition}")?;
        }
        Ok(())
    }
}

fn write_position(f: &mut Formatter<'_>, position: Option<&ColumnPosition>) -> fmt::Result {
    match position {
        Some(position) => write!(f, " {position}"),
        None => Ok(()),
    }
}

impl Display for AlterTableSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddColumn { column, position } => {
                write!(f, "ADD COLUMN {column}")?;
                write_position(f, position.as_ref())
            }
            Self::ModifyColumn { column, position } => {
                write!(f, "MODIFY COLUMN {column}")?;
                write_position(f, position.as_ref())
            }
            Self::ChangeColumn {
                old_name,
                column,
                position,
            } => {
                write!(f, "CHANGE COLUMN {} {column}", Ident(old_name))?;
                write_position(f, position.as_ref())
            }
            Self::RenameColumn { old_name, new_name } => {
                write!(f, "RENAME COLUMN {} TO {}", Ident(old_name), Ident(new_name))
            }
            Self::DropColumn { name } => write!(f, "DROP COLUMN {}", Ident(name)),
            Self::AddIndex(index) => write!(f, "ADD {index}"),
            Self::DropIndex { name } => write!(f, "DROP KEY {}", Ident(name)),
            Self::DropPrimaryKey => f.write_str("DROP PRIMARY KEY"),
            Self::AddConstraint(constraint) => write!(f, "ADD {constraint}"),
            Self::DropForeignKey { name } => write!(f, "DROP FOREIGN KEY {}", Ident(name)),
            Self::DropCheck { name } => write!(f, "DROP CHECK {}", Ident(name)),
            Self::TableOptions(options) => write!(f, "{options}"),
            Self::PartitionBy(spec) => write!(f, "{spec}"),
            Self::RemovePartitioning => f.write_str("REMOVE PARTITIONING"),
            Self::AddPartition(definitions) => {
                f.write_str("ADD PARTITION ")?;
                write_partition_definitions(f, definitions)
            }
            Self::DropPartition(names) => {
                f.write_str("DROP PARTITION ")?;
                identifier_list(f, names)
            }
        }
    }
}

impl Display for AlterTableStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ALTER TABLE {} ", Ident(&self.table))?;
        comma_separated(f, &self.specs)
    }
}

/// Writes everything from the algorithm clause to the end of the view.
fn write_view(f: &mut Formatter<'_>, view: &ViewDefinition) -> fmt::Result {
    if let Some(algorithm) = view.algorithm {
        write!(f, "ALGORITHM = {} ", algorithm.as_str())?;
    }
    if let Some(security) = view.security {
        write!(f, "SQL SECURITY {} ", security.as_str())?;
    }
    write!(f, "VIEW {}", Ident(&view.name))?;
    if !view.columns.is_empty() {
        f.write_char('(')?;
        identifier_list(f, &view.columns)?;
        f.write_char(')')?;
    }
    write!(f, " AS {}", view.query)?;
    match view.check_option {
        Some(ViewCheckOption::Cascaded) => f.write_str(" WITH CASCADED CHECK OPTION"),
        Some(ViewCheckOption::Local) => f.write_str(" WITH LOCAL CHECK OPTION"),
        None => Ok(()),
    }
}

impl Display for CreateViewStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("CREATE ")?;
        if self.or_replace {
            f.write_str("OR REPLACE ")?;
        }
        write_view(f, &self.view)
    }
}

impl Display for AlterViewStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("ALTER ")?;
        write_view(f, &self.view)
    }
}

impl Display for DropTableStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("DROP TABLE ")?;
        if self.if_exists {
            f.write_str("IF EXISTS ")?;
        }
        identifier_list(f, &self.names)
    }
}

impl Display for DropViewStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("DROP VIEW ")?;
        if self.if_exists {
            f.write_str("IF EXISTS ")?;
        }
        identifier_list(f, &self.names)
    }
}

impl Display for RenameTableStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("RENAME TABLE ")?;
        for (i, (from, to)) in self.renames.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} TO {}", Ident(from), Ident(to))?;
        }
        Ok(())
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select(select) => write!(f, "{select}"),
            Self::CreateTable(create) => write!(f, "{create}"),
            Self::CreateView(create) => write!(f, "{create}"),
            Self::AlterTable(alter) => write!(f, "{alter}"),
            Self::AlterView(alter) => write!(f, "{alter}"),
            Self::DropTable(drop) => write!(f, "{drop}"),
            Self::DropView(drop) => write!(f, "{drop}"),
            Self::RenameTable(rename) => write!(f, "{rename}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{DataType, IndexKind, IntegerKind};

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("users"), "users");
        assert_eq!(quote_identifier("select"), "`select`");
        assert_eq!(quote_identifier("comment"), "comment");
        assert_eq!(quote_identifier("my col"), "`my col`");
        assert_eq!(quote_identifier("1abc"), "`1abc`");
        assert_eq!(quote_identifier("a`b"), "`a``b`");
        assert_eq!(quote_identifier(""), "``");
    }

    #[test]
    fn test_quote_string() {
        assert_eq!(quote_string("it's"), "'it''s'");
        assert_eq!(quote_string("a\\b\n"), "'a\\\\b\\n'");
    }

    #[test]
    fn test_expression_parentheses_follow_precedence() {
        let sum = Expr::column("a").binary(BinaryOp::Add, Expr::column("b"));
        let product = sum.clone().binary(BinaryOp::Mul, Expr::integer(2));
        assert_eq!(product.to_string(), "(a + b) * 2");

        let right_nested = Expr::column("a").binary(BinaryOp::Sub, sum);
        assert_eq!(right_nested.to_string(), "a - (a + b)");

        let negated = Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(Expr::column("a").and(Expr::column("b"))),
        };
        assert_eq!(negated.to_string(), "NOT (a AND b)");

        let double_negative = Expr::Unary {
            op: UnaryOp::Neg,
            operand: Box::new(Expr::integer(-1)),
        };
        assert_eq!(double_negative.to_string(), "-(-1)");
    }

    #[test]
    fn test_column_nullability_rendering() {
        let column = ColumnDefinition::new("id", DataType::integer(IntegerKind::Big)).not_null();
        assert_eq!(column.to_string(), "id bigint NOT NULL");

        let mut column = ColumnDefinition::new("name", DataType::Varchar(Some(64)));
        column.nullable = Some(true);
        column.default = Some(Expr::null());
        assert_eq!(column.to_string(), "name varchar(64) DEFAULT NULL");

        column.default = None;
        assert_eq!(column.to_string(), "name varchar(64) NULL");

        column.default = Some(Expr::function("json_array", vec![Expr::integer(1), Expr::integer(2)]));
        assert_eq!(column.to_string(), "name varchar(64) DEFAULT (json_array(1, 2))");
    }

    #[test]
    fn test_index_rendering() {
        let index = IndexDefinition::new(
            Some("name_idx".into()),
            IndexKind::Plain,
            vec![IndexColumn::new("name").with_length(16)],
        );
        assert_eq!(index.to_string(), "KEY name_idx (name(16))");

        let mut primary = IndexDefinition::primary(&["id"]);
        primary.name = Some("PRIMARY".into());
        assert_eq!(primary.to_string(), "PRIMARY KEY (id)");
    }

    #[test]
    fn test_create_table_layout() {
        let table = CreateTableStatement::new("t")
            .column(ColumnDefinition::new("id", DataType::integer(IntegerKind::Int)))
            .index(IndexDefinition::primary(&["id"]));
        assert_eq!(
            table.to_string(),
            "CREATE TABLE t (\n    id int,\n    PRIMARY KEY (id)\n)"
        );
    }
}
