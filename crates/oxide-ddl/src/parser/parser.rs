//! Parser core: token cursor, statement dispatch, queries and expressions.

use super::error::ParseError;
use super::pratt::{infix_binding_power, prefix_operator, token_to_binary_op};
use crate::ast::{
    BinaryOp, Expr, FunctionCall, JoinClause, JoinType, Literal, OrderBy, OrderDirection,
    SelectColumn, SelectStatement, Statement, TableRef, UnaryOp, UnionBranch,
};
use crate::lexer::{Keyword, Lexer, Span, Token, TokenKind};

/// Functions that may be written without parentheses.
const NILADIC_FUNCTIONS: &[&str] = &[
    "current_timestamp",
    "current_date",
    "current_time",
    "current_user",
    "localtime",
    "localtimestamp",
    "utc_date",
    "utc_time",
    "utc_timestamp",
];

/// DDL parser over one batch of statements.
pub struct Parser<'a> {
    pub(super) input: &'a str,
    pub(super) lexer: Lexer<'a>,
    pub(super) current: Token,
    peeked: Option<Token>,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        Self {
            input,
            lexer,
            current,
            peeked: None,
        }
    }

    /// Parses exactly one statement, optionally followed by semicolons.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the input is not one supported statement.
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let statement = self.parse_one()?;
        while self.check(&TokenKind::Semicolon) {
            self.advance();
        }
        if !self.current.is_eof() {
            return Err(self.unexpected("end of statement"));
        }
        Ok(statement)
    }

    /// Parses a semicolon-separated batch of statements.
    ///
    /// # Errors
    ///
    /// Returns the first `ParseError` encountered.
    pub fn parse_statements(&mut self) -> Result<Vec<Statement>, ParseError> {
        let mut statements = Vec::new();
        loop {
            while self.check(&TokenKind::Semicolon) {
                self.advance();
            }
            if self.current.is_eof() {
                return Ok(statements);
            }
            statements.push(self.parse_one()?);
            if !self.check(&TokenKind::Semicolon) && !self.current.is_eof() {
                return Err(self.unexpected("`;` or end of input"));
            }
        }
    }

    fn parse_one(&mut self) -> Result<Statement, ParseError> {
        match &self.current.kind {
            TokenKind::Keyword(Keyword::Select) => {
                Ok(Statement::Select(self.parse_select_statement()?))
            }
            TokenKind::Keyword(Keyword::Create) => self.parse_create(),
            TokenKind::Keyword(Keyword::Alter) => self.parse_alter(),
            TokenKind::Keyword(Keyword::Drop) => self.parse_drop(),
            TokenKind::Keyword(Keyword::Rename) => self.parse_rename(),
            _ => Err(self.unexpected("CREATE, ALTER, DROP, RENAME or SELECT")),
        }
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Parses a SELECT statement with any trailing UNION branches.
    pub(super) fn parse_select_statement(&mut self) -> Result<SelectStatement, ParseError> {
        let mut select = self.parse_select_block()?;
        while self.check_keyword(Keyword::Union) {
            self.advance();
            let all = if self.check_keyword(Keyword::All) {
                self.advance();
                true
            } else {
                if self.check_keyword(Keyword::Distinct) {
                    self.advance();
                }
                false
            };
            let branch = self.parse_select_block()?;
            select.unions.push(UnionBranch {
                all,
                select: branch,
            });
        }
        Ok(select)
    }

    fn parse_select_block(&mut self) -> Result<SelectStatement, ParseError> {
        self.expect_keyword(Keyword::Select)?;

        let distinct = if self.check_keyword(Keyword::Distinct) {
            self.advance();
            true
        } else {
            if self.check_keyword(Keyword::All) {
                self.advance();
            }
            false
        };

        let mut select = SelectStatement::new(self.parse_select_columns()?);
        select.distinct = distinct;

        if self.check_keyword(Keyword::From) {
            self.advance();
            loop {
                select.from.push(self.parse_table_ref()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        if self.eat_keyword(Keyword::Where) {
            select.where_clause = Some(self.parse_expression(0)?);
        }
        if self.eat_keyword(Keyword::Group) {
            self.expect_keyword(Keyword::By)?;
            select.group_by = self.parse_expression_list()?;
        }
        if self.eat_keyword(Keyword::Having) {
            select.having = Some(self.parse_expression(0)?);
        }
        if self.eat_keyword(Keyword::Order) {
            self.expect_keyword(Keyword::By)?;
            select.order_by = self.parse_order_by_list()?;
        }
        if self.eat_keyword(Keyword::Limit) {
            let first = self.parse_expression(0)?;
            if self.eat(&TokenKind::Comma) {
                // LIMIT offset, count
                select.offset = Some(first);
                select.limit = Some(self.parse_expression(0)?);
            } else {
                select.limit = Some(first);
                if self.eat_keyword(Keyword::Offset) {
                    select.offset = Some(self.parse_expression(0)?);
                }
            }
        }
        Ok(select)
    }

    fn parse_select_columns(&mut self) -> Result<Vec<SelectColumn>, ParseError> {
        let mut columns = vec![];
        loop {
            let expr = self.parse_expression(0)?;
            let alias = if self.eat_keyword(Keyword::As) {
                Some(self.expect_identifier_or_string()?)
            } else if self.check_identifier() {
                Some(self.expect_identifier()?)
            } else {
                None
            };
            columns.push(SelectColumn { expr, alias });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(columns)
    }

    fn parse_table_ref(&mut self) -> Result<TableRef, ParseError> {
        let mut table_ref = self.parse_table_factor()?;
        while let Some(join_type) = self.parse_join_type()? {
            let right = self.parse_table_factor()?;
            let (on, using) = if join_type.is_natural() {
                (None, vec![])
            } else if self.eat_keyword(Keyword::On) {
                (Some(self.parse_expression(0)?), vec![])
            } else if self.eat_keyword(Keyword::Using) {
                self.expect(&TokenKind::LeftParen)?;
                let columns = self.parse_identifier_list()?;
                self.expect(&TokenKind::RightParen)?;
                (None, columns)
            } else if matches!(join_type, JoinType::Left | JoinType::Right) {
                return Err(self.unexpected("ON or USING"));
            } else {
                (None, vec![])
            };
            table_ref = TableRef::Join {
                left: Box::new(table_ref),
                join: Box::new(JoinClause {
                    join_type,
                    table: right,
                    on,
                    using,
                }),
            };
        }
        Ok(table_ref)
    }

    /// A table name, derived table or parenthesized join, without trailing
    /// joins.
    fn parse_table_factor(&mut self) -> Result<TableRef, ParseError> {
        if self.eat(&TokenKind::LeftParen) {
            if self.check_keyword(Keyword::Select) {
                let query = self.parse_select_statement()?;
                self.expect(&TokenKind::RightParen)?;
                self.eat_keyword(Keyword::As);
                let alias = self.expect_identifier()?;
                return Ok(TableRef::Subquery {
                    query: Box::new(query),
                    alias,
                });
            }
            let inner = self.parse_table_ref()?;
            self.expect(&TokenKind::RightParen)?;
            return Ok(inner);
        }

        let first = self.expect_identifier()?;
        let (schema, name) = if self.eat(&TokenKind::Dot) {
            (Some(first), self.expect_identifier()?)
        } else {
            (None, first)
        };
        let alias = if self.eat_keyword(Keyword::As) || self.check_identifier() {
            Some(self.expect_identifier()?)
        } else {
            None
        };
        Ok(TableRef::Table {
            schema,
            name,
            alias,
        })
    }

    fn parse_join_type(&mut self) -> Result<Option<JoinType>, ParseError> {
        let join_type = match &self.current.kind {
            TokenKind::Keyword(Keyword::Join) => JoinType::Inner,
            TokenKind::Keyword(Keyword::Inner) => {
                self.advance();
                JoinType::Inner
            }
            TokenKind::Keyword(Keyword::Cross) => {
                self.advance();
                JoinType::Cross
            }
            TokenKind::Keyword(Keyword::StraightJoin) => {
                self.advance();
                return Ok(Some(JoinType::Straight));
            }
            TokenKind::Keyword(Keyword::Natural) => {
                self.advance();
                if self.eat_keyword(Keyword::Left) {
                    self.eat_keyword(Keyword::Outer);
                    JoinType::NaturalLeft
                } else if self.eat_keyword(Keyword::Right) {
                    self.eat_keyword(Keyword::Outer);
                    JoinType::NaturalRight
                } else {
                    self.eat_keyword(Keyword::Inner);
                    JoinType::Natural
                }
            }
            TokenKind::Keyword(kw @ (Keyword::Left | Keyword::Right)) => {
                let join_type = if *kw == Keyword::Left {
                    JoinType::Left
                } else {
                    JoinType::Right
                };
                self.advance();
                self.eat_keyword(Keyword::Outer);
                join_type
            }
            _ => return Ok(None),
        };
        self.expect_keyword(Keyword::Join)?;
        Ok(Some(join_type))
    }

    fn parse_order_by_list(&mut self) -> Result<Vec<OrderBy>, ParseError> {
        let mut items = vec![];
        loop {
            let expr = self.parse_expression(0)?;
            let direction = if self.eat_keyword(Keyword::Desc) {
                Some(OrderDirection::Desc)
            } else if self.eat_keyword(Keyword::Asc) {
                Some(OrderDirection::Asc)
            } else {
                None
            };
            items.push(OrderBy { expr, direction });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(items)
    }

    // ---------------------------------------------------------------------
    // Expressions
    // ---------------------------------------------------------------------

    /// Parses an expression whose operators bind at least as tightly as
    /// `min_bp`.
    pub(super) fn parse_expression(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let Some((l_bp, r_bp)) = infix_binding_power(&self.current.kind) else {
                break;
            };
            if l_bp < min_bp {
                break;
            }

            // NOT only continues an expression as NOT IN / NOT BETWEEN / NOT LIKE.
            let negated = if self.check_keyword(Keyword::Not) {
                if !matches!(
                    self.peek_kind(),
                    TokenKind::Keyword(Keyword::In | Keyword::Between | Keyword::Like)
                ) {
                    break;
                }
                self.advance();
                true
            } else {
                false
            };

            lhs = match &self.current.kind {
                TokenKind::Keyword(Keyword::Is) => {
                    self.advance();
                    let negated = self.eat_keyword(Keyword::Not);
                    self.expect_keyword(Keyword::Null)?;
                    Expr::IsNull {
                        expr: Box::new(lhs),
                        negated,
                    }
                }
                TokenKind::Keyword(Keyword::In) => {
                    self.advance();
                    self.expect(&TokenKind::LeftParen)?;
                    let expr = if self.check_keyword(Keyword::Select) {
                        Expr::InSubquery {
                            expr: Box::new(lhs),
                            query: Box::new(self.parse_select_statement()?),
                            negated,
                        }
                    } else {
                        Expr::In {
                            expr: Box::new(lhs),
                            list: self.parse_expression_list()?,
                            negated,
                        }
                    };
                    self.expect(&TokenKind::RightParen)?;
                    expr
                }
                TokenKind::Keyword(Keyword::Between) => {
                    self.advance();
                    let low = self.parse_expression(r_bp)?;
                    self.expect_keyword(Keyword::And)?;
                    let high = self.parse_expression(r_bp)?;
                    Expr::Between {
                        expr: Box::new(lhs),
                        low: Box::new(low),
                        high: Box::new(high),
                        negated,
                    }
                }
                kind => {
                    let Some(op) = token_to_binary_op(kind) else {
                        break;
                    };
                    self.advance();
                    let rhs = self.parse_expression(r_bp)?;
                    let expr = lhs.binary(op, rhs);
                    if negated && op == BinaryOp::Like {
                        Expr::Unary {
                            op: UnaryOp::Not,
                            operand: Box::new(Expr::Paren(Box::new(expr))),
                        }
                    } else {
                        expr
                    }
                }
            };
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        if let Some((op, bp)) = prefix_operator(&self.current.kind) {
            self.advance();
            // NOT EXISTS folds into the EXISTS node
            if op == UnaryOp::Not && self.check_keyword(Keyword::Exists) {
                if let Expr::Exists { query, negated } = self.parse_primary()? {
                    return Ok(Expr::Exists {
                        query,
                        negated: !negated,
                    });
                }
            }
            let operand = self.parse_expression(bp)?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let literal = match &self.current.kind {
            TokenKind::Integer(n) => Some(Literal::Integer(*n)),
            TokenKind::Float(f) => Some(Literal::Float(*f)),
            TokenKind::String(s) => Some(Literal::String(s.clone())),
            TokenKind::Blob(b) => Some(Literal::Blob(b.clone())),
            TokenKind::Keyword(Keyword::True) => Some(Literal::Boolean(true)),
            TokenKind::Keyword(Keyword::False) => Some(Literal::Boolean(false)),
            TokenKind::Keyword(Keyword::Null) => Some(Literal::Null),
            _ => None,
        };
        if let Some(literal) = literal {
            self.advance();
            return Ok(Expr::Literal(literal));
        }

        let keyword_call = matches!(self.current.kind, TokenKind::Keyword(_))
            && self.peek_kind() == &TokenKind::LeftParen;

        match &self.current.kind {
            TokenKind::Star => {
                self.advance();
                Ok(Expr::Wildcard { table: None })
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = if self.check_keyword(Keyword::Select) {
                    Expr::Subquery(Box::new(self.parse_select_statement()?))
                } else {
                    Expr::Paren(Box::new(self.parse_expression(0)?))
                };
                self.expect(&TokenKind::RightParen)?;
                Ok(expr)
            }
            TokenKind::Keyword(Keyword::Case) => self.parse_case_expression(),
            TokenKind::Keyword(Keyword::Cast) if keyword_call => {
                self.advance();
                self.parse_cast_expression()
            }
            TokenKind::Keyword(Keyword::Exists) => {
                self.advance();
                self.expect(&TokenKind::LeftParen)?;
                let query = self.parse_select_statement()?;
                self.expect(&TokenKind::RightParen)?;
                Ok(Expr::Exists {
                    query: Box::new(query),
                    negated: false,
                })
            }
            // Reserved words that double as function names: LEFT(), IF(), ...
            TokenKind::Keyword(_) if keyword_call => {
                let name = self.current_text().to_string();
                self.advance();
                self.parse_function_call(name)
            }
            _ if self.check_identifier() => {
                let name = self.expect_identifier()?;
                if self.check(&TokenKind::LeftParen) {
                    return self.parse_function_call(name);
                }
                if self.eat(&TokenKind::Dot) {
                    if self.eat(&TokenKind::Star) {
                        return Ok(Expr::Wildcard { table: Some(name) });
                    }
                    let column = self.expect_identifier()?;
                    return Ok(Expr::qualified_column(name, column));
                }
                if NILADIC_FUNCTIONS.contains(&name.to_ascii_lowercase().as_str()) {
                    return Ok(Expr::function(name, vec![]));
                }
                Ok(Expr::column(name))
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    fn parse_function_call(&mut self, name: String) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let distinct = self.eat_keyword(Keyword::Distinct);
        let args = if self.check(&TokenKind::RightParen) {
            vec![]
        } else {
            self.parse_expression_list()?
        };
        self.expect(&TokenKind::RightParen)?;
        Ok(Expr::Function(FunctionCall {
            name,
            args,
            distinct,
        }))
    }

    fn parse_cast_expression(&mut self) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let expr = self.parse_expression(0)?;
        self.expect_keyword(Keyword::As)?;
        let data_type = self.parse_data_type()?;
        self.expect(&TokenKind::RightParen)?;
        Ok(Expr::Cast {
            expr: Box::new(expr),
            data_type,
        })
    }

    fn parse_case_expression(&mut self) -> Result<Expr, ParseError> {
        self.expect_keyword(Keyword::Case)?;
        let operand = if self.check_keyword(Keyword::When) {
            None
        } else {
            Some(Box::new(self.parse_expression(0)?))
        };
        let mut when_clauses = vec![];
        while self.eat_keyword(Keyword::When) {
            let when_expr = self.parse_expression(0)?;
            self.expect_keyword(Keyword::Then)?;
            let then_expr = self.parse_expression(0)?;
            when_clauses.push((when_expr, then_expr));
        }
        if when_clauses.is_empty() {
            return Err(self.unexpected("WHEN"));
        }
        let else_clause = if self.eat_keyword(Keyword::Else) {
            Some(Box::new(self.parse_expression(0)?))
        } else {
            None
        };
        self.expect_keyword(Keyword::End)?;
        Ok(Expr::Case {
            operand,
            when_clauses,
            else_clause,
        })
    }

    pub(super) fn parse_expression_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = vec![];
        loop {
            exprs.push(self.parse_expression(0)?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(exprs)
    }

    pub(super) fn parse_identifier_list(&mut self) -> Result<Vec<String>, ParseError> {
        let mut idents = vec![];
        loop {
            idents.push(self.expect_identifier()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(idents)
    }

    // ---------------------------------------------------------------------
    // Token cursor
    // ---------------------------------------------------------------------

    pub(super) fn advance(&mut self) {
        self.current = self
            .peeked
            .take()
            .unwrap_or_else(|| self.lexer.next_token());
    }

    /// Kind of the token after the current one.
    pub(super) fn peek_kind(&mut self) -> &TokenKind {
        let lexer = &mut self.lexer;
        &self.peeked.get_or_insert_with(|| lexer.next_token()).kind
    }

    /// Source text of the current token.
    pub(super) fn current_text(&self) -> &'a str {
        self.current.span.slice(self.input)
    }

    pub(super) fn current_span(&self) -> Span {
        self.current.span
    }

    /// Compares token kinds by variant only.
    pub(super) fn check(&self, kind: &TokenKind) -> bool {
        core::mem::discriminant(&self.current.kind) == core::mem::discriminant(kind)
    }

    pub(super) fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(&self.current.kind, TokenKind::Keyword(kw) if *kw == keyword)
    }

    /// Bare identifiers, quoted identifiers and unreserved keywords.
    pub(super) fn check_identifier(&self) -> bool {
        match &self.current.kind {
            TokenKind::Identifier(_) => true,
            TokenKind::Keyword(kw) => !kw.is_reserved(),
            _ => false,
        }
    }

    /// Consumes the current token if it has the given kind.
    pub(super) fn eat(&mut self, kind: &TokenKind) -> bool {
        let found = self.check(kind);
        if found {
            self.advance();
        }
        found
    }

    pub(super) fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        let found = self.check_keyword(keyword);
        if found {
            self.advance();
        }
        found
    }

    pub(super) fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected(describe_expected(kind)))
        }
    }

    pub(super) fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), ParseError> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.unexpected(keyword.as_str()))
        }
    }

    /// Expects an identifier; unreserved keywords keep their source spelling.
    pub(super) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        let name = match &self.current.kind {
            TokenKind::Identifier(name) => name.clone(),
            TokenKind::Keyword(kw) if !kw.is_reserved() => self.current_text().to_string(),
            _ => return Err(self.unexpected("identifier")),
        };
        self.advance();
        Ok(name)
    }

    pub(super) fn expect_identifier_or_string(&mut self) -> Result<String, ParseError> {
        if let TokenKind::String(value) = &self.current.kind {
            let value = value.clone();
            self.advance();
            return Ok(value);
        }
        self.expect_identifier()
    }

    pub(super) fn expect_string(&mut self) -> Result<String, ParseError> {
        if let TokenKind::String(value) = &self.current.kind {
            let value = value.clone();
            self.advance();
            Ok(value)
        } else {
            Err(self.unexpected("string literal"))
        }
    }

    pub(super) fn expect_unsigned(&mut self) -> Result<u64, ParseError> {
        if let TokenKind::Integer(n) = self.current.kind {
            let value = u64::try_from(n)
                .map_err(|_| ParseError::new("expected a non-negative integer", self.current.span))?;
            self.advance();
            Ok(value)
        } else {
            Err(self.unexpected("integer"))
        }
    }

    pub(super) fn expect_u32(&mut self) -> Result<u32, ParseError> {
        let span = self.current.span;
        let value = self.expect_unsigned()?;
        u32::try_from(value).map_err(|_| ParseError::new("integer out of range", span))
    }

    pub(super) fn unexpected(&self, expected: impl Into<String>) -> ParseError {
        ParseError::unexpected(expected, self.current.kind.clone(), self.current.span)
    }
}

fn describe_expected(kind: &TokenKind) -> &'static str {
    match kind {
        TokenKind::LeftParen => "`(`",
        TokenKind::RightParen => "`)`",
        TokenKind::Comma => "`,`",
        TokenKind::Semicolon => "`;`",
        TokenKind::Dot => "`.`",
        TokenKind::Eq => "`=`",
        _ => "token",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(sql: &str) -> Result<Statement, ParseError> {
        Parser::new(sql).parse_statement()
    }

    fn select(sql: &str) -> SelectStatement {
        match parse(sql) {
            Ok(Statement::Select(select)) => select,
            other => panic!("expected SELECT, got {other:?}"),
        }
    }

    #[test]
    fn test_select_with_join_and_alias() {
        let query = select("SELECT u.id, o.amount total FROM users u LEFT JOIN orders AS o ON u.id = o.user_id");
        assert_eq!(query.columns[1].alias.as_deref(), Some("total"));
        let TableRef::Join { join, .. } = &query.from[0] else {
            panic!("expected a join");
        };
        assert_eq!(join.join_type, JoinType::Left);
        assert!(join.on.is_some());
    }

    #[test]
    fn test_expression_precedence() {
        let query = select("SELECT 1 + 2 * 3");
        let Expr::Binary { op, right, .. } = &query.columns[0].expr else {
            panic!("expected binary expression");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(
            right.as_ref(),
            Expr::Binary {
                op: BinaryOp::Mul,
                ..
            }
        ));
    }

    #[test]
    fn test_negated_predicates() {
        let query = select("SELECT a FROM t WHERE a NOT IN (1, 2) AND b NOT BETWEEN 1 AND 5");
        let Some(Expr::Binary { left, right, .. }) = &query.where_clause else {
            panic!("expected AND");
        };
        assert!(matches!(left.as_ref(), Expr::In { negated: true, .. }));
        assert!(matches!(right.as_ref(), Expr::Between { negated: true, .. }));

        let query = select("SELECT a FROM t WHERE NOT EXISTS (SELECT 1 FROM u)");
        assert!(matches!(query.where_clause, Some(Expr::Exists { negated: true, .. })));

        let query = select("SELECT a FROM t WHERE NOT a = 1");
        assert!(matches!(
            query.where_clause,
            Some(Expr::Unary {
                op: UnaryOp::Not,
                ..
            })
        ));
    }

    #[test]
    fn test_niladic_and_keyword_functions() {
        let query = select("SELECT CURRENT_TIMESTAMP, LEFT(name, 3), IF(a, 1, 2) FROM t");
        assert!(matches!(&query.columns[0].expr, Expr::Function(f) if f.args.is_empty()));
        assert!(matches!(&query.columns[1].expr, Expr::Function(f) if f.name == "LEFT"));
        assert!(matches!(&query.columns[2].expr, Expr::Function(f) if f.args.len() == 3));
    }

    #[test]
    fn test_union_and_limit() {
        let query = select("SELECT a FROM t UNION ALL SELECT b FROM u LIMIT 5, 10");
        assert_eq!(query.unions.len(), 1);
        assert!(query.unions[0].all);
        assert_eq!(query.unions[0].select.limit, Some(Expr::integer(10)));
        assert_eq!(query.unions[0].select.offset, Some(Expr::integer(5)));
    }

    #[test]
    fn test_comma_join_and_derived_table() {
        let query = select("SELECT * FROM a, (SELECT id FROM b) AS d");
        assert_eq!(query.from.len(), 2);
        assert!(matches!(&query.from[1], TableRef::Subquery { alias, .. } if alias == "d"));
    }

    #[test]
    fn test_unreserved_keyword_as_column() {
        let query = select("SELECT comment, `select` FROM t");
        assert_eq!(query.columns[0].expr, Expr::column("comment"));
        assert_eq!(query.columns[1].expr, Expr::column("select"));
    }

    #[test]
    fn test_statement_batch() {
        let statements = Parser::new("SELECT 1; SELECT 2;;").parse_statements();
        assert_eq!(statements.map(|s| s.len()), Ok(2));
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        let err = parse("SELECT 1 SELECT 2").expect_err("garbage after statement");
        assert_eq!(err.expected.as_deref(), Some("end of statement"));
    }
}
