//! # oxide-ddl
//!
//! Parser and canonical printer for the MySQL data definition language.
//!
//! This crate provides:
//! - A hand-written lexer for MySQL lexical conventions (backtick
//!   identifiers, `#` comments, backslash escapes)
//! - A recursive descent parser with Pratt expression parsing for
//!   `CREATE`/`ALTER`/`DROP`/`RENAME` on tables and views, and the `SELECT`
//!   subset view definitions use
//! - A printer: every AST node renders to canonical SQL through `Display`
//!
//! ```rust
//! use oxide_ddl::{parse_statement, Statement};
//!
//! let statement = parse_statement("create table t (id int, primary key (id))").unwrap();
//! let Statement::CreateTable(table) = &statement else { unreachable!() };
//! assert_eq!(table.columns[0].name, "id");
//! assert_eq!(
//!     statement.to_string(),
//!     "CREATE TABLE t (\n    id int,\n    PRIMARY KEY (id)\n)"
//! );
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod printer;

pub use ast::{Expr, SelectStatement, Statement};
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use parser::{ParseError, Parser};
pub use printer::{quote_identifier, quote_string};

/// Parses a single statement.
///
/// # Errors
///
/// Returns a `ParseError` if `sql` is not exactly one supported statement.
pub fn parse_statement(sql: &str) -> Result<Statement, ParseError> {
    Parser::new(sql).parse_statement()
}

/// Parses a semicolon-separated batch of statements.
///
/// # Errors
///
/// Returns the first `ParseError` in the batch.
pub fn parse_statements(sql: &str) -> Result<Vec<Statement>, ParseError> {
    Parser::new(sql).parse_statements()
}
