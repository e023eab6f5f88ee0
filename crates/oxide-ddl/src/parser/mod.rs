//! DDL parser.
//!
//! A hand-written recursive descent parser with Pratt expression parsing.
//! [`Parser::parse_statements`] splits a batch on semicolons.

mod ddl;
mod error;
#[allow(clippy::module_inception)]
mod parser;
mod pratt;

pub use error::ParseError;
pub use parser::Parser;
