//! DDL lexer.
//!
//! Hand-written tokenizer for the MySQL flavour of SQL used by schema
//! definitions: backtick identifiers, `#` comments, backslash escapes in
//! string literals.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{Keyword, Token, TokenKind};
pub use tokenizer::Lexer;
