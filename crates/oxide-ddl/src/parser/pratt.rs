//! Operator precedence for the Pratt expression parser, following MySQL's
//! precedence table.

use crate::ast::{BinaryOp, UnaryOp};
use crate::lexer::{Keyword, TokenKind};

/// Binding power of prefix `NOT`: looser than comparisons.
pub const NOT_PREFIX_BP: u8 = 7;
/// Binding power of `-`, `~` and `!`.
pub const UNARY_BP: u8 = 23;
/// Binding power used where only a single operand may follow (DEFAULT
/// values): no infix operator binds this tightly.
pub const OPERAND_ONLY_BP: u8 = 100;

/// Returns `(left_bp, right_bp)` for an infix operator token; all binary
/// operators are left-associative.
#[must_use]
pub const fn infix_binding_power(kind: &TokenKind) -> Option<(u8, u8)> {
    match kind {
        TokenKind::Keyword(Keyword::Or) | TokenKind::DoublePipe => Some((1, 2)),
        TokenKind::Keyword(Keyword::Xor) => Some((3, 4)),
        TokenKind::Keyword(Keyword::And) | TokenKind::DoubleAmpersand => Some((5, 6)),
        TokenKind::Eq
        | TokenKind::NullSafeEq
        | TokenKind::NotEq
        | TokenKind::Lt
        | TokenKind::LtEq
        | TokenKind::Gt
        | TokenKind::GtEq
        | TokenKind::Keyword(
            Keyword::Is | Keyword::In | Keyword::Between | Keyword::Like | Keyword::Not,
        ) => Some((9, 10)),
        TokenKind::BitOr => Some((11, 12)),
        TokenKind::BitAnd => Some((13, 14)),
        TokenKind::LeftShift | TokenKind::RightShift => Some((15, 16)),
        TokenKind::Plus | TokenKind::Minus => Some((17, 18)),
        TokenKind::Star
        | TokenKind::Slash
        | TokenKind::Percent
        | TokenKind::Keyword(Keyword::Div | Keyword::Mod) => Some((19, 20)),
        TokenKind::BitXor => Some((21, 22)),
        _ => None,
    }
}

#[must_use]
pub const fn token_to_binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Sub),
        TokenKind::Star => Some(BinaryOp::Mul),
        TokenKind::Slash => Some(BinaryOp::Div),
        TokenKind::Keyword(Keyword::Div) => Some(BinaryOp::IntDiv),
        TokenKind::Percent | TokenKind::Keyword(Keyword::Mod) => Some(BinaryOp::Mod),
        TokenKind::Eq => Some(BinaryOp::Eq),
        TokenKind::NullSafeEq => Some(BinaryOp::NullSafeEq),
        TokenKind::NotEq => Some(BinaryOp::NotEq),
        TokenKind::Lt => Some(BinaryOp::Lt),
        TokenKind::LtEq => Some(BinaryOp::LtEq),
        TokenKind::Gt => Some(BinaryOp::Gt),
        TokenKind::GtEq => Some(BinaryOp::GtEq),
        TokenKind::Keyword(Keyword::Like) => Some(BinaryOp::Like),
        TokenKind::Keyword(Keyword::And) | TokenKind::DoubleAmpersand => Some(BinaryOp::And),
        TokenKind::Keyword(Keyword::Or) | TokenKind::DoublePipe => Some(BinaryOp::Or),
        TokenKind::Keyword(Keyword::Xor) => Some(BinaryOp::Xor),
        TokenKind::BitAnd => Some(BinaryOp::BitAnd),
        TokenKind::BitOr => Some(BinaryOp::BitOr),
        TokenKind::BitXor => Some(BinaryOp::BitXor),
        TokenKind::LeftShift => Some(BinaryOp::LeftShift),
        TokenKind::RightShift => Some(BinaryOp::RightShift),
        _ => None,
    }
}

/// Unary operator for a prefix token, with its binding power.
#[must_use]
pub const fn prefix_operator(kind: &TokenKind) -> Option<(UnaryOp, u8)> {
    match kind {
        TokenKind::Minus => Some((UnaryOp::Neg, UNARY_BP)),
        TokenKind::BitNot => Some((UnaryOp::BitNot, UNARY_BP)),
        TokenKind::Bang => Some((UnaryOp::Not, UNARY_BP)),
        TokenKind::Keyword(Keyword::Not) => Some((UnaryOp::Not, NOT_PREFIX_BP)),
        _ => None,
    }
}
