//! Operator matching helpers.

use nbi_ir::{BinaryOp, CmpOp, UnaryOp};
use nbi_lexer::TokenKind;

use crate::Parser;

pub(super) fn bitor_op(kind: &TokenKind) -> Option<BinaryOp> {
    matches!(kind, TokenKind::Pipe).then_some(BinaryOp::BitOr)
}

pub(super) fn bitxor_op(kind: &TokenKind) -> Option<BinaryOp> {
    matches!(kind, TokenKind::Caret).then_some(BinaryOp::BitXor)
}

pub(super) fn bitand_op(kind: &TokenKind) -> Option<BinaryOp> {
    matches!(kind, TokenKind::Amp).then_some(BinaryOp::BitAnd)
}

pub(super) fn shift_op(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::LShift => Some(BinaryOp::LShift),
        TokenKind::RShift => Some(BinaryOp::RShift),
        _ => None,
    }
}

pub(super) fn additive_op(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Sub),
        _ => None,
    }
}

pub(super) fn multiplicative_op(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Star => Some(BinaryOp::Mul),
        TokenKind::Slash => Some(BinaryOp::Div),
        TokenKind::DoubleSlash => Some(BinaryOp::FloorDiv),
        TokenKind::Percent => Some(BinaryOp::Mod),
        TokenKind::At => Some(BinaryOp::MatMul),
        _ => None,
    }
}

pub(super) fn unary_op(kind: &TokenKind) -> Option<UnaryOp> {
    match kind {
        TokenKind::Minus => Some(UnaryOp::Neg),
        TokenKind::Plus => Some(UnaryOp::Pos),
        TokenKind::Tilde => Some(UnaryOp::Invert),
        _ => None,
    }
}

impl Parser<'_> {
    /// Consume a comparison operator, including the two-token forms
    /// `not in` and `is not`.
    pub(super) fn eat_comparison_op(&mut self) -> Option<CmpOp> {
        let op = match self.current_kind() {
            TokenKind::EqEq => CmpOp::Eq,
            TokenKind::NotEq => CmpOp::NotEq,
            TokenKind::Lt => CmpOp::Lt,
            TokenKind::LtEq => CmpOp::LtE,
            TokenKind::Gt => CmpOp::Gt,
            TokenKind::GtEq => CmpOp::GtE,
            TokenKind::In => CmpOp::In,
            TokenKind::Not if self.peek_next_kind() == &TokenKind::In => {
                self.advance();
                CmpOp::NotIn
            }
            TokenKind::Is if self.peek_next_kind() == &TokenKind::Not => {
                self.advance();
                CmpOp::IsNot
            }
            TokenKind::Is => CmpOp::Is,
            _ => return None,
        };
        self.advance();
        Some(op)
    }
}
