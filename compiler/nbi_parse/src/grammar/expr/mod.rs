//! Expression parsing.
//!
//! - `mod.rs`: entry points, conditional expressions, lambdas, the boolean
//!   and binary precedence chain
//! - `operators.rs`: operator matching helpers
//! - `primary.rs`: atoms, displays, comprehensions, string concatenation
//! - `postfix.rs`: calls, subscripts, attribute access

mod operators;
mod postfix;
mod primary;

use std::rc::Rc;

use nbi_ir::{BinaryOp, BoolOp, Expr, ExprKind, Lambda, UnaryOp};
use nbi_lexer::TokenKind;
use nbi_stack::ensure_sufficient_stack;

use crate::{ParseError, ParseErrorKind, Parser};

/// Tokens that may begin an expression. Used to tell a trailing comma
/// from a continued list.
fn starts_expression(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Name(_)
            | TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::Imaginary(_)
            | TokenKind::Str(_)
            | TokenKind::Bytes(_)
            | TokenKind::FString { .. }
            | TokenKind::None
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Ellipsis
            | TokenKind::LParen
            | TokenKind::LBracket
            | TokenKind::LBrace
            | TokenKind::Minus
            | TokenKind::Plus
            | TokenKind::Tilde
            | TokenKind::Not
            | TokenKind::Lambda
            | TokenKind::Await
            | TokenKind::Star
            | TokenKind::Yield
    )
}

impl Parser<'_> {
    /// Parse a single expression (`test` in the reference grammar).
    ///
    /// Wrapped in `ensure_sufficient_stack` so deeply nested source cannot
    /// overflow the native stack.
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        ensure_sufficient_stack(|| self.parse_expr_inner())
    }

    fn parse_expr_inner(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::Lambda) {
            return self.parse_lambda();
        }
        let start = self.current_span();
        let line = self.current_line();
        let body = self.parse_or()?;

        if self.eat(&TokenKind::If) {
            let test = self.parse_or()?;
            self.expect(&TokenKind::Else)?;
            let orelse = self.parse_expr()?;
            return Ok(Expr::new(
                ExprKind::IfExp {
                    test: Box::new(test),
                    body: Box::new(body),
                    orelse: Box::new(orelse),
                },
                self.span_from(start),
                line,
            ));
        }
        if self.check(&TokenKind::ColonEq) {
            return Err(self.error_here(ParseErrorKind::Unsupported("assignment expression")));
        }
        Ok(body)
    }

    /// Comma-separated expressions, with `*` unpacking allowed. More than
    /// one item, or a trailing comma, makes a tuple.
    pub(crate) fn parse_testlist_star_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_expr_list(Self::parse_star_or_expr)
    }

    /// Right-hand side of an assignment or an expression statement, where
    /// a bare `yield` is allowed.
    pub(crate) fn parse_yield_or_testlist(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::Yield) {
            self.parse_yield_expr()
        } else {
            self.parse_testlist_star_expr()
        }
    }

    /// `yield`, `yield a, b` or `yield from iterable`, positioned on
    /// `yield`.
    pub(crate) fn parse_yield_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span();
        let line = self.current_line();
        self.expect(&TokenKind::Yield)?;
        let kind = if self.eat(&TokenKind::From) {
            ExprKind::YieldFrom(Box::new(self.parse_expr()?))
        } else if starts_expression(self.current_kind()) && !self.check(&TokenKind::Yield) {
            ExprKind::Yield(Some(Box::new(self.parse_testlist_star_expr()?)))
        } else {
            ExprKind::Yield(None)
        };
        Ok(Expr::new(kind, self.span_from(start), line))
    }

    /// Binding targets for `for`, `del` and comprehensions. Items stop
    /// below comparisons so `for x in xs` leaves `in` unconsumed.
    pub(crate) fn parse_target_list(&mut self) -> Result<Expr, ParseError> {
        self.parse_expr_list(Self::parse_target)
    }

    pub(crate) fn parse_target(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::Star) {
            let start = self.current_span();
            let line = self.current_line();
            self.advance();
            let inner = self.parse_bitor()?;
            return Ok(Expr::new(
                ExprKind::Starred(Box::new(inner)),
                self.span_from(start),
                line,
            ));
        }
        self.parse_bitor()
    }

    pub(crate) fn parse_star_or_expr(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::Star) {
            return self.parse_target();
        }
        self.parse_expr()
    }

    fn parse_expr_list(
        &mut self,
        mut item: impl FnMut(&mut Self) -> Result<Expr, ParseError>,
    ) -> Result<Expr, ParseError> {
        let start = self.current_span();
        let line = self.current_line();
        let first = item(self)?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            if !starts_expression(self.current_kind()) {
                break;
            }
            items.push(item(self)?);
        }
        Ok(Expr::new(
            ExprKind::Tuple(items),
            self.span_from(start),
            line,
        ))
    }

    /// `lambda params: body`
    fn parse_lambda(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span();
        let line = self.current_line();
        self.advance();
        let params = self.parse_parameters(&TokenKind::Colon, false)?;
        self.expect(&TokenKind::Colon)?;
        let body = self.parse_expr()?;
        Ok(Expr::new(
            ExprKind::Lambda(Rc::new(Lambda { params, body })),
            self.span_from(start),
            line,
        ))
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        self.parse_bool_level(BoolOp::Or, &TokenKind::Or, Self::parse_and)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        self.parse_bool_level(BoolOp::And, &TokenKind::And, Self::parse_not)
    }

    fn parse_bool_level(
        &mut self,
        op: BoolOp,
        token: &TokenKind,
        mut next: impl FnMut(&mut Self) -> Result<Expr, ParseError>,
    ) -> Result<Expr, ParseError> {
        let start = self.current_span();
        let line = self.current_line();
        let first = next(self)?;
        if !self.check(token) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.eat(token) {
            values.push(next(self)?);
        }
        Ok(Expr::new(
            ExprKind::BoolOp { op, values },
            self.span_from(start),
            line,
        ))
    }

    fn parse_not(&mut self) -> Result<Expr, ParseError> {
        if !self.check(&TokenKind::Not) {
            return self.parse_comparison();
        }
        let start = self.current_span();
        let line = self.current_line();
        self.advance();
        let operand = ensure_sufficient_stack(|| self.parse_not())?;
        Ok(Expr::new(
            ExprKind::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            },
            self.span_from(start),
            line,
        ))
    }

    /// `a < b <= c` keeps every operator in one node.
    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span();
        let line = self.current_line();
        let left = self.parse_bitor()?;
        let mut ops = Vec::new();
        while let Some(op) = self.eat_comparison_op() {
            ops.push((op, self.parse_bitor()?));
        }
        if ops.is_empty() {
            return Ok(left);
        }
        Ok(Expr::new(
            ExprKind::Compare {
                left: Box::new(left),
                ops,
            },
            self.span_from(start),
            line,
        ))
    }

    fn parse_bitor(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(operators::bitor_op, Self::parse_bitxor)
    }

    fn parse_bitxor(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(operators::bitxor_op, Self::parse_bitand)
    }

    fn parse_bitand(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(operators::bitand_op, Self::parse_shift)
    }

    fn parse_shift(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(operators::shift_op, Self::parse_arith)
    }

    fn parse_arith(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(operators::additive_op, Self::parse_term)
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(operators::multiplicative_op, Self::parse_factor)
    }

    /// Left-associative binary level.
    fn parse_binary_level(
        &mut self,
        matcher: fn(&TokenKind) -> Option<BinaryOp>,
        mut next: impl FnMut(&mut Self) -> Result<Expr, ParseError>,
    ) -> Result<Expr, ParseError> {
        let start = self.current_span();
        let line = self.current_line();
        let mut left = next(self)?;
        while let Some(op) = matcher(self.current_kind()) {
            self.advance();
            let right = next(self)?;
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                self.span_from(start),
                line,
            );
        }
        Ok(left)
    }

    /// Prefix `-`, `+` and `~`.
    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        let Some(op) = operators::unary_op(self.current_kind()) else {
            return self.parse_power();
        };
        let start = self.current_span();
        let line = self.current_line();
        self.advance();
        let operand = ensure_sufficient_stack(|| self.parse_factor())?;
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            self.span_from(start),
            line,
        ))
    }

    /// `**` binds tighter than a unary minus on its left and is
    /// right-associative: `-2 ** -1` is `-(2 ** (-1))`.
    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span();
        let line = self.current_line();
        let base = self.parse_await()?;
        if !self.eat(&TokenKind::DoubleStar) {
            return Ok(base);
        }
        let exponent = self.parse_factor()?;
        Ok(Expr::new(
            ExprKind::Binary {
                left: Box::new(base),
                op: BinaryOp::Pow,
                right: Box::new(exponent),
            },
            self.span_from(start),
            line,
        ))
    }

    fn parse_await(&mut self) -> Result<Expr, ParseError> {
        if !self.check(&TokenKind::Await) {
            return self.parse_primary();
        }
        let start = self.current_span();
        let line = self.current_line();
        self.advance();
        let operand = self.parse_primary()?;
        Ok(Expr::new(
            ExprKind::Await(Box::new(operand)),
            self.span_from(start),
            line,
        ))
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span();
        let line = self.current_line();
        let atom = self.parse_atom()?;
        self.parse_postfix(atom, start, line)
    }
}

#[cfg(test)]
mod tests;
