//! Postfix forms: calls, subscripts and attribute access.

use nbi_ir::{Argument, Expr, ExprKind, Span};
use nbi_lexer::TokenKind;

use crate::{ParseError, ParseErrorKind, Parser};

impl Parser<'_> {
    pub(super) fn parse_postfix(
        &mut self,
        mut expr: Expr,
        start: Span,
        line: u32,
    ) -> Result<Expr, ParseError> {
        loop {
            let kind = match self.current_kind() {
                TokenKind::LParen => {
                    self.advance();
                    let args = self.parse_call_arguments()?;
                    ExprKind::Call {
                        func: Box::new(expr),
                        args,
                    }
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_subscript()?;
                    self.expect(&TokenKind::RBracket)?;
                    ExprKind::Subscript {
                        value: Box::new(expr),
                        index: Box::new(index),
                    }
                }
                TokenKind::Dot => {
                    self.advance();
                    let attr = self.expect_name()?;
                    ExprKind::Attribute {
                        value: Box::new(expr),
                        attr,
                    }
                }
                _ => return Ok(expr),
            };
            expr = Expr::new(kind, self.span_from(start), line);
        }
    }

    /// Arguments after an opening `(`, up to and including the `)`.
    pub(crate) fn parse_call_arguments(&mut self) -> Result<Vec<Argument>, ParseError> {
        let mut args = Vec::new();
        let mut seen_keyword = false;

        while !self.check(&TokenKind::RParen) {
            if self.eat(&TokenKind::Star) {
                args.push(Argument::Unpack(self.parse_expr()?));
            } else if self.eat(&TokenKind::DoubleStar) {
                seen_keyword = true;
                args.push(Argument::UnpackMapping(self.parse_expr()?));
            } else if let (TokenKind::Name(name), TokenKind::Eq) =
                (self.current_kind(), self.peek_next_kind())
            {
                self.advance();
                self.advance();
                seen_keyword = true;
                args.push(Argument::Keyword(name.clone(), self.parse_expr()?));
            } else {
                let start = self.current_span();
                let line = self.current_line();
                let value = self.parse_expr()?;
                if seen_keyword {
                    return Err(ParseError::new(
                        ParseErrorKind::PositionalAfterKeyword,
                        value.span,
                    ));
                }
                if self.starts_comprehension() {
                    let generators = self.parse_comprehension_clauses()?;
                    let genexp = Expr::new(
                        ExprKind::ListComp {
                            elt: Box::new(value),
                            generators,
                        },
                        self.span_from(start),
                        line,
                    );
                    args.push(Argument::Positional(genexp));
                    break;
                }
                args.push(Argument::Positional(value));
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(args)
    }

    /// Index expression inside `[]`: an expression, a slice, or a tuple of
    /// either.
    fn parse_subscript(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span();
        let line = self.current_line();
        let first = self.parse_slice_item()?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            if self.check(&TokenKind::RBracket) {
                break;
            }
            items.push(self.parse_slice_item()?);
        }
        Ok(Expr::new(ExprKind::Tuple(items), self.span_from(start), line))
    }

    fn parse_slice_item(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span();
        let line = self.current_line();
        let lower = if self.check(&TokenKind::Colon) {
            None
        } else {
            let expr = self.parse_expr()?;
            if !self.check(&TokenKind::Colon) {
                return Ok(expr);
            }
            Some(Box::new(expr))
        };
        self.expect(&TokenKind::Colon)?;
        let upper = self.parse_slice_bound()?;
        let step = if self.eat(&TokenKind::Colon) {
            self.parse_slice_bound()?
        } else {
            None
        };
        Ok(Expr::new(
            ExprKind::Slice { lower, upper, step },
            self.span_from(start),
            line,
        ))
    }

    fn parse_slice_bound(&mut self) -> Result<Option<Box<Expr>>, ParseError> {
        if matches!(
            self.current_kind(),
            TokenKind::Colon | TokenKind::RBracket | TokenKind::Comma
        ) {
            return Ok(None);
        }
        Ok(Some(Box::new(self.parse_expr()?)))
    }
}
