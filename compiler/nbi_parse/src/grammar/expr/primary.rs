//! Atoms: names, literals, parenthesized forms and displays.

use nbi_ir::{Comprehension, Constant, Expr, ExprKind, FStringPart, Span};
use nbi_lexer::TokenKind;
use tracing::trace;

use crate::grammar::check_assign_target;
use crate::grammar::fstring::parse_fstring;
use crate::{ParseError, ParseErrorKind, Parser};

impl Parser<'_> {
    pub(super) fn parse_atom(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span();
        let line = self.current_line();
        let kind = match self.current_kind() {
            TokenKind::Name(name) => ExprKind::Name(name.clone()),
            TokenKind::Int(value) => ExprKind::Constant(Constant::Int(*value)),
            TokenKind::Float(value) => ExprKind::Constant(Constant::Float(*value)),
            TokenKind::Imaginary(value) => ExprKind::Constant(Constant::Imaginary(*value)),
            TokenKind::None => ExprKind::Constant(Constant::None),
            TokenKind::True => ExprKind::Constant(Constant::Bool(true)),
            TokenKind::False => ExprKind::Constant(Constant::Bool(false)),
            TokenKind::Ellipsis => ExprKind::Constant(Constant::Ellipsis),
            TokenKind::Str(_) | TokenKind::FString { .. } => return self.parse_strings(),
            TokenKind::Bytes(_) => return self.parse_bytes(),
            TokenKind::LParen => return self.parse_paren(),
            TokenKind::LBracket => return self.parse_list_display(),
            TokenKind::LBrace => return self.parse_brace_display(),
            TokenKind::Yield => return Err(self.error_here(ParseErrorKind::InvalidSyntax)),
            _ => return Err(self.error_expected("an expression")),
        };
        self.advance();
        Ok(Expr::new(kind, start, line))
    }

    /// Adjacent string literals concatenate. Any f-string in the run turns
    /// the whole run into an f-string.
    fn parse_strings(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span();
        let line = self.current_line();
        let mut parts: Vec<FStringPart> = Vec::new();
        let mut formatted = false;

        loop {
            let token = self.cursor.current();
            match &token.kind {
                TokenKind::Str(text) => push_literal(&mut parts, text),
                TokenKind::FString { body, raw, offset } => {
                    formatted = true;
                    for part in parse_fstring(body, *raw, *offset, token.line)? {
                        match part {
                            FStringPart::Literal(text) => push_literal(&mut parts, &text),
                            field => parts.push(field),
                        }
                    }
                }
                TokenKind::Bytes(_) => return Err(self.error_here(ParseErrorKind::MixedBytes)),
                _ => break,
            }
            self.advance();
        }

        let span = self.span_from(start);
        if formatted {
            return Ok(Expr::new(ExprKind::FString(parts), span, line));
        }
        let text = match parts.pop() {
            Some(FStringPart::Literal(text)) => text,
            _ => String::new(),
        };
        Ok(Expr::new(ExprKind::Constant(Constant::Str(text)), span, line))
    }

    fn parse_bytes(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span();
        let line = self.current_line();
        let mut bytes = Vec::new();
        loop {
            match self.current_kind() {
                TokenKind::Bytes(chunk) => bytes.extend_from_slice(chunk),
                TokenKind::Str(_) | TokenKind::FString { .. } => {
                    return Err(self.error_here(ParseErrorKind::MixedBytes));
                }
                _ => break,
            }
            self.advance();
        }
        Ok(Expr::new(
            ExprKind::Constant(Constant::Bytes(bytes)),
            self.span_from(start),
            line,
        ))
    }

    /// `()`, `(expr)`, `(yield ...)`, `(a, b)` or a generator expression.
    fn parse_paren(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span();
        let line = self.current_line();
        self.advance();

        if self.eat(&TokenKind::RParen) {
            return Ok(Expr::new(ExprKind::Tuple(Vec::new()), self.span_from(start), line));
        }
        if self.check(&TokenKind::Yield) {
            let value = self.parse_yield_expr()?;
            self.expect(&TokenKind::RParen)?;
            return Ok(value);
        }

        let first = self.parse_star_or_expr()?;
        if self.starts_comprehension() {
            let generators = self.parse_comprehension_clauses()?;
            self.expect(&TokenKind::RParen)?;
            trace!(line, "generator expression materialized as a list");
            return Ok(Expr::new(
                ExprKind::ListComp {
                    elt: Box::new(first),
                    generators,
                },
                self.span_from(start),
                line,
            ));
        }
        if self.eat(&TokenKind::RParen) {
            if let ExprKind::Starred(_) = first.kind {
                return Err(ParseError::new(
                    ParseErrorKind::Unsupported("starred expression here"),
                    first.span,
                ));
            }
            return Ok(first);
        }

        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            if self.check(&TokenKind::RParen) {
                break;
            }
            items.push(self.parse_star_or_expr()?);
        }
        self.expect(&TokenKind::RParen)?;
        Ok(Expr::new(ExprKind::Tuple(items), self.span_from(start), line))
    }

    /// `[a, b]` or `[x for x in xs]`
    fn parse_list_display(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span();
        let line = self.current_line();
        self.advance();

        if self.eat(&TokenKind::RBracket) {
            return Ok(Expr::new(ExprKind::List(Vec::new()), self.span_from(start), line));
        }

        let first = self.parse_star_or_expr()?;
        if self.starts_comprehension() {
            let generators = self.parse_comprehension_clauses()?;
            self.expect(&TokenKind::RBracket)?;
            return Ok(Expr::new(
                ExprKind::ListComp {
                    elt: Box::new(first),
                    generators,
                },
                self.span_from(start),
                line,
            ));
        }

        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            if self.check(&TokenKind::RBracket) {
                break;
            }
            items.push(self.parse_star_or_expr()?);
        }
        self.expect(&TokenKind::RBracket)?;
        Ok(Expr::new(ExprKind::List(items), self.span_from(start), line))
    }

    /// `{}`, `{k: v, **m}`, `{k: v for ...}`, `{a, *b}` or
    /// `{x for ...}`.
    fn parse_brace_display(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span();
        let line = self.current_line();
        self.advance();

        if self.eat(&TokenKind::RBrace) {
            return Ok(Expr::new(ExprKind::Dict(Vec::new()), self.span_from(start), line));
        }
        if self.check(&TokenKind::DoubleStar) {
            let first = self.parse_dict_entry()?;
            return self.finish_dict(first, start, line);
        }

        let first = self.parse_star_or_expr()?;
        if !matches!(first.kind, ExprKind::Starred(_)) && self.eat(&TokenKind::Colon) {
            let value = self.parse_expr()?;
            if self.starts_comprehension() {
                let generators = self.parse_comprehension_clauses()?;
                self.expect(&TokenKind::RBrace)?;
                return Ok(Expr::new(
                    ExprKind::DictComp {
                        key: Box::new(first),
                        value: Box::new(value),
                        generators,
                    },
                    self.span_from(start),
                    line,
                ));
            }
            return self.finish_dict((Some(first), value), start, line);
        }

        if self.starts_comprehension() {
            let generators = self.parse_comprehension_clauses()?;
            self.expect(&TokenKind::RBrace)?;
            return Ok(Expr::new(
                ExprKind::SetComp {
                    elt: Box::new(first),
                    generators,
                },
                self.span_from(start),
                line,
            ));
        }

        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            if self.check(&TokenKind::RBrace) {
                break;
            }
            items.push(self.parse_star_or_expr()?);
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(Expr::new(ExprKind::Set(items), self.span_from(start), line))
    }

    /// The entries after the first in a dict display.
    fn finish_dict(
        &mut self,
        first: (Option<Expr>, Expr),
        start: Span,
        line: u32,
    ) -> Result<Expr, ParseError> {
        let mut entries = vec![first];
        while self.eat(&TokenKind::Comma) {
            if self.check(&TokenKind::RBrace) {
                break;
            }
            entries.push(self.parse_dict_entry()?);
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(Expr::new(ExprKind::Dict(entries), self.span_from(start), line))
    }

    /// `key: value` or `**mapping`.
    fn parse_dict_entry(&mut self) -> Result<(Option<Expr>, Expr), ParseError> {
        if self.eat(&TokenKind::DoubleStar) {
            return Ok((None, self.parse_bitor()?));
        }
        let key = self.parse_expr()?;
        self.expect(&TokenKind::Colon)?;
        Ok((Some(key), self.parse_expr()?))
    }

    pub(super) fn starts_comprehension(&self) -> bool {
        match self.current_kind() {
            TokenKind::For => true,
            TokenKind::Async => self.peek_next_kind() == &TokenKind::For,
            _ => false,
        }
    }

    /// One or more `[async] for target in iter [if cond]*` clauses.
    pub(crate) fn parse_comprehension_clauses(
        &mut self,
    ) -> Result<Vec<Comprehension>, ParseError> {
        let mut generators = Vec::new();
        loop {
            let is_async = self.check(&TokenKind::Async);
            if is_async {
                self.advance();
                self.expect(&TokenKind::For)?;
            } else if !self.eat(&TokenKind::For) {
                break;
            }
            let target = self.parse_target_list()?;
            check_assign_target(&target)?;
            self.expect(&TokenKind::In)?;
            let iter = self.parse_or()?;
            let mut conditions = Vec::new();
            while self.eat(&TokenKind::If) {
                conditions.push(self.parse_or()?);
            }
            generators.push(Comprehension {
                target,
                iter,
                conditions,
                is_async,
            });
        }
        Ok(generators)
    }
}

/// Append literal text, merging with a preceding literal.
fn push_literal(parts: &mut Vec<FStringPart>, text: &str) {
    if let Some(FStringPart::Literal(last)) = parts.last_mut() {
        last.push_str(text);
        return;
    }
    parts.push(FStringPart::Literal(text.to_string()));
}
