//! Token cursor for navigating the token stream.

use nbi_ir::Span;
use nbi_lexer::{Token, TokenKind};

/// Position in a token list that always ends with `Eof`.
pub struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        debug_assert!(
            tokens.last().is_some_and(|t| t.kind == TokenKind::Eof),
            "token list must end with Eof"
        );
        Cursor { tokens, pos: 0 }
    }

    /// The current token. Past the end, this stays on `Eof`.
    #[inline]
    pub fn current(&self) -> &'a Token {
        let idx = self.pos.min(self.tokens.len().saturating_sub(1));
        &self.tokens[idx]
    }

    #[inline]
    pub fn current_kind(&self) -> &'a TokenKind {
        &self.current().kind
    }

    #[inline]
    pub fn current_span(&self) -> Span {
        self.current().span
    }

    #[inline]
    pub fn current_line(&self) -> u32 {
        self.current().line
    }

    pub fn previous_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|idx| self.tokens.get(idx)) {
            Some(token) => token.span,
            None => Span::DUMMY,
        }
    }

    pub fn peek_next_kind(&self) -> &'a TokenKind {
        let idx = (self.pos + 1).min(self.tokens.len().saturating_sub(1));
        &self.tokens[idx].kind
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    #[inline]
    pub fn check(&self, kind: &TokenKind) -> bool {
        self.current_kind() == kind
    }

    pub fn check_name(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Name(_))
    }

    /// Index of the current token, for [`Cursor::reset`].
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Return to a position taken earlier from [`Cursor::position`].
    pub fn reset(&mut self, pos: usize) {
        self.pos = pos.min(self.tokens.len().saturating_sub(1));
    }

    /// Consume the current token and return it.
    pub fn advance(&mut self) -> &'a Token {
        let token = self.current();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it matches `kind`.
    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }
}
