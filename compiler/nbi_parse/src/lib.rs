//! Recursive descent parser for notebook cell source.
//!
//! [`parse`] lexes and parses a whole cell into an [`nbi_ir::Program`].
//! Syntax outside the supported subset (assignment expressions, `match`
//! statements, `except*`) is rejected with [`ParseErrorKind::Unsupported`]
//! rather than misparsed. [`parse_declarations`] is the lenient form used
//! when only a cell's definitions and imports matter: top-level statements
//! that cannot declare anything are dropped when they hit such syntax.

mod cursor;
mod error;
mod grammar;

use nbi_ir::{Expr, LineIndex, Program, Span};
use nbi_lexer::{lex, Token, TokenKind};
use nbi_stack::ensure_sufficient_stack;

use cursor::Cursor;

pub use error::{ParseError, ParseErrorKind};

/// Parser state over one token list.
pub struct Parser<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
        }
    }

    #[inline]
    pub(crate) fn current_kind(&self) -> &'a TokenKind {
        self.cursor.current_kind()
    }

    #[inline]
    pub(crate) fn current_span(&self) -> Span {
        self.cursor.current_span()
    }

    #[inline]
    pub(crate) fn current_line(&self) -> u32 {
        self.cursor.current_line()
    }

    #[inline]
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.cursor.check(kind)
    }

    pub(crate) fn peek_next_kind(&self) -> &'a TokenKind {
        self.cursor.peek_next_kind()
    }

    pub(crate) fn advance(&mut self) -> &'a Token {
        self.cursor.advance()
    }

    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        self.cursor.eat(kind)
    }

    /// Span from `start` to the end of the last consumed token.
    pub(crate) fn span_from(&self, start: Span) -> Span {
        start.merge(self.cursor.previous_span())
    }

    pub(crate) fn expect(&mut self, kind: &TokenKind) -> Result<&'a Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_expected(kind.display_name()))
        }
    }

    pub(crate) fn expect_name(&mut self) -> Result<String, ParseError> {
        match self.current_kind() {
            TokenKind::Name(name) => {
                self.advance();
                Ok(name.clone())
            }
            _ => Err(self.error_expected("a name")),
        }
    }

    pub(crate) fn error_expected(&self, expected: impl Into<String>) -> ParseError {
        match self.current_kind() {
            TokenKind::Indent => {
                ParseError::new(ParseErrorKind::UnexpectedIndent, self.current_span())
            }
            found => ParseError::expected(expected, found, self.current_span()),
        }
    }

    pub(crate) fn error_here(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.current_span())
    }

    /// Parse statements until end of input.
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        self.parse_top_level(false)
    }

    /// Like [`Parser::parse_program`], but a top-level statement that is
    /// not a definition or import and uses unsupported syntax is skipped.
    pub fn parse_declarations(&mut self) -> Result<Program, ParseError> {
        self.parse_top_level(true)
    }

    fn parse_top_level(&mut self, skip_unsupported: bool) -> Result<Program, ParseError> {
        let mut body = Vec::new();
        while !self.cursor.is_at_end() {
            if self.check(&TokenKind::Indent) {
                return Err(self.error_here(ParseErrorKind::UnexpectedIndent));
            }
            let start = self.cursor.position();
            let declaration = self.starts_declaration();
            match self.parse_statement() {
                Ok(stmts) => body.extend(stmts),
                Err(err)
                    if skip_unsupported
                        && !declaration
                        && matches!(err.kind, ParseErrorKind::Unsupported(_)) =>
                {
                    tracing::debug!(error = %err, "skipping statement with unsupported syntax");
                    self.cursor.reset(start);
                    self.skip_statement();
                }
                Err(err) => return Err(err),
            }
        }
        Ok(Program::new(body))
    }

    /// Parse a single expression that must fill the token list.
    pub fn parse_standalone_expr(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_testlist_star_expr()?;
        self.eat(&TokenKind::Newline);
        if !self.cursor.is_at_end() {
            return Err(self.error_expected("end of expression"));
        }
        Ok(expr)
    }
}

/// Parse a cell into a program.
///
/// Errors carry 1-based `line` and `column` relative to `source`.
#[tracing::instrument(level = "trace", skip_all, fields(len = source.len()))]
pub fn parse(source: &str) -> Result<Program, ParseError> {
    parse_cell(source, |parser| parser.parse_program())
}

/// Parse a cell for its definitions and imports.
///
/// Top-level statements that are neither, and that use syntax this parser
/// does not support, are left out of the program instead of failing the
/// whole cell. Any other syntax error still fails.
#[tracing::instrument(level = "trace", skip_all, fields(len = source.len()))]
pub fn parse_declarations(source: &str) -> Result<Program, ParseError> {
    parse_cell(source, |parser| parser.parse_declarations())
}

fn parse_cell(
    source: &str,
    run: impl FnOnce(&mut Parser<'_>) -> Result<Program, ParseError>,
) -> Result<Program, ParseError> {
    let index = LineIndex::new(source);
    let result = lex(source)
        .map_err(ParseError::from)
        .and_then(|tokens| ensure_sufficient_stack(|| run(&mut Parser::new(&tokens))));
    result.map_err(|err| {
        tracing::trace!(error = %err, "cell did not parse");
        err.located(&index)
    })
}

/// Parse a standalone expression such as an f-string field.
pub fn parse_expression(source: &str) -> Result<Expr, ParseError> {
    let index = LineIndex::new(source);
    let tokens = lex(source).map_err(|err| ParseError::from(err).located(&index))?;
    Parser::new(&tokens)
        .parse_standalone_expr()
        .map_err(|err| err.located(&index))
}

#[cfg(test)]
mod tests;
