//! Parse error types.

use nbi_ir::{LineIndex, Span};
use nbi_lexer::{LexError, TokenKind};
use thiserror::Error;

/// A syntax error with its location in the cell.
///
/// `line` and `column` are 1-based and filled in by [`crate::parse`] once the
/// error leaves the parser; inside the parser only `span` is meaningful.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    pub line: u32,
    pub column: u32,
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ParseErrorKind {
    #[error(transparent)]
    Lex(LexError),
    #[error("invalid syntax")]
    InvalidSyntax,
    #[error("expected {expected}, found {found}")]
    Expected { expected: String, found: String },
    #[error("expected an indented block after {0}")]
    ExpectedBlock(&'static str),
    #[error("unexpected indent")]
    UnexpectedIndent,
    #[error("unindent does not match any outer indentation level")]
    UnexpectedDedent,
    #[error("cannot assign to {0}")]
    InvalidTarget(&'static str),
    #[error("cannot delete {0}")]
    InvalidDeleteTarget(&'static str),
    #[error("{0} is not supported")]
    Unsupported(&'static str),
    #[error("f-string: {0}")]
    FString(&'static str),
    #[error("cannot mix bytes and nonbytes literals")]
    MixedBytes,
    #[error("positional argument follows keyword argument")]
    PositionalAfterKeyword,
    #[error("expected 'except' or 'finally' block")]
    BareTry,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        ParseError {
            kind,
            span,
            line: 0,
            column: 0,
        }
    }

    pub(crate) fn expected(expected: impl Into<String>, found: &TokenKind, span: Span) -> Self {
        ParseError::new(
            ParseErrorKind::Expected {
                expected: expected.into(),
                found: found.display_name(),
            },
            span,
        )
    }

    /// Fill in `line` and `column` from the error's span.
    #[must_use]
    pub fn located(mut self, index: &LineIndex) -> Self {
        let (line, column) = index.line_col(self.span.start);
        self.line = line;
        self.column = column;
        self
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        let span = err.span;
        ParseError::new(ParseErrorKind::Lex(err), span)
    }
}

#[cfg(test)]
mod tests;
