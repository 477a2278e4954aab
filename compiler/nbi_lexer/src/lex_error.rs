//! Lexer errors.

use nbi_ir::Span;
use thiserror::Error;

/// A lexer error and where it happened.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        LexError { kind, span }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated triple-quoted string literal")]
    UnterminatedTripleString,
    #[error("invalid string prefix '{0}'")]
    InvalidStringPrefix(String),
    #[error("bytes can only contain ASCII literal characters")]
    NonAsciiBytes,
    #[error("truncated \\{0} escape")]
    TruncatedEscape(char),
    #[error("unsupported \\{0} escape")]
    UnsupportedEscape(char),
    #[error("integer literal is too large")]
    IntOverflow,
    #[error("invalid {0} literal")]
    InvalidNumber(&'static str),
    #[error("invalid character '{0}' (U+{code:04X})", code = u32::from(*.0))]
    InvalidCharacter(char),
    #[error("unexpected character after line continuation character")]
    StrayBackslash,
    #[error("unindent does not match any outer indentation level")]
    InconsistentDedent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_character() {
        let err = LexError::new(LexErrorKind::InvalidCharacter('€'), Span::new(0, 3));
        assert_eq!(err.to_string(), "invalid character '€' (U+20AC)");
        assert_eq!(
            LexErrorKind::TruncatedEscape('x').to_string(),
            "truncated \\x escape"
        );
    }
}
