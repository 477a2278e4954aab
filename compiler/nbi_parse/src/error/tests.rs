use nbi_ir::{LineIndex, Span};
use nbi_lexer::{LexError, LexErrorKind, TokenKind};

use super::{ParseError, ParseErrorKind};

#[test]
fn located_fills_line_and_column() {
    let source = "a = 1\nb = )\n";
    let err = ParseError::new(ParseErrorKind::InvalidSyntax, Span::new(10, 11))
        .located(&LineIndex::new(source));
    assert_eq!((err.line, err.column), (2, 5));
}

#[test]
fn lexer_errors_keep_their_message() {
    let lex = LexError::new(LexErrorKind::UnterminatedString, Span::new(4, 5));
    let err = ParseError::from(lex);
    assert_eq!(err.span, Span::new(4, 5));
    assert_eq!(err.to_string(), "unterminated string literal");
}

#[test]
fn expected_names_the_found_token() {
    let err = ParseError::expected("':'", &TokenKind::Newline, Span::point(3));
    assert_eq!(err.to_string(), "expected ':', found newline");
}
