use pretty_assertions::assert_eq;

use super::*;

fn kinds(source: &str) -> Vec<TokenKind> {
    match lex(source) {
        Ok(tokens) => tokens.into_iter().map(|t| t.kind).collect(),
        Err(err) => panic!("lex failed: {err}"),
    }
}

fn name(s: &str) -> TokenKind {
    TokenKind::Name(s.to_string())
}

#[test]
fn simple_statement() {
    assert_eq!(
        kinds("x = 1 + 2.5"),
        vec![
            name("x"),
            TokenKind::Eq,
            TokenKind::Int(1),
            TokenKind::Plus,
            TokenKind::Float(2.5),
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn blocks_emit_indent_and_dedent() {
    let source = "def f(a):\n    if a:\n        return 1\n    return 2\nx = f\n";
    assert_eq!(
        kinds(source),
        vec![
            TokenKind::Def,
            name("f"),
            TokenKind::LParen,
            name("a"),
            TokenKind::RParen,
            TokenKind::Colon,
            TokenKind::Newline,
            TokenKind::Indent,
            TokenKind::If,
            name("a"),
            TokenKind::Colon,
            TokenKind::Newline,
            TokenKind::Indent,
            TokenKind::Return,
            TokenKind::Int(1),
            TokenKind::Newline,
            TokenKind::Dedent,
            TokenKind::Return,
            TokenKind::Int(2),
            TokenKind::Newline,
            TokenKind::Dedent,
            name("x"),
            TokenKind::Eq,
            name("f"),
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn open_blocks_close_at_end_of_input() {
    let tokens = kinds("class A:\n    pass");
    assert_eq!(
        &tokens[tokens.len() - 3..],
        &[TokenKind::Newline, TokenKind::Dedent, TokenKind::Eof]
    );
}

#[test]
fn blank_and_comment_lines_are_invisible() {
    let source = "a = 1\n\n   # indented comment\n\nb = 2  # trailing\n";
    assert_eq!(
        kinds(source),
        vec![
            name("a"),
            TokenKind::Eq,
            TokenKind::Int(1),
            TokenKind::Newline,
            name("b"),
            TokenKind::Eq,
            TokenKind::Int(2),
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn newlines_inside_brackets_are_joined() {
    let source = "x = [\n    1,\n  2,\n]\n";
    assert_eq!(
        kinds(source),
        vec![
            name("x"),
            TokenKind::Eq,
            TokenKind::LBracket,
            TokenKind::Int(1),
            TokenKind::Comma,
            TokenKind::Int(2),
            TokenKind::Comma,
            TokenKind::RBracket,
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn backslash_joins_lines() {
    assert_eq!(
        kinds("x = 1 + \\\n    2\n"),
        vec![
            name("x"),
            TokenKind::Eq,
            TokenKind::Int(1),
            TokenKind::Plus,
            TokenKind::Int(2),
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn string_forms() {
    assert_eq!(
        kinds(r#"'a\n' "b" r'\d' u"c""#)[..4],
        [
            TokenKind::Str("a\n".to_string()),
            TokenKind::Str("b".to_string()),
            TokenKind::Str(r"\d".to_string()),
            TokenKind::Str("c".to_string()),
        ]
    );
}

#[test]
fn triple_quoted_string_spans_lines() {
    let tokens = lex("s = \"\"\"one\ntwo \"quoted\"\n\"\"\"\nt = 1\n").unwrap_or_default();
    assert_eq!(
        tokens[2].kind,
        TokenKind::Str("one\ntwo \"quoted\"\n".to_string())
    );
    let t = tokens.iter().find(|t| t.kind == name("t"));
    assert_eq!(t.map(|t| t.line), Some(4));
}

#[test]
fn fstring_keeps_raw_body() {
    let source = "f'{x!r:>4} {{y}}'";
    let tokens = lex(source).unwrap_or_default();
    assert_eq!(
        tokens[0].kind,
        TokenKind::FString {
            body: "{x!r:>4} {{y}}".to_string(),
            raw: false,
            offset: 2,
        }
    );
}

#[test]
fn numbers() {
    assert_eq!(
        kinds("0x_ff 0o17 0b101 1_000 .5 1e3 3.")[..7],
        [
            TokenKind::Int(255),
            TokenKind::Int(15),
            TokenKind::Int(5),
            TokenKind::Int(1000),
            TokenKind::Float(0.5),
            TokenKind::Float(1000.0),
            TokenKind::Float(3.0),
        ]
    );
}

#[test]
fn operators_take_the_longest_match() {
    assert_eq!(
        kinds("a //= b ** c -> ... != d")[..9],
        [
            name("a"),
            TokenKind::AugAssign(BinaryOp::FloorDiv),
            name("b"),
            TokenKind::DoubleStar,
            name("c"),
            TokenKind::Arrow,
            TokenKind::Ellipsis,
            TokenKind::NotEq,
            name("d"),
        ]
    );
}

#[test]
fn keywords_and_soft_keywords() {
    assert_eq!(
        kinds("async def match(): await x")[..7],
        [
            TokenKind::Async,
            TokenKind::Def,
            name("match"),
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::Colon,
            TokenKind::Await,
        ]
    );
}

#[test]
fn unicode_identifiers() {
    assert_eq!(kinds("größe = 1")[0], name("größe"));
}

#[test]
fn tokens_carry_lines_and_spans() {
    let tokens = lex("a\n\nbb = 1\n").unwrap_or_default();
    let bb = &tokens[2];
    assert_eq!(bb.kind, name("bb"));
    assert_eq!(bb.line, 3);
    assert_eq!(bb.span, Span::new(3, 5));
}

#[test]
fn unterminated_strings() {
    let err = lex("x = 'abc\ny = 1").err();
    assert_eq!(err.map(|e| e.kind), Some(LexErrorKind::UnterminatedString));

    let err = lex("x = '''abc\n").err();
    assert_eq!(
        err.map(|e| e.kind),
        Some(LexErrorKind::UnterminatedTripleString)
    );
}

#[test]
fn bad_dedent() {
    let err = lex("if x:\n        a\n    b\n").err();
    assert_eq!(err.map(|e| e.kind), Some(LexErrorKind::InconsistentDedent));
}

#[test]
fn invalid_characters() {
    let err = lex("x = 1 $ 2").err();
    assert_eq!(err.map(|e| e.kind), Some(LexErrorKind::InvalidCharacter('$')));
    let err = lex("x = b'caf\u{e9}'").err();
    assert_eq!(err.map(|e| e.kind), Some(LexErrorKind::NonAsciiBytes));
}

#[test]
fn bytes_literals() {
    assert_eq!(
        kinds(r"b'ab\x00' Rb'\d' b'''x'''")[..3],
        [
            TokenKind::Bytes(vec![b'a', b'b', 0]),
            TokenKind::Bytes(br"\d".to_vec()),
            TokenKind::Bytes(b"x".to_vec()),
        ]
    );
}

#[test]
fn imaginary_literals() {
    assert_eq!(
        kinds("2j 1.5J 1e2j .5j")[..4],
        [
            TokenKind::Imaginary(2.0),
            TokenKind::Imaginary(1.5),
            TokenKind::Imaginary(100.0),
            TokenKind::Imaginary(0.5),
        ]
    );
}

#[test]
fn integer_overflow_is_reported() {
    let err = lex("n = 99999999999999999999").err();
    assert_eq!(err.map(|e| e.kind), Some(LexErrorKind::IntOverflow));
}

#[test]
fn leading_indentation_is_an_indent() {
    assert_eq!(kinds("  x")[0], TokenKind::Indent);
}
