use nbi_ir::{Constant, ExprKind, FStringPart};
use pretty_assertions::assert_eq;

use super::parse_fstring;
use crate::ParseErrorKind;

fn parts(body: &str) -> Vec<FStringPart> {
    match parse_fstring(body, false, 0, 1) {
        Ok(parts) => parts,
        Err(err) => panic!("{body:?}: {err}"),
    }
}

fn literal(text: &str) -> FStringPart {
    FStringPart::Literal(text.to_string())
}

#[test]
fn plain_text_and_doubled_braces() {
    assert_eq!(parts("a {{b}} c\\n"), vec![literal("a {b} c\n")]);
}

#[test]
fn fields_split_literals() {
    let parts = parts("x={x}, y={y!s}");
    assert_eq!(parts.len(), 4);
    assert_eq!(parts[0], literal("x="));
    assert_eq!(parts[2], literal(", y="));
    let FStringPart::Field { conversion, .. } = &parts[3] else {
        panic!("expected field");
    };
    assert_eq!(*conversion, Some('s'));
}

#[test]
fn nested_brackets_and_strings_do_not_end_a_field() {
    let parts = parts("{d['k:}']}{f(a, b)[0]}{ {'a': 1}['a'] }");
    assert_eq!(parts.len(), 3);
    assert!(parts
        .iter()
        .all(|p| matches!(p, FStringPart::Field { spec: None, .. })));
}

#[test]
fn not_equal_is_not_a_conversion() {
    let parts = parts("{a != b}");
    let FStringPart::Field {
        expr, conversion, ..
    } = &parts[0]
    else {
        panic!("expected field");
    };
    assert!(matches!(expr.kind, ExprKind::Compare { .. }));
    assert_eq!(*conversion, None);
}

#[test]
fn self_documenting_field() {
    let parts = parts("{value = }");
    assert_eq!(parts[0], literal("value = "));
    let FStringPart::Field { conversion, .. } = &parts[1] else {
        panic!("expected field");
    };
    assert_eq!(*conversion, Some('r'));
}

#[test]
fn raw_fstring_keeps_backslashes() {
    let parts = parse_fstring(r"\d{n}\w", true, 0, 1).unwrap_or_default();
    assert_eq!(parts[0], literal(r"\d"));
    assert_eq!(parts[2], literal(r"\w"));
}

#[test]
fn field_locations_are_shifted_into_the_cell() {
    let parts = parse_fstring("ab\n{ 42 }", false, 10, 3).unwrap_or_default();
    let FStringPart::Field { expr, .. } = &parts[1] else {
        panic!("expected field");
    };
    assert_eq!(expr.kind, ExprKind::Constant(Constant::Int(42)));
    assert_eq!(expr.span.start, 15);
    assert_eq!(expr.line, 4);
}

#[test]
fn malformed_fields() {
    let err = |body: &str| parse_fstring(body, false, 0, 1).err().map(|e| e.kind);
    assert_eq!(
        err("{}"),
        Some(ParseErrorKind::FString("valid expression required before '}'"))
    );
    assert_eq!(err("{x"), Some(ParseErrorKind::FString("expecting '}'")));
    assert_eq!(
        err("a } b"),
        Some(ParseErrorKind::FString("single '}' is not allowed"))
    );
    assert_eq!(
        err("{x!q}"),
        Some(ParseErrorKind::FString("invalid conversion character"))
    );
    assert_eq!(
        err("{x:{w}}"),
        Some(ParseErrorKind::Unsupported(
            "nested replacement field in format spec"
        ))
    );
}
