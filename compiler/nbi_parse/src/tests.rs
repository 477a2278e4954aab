use nbi_ir::{Program, StmtKind};
use pretty_assertions::assert_eq;

use super::*;

#[test]
fn empty_and_comment_only_cells_parse_to_nothing() {
    assert_eq!(parse("").map(|p| p.is_empty()), Ok(true));
    assert_eq!(parse("# just a note\n\n").map(|p| p.is_empty()), Ok(true));
}

#[test]
fn mixed_cell_keeps_statement_order() {
    let source = "import os\nx = 1\ndef f():\n    return x\nprint(f())\nclass C:\n    pass\n";
    let program = parse(source).unwrap_or_default();
    let kinds: Vec<&str> = program.body.iter().map(|s| s.kind.describe()).collect();
    assert_eq!(
        kinds,
        [
            "import",
            "assignment",
            "function definition",
            "expression",
            "class definition"
        ]
    );
    let lines: Vec<u32> = program.body.iter().map(|s| s.line).collect();
    assert_eq!(lines, [1, 2, 3, 5, 6]);
}

#[test]
fn lexer_errors_surface_as_parse_errors() {
    let err = parse("x = 1\ns = 'open\n").err();
    let err = err.as_ref();
    assert!(matches!(
        err.map(|e| &e.kind),
        Some(ParseErrorKind::Lex(_))
    ));
    assert_eq!(err.map(|e| (e.line, e.column)), Some((2, 5)));
}

#[test]
fn error_columns_are_one_based() {
    let err = parse("x = = 1\n").err();
    assert_eq!(err.map(|e| (e.line, e.column)), Some((1, 5)));
}

#[test]
fn unclosed_bracket_reports_end_of_input() {
    let err = parse("f(1,\n").err();
    assert!(matches!(
        err.map(|e| e.kind),
        Some(ParseErrorKind::Expected { .. })
    ));
}

#[test]
fn deeply_nested_expressions_do_not_overflow() {
    let depth = 2_000;
    let source = format!("x = {}1{}\n", "(".repeat(depth), ")".repeat(depth));
    let program = parse(&source).unwrap_or_default();
    assert!(matches!(program.body[0].kind, StmtKind::Assign { .. }));
}

#[test]
fn standalone_expression_must_be_complete() {
    assert!(parse_expression("a + b").is_ok());
    assert!(parse_expression("a b").is_err());
}

fn described(program: &Program) -> Vec<&'static str> {
    program.body.iter().map(|s| s.kind.describe()).collect()
}

#[test]
fn declarations_survive_unsupported_top_level_statements() {
    let source = "def f(): ...\nif (n := 3) > 2:\n    pass\nelse:\n    pass\nclass C:\n    pass\n";
    assert!(parse(source).is_err());
    let program = parse_declarations(source).unwrap_or_default();
    assert_eq!(described(&program), ["function definition", "class definition"]);
    assert_eq!(program.body[1].line, 6);
}

#[test]
fn skipped_statements_include_nested_blocks() {
    let source = "\
import os
match command:
    case 1:
        x = 1
    case _:
        pass
y = 2
print((z := 1)); w = 3
def g():
    return 1
";
    let program = parse_declarations(source).unwrap_or_default();
    assert_eq!(
        described(&program),
        ["import", "assignment", "function definition"]
    );
    let lines: Vec<u32> = program.body.iter().map(|s| s.line).collect();
    assert_eq!(lines, [1, 7, 9]);
}

#[test]
fn unsupported_syntax_inside_a_declaration_still_fails() {
    let err = parse_declarations("def f():\n    if (n := 3):\n        pass\n").err();
    assert_eq!(
        err.map(|e| e.kind),
        Some(ParseErrorKind::Unsupported("assignment expression"))
    );
}

#[test]
fn invalid_syntax_is_never_skipped() {
    let err = parse_declarations("def f(): ...\nx = = 1\n").err();
    assert_eq!(err.map(|e| e.line), Some(2));
}
