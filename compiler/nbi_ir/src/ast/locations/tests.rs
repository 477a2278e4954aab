use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::*;
use crate::ast::{Constant, FunctionDef};
use crate::Span;

fn expr(kind: ExprKind, line: u32) -> Expr {
    Expr::new(kind, Span::DUMMY, line)
}

fn stmt(kind: StmtKind, line: u32) -> Stmt {
    Stmt::new(kind, Span::DUMMY, line)
}

#[test]
fn top_level_without_line_defaults_to_one() {
    let mut program = Program::new(vec![stmt(StmtKind::Pass, 0)]);
    fix_missing_locations(&mut program);
    assert_eq!(program.body[0].line, 1);
}

#[test]
fn nested_nodes_inherit_parent_line() {
    let ret = stmt(
        StmtKind::Return(Some(expr(ExprKind::Constant(Constant::Int(1)), 0))),
        0,
    );
    let def = FunctionDef {
        name: "f".to_string(),
        params: Parameters::default(),
        body: vec![ret],
        decorators: vec![],
        returns: None,
        is_async: false,
    };
    let mut program = Program::new(vec![stmt(StmtKind::FunctionDef(Rc::new(def)), 7)]);

    fix_missing_locations(&mut program);

    let StmtKind::FunctionDef(def) = &program.body[0].kind else {
        panic!("expected function definition");
    };
    assert_eq!(def.body[0].line, 7);
    let StmtKind::Return(Some(value)) = &def.body[0].kind else {
        panic!("expected return");
    };
    assert_eq!(value.line, 7);
}

#[test]
fn located_nodes_are_untouched() {
    let value = expr(ExprKind::Name("x".to_string()), 4);
    let mut program = Program::new(vec![stmt(StmtKind::Expr(value), 3)]);
    fix_missing_locations(&mut program);
    let StmtKind::Expr(value) = &program.body[0].kind else {
        panic!("expected expression statement");
    };
    assert_eq!(program.body[0].line, 3);
    assert_eq!(value.line, 4);
}

#[test]
fn shared_definition_is_copied_on_write() {
    let def = Rc::new(FunctionDef {
        name: "g".to_string(),
        params: Parameters::default(),
        body: vec![stmt(StmtKind::Pass, 0)],
        decorators: vec![],
        returns: None,
        is_async: false,
    });
    let original = Rc::clone(&def);
    let mut program = Program::new(vec![stmt(StmtKind::FunctionDef(def), 2)]);

    fix_missing_locations(&mut program);

    assert_eq!(original.body[0].line, 0);
    let StmtKind::FunctionDef(fixed) = &program.body[0].kind else {
        panic!("expected function definition");
    };
    assert_eq!(fixed.body[0].line, 2);
}
