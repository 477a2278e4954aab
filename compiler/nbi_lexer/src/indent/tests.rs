use super::{column_at, IndentChange, IndentStack};
use crate::LexErrorKind;

#[test]
fn indent_then_dedent() {
    let mut stack = IndentStack::new();
    assert_eq!(stack.process(0), Ok(IndentChange::Same));
    assert_eq!(stack.process(4), Ok(IndentChange::Indent));
    assert_eq!(stack.process(8), Ok(IndentChange::Indent));
    assert_eq!(stack.open_blocks(), 2);
    assert_eq!(stack.process(0), Ok(IndentChange::Dedent(2)));
    assert_eq!(stack.open_blocks(), 0);
}

#[test]
fn dedent_to_unknown_level_fails() {
    let mut stack = IndentStack::new();
    assert_eq!(stack.process(4), Ok(IndentChange::Indent));
    assert_eq!(stack.process(2), Err(LexErrorKind::InconsistentDedent));
}

#[test]
fn brackets_nest() {
    let mut stack = IndentStack::new();
    stack.open_bracket();
    stack.open_bracket();
    stack.close_bracket();
    assert!(stack.in_brackets());
    stack.close_bracket();
    stack.close_bracket();
    assert!(!stack.in_brackets());
}

#[test]
fn tabs_advance_to_the_next_stop() {
    let source = "x\n\t  y";
    assert_eq!(column_at(source, 5), 10);
    assert_eq!(column_at("    z", 4), 4);
}
