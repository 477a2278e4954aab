//! Grammar productions.
//!
//! Each module extends [`Parser`](crate::Parser) with methods for one
//! family of productions:
//!
//! - `stmt`: simple and compound statements, blocks, definitions
//! - `expr`: the expression precedence chain, displays, calls, lambdas
//! - `fstring`: splitting f-string bodies into literal and field parts
//! - `params`: parameter lists shared by `def` and `lambda`

mod expr;
mod fstring;
mod params;
mod stmt;

use nbi_ir::{Expr, ExprKind};

use crate::{ParseError, ParseErrorKind};

/// What an invalid assignment target looks like, for error messages.
fn target_description(expr: &Expr) -> &'static str {
    match &expr.kind {
        ExprKind::Call { .. } => "function call",
        ExprKind::Constant(_) | ExprKind::FString(_) => "literal",
        ExprKind::Lambda(_) => "lambda",
        ExprKind::Await(_) => "await expression",
        ExprKind::Compare { .. } => "comparison",
        ExprKind::IfExp { .. } => "conditional expression",
        ExprKind::ListComp { .. } => "list comprehension",
        ExprKind::DictComp { .. } => "dict comprehension",
        ExprKind::SetComp { .. } => "set comprehension",
        ExprKind::Dict(_) => "dict literal",
        ExprKind::Set(_) => "set display",
        ExprKind::Yield(_) | ExprKind::YieldFrom(_) => "yield expression",
        _ => "expression",
    }
}

/// Reject anything that cannot be bound by `=`, `for` or `as`.
fn check_assign_target(expr: &Expr) -> Result<(), ParseError> {
    match &expr.kind {
        ExprKind::Name(_) | ExprKind::Attribute { .. } | ExprKind::Subscript { .. } => Ok(()),
        ExprKind::Tuple(items) | ExprKind::List(items) => {
            let mut starred = 0;
            for item in items {
                if let ExprKind::Starred(inner) = &item.kind {
                    starred += 1;
                    check_assign_target(inner)?;
                } else {
                    check_assign_target(item)?;
                }
            }
            if starred > 1 {
                return Err(ParseError::new(
                    ParseErrorKind::InvalidTarget("multiple starred expressions"),
                    expr.span,
                ));
            }
            Ok(())
        }
        ExprKind::Starred(_) => Err(ParseError::new(
            ParseErrorKind::InvalidTarget("starred expression outside a tuple or list"),
            expr.span,
        )),
        _ => Err(ParseError::new(
            ParseErrorKind::InvalidTarget(target_description(expr)),
            expr.span,
        )),
    }
}

/// Targets of augmented and annotated assignment: a single name,
/// attribute or subscript.
fn check_single_target(expr: &Expr) -> Result<(), ParseError> {
    match &expr.kind {
        ExprKind::Name(_) | ExprKind::Attribute { .. } | ExprKind::Subscript { .. } => Ok(()),
        ExprKind::Tuple(_) | ExprKind::List(_) => Err(ParseError::new(
            ParseErrorKind::InvalidTarget("tuple or list in augmented assignment"),
            expr.span,
        )),
        _ => Err(ParseError::new(
            ParseErrorKind::InvalidTarget(target_description(expr)),
            expr.span,
        )),
    }
}

fn check_delete_target(expr: &Expr) -> Result<(), ParseError> {
    match &expr.kind {
        ExprKind::Name(_) | ExprKind::Attribute { .. } | ExprKind::Subscript { .. } => Ok(()),
        ExprKind::Tuple(items) | ExprKind::List(items) => {
            items.iter().try_for_each(check_delete_target)
        }
        _ => Err(ParseError::new(
            ParseErrorKind::InvalidDeleteTarget(target_description(expr)),
            expr.span,
        )),
    }
}
