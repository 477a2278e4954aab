//! Line backfilling for synthesized or rebuilt trees.

use std::rc::Rc;

use super::{Comprehension, Expr, ExprKind, FStringPart, Parameters, Program, Stmt, StmtKind};

/// Give every node with `line == 0` the line of its nearest located parent.
///
/// Top-level statements without a line fall back to line 1. Definitions
/// behind a shared `Rc` are copied on write.
pub fn fix_missing_locations(program: &mut Program) {
    for stmt in &mut program.body {
        fix_stmt(stmt, 1);
    }
}

fn fix_block(body: &mut [Stmt], parent: u32) {
    for stmt in body {
        fix_stmt(stmt, parent);
    }
}

fn fix_stmt(stmt: &mut Stmt, parent: u32) {
    if stmt.line == 0 {
        stmt.line = parent;
    }
    let line = stmt.line;
    match &mut stmt.kind {
        StmtKind::FunctionDef(def) => {
            let def = Rc::make_mut(def);
            fix_exprs(&mut def.decorators, line);
            fix_params(&mut def.params, line);
            if let Some(returns) = &mut def.returns {
                fix_expr(returns, line);
            }
            fix_block(&mut def.body, line);
        }
        StmtKind::ClassDef(def) => {
            let def = Rc::make_mut(def);
            fix_exprs(&mut def.bases, line);
            fix_exprs(&mut def.decorators, line);
            for (_, value) in &mut def.keywords {
                fix_expr(value, line);
            }
            fix_block(&mut def.body, line);
        }
        StmtKind::Import(_)
        | StmtKind::ImportFrom(_)
        | StmtKind::Pass
        | StmtKind::Break
        | StmtKind::Continue
        | StmtKind::Global(_)
        | StmtKind::Nonlocal(_) => {}
        StmtKind::Expr(value) => fix_expr(value, line),
        StmtKind::Assign { targets, value } => {
            fix_exprs(targets, line);
            fix_expr(value, line);
        }
        StmtKind::AugAssign { target, value, .. } => {
            fix_expr(target, line);
            fix_expr(value, line);
        }
        StmtKind::AnnAssign {
            target,
            annotation,
            value,
        } => {
            fix_expr(target, line);
            fix_expr(annotation, line);
            if let Some(value) = value {
                fix_expr(value, line);
            }
        }
        StmtKind::Return(value) => {
            if let Some(value) = value {
                fix_expr(value, line);
            }
        }
        StmtKind::Raise { exc, cause } => {
            for e in [exc, cause].into_iter().flatten() {
                fix_expr(e, line);
            }
        }
        StmtKind::Assert { test, msg } => {
            fix_expr(test, line);
            if let Some(msg) = msg {
                fix_expr(msg, line);
            }
        }
        StmtKind::Delete(targets) => fix_exprs(targets, line),
        StmtKind::If { test, body, orelse } | StmtKind::While { test, body, orelse } => {
            fix_expr(test, line);
            fix_block(body, line);
            fix_block(orelse, line);
        }
        StmtKind::For {
            target,
            iter,
            body,
            orelse,
            ..
        } => {
            fix_expr(target, line);
            fix_expr(iter, line);
            fix_block(body, line);
            fix_block(orelse, line);
        }
        StmtKind::Try(try_stmt) => {
            fix_block(&mut try_stmt.body, line);
            for handler in &mut try_stmt.handlers {
                if handler.line == 0 {
                    handler.line = line;
                }
                if let Some(kind) = &mut handler.kind {
                    fix_expr(kind, handler.line);
                }
                fix_block(&mut handler.body, handler.line);
            }
            fix_block(&mut try_stmt.orelse, line);
            fix_block(&mut try_stmt.finalbody, line);
        }
        StmtKind::With { items, body, .. } => {
            for item in items {
                fix_expr(&mut item.context, line);
                if let Some(target) = &mut item.target {
                    fix_expr(target, line);
                }
            }
            fix_block(body, line);
        }
    }
}

fn fix_params(params: &mut Parameters, line: u32) {
    for param in params.positional.iter_mut().chain(params.kwonly.iter_mut()) {
        if let Some(annotation) = &mut param.annotation {
            fix_expr(annotation, line);
        }
        if let Some(default) = &mut param.default {
            fix_expr(default, line);
        }
    }
}

fn fix_exprs(exprs: &mut [Expr], parent: u32) {
    for expr in exprs {
        fix_expr(expr, parent);
    }
}

fn fix_comprehensions(generators: &mut [Comprehension], line: u32) {
    for generator in generators {
        fix_expr(&mut generator.target, line);
        fix_expr(&mut generator.iter, line);
        fix_exprs(&mut generator.conditions, line);
    }
}

fn fix_expr(expr: &mut Expr, parent: u32) {
    if expr.line == 0 {
        expr.line = parent;
    }
    let line = expr.line;
    match &mut expr.kind {
        ExprKind::Name(_) | ExprKind::Constant(_) => {}
        ExprKind::FString(parts) => {
            for part in parts {
                if let FStringPart::Field { expr, .. } = part {
                    fix_expr(expr, line);
                }
            }
        }
        ExprKind::List(items) | ExprKind::Tuple(items) | ExprKind::Set(items) => {
            fix_exprs(items, line)
        }
        ExprKind::Dict(entries) => {
            for (key, value) in entries {
                if let Some(key) = key {
                    fix_expr(key, line);
                }
                fix_expr(value, line);
            }
        }
        ExprKind::Yield(value) => {
            if let Some(value) = value {
                fix_expr(value, line);
            }
        }
        ExprKind::Attribute { value, .. }
        | ExprKind::Await(value)
        | ExprKind::YieldFrom(value)
        | ExprKind::Starred(value)
        | ExprKind::Unary { operand: value, .. } => fix_expr(value, line),
        ExprKind::Subscript { value, index } => {
            fix_expr(value, line);
            fix_expr(index, line);
        }
        ExprKind::Slice { lower, upper, step } => {
            for part in [lower, upper, step].into_iter().flatten() {
                fix_expr(part, line);
            }
        }
        ExprKind::Call { func, args } => {
            fix_expr(func, line);
            for arg in args {
                fix_expr(arg.expr_mut(), line);
            }
        }
        ExprKind::Binary { left, right, .. } => {
            fix_expr(left, line);
            fix_expr(right, line);
        }
        ExprKind::BoolOp { values, .. } => fix_exprs(values, line),
        ExprKind::Compare { left, ops } => {
            fix_expr(left, line);
            for (_, right) in ops {
                fix_expr(right, line);
            }
        }
        ExprKind::IfExp { test, body, orelse } => {
            fix_expr(test, line);
            fix_expr(body, line);
            fix_expr(orelse, line);
        }
        ExprKind::Lambda(lambda) => {
            let lambda = Rc::make_mut(lambda);
            fix_params(&mut lambda.params, line);
            fix_expr(&mut lambda.body, line);
        }
        ExprKind::ListComp { elt, generators } | ExprKind::SetComp { elt, generators } => {
            fix_expr(elt, line);
            fix_comprehensions(generators, line);
        }
        ExprKind::DictComp {
            key,
            value,
            generators,
        } => {
            fix_expr(key, line);
            fix_expr(value, line);
            fix_comprehensions(generators, line);
        }
    }
}

#[cfg(test)]
mod tests;
