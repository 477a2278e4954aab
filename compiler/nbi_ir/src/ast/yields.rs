//! Generator detection.

use super::{Expr, ExprKind, FStringPart, FunctionDef, Parameters, Stmt, StmtKind};

impl FunctionDef {
    /// Whether calling the function produces a generator: the body contains
    /// `yield` or `yield from` outside nested functions, classes and lambdas.
    pub fn is_generator(&self) -> bool {
        block_yields(&self.body)
    }
}

fn block_yields(body: &[Stmt]) -> bool {
    body.iter().any(stmt_yields)
}

fn exprs_yield(exprs: &[Expr]) -> bool {
    exprs.iter().any(expr_yields)
}

fn optional_yields(expr: Option<&Expr>) -> bool {
    expr.is_some_and(expr_yields)
}

fn params_yield(params: &Parameters) -> bool {
    params
        .positional
        .iter()
        .chain(&params.kwonly)
        .any(|param| optional_yields(param.default.as_ref()))
}

fn stmt_yields(stmt: &Stmt) -> bool {
    match &stmt.kind {
        // Only the parts evaluated in the enclosing scope count.
        StmtKind::FunctionDef(def) => exprs_yield(&def.decorators) || params_yield(&def.params),
        StmtKind::ClassDef(def) => exprs_yield(&def.bases) || exprs_yield(&def.decorators),
        StmtKind::Import(_)
        | StmtKind::ImportFrom(_)
        | StmtKind::Pass
        | StmtKind::Break
        | StmtKind::Continue
        | StmtKind::Global(_)
        | StmtKind::Nonlocal(_) => false,
        StmtKind::Expr(value) => expr_yields(value),
        StmtKind::Assign { targets, value } => exprs_yield(targets) || expr_yields(value),
        StmtKind::AugAssign { target, value, .. } => expr_yields(target) || expr_yields(value),
        StmtKind::AnnAssign { target, value, .. } => {
            expr_yields(target) || optional_yields(value.as_ref())
        }
        StmtKind::Return(value) => optional_yields(value.as_ref()),
        StmtKind::Raise { exc, cause } => {
            optional_yields(exc.as_ref()) || optional_yields(cause.as_ref())
        }
        StmtKind::Assert { test, msg } => expr_yields(test) || optional_yields(msg.as_ref()),
        StmtKind::Delete(targets) => exprs_yield(targets),
        StmtKind::If { test, body, orelse } | StmtKind::While { test, body, orelse } => {
            expr_yields(test) || block_yields(body) || block_yields(orelse)
        }
        StmtKind::For {
            target,
            iter,
            body,
            orelse,
            ..
        } => expr_yields(target) || expr_yields(iter) || block_yields(body) || block_yields(orelse),
        StmtKind::Try(try_stmt) => {
            block_yields(&try_stmt.body)
                || try_stmt.handlers.iter().any(|handler| {
                    optional_yields(handler.kind.as_ref()) || block_yields(&handler.body)
                })
                || block_yields(&try_stmt.orelse)
                || block_yields(&try_stmt.finalbody)
        }
        StmtKind::With { items, body, .. } => {
            items.iter().any(|item| {
                expr_yields(&item.context) || optional_yields(item.target.as_ref())
            }) || block_yields(body)
        }
    }
}

fn expr_yields(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Yield(_) | ExprKind::YieldFrom(_) => true,
        ExprKind::Name(_) | ExprKind::Constant(_) | ExprKind::Lambda(_) => false,
        ExprKind::FString(parts) => parts.iter().any(|part| match part {
            FStringPart::Field { expr, .. } => expr_yields(expr),
            FStringPart::Literal(_) => false,
        }),
        ExprKind::List(items) | ExprKind::Tuple(items) | ExprKind::Set(items) => {
            exprs_yield(items)
        }
        ExprKind::Dict(entries) => entries
            .iter()
            .any(|(key, value)| optional_yields(key.as_ref()) || expr_yields(value)),
        ExprKind::Attribute { value, .. }
        | ExprKind::Await(value)
        | ExprKind::Starred(value)
        | ExprKind::Unary { operand: value, .. } => expr_yields(value),
        ExprKind::Subscript { value, index } => expr_yields(value) || expr_yields(index),
        ExprKind::Slice { lower, upper, step } => [lower, upper, step]
            .into_iter()
            .any(|part| optional_yields(part.as_deref())),
        ExprKind::Call { func, args } => {
            expr_yields(func) || args.iter().any(|arg| expr_yields(arg.expr()))
        }
        ExprKind::Binary { left, right, .. } => expr_yields(left) || expr_yields(right),
        ExprKind::BoolOp { values, .. } => exprs_yield(values),
        ExprKind::Compare { left, ops } => {
            expr_yields(left) || ops.iter().any(|(_, right)| expr_yields(right))
        }
        ExprKind::IfExp { test, body, orelse } => {
            expr_yields(test) || expr_yields(body) || expr_yields(orelse)
        }
        // The first iterable is the only part evaluated in the enclosing
        // scope.
        ExprKind::ListComp { generators, .. }
        | ExprKind::SetComp { generators, .. }
        | ExprKind::DictComp { generators, .. } => generators
            .first()
            .is_some_and(|generator| expr_yields(&generator.iter)),
    }
}
