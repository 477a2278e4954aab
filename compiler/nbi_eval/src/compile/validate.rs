//! Context-dependent statement and expression checks.

use nbi_ir::{
    Argument, Comprehension, Expr, ExprKind, FStringPart, ImportNames, Parameters, Program, Span,
    Stmt, StmtKind,
};
use rustc_hash::FxHashSet;

use super::scope::ScopeInfo;
use super::CompileErrorKind;

type Failure = (CompileErrorKind, u32, Span);

#[derive(Copy, Clone)]
enum Context {
    Module,
    Class,
    Function { is_async: bool },
    Lambda,
}

struct Validator {
    context: Context,
    in_loop: bool,
    /// Set while inside a comprehension's element, conditions or inner
    /// iterables, naming the comprehension.
    comprehension: Option<&'static str>,
    /// Enclosing function scopes, innermost last.
    functions: Vec<ScopeInfo>,
}

pub(super) fn check_program(program: &Program) -> Result<(), Failure> {
    let mut validator = Validator {
        context: Context::Module,
        in_loop: false,
        comprehension: None,
        functions: Vec::new(),
    };
    validator.block(&program.body)
}

fn fail<T>(kind: CompileErrorKind, line: u32, span: Span) -> Result<T, Failure> {
    Err((kind, line, span))
}

impl Validator {
    fn block(&mut self, body: &[Stmt]) -> Result<(), Failure> {
        body.iter().try_for_each(|stmt| self.stmt(stmt))
    }

    fn loop_body(&mut self, body: &[Stmt]) -> Result<(), Failure> {
        let outer = std::mem::replace(&mut self.in_loop, true);
        let result = self.block(body);
        self.in_loop = outer;
        result
    }

    fn nested<R>(&mut self, context: Context, f: impl FnOnce(&mut Self) -> R) -> R {
        let outer_context = std::mem::replace(&mut self.context, context);
        let outer_loop = std::mem::replace(&mut self.in_loop, false);
        let result = f(self);
        self.context = outer_context;
        self.in_loop = outer_loop;
        result
    }

    fn stmt(&mut self, stmt: &Stmt) -> Result<(), Failure> {
        let (line, span) = (stmt.line, stmt.span);
        match &stmt.kind {
            StmtKind::FunctionDef(def) => {
                self.exprs(&def.decorators)?;
                self.parameters(&def.params, line, span)?;
                if let Some(returns) = &def.returns {
                    self.expr(returns)?;
                }
                let info = ScopeInfo::for_function(&def.params, &def.body);
                self.declarations(&def.params, &def.body, &info)?;
                self.functions.push(info);
                let result = self.nested(
                    Context::Function {
                        is_async: def.is_async,
                    },
                    |v| v.block(&def.body),
                );
                self.functions.pop();
                result
            }
            StmtKind::ClassDef(def) => {
                self.exprs(&def.decorators)?;
                self.exprs(&def.bases)?;
                for (_, value) in &def.keywords {
                    self.expr(value)?;
                }
                self.nested(Context::Class, |v| v.block(&def.body))
            }
            StmtKind::Import(_) => Ok(()),
            StmtKind::ImportFrom(import) => {
                if matches!(import.names, ImportNames::Star)
                    && matches!(self.context, Context::Function { .. })
                {
                    return fail(CompileErrorKind::StarImportInFunction, line, span);
                }
                Ok(())
            }
            StmtKind::Expr(value) => self.expr(value),
            StmtKind::Assign { targets, value } => {
                self.exprs(targets)?;
                self.expr(value)
            }
            StmtKind::AugAssign { target, value, .. } => {
                self.expr(target)?;
                self.expr(value)
            }
            StmtKind::AnnAssign {
                target,
                annotation,
                value,
            } => {
                self.expr(target)?;
                self.expr(annotation)?;
                self.opt(value.as_ref())
            }
            StmtKind::Return(value) => {
                if !matches!(self.context, Context::Function { .. }) {
                    return fail(CompileErrorKind::ReturnOutsideFunction, line, span);
                }
                self.opt(value.as_ref())
            }
            StmtKind::Pass | StmtKind::Global(_) => Ok(()),
            StmtKind::Break if !self.in_loop => {
                fail(CompileErrorKind::BreakOutsideLoop, line, span)
            }
            StmtKind::Continue if !self.in_loop => {
                fail(CompileErrorKind::ContinueOutsideLoop, line, span)
            }
            StmtKind::Break | StmtKind::Continue => Ok(()),
            StmtKind::Raise { exc, cause } => {
                self.opt(exc.as_ref())?;
                self.opt(cause.as_ref())
            }
            StmtKind::Assert { test, msg } => {
                self.expr(test)?;
                self.opt(msg.as_ref())
            }
            StmtKind::Nonlocal(names) => self.nonlocal(names, line, span),
            StmtKind::Delete(targets) => self.exprs(targets),
            StmtKind::If { test, body, orelse } => {
                self.expr(test)?;
                self.block(body)?;
                self.block(orelse)
            }
            StmtKind::While { test, body, orelse } => {
                self.expr(test)?;
                self.loop_body(body)?;
                self.block(orelse)
            }
            StmtKind::For {
                target,
                iter,
                body,
                orelse,
                is_async,
            } => {
                if *is_async {
                    self.require_async("async for", line, span)?;
                }
                self.expr(target)?;
                self.expr(iter)?;
                self.loop_body(body)?;
                self.block(orelse)
            }
            StmtKind::Try(try_stmt) => {
                self.block(&try_stmt.body)?;
                for handler in &try_stmt.handlers {
                    self.opt(handler.kind.as_ref())?;
                    self.block(&handler.body)?;
                }
                self.block(&try_stmt.orelse)?;
                self.block(&try_stmt.finalbody)
            }
            StmtKind::With {
                items,
                body,
                is_async,
            } => {
                if *is_async {
                    self.require_async("async with", line, span)?;
                }
                for item in items {
                    self.expr(&item.context)?;
                    self.opt(item.target.as_ref())?;
                }
                self.block(body)
            }
        }
    }

    fn is_async(&self) -> bool {
        matches!(self.context, Context::Function { is_async: true })
    }

    fn require_async(&self, what: &'static str, line: u32, span: Span) -> Result<(), Failure> {
        if self.is_async() {
            Ok(())
        } else {
            fail(CompileErrorKind::AsyncOutsideAsyncFunction(what), line, span)
        }
    }

    fn nonlocal(&self, names: &[String], line: u32, span: Span) -> Result<(), Failure> {
        match self.context {
            Context::Module => fail(CompileErrorKind::NonlocalAtModuleLevel, line, span),
            Context::Class if self.functions.is_empty() => {
                fail(CompileErrorKind::NonlocalAtModuleLevel, line, span)
            }
            Context::Class | Context::Function { .. } | Context::Lambda => {
                // The innermost entry is the declaring function itself;
                // a class body has no entry of its own.
                let enclosing = match self.context {
                    Context::Function { .. } | Context::Lambda => {
                        &self.functions[..self.functions.len().saturating_sub(1)]
                    }
                    _ => &self.functions[..],
                };
                for name in names {
                    if !enclosing.iter().rev().any(|scope| scope.is_local(name)) {
                        return fail(
                            CompileErrorKind::NonlocalWithoutBinding(name.clone()),
                            line,
                            span,
                        );
                    }
                }
                Ok(())
            }
        }
    }

    /// Conflicts between parameters and `global`/`nonlocal` declarations.
    fn declarations(
        &self,
        params: &Parameters,
        body: &[Stmt],
        info: &ScopeInfo,
    ) -> Result<(), Failure> {
        for name in params.names() {
            let kind = if info.is_global(name) {
                CompileErrorKind::ParameterAndGlobal(name.to_owned())
            } else if info.is_nonlocal(name) {
                CompileErrorKind::ParameterAndNonlocal(name.to_owned())
            } else {
                continue;
            };
            let stmt = first_declaration(body, name);
            return fail(
                kind,
                stmt.map_or(0, |s| s.line),
                stmt.map_or(Span::DUMMY, |s| s.span),
            );
        }
        if let Some(stmt) = body.iter().find(|stmt| match &stmt.kind {
            StmtKind::Nonlocal(names) => names.iter().any(|n| info.is_global(n)),
            _ => false,
        }) {
            let StmtKind::Nonlocal(names) = &stmt.kind else {
                return Ok(());
            };
            let name = names
                .iter()
                .find(|n| info.is_global(n))
                .cloned()
                .unwrap_or_default();
            return fail(CompileErrorKind::NonlocalAndGlobal(name), stmt.line, stmt.span);
        }
        Ok(())
    }

    fn parameters(&mut self, params: &Parameters, line: u32, span: Span) -> Result<(), Failure> {
        let mut seen = FxHashSet::default();
        for name in params.names() {
            if !seen.insert(name) {
                return fail(CompileErrorKind::DuplicateArgument(name.to_owned()), line, span);
            }
        }
        let mut saw_default = false;
        for param in &params.positional {
            match &param.default {
                Some(default) => {
                    saw_default = true;
                    self.expr(default)?;
                }
                None if saw_default => {
                    return fail(CompileErrorKind::NonDefaultAfterDefault, line, span)
                }
                None => {}
            }
            if let Some(annotation) = &param.annotation {
                self.expr(annotation)?;
            }
        }
        for param in &params.kwonly {
            self.opt(param.default.as_ref())?;
            self.opt(param.annotation.as_ref())?;
        }
        Ok(())
    }

    fn opt(&mut self, expr: Option<&Expr>) -> Result<(), Failure> {
        expr.map_or(Ok(()), |e| self.expr(e))
    }

    fn exprs(&mut self, exprs: &[Expr]) -> Result<(), Failure> {
        exprs.iter().try_for_each(|e| self.expr(e))
    }

    /// The first iterable is evaluated in the enclosing scope; everything
    /// else runs inside the comprehension.
    fn comprehension(
        &mut self,
        kind: &'static str,
        generators: &[Comprehension],
        elts: &[&Expr],
        expr: &Expr,
    ) -> Result<(), Failure> {
        if generators.iter().any(|g| g.is_async) && !self.is_async() {
            return fail(
                CompileErrorKind::AsyncComprehensionOutsideAsyncFunction,
                expr.line,
                expr.span,
            );
        }
        let Some((first, rest)) = generators.split_first() else {
            return Ok(());
        };
        self.expr(&first.iter)?;
        let outer = self.comprehension.replace(kind);
        let result = self.comprehension_body(first, rest, elts);
        self.comprehension = outer;
        result
    }

    fn comprehension_body(
        &mut self,
        first: &Comprehension,
        rest: &[Comprehension],
        elts: &[&Expr],
    ) -> Result<(), Failure> {
        self.expr(&first.target)?;
        self.exprs(&first.conditions)?;
        for generator in rest {
            self.expr(&generator.target)?;
            self.expr(&generator.iter)?;
            self.exprs(&generator.conditions)?;
        }
        elts.iter().try_for_each(|elt| self.expr(elt))
    }

    fn yield_expr(&mut self, expr: &Expr, from: bool) -> Result<(), Failure> {
        let kind = if let Some(comprehension) = self.comprehension {
            CompileErrorKind::YieldInComprehension(comprehension)
        } else {
            match self.context {
                Context::Module | Context::Class => CompileErrorKind::YieldOutsideFunction,
                Context::Lambda => CompileErrorKind::YieldInLambda,
                Context::Function { is_async: true } if from => {
                    CompileErrorKind::YieldFromInAsyncFunction
                }
                Context::Function { .. } => return Ok(()),
            }
        };
        fail(kind, expr.line, expr.span)
    }

    fn expr(&mut self, expr: &Expr) -> Result<(), Failure> {
        nbi_stack::ensure_sufficient_stack(|| self.expr_inner(expr))
    }

    fn expr_inner(&mut self, expr: &Expr) -> Result<(), Failure> {
        match &expr.kind {
            ExprKind::Name(_) | ExprKind::Constant(_) => Ok(()),
            ExprKind::FString(parts) => parts.iter().try_for_each(|part| match part {
                FStringPart::Field { expr, .. } => self.expr(expr),
                FStringPart::Literal(_) => Ok(()),
            }),
            ExprKind::List(items) | ExprKind::Tuple(items) | ExprKind::Set(items) => {
                self.exprs(items)
            }
            ExprKind::Dict(entries) => entries.iter().try_for_each(|(k, v)| {
                if let Some(k) = k {
                    self.expr(k)?;
                }
                self.expr(v)
            }),
            ExprKind::Attribute { value, .. }
            | ExprKind::Starred(value)
            | ExprKind::Unary { operand: value, .. } => self.expr(value),
            ExprKind::Subscript { value, index } => {
                self.expr(value)?;
                self.expr(index)
            }
            ExprKind::Slice { lower, upper, step } => {
                for part in [lower, upper, step].into_iter().flatten() {
                    self.expr(part)?;
                }
                Ok(())
            }
            ExprKind::Call { func, args } => {
                self.expr(func)?;
                let mut keywords = FxHashSet::default();
                for arg in args {
                    if let Argument::Keyword(name, _) = arg {
                        if !keywords.insert(name.as_str()) {
                            return fail(
                                CompileErrorKind::RepeatedKeyword(name.clone()),
                                arg.expr().line,
                                arg.expr().span,
                            );
                        }
                    }
                    self.expr(arg.expr())?;
                }
                Ok(())
            }
            ExprKind::Binary { left, right, .. } => {
                self.expr(left)?;
                self.expr(right)
            }
            ExprKind::BoolOp { values, .. } => self.exprs(values),
            ExprKind::Compare { left, ops } => {
                self.expr(left)?;
                ops.iter().try_for_each(|(_, right)| self.expr(right))
            }
            ExprKind::IfExp { test, body, orelse } => {
                self.expr(test)?;
                self.expr(body)?;
                self.expr(orelse)
            }
            ExprKind::Lambda(lambda) => {
                self.parameters(&lambda.params, expr.line, expr.span)?;
                self.functions.push(ScopeInfo::for_lambda(&lambda.params));
                let outer = self.comprehension.take();
                let result = self.nested(Context::Lambda, |v| v.expr(&lambda.body));
                self.comprehension = outer;
                self.functions.pop();
                result
            }
            ExprKind::ListComp { elt, generators } => {
                self.comprehension("list comprehension", generators, &[elt.as_ref()], expr)
            }
            ExprKind::SetComp { elt, generators } => {
                self.comprehension("set comprehension", generators, &[elt.as_ref()], expr)
            }
            ExprKind::DictComp {
                key,
                value,
                generators,
            } => {
                let elts = [key.as_ref(), value.as_ref()];
                self.comprehension("dict comprehension", generators, &elts, expr)
            }
            ExprKind::Yield(value) => {
                self.yield_expr(expr, false)?;
                match value {
                    Some(value) => self.expr(value),
                    None => Ok(()),
                }
            }
            ExprKind::YieldFrom(value) => {
                self.yield_expr(expr, true)?;
                self.expr(value)
            }
            ExprKind::Await(value) => match self.context {
                Context::Function { is_async: true } => self.expr(value),
                Context::Function { is_async: false } | Context::Lambda => {
                    fail(CompileErrorKind::AwaitOutsideAsyncFunction, expr.line, expr.span)
                }
                Context::Module | Context::Class => {
                    fail(CompileErrorKind::AwaitOutsideFunction, expr.line, expr.span)
                }
            },
        }
    }
}

fn first_declaration<'a>(body: &'a [Stmt], name: &str) -> Option<&'a Stmt> {
    body.iter().find(|stmt| match &stmt.kind {
        StmtKind::Global(names) | StmtKind::Nonlocal(names) => names.iter().any(|n| n == name),
        _ => false,
    })
}
