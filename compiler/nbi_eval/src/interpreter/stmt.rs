//! Statement execution and name binding.

use std::rc::Rc;

use nbi_ir::{Expr, ExprKind, FunctionDef, Stmt, StmtKind, TryStmt, WithItem};
use nbi_stack::ensure_sufficient_stack;

use super::{EvalResult, ExecResult, Flow, Frame, Interpreter, Locals};
use crate::exception::{ExceptionKind, RaisedException};
use crate::value::{FunctionSource, Scope, Value};

impl Interpreter<'_> {
    pub(crate) fn exec_block(&self, body: &[Stmt], frame: &Frame) -> ExecResult {
        for stmt in body {
            match self.exec_stmt(stmt, frame)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&self, stmt: &Stmt, frame: &Frame) -> ExecResult {
        frame.line.set(stmt.line);
        ensure_sufficient_stack(|| self.exec_stmt_kind(&stmt.kind, frame))
    }

    fn exec_stmt_kind(&self, kind: &StmtKind, frame: &Frame) -> ExecResult {
        match kind {
            StmtKind::FunctionDef(def) => self.exec_function_def(def, frame)?,
            StmtKind::ClassDef(def) => self.exec_class_def(def, frame)?,
            StmtKind::Import(aliases) => self.exec_import(aliases, frame)?,
            StmtKind::ImportFrom(node) => self.exec_import_from(node, frame)?,
            StmtKind::Expr(expr) => {
                self.eval(expr, frame)?;
            }
            StmtKind::Assign { targets, value } => {
                let value = self.eval(value, frame)?;
                for target in targets {
                    self.assign(target, value.clone(), frame)?;
                }
            }
            StmtKind::AugAssign { target, op, value } => {
                self.exec_aug_assign(target, *op, value, frame)?
            }
            StmtKind::AnnAssign { target, value, .. } => {
                if let Some(value) = value {
                    let value = self.eval(value, frame)?;
                    self.assign(target, value, frame)?;
                }
            }
            StmtKind::Return(value) => {
                let value = match value {
                    Some(value) => self.eval(value, frame)?,
                    None => Value::None,
                };
                return Ok(Flow::Return(value));
            }
            StmtKind::Pass | StmtKind::Global(_) | StmtKind::Nonlocal(_) => {}
            StmtKind::Break => return Ok(Flow::Break),
            StmtKind::Continue => return Ok(Flow::Continue),
            StmtKind::Raise { exc, cause } => {
                return Err(self.exec_raise(exc.as_ref(), cause.as_ref(), frame)?)
            }
            StmtKind::Assert { test, msg } => {
                let passed = self.eval(test, frame)?;
                if !self.truthy(&passed)? {
                    let args = match msg {
                        Some(msg) => vec![self.eval(msg, frame)?],
                        None => Vec::new(),
                    };
                    return Err(self.exception_with_args(ExceptionKind::AssertionError, args));
                }
            }
            StmtKind::Delete(targets) => {
                for target in targets {
                    self.delete_target(target, frame)?;
                }
            }
            StmtKind::If { test, body, orelse } => {
                let test = self.eval(test, frame)?;
                return if self.truthy(&test)? {
                    self.exec_block(body, frame)
                } else {
                    self.exec_block(orelse, frame)
                };
            }
            StmtKind::While { test, body, orelse } => loop {
                let value = self.eval(test, frame)?;
                if !self.truthy(&value)? {
                    return self.exec_block(orelse, frame);
                }
                match self.exec_block(body, frame)? {
                    Flow::Normal | Flow::Continue => {}
                    Flow::Break => break,
                    flow @ Flow::Return(_) => return Ok(flow),
                }
            },
            StmtKind::For {
                target,
                iter,
                body,
                orelse,
                is_async,
            } => {
                let iterable = self.eval(iter, frame)?;
                let items = if *is_async {
                    self.async_iterate(&iterable)?
                } else {
                    self.iterate(&iterable)?
                };
                for item in items {
                    self.assign(target, item, frame)?;
                    match self.exec_block(body, frame)? {
                        Flow::Normal | Flow::Continue => {}
                        Flow::Break => return Ok(Flow::Normal),
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                return self.exec_block(orelse, frame);
            }
            StmtKind::Try(node) => return self.exec_try(node, frame),
            StmtKind::With {
                items,
                body,
                is_async,
            } => return self.exec_with(items, body, *is_async, frame),
        }
        Ok(Flow::Normal)
    }

    fn exec_function_def(&self, def: &Rc<FunctionDef>, frame: &Frame) -> EvalResult<()> {
        let decorators = def
            .decorators
            .iter()
            .map(|decorator| self.eval(decorator, frame))
            .collect::<EvalResult<Vec<_>>>()?;
        let function = self.make_function(FunctionSource::Def(Rc::clone(def)), &def.name, frame)?;
        let mut value = Value::Function(function);
        for decorator in decorators.iter().rev() {
            value = self.call(decorator, vec![value])?;
        }
        self.store_name(&def.name, value, frame)
    }

    fn exec_aug_assign(
        &self,
        target: &Expr,
        op: nbi_ir::BinaryOp,
        value: &Expr,
        frame: &Frame,
    ) -> EvalResult<()> {
        match &target.kind {
            ExprKind::Name(name) => {
                let current = self.load_name(name, frame)?;
                let rhs = self.eval(value, frame)?;
                let result = self.inplace_op(op, current, rhs)?;
                self.store_name(name, result, frame)
            }
            ExprKind::Attribute { value: object, attr } => {
                let object = self.eval(object, frame)?;
                let current = self.get_attr(&object, attr)?;
                let rhs = self.eval(value, frame)?;
                let result = self.inplace_op(op, current, rhs)?;
                self.set_attr(&object, attr, result)
            }
            ExprKind::Subscript { value: container, index } => {
                let container = self.eval(container, frame)?;
                if let Some((lower, upper, step)) = self.eval_slice(index, frame)? {
                    let current = self.get_slice(
                        &container,
                        lower.as_ref(),
                        upper.as_ref(),
                        step.as_ref(),
                    )?;
                    let rhs = self.eval(value, frame)?;
                    let result = self.inplace_op(op, current, rhs)?;
                    return self.set_slice(
                        &container,
                        lower.as_ref(),
                        upper.as_ref(),
                        step.as_ref(),
                        &result,
                    );
                }
                let index = self.eval(index, frame)?;
                let current = self.get_item(&container, &index)?;
                let rhs = self.eval(value, frame)?;
                let result = self.inplace_op(op, current, rhs)?;
                self.set_item(&container, &index, result)
            }
            _ => Err(self.type_error("illegal expression for augmented assignment")),
        }
    }

    /// Build the exception a `raise` statement throws.
    fn exec_raise(
        &self,
        exc: Option<&Expr>,
        cause: Option<&Expr>,
        frame: &Frame,
    ) -> EvalResult<RaisedException> {
        let Some(exc) = exc else {
            return self
                .handling
                .borrow()
                .last()
                .cloned()
                .ok_or_else(|| self.runtime_error("No active exception to reraise"));
        };
        let exception = self.eval(exc, frame)?;
        let exception = self.exception_instance(exception)?;
        let mut raised = RaisedException::new(exception);
        if let Some(cause) = cause {
            let cause = self.eval(cause, frame)?;
            if !cause.is_none() {
                let cause = self.exception_instance(cause)?;
                let known = self
                    .handling
                    .borrow()
                    .iter()
                    .rev()
                    .find(|handled| handled.exception.is(&cause))
                    .cloned();
                raised.cause = Some(Box::new(known.unwrap_or_else(|| RaisedException::new(cause))));
            }
        }
        Ok(raised)
    }

    /// Instantiate an exception class, or accept an exception instance.
    fn exception_instance(&self, value: Value) -> EvalResult {
        match &value {
            Value::Class(class)
                if class
                    .is_subclass_of(self.runtime.exception_class(ExceptionKind::BaseException)) =>
            {
                self.instantiate(class, super::CallArgs::default())
            }
            Value::Instance(instance) if self.is_exception_instance(instance) => Ok(value),
            _ => Err(self.type_error("exceptions must derive from BaseException")),
        }
    }

    fn exec_try(&self, node: &TryStmt, frame: &Frame) -> ExecResult {
        let outcome = match self.exec_block(&node.body, frame) {
            Ok(Flow::Normal) => self.exec_block(&node.orelse, frame),
            Ok(flow) => Ok(flow),
            Err(raised) => self.handle_exception(node, raised, frame),
        };
        if node.finalbody.is_empty() {
            return outcome;
        }
        let line = frame.line.get();
        match self.exec_block(&node.finalbody, frame)? {
            Flow::Normal => {
                if outcome.is_err() {
                    frame.line.set(line);
                }
                outcome
            }
            flow => Ok(flow),
        }
    }

    fn handle_exception(
        &self,
        node: &TryStmt,
        raised: RaisedException,
        frame: &Frame,
    ) -> ExecResult {
        let line = frame.line.get();
        for handler in &node.handlers {
            let matches = match &handler.kind {
                None => true,
                Some(kind) => {
                    let filter = self.eval(kind, frame)?;
                    self.exception_matches(&raised.exception, &filter)?
                }
            };
            if !matches {
                continue;
            }
            if let Some(name) = &handler.name {
                self.store_name(name, raised.exception.clone(), frame)?;
            }
            self.handling.borrow_mut().push(raised);
            let result = self.exec_block(&handler.body, frame);
            self.handling.borrow_mut().pop();
            if let Some(name) = &handler.name {
                self.unbind_name(name, frame);
            }
            return result;
        }
        frame.line.set(line);
        Err(raised)
    }

    /// Whether `exception` is caught by an `except` clause naming `filter`.
    pub(crate) fn exception_matches(&self, exception: &Value, filter: &Value) -> EvalResult<bool> {
        match filter {
            Value::Class(class)
                if class
                    .is_subclass_of(self.runtime.exception_class(ExceptionKind::BaseException)) =>
            {
                Ok(self.is_instance(exception, class))
            }
            Value::Tuple(filters) => {
                for filter in filters.iter() {
                    if self.exception_matches(exception, filter)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            _ => Err(self.type_error(
                "catching classes that do not inherit from BaseException is not allowed",
            )),
        }
    }

    /// `with`, or `async with` when `is_async` is set: the manager's
    /// `__aenter__` and `__aexit__` results are awaited.
    fn exec_with(
        &self,
        items: &[WithItem],
        body: &[Stmt],
        is_async: bool,
        frame: &Frame,
    ) -> ExecResult {
        let Some((item, rest)) = items.split_first() else {
            return self.exec_block(body, frame);
        };
        let manager = self.eval(&item.context, frame)?;
        let (enter_name, exit_name, protocol_name) = if is_async {
            ("__aenter__", "__aexit__", "asynchronous context manager")
        } else {
            ("__enter__", "__exit__", "context manager")
        };
        let protocol = |name: &str| {
            self.lookup_attr(&manager, name)?.ok_or_else(|| {
                self.type_error(format!(
                    "'{}' object does not support the {protocol_name} protocol",
                    manager.type_name()
                ))
            })
        };
        let enter = protocol(enter_name)?;
        let exit = protocol(exit_name)?;
        let call = |method: &Value, args: Vec<Value>| {
            let result = self.call(method, args)?;
            if is_async {
                self.await_value(&result)
            } else {
                Ok(result)
            }
        };
        let entered = call(&enter, Vec::new())?;
        let result = match &item.target {
            Some(target) => self
                .assign(target, entered, frame)
                .and_then(|()| self.exec_with(rest, body, is_async, frame)),
            None => self.exec_with(rest, body, is_async, frame),
        };
        match result {
            Ok(flow) => {
                call(&exit, vec![Value::None, Value::None, Value::None])?;
                Ok(flow)
            }
            Err(raised) => {
                let class = Value::Class(self.runtime.class_of(&raised.exception));
                let suppress = call(&exit, vec![class, raised.exception.clone(), Value::None])?;
                if self.truthy(&suppress)? {
                    Ok(Flow::Normal)
                } else {
                    Err(raised)
                }
            }
        }
    }

    /// Bind `value` to an assignment target.
    pub(crate) fn assign(&self, target: &Expr, value: Value, frame: &Frame) -> EvalResult<()> {
        match &target.kind {
            ExprKind::Name(name) => self.store_name(name, value, frame),
            ExprKind::Attribute { value: object, attr } => {
                let object = self.eval(object, frame)?;
                self.set_attr(&object, attr, value)
            }
            ExprKind::Subscript { value: container, index } => {
                let container = self.eval(container, frame)?;
                if let Some((lower, upper, step)) = self.eval_slice(index, frame)? {
                    return self.set_slice(
                        &container,
                        lower.as_ref(),
                        upper.as_ref(),
                        step.as_ref(),
                        &value,
                    );
                }
                let index = self.eval(index, frame)?;
                self.set_item(&container, &index, value)
            }
            ExprKind::Tuple(targets) | ExprKind::List(targets) => {
                self.unpack(targets, &value, frame)
            }
            _ => Err(self.type_error("cannot assign to expression")),
        }
    }

    fn unpack(&self, targets: &[Expr], value: &Value, frame: &Frame) -> EvalResult<()> {
        if matches!(
            value,
            Value::None | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Complex(_)
        ) {
            return Err(self.type_error(format!(
                "cannot unpack non-iterable {} object",
                value.type_name()
            )));
        }
        let mut items = self.iterate(value)?;
        let expected = targets.len();
        let Some(star) = targets.iter().position(|t| matches!(t.kind, ExprKind::Starred(_))) else {
            if items.len() < expected {
                return Err(self.value_error(format!(
                    "not enough values to unpack (expected {expected}, got {})",
                    items.len()
                )));
            }
            if items.len() > expected {
                return Err(self.value_error(format!(
                    "too many values to unpack (expected {expected})"
                )));
            }
            for (target, item) in targets.iter().zip(items) {
                self.assign(target, item, frame)?;
            }
            return Ok(());
        };
        if items.len() < expected - 1 {
            return Err(self.value_error(format!(
                "not enough values to unpack (expected at least {}, got {})",
                expected - 1,
                items.len()
            )));
        }
        let after = expected - star - 1;
        let tail = items.split_off(items.len() - after);
        let middle = items.split_off(star);
        for (target, item) in targets[..star].iter().zip(items) {
            self.assign(target, item, frame)?;
        }
        if let ExprKind::Starred(inner) = &targets[star].kind {
            self.assign(inner, Value::list(middle), frame)?;
        }
        for (target, item) in targets[star + 1..].iter().zip(tail) {
            self.assign(target, item, frame)?;
        }
        Ok(())
    }

    fn delete_target(&self, target: &Expr, frame: &Frame) -> EvalResult<()> {
        match &target.kind {
            ExprKind::Name(name) => self.delete_name(name, frame),
            ExprKind::Attribute { value, attr } => {
                let object = self.eval(value, frame)?;
                self.delete_attr(&object, attr)
            }
            ExprKind::Subscript { value, index } => {
                let container = self.eval(value, frame)?;
                if let Some((lower, upper, step)) = self.eval_slice(index, frame)? {
                    return self.delete_slice(
                        &container,
                        lower.as_ref(),
                        upper.as_ref(),
                        step.as_ref(),
                    );
                }
                let index = self.eval(index, frame)?;
                self.delete_item(&container, &index)
            }
            ExprKind::Tuple(targets) | ExprKind::List(targets) => {
                for target in targets {
                    self.delete_target(target, frame)?;
                }
                Ok(())
            }
            _ => Err(self.type_error("cannot delete expression")),
        }
    }

    /// Read a variable, following the frame's scoping rules.
    pub(crate) fn load_name(&self, name: &str, frame: &Frame) -> EvalResult {
        match &frame.locals {
            Locals::Module => {}
            Locals::Class { namespace, enclosing } => {
                if let Some(value) = namespace.get(name) {
                    return Ok(value);
                }
                if let Some(value) = self.load_free(enclosing.as_ref(), name)? {
                    return Ok(value);
                }
            }
            Locals::Function(scope) => {
                if scope.info.is_local(name) {
                    return scope.get(name).ok_or_else(|| self.unbound_local(name));
                }
                if !scope.info.is_global(name) {
                    if let Some(value) = self.load_free(scope.parent.as_ref(), name)? {
                        return Ok(value);
                    }
                }
            }
        }
        frame
            .globals
            .get(name)
            .or_else(|| self.runtime.builtins().get(name))
            .ok_or_else(|| self.name_error(name))
    }

    /// Look `name` up in enclosing function scopes.
    fn load_free(&self, scope: Option<&Rc<Scope>>, name: &str) -> EvalResult<Option<Value>> {
        let Some(owner) = scope.and_then(|scope| scope.owner_of(name)) else {
            return Ok(None);
        };
        owner.get(name).map(Some).ok_or_else(|| {
            self.exception(
                ExceptionKind::NameError,
                format!(
                    "cannot access free variable '{name}' where it is not associated with a value in enclosing scope"
                ),
            )
        })
    }

    pub(crate) fn store_name(&self, name: &str, value: Value, frame: &Frame) -> EvalResult<()> {
        match &frame.locals {
            Locals::Module => frame.globals.set(name, value),
            Locals::Class { namespace, .. } => namespace.set(name, value),
            Locals::Function(scope) => {
                if scope.info.is_global(name) {
                    frame.globals.set(name, value);
                } else if scope.info.is_nonlocal(name) {
                    match scope.parent.as_ref().and_then(|parent| parent.owner_of(name)) {
                        Some(owner) => owner.set(name, value),
                        None => scope.set(name, value),
                    }
                } else {
                    scope.set(name, value);
                }
            }
        }
        Ok(())
    }

    fn delete_name(&self, name: &str, frame: &Frame) -> EvalResult<()> {
        let removed = match &frame.locals {
            Locals::Module => frame.globals.remove(name),
            Locals::Class { namespace, .. } => namespace.remove(name),
            Locals::Function(scope) => {
                if scope.info.is_global(name) {
                    frame.globals.remove(name)
                } else if scope.info.is_nonlocal(name) {
                    scope
                        .parent
                        .as_ref()
                        .and_then(|parent| parent.owner_of(name))
                        .and_then(|owner| owner.remove(name))
                } else {
                    return scope
                        .remove(name)
                        .map(drop)
                        .ok_or_else(|| self.unbound_local(name));
                }
            }
        };
        removed.map(drop).ok_or_else(|| self.name_error(name))
    }

    /// Remove a binding if present; used for `except ... as name`.
    fn unbind_name(&self, name: &str, frame: &Frame) {
        if let Err(raised) = self.delete_name(name, frame) {
            tracing::trace!(name, exception = raised.type_name(), "handler name already unbound");
        }
    }
}
