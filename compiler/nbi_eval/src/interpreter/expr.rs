//! Expression evaluation.

use std::cell::Cell;
use std::rc::Rc;

use nbi_ir::{Argument, BoolOp, Comprehension, Constant, Expr, ExprKind};
use nbi_stack::ensure_sufficient_stack;

use super::{CallArgs, EvalResult, Frame, Interpreter, Locals};
use crate::compile::ScopeInfo;
use crate::value::{Builtin, Complex, DictValue, FunctionSource, Scope, SetValue, Value};

type SliceParts = (Option<Value>, Option<Value>, Option<Value>);

impl Interpreter<'_> {
    pub(crate) fn eval(&self, expr: &Expr, frame: &Frame) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_kind(&expr.kind, frame))
    }

    fn eval_kind(&self, kind: &ExprKind, frame: &Frame) -> EvalResult {
        match kind {
            ExprKind::Name(name) => self.load_name(name, frame),
            ExprKind::Constant(constant) => Ok(match constant {
                Constant::None => Value::None,
                Constant::Bool(b) => Value::Bool(*b),
                Constant::Int(i) => Value::Int(*i),
                Constant::Float(f) => Value::Float(*f),
                Constant::Imaginary(im) => Value::Complex(Complex::new(0.0, *im)),
                Constant::Str(s) => Value::from(s.as_str()),
                Constant::Bytes(b) => Value::bytes(b.as_slice()),
                Constant::Ellipsis => Value::Ellipsis,
            }),
            ExprKind::FString(parts) => self.format_fstring(parts, frame),
            ExprKind::List(items) => Ok(Value::list(self.eval_items(items, frame)?)),
            ExprKind::Tuple(items) => Ok(Value::tuple(self.eval_items(items, frame)?)),
            ExprKind::Set(items) => {
                let mut set = SetValue::new();
                for item in self.eval_items(items, frame)? {
                    let hash = self.hash_key_of(&item)?;
                    set.insert(hash, item);
                }
                Ok(Value::set(set))
            }
            ExprKind::Dict(entries) => {
                let mut dict = DictValue::new();
                for (key, value) in entries {
                    let Some(key) = key else {
                        let mapping = self.eval(value, frame)?;
                        if !matches!(mapping, Value::Dict(_)) {
                            return Err(self.type_error(format!(
                                "'{}' object is not a mapping",
                                mapping.type_name()
                            )));
                        }
                        self.update_dict(&mut dict, &mapping)?;
                        continue;
                    };
                    let key = self.eval(key, frame)?;
                    let value = self.eval(value, frame)?;
                    let hash = self.hash_key_of(&key)?;
                    dict.insert(hash, key, value);
                }
                Ok(Value::dict(dict))
            }
            ExprKind::Attribute { value, attr } => {
                let object = self.eval(value, frame)?;
                self.get_attr(&object, attr)
            }
            ExprKind::Subscript { value, index } => {
                let container = self.eval(value, frame)?;
                if let Some((lower, upper, step)) = self.eval_slice(index, frame)? {
                    return self.get_slice(
                        &container,
                        lower.as_ref(),
                        upper.as_ref(),
                        step.as_ref(),
                    );
                }
                let index = self.eval(index, frame)?;
                self.get_item(&container, &index)
            }
            ExprKind::Slice { .. } => {
                Err(self.type_error("slice expressions are only valid as subscripts"))
            }
            ExprKind::Call { func, args } => self.eval_call(func, args, frame),
            ExprKind::Binary { left, op, right } => {
                let left = self.eval(left, frame)?;
                let right = self.eval(right, frame)?;
                self.binary_op(*op, &left, &right)
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.eval(operand, frame)?;
                self.unary_op(*op, &operand)
            }
            ExprKind::BoolOp { op, values } => {
                let mut result = Value::None;
                for value in values {
                    result = self.eval(value, frame)?;
                    let truth = self.truthy(&result)?;
                    match op {
                        BoolOp::And if !truth => return Ok(result),
                        BoolOp::Or if truth => return Ok(result),
                        BoolOp::And | BoolOp::Or => {}
                    }
                }
                Ok(result)
            }
            ExprKind::Compare { left, ops } => {
                let mut current = self.eval(left, frame)?;
                for (op, right) in ops {
                    let right = self.eval(right, frame)?;
                    if !self.compare(*op, &current, &right)? {
                        return Ok(Value::Bool(false));
                    }
                    current = right;
                }
                Ok(Value::Bool(true))
            }
            ExprKind::IfExp { test, body, orelse } => {
                let test = self.eval(test, frame)?;
                if self.truthy(&test)? {
                    self.eval(body, frame)
                } else {
                    self.eval(orelse, frame)
                }
            }
            ExprKind::Lambda(lambda) => self
                .make_function(FunctionSource::Lambda(Rc::clone(lambda)), "<lambda>", frame)
                .map(Value::Function),
            ExprKind::ListComp { elt, generators } => {
                let mut items = Vec::new();
                self.run_comprehension(generators, frame, &mut |inner: &Frame| {
                    items.push(self.eval(elt, inner)?);
                    Ok(())
                })?;
                Ok(Value::list(items))
            }
            ExprKind::SetComp { elt, generators } => {
                let mut set = SetValue::new();
                self.run_comprehension(generators, frame, &mut |inner: &Frame| {
                    let item = self.eval(elt, inner)?;
                    let hash = self.hash_key_of(&item)?;
                    set.insert(hash, item);
                    Ok(())
                })?;
                Ok(Value::set(set))
            }
            ExprKind::DictComp {
                key,
                value,
                generators,
            } => {
                let mut dict = DictValue::new();
                self.run_comprehension(generators, frame, &mut |inner: &Frame| {
                    let key = self.eval(key, inner)?;
                    let value = self.eval(value, inner)?;
                    let hash = self.hash_key_of(&key)?;
                    dict.insert(hash, key, value);
                    Ok(())
                })?;
                Ok(Value::dict(dict))
            }
            ExprKind::Await(value) => {
                let awaitable = self.eval(value, frame)?;
                self.await_value(&awaitable)
            }
            ExprKind::Yield(value) => {
                let value = match value {
                    Some(value) => self.eval(value, frame)?,
                    None => Value::None,
                };
                self.push_yielded(frame, vec![value])?;
                Ok(Value::None)
            }
            ExprKind::YieldFrom(iterable) => {
                let iterable = self.eval(iterable, frame)?;
                let items = self.iterate(&iterable)?;
                self.push_yielded(frame, items)?;
                Ok(Value::None)
            }
            ExprKind::Starred(_) => Err(self.type_error("can't use starred expression here")),
        }
    }

    /// Items of a list or tuple display, expanding `*iterable`.
    fn eval_items(&self, items: &[Expr], frame: &Frame) -> EvalResult<Vec<Value>> {
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            if let ExprKind::Starred(inner) = &item.kind {
                let iterable = self.eval(inner, frame)?;
                values.extend(self.iterate(&iterable)?);
            } else {
                values.push(self.eval(item, frame)?);
            }
        }
        Ok(values)
    }

    /// Evaluate the bounds of a slice subscript; `None` if `index` is not a
    /// slice.
    pub(crate) fn eval_slice(&self, index: &Expr, frame: &Frame) -> EvalResult<Option<SliceParts>> {
        let ExprKind::Slice { lower, upper, step } = &index.kind else {
            return Ok(None);
        };
        let part =
            |expr: &Option<Box<Expr>>| expr.as_ref().map(|e| self.eval(e, frame)).transpose();
        Ok(Some((part(lower)?, part(upper)?, part(step)?)))
    }

    fn eval_call(&self, func: &Expr, args: &[Argument], frame: &Frame) -> EvalResult {
        let callee = self.eval(func, frame)?;
        if args.is_empty() && matches!(callee, Value::Builtin(Builtin::Super)) {
            let (class, receiver) = frame
                .super_context
                .clone()
                .ok_or_else(|| self.runtime_error("super(): no arguments"))?;
            return self.make_super(&class, receiver);
        }
        let call = self.eval_arguments(args, frame)?;
        self.call_value(&callee, call)
    }

    fn eval_arguments(&self, args: &[Argument], frame: &Frame) -> EvalResult<CallArgs> {
        let mut call = CallArgs::default();
        for arg in args {
            match arg {
                Argument::Positional(expr) => call.args.push(self.eval(expr, frame)?),
                Argument::Unpack(expr) => {
                    let iterable = self.eval(expr, frame)?;
                    call.args.extend(self.iterate(&iterable)?);
                }
                Argument::Keyword(name, expr) => {
                    let value = self.eval(expr, frame)?;
                    call.keywords.push((name.clone(), value));
                }
                Argument::UnpackMapping(expr) => {
                    let mapping = self.eval(expr, frame)?;
                    let Value::Dict(dict) = &mapping else {
                        return Err(self.type_error(format!(
                            "argument after ** must be a mapping, not {}",
                            mapping.type_name()
                        )));
                    };
                    let entries: Vec<(Value, Value)> = dict
                        .borrow()
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect();
                    for (key, value) in entries {
                        let Some(key) = key.as_str() else {
                            return Err(self.type_error("keywords must be strings"));
                        };
                        if call.keywords.iter().any(|(existing, _)| existing == key) {
                            return Err(self.type_error(format!(
                                "got multiple values for keyword argument '{key}'"
                            )));
                        }
                        call.keywords.push((key.to_owned(), value));
                    }
                }
            }
        }
        Ok(call)
    }

    /// Run comprehension clauses in their own scope, calling `emit` for each
    /// innermost binding. The first iterable is evaluated in `frame`.
    fn run_comprehension(
        &self,
        generators: &[Comprehension],
        frame: &Frame,
        emit: &mut dyn FnMut(&Frame) -> EvalResult<()>,
    ) -> EvalResult<()> {
        let Some(first) = generators.first() else {
            return Ok(());
        };
        let iterable = self.eval(&first.iter, frame)?;
        let scope = Scope::new(
            Rc::new(ScopeInfo::for_comprehension(generators)),
            frame.enclosing_scope(),
        );
        let inner = Frame {
            globals: frame.globals.clone(),
            locals: Locals::Function(scope),
            filename: Rc::clone(&frame.filename),
            name: Rc::clone(&frame.name),
            line: Cell::new(frame.line.get()),
            super_context: frame.super_context.clone(),
            qualname_prefix: frame.qualname_prefix.clone(),
            yields: None,
        };
        self.comprehension_level(generators, Some(iterable), &inner, emit)
    }

    fn comprehension_level(
        &self,
        generators: &[Comprehension],
        iterable: Option<Value>,
        frame: &Frame,
        emit: &mut dyn FnMut(&Frame) -> EvalResult<()>,
    ) -> EvalResult<()> {
        let Some((generator, rest)) = generators.split_first() else {
            return emit(frame);
        };
        let iterable = match iterable {
            Some(iterable) => iterable,
            None => self.eval(&generator.iter, frame)?,
        };
        let items = if generator.is_async {
            self.async_iterate(&iterable)?
        } else {
            self.iterate(&iterable)?
        };
        'items: for item in items {
            self.assign(&generator.target, item, frame)?;
            for condition in &generator.conditions {
                let keep = self.eval(condition, frame)?;
                if !self.truthy(&keep)? {
                    continue 'items;
                }
            }
            self.comprehension_level(rest, None, frame, emit)?;
        }
        Ok(())
    }
}
