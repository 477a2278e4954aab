//! Protocols every value takes part in: truth, `str`/`repr`, equality,
//! iteration, length and subscription.

use std::rc::Rc;

use super::{EvalResult, Interpreter};
use crate::exception::ExceptionKind;
use crate::runtime::{bytes_repr, complex_repr, float_repr, str_repr};
use crate::value::{ClassObject, Complex, FunctionSource, HashKey, Instance, Value};

/// Numeric view of `bool`, `int` and `float`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub(crate) fn of(value: &Value) -> Option<Number> {
        match value {
            Value::Bool(b) => Some(Number::Int(i64::from(*b))),
            Value::Int(i) => Some(Number::Int(*i)),
            Value::Float(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }

    #[expect(clippy::cast_precision_loss, reason = "mixed arithmetic promotes to float")]
    pub(crate) fn to_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }
}

/// Complex view of any number.
pub(crate) fn complex_of(value: &Value) -> Option<Complex> {
    match value {
        Value::Complex(c) => Some(*c),
        other => Number::of(other).map(|n| Complex::new(n.to_f64(), 0.0)),
    }
}

/// Method defined in Python code on `class` or an ancestor. Builtin slots
/// such as `object.__init__` are skipped.
pub(crate) fn user_method(class: &ClassObject, name: &str) -> Option<Value> {
    match class.lookup(name)? {
        method @ (Value::Function(_) | Value::StaticMethod(_) | Value::ClassMethod(_)) => {
            Some(method)
        }
        _ => None,
    }
}

/// Clamp and enumerate the indices selected by a slice over `len` items.
pub(crate) fn slice_indices(
    len: usize,
    lower: Option<i64>,
    upper: Option<i64>,
    step: i64,
) -> Vec<usize> {
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    let clamp = |bound: i64, low: i64, high: i64| {
        let bound = if bound < 0 { bound + len } else { bound };
        bound.clamp(low, high)
    };
    let (start, stop) = if step > 0 {
        (
            lower.map_or(0, |b| clamp(b, 0, len)),
            upper.map_or(len, |b| clamp(b, 0, len)),
        )
    } else {
        (
            lower.map_or(len - 1, |b| clamp(b, -1, len - 1)),
            upper.map_or(-1, |b| clamp(b, -1, len - 1)),
        )
    };
    let mut indices = Vec::new();
    let mut i = start;
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        if let Ok(index) = usize::try_from(i) {
            indices.push(index);
        }
        i += step;
    }
    indices
}

impl Interpreter<'_> {
    pub(crate) fn truthy(&self, value: &Value) -> EvalResult<bool> {
        if let Some(truth) = value.builtin_truth() {
            return Ok(truth);
        }
        let Value::Instance(instance) = value else {
            return Ok(true);
        };
        if let Some(method) = user_method(&instance.class, "__bool__") {
            return match self.call_method(method, value, &instance.class, "__bool__", Vec::new())? {
                Value::Bool(b) => Ok(b),
                other => Err(self.type_error(format!(
                    "__bool__ should return bool, returned {}",
                    other.type_name()
                ))),
            };
        }
        if user_method(&instance.class, "__len__").is_some() {
            return Ok(self.len_of(value)? != 0);
        }
        Ok(true)
    }

    /// Bind `method` (found on `class`) to `receiver` and call it.
    pub(crate) fn call_method(
        &self,
        method: Value,
        receiver: &Value,
        class: &Rc<ClassObject>,
        name: &str,
        args: Vec<Value>,
    ) -> EvalResult {
        let bound = self.bind_attribute(method, receiver, class, name)?;
        self.call(&bound, args)
    }

    /// Call dunder `name` on an instance when its class defines it.
    pub(crate) fn call_dunder(
        &self,
        value: &Value,
        name: &str,
        args: Vec<Value>,
    ) -> EvalResult<Option<Value>> {
        let Value::Instance(instance) = value else {
            return Ok(None);
        };
        match user_method(&instance.class, name) {
            Some(method) => self
                .call_method(method, value, &instance.class, name, args)
                .map(Some),
            None => Ok(None),
        }
    }

    pub(crate) fn to_str(&self, value: &Value) -> EvalResult<String> {
        match value {
            Value::Str(s) => Ok(s.to_string()),
            Value::Instance(instance) => {
                if let Some(text) = self.call_dunder(value, "__str__", Vec::new())? {
                    return self.expect_string(text, "__str__");
                }
                if self.is_exception_instance(instance) {
                    return self.exception_str(instance);
                }
                self.to_repr(value)
            }
            other => self.to_repr(other),
        }
    }

    fn expect_string(&self, value: Value, method: &str) -> EvalResult<String> {
        match value {
            Value::Str(s) => Ok(s.to_string()),
            other => Err(self.type_error(format!(
                "{method} returned non-string (type {})",
                other.type_name()
            ))),
        }
    }

    pub(crate) fn is_exception_instance(&self, instance: &Instance) -> bool {
        instance
            .class
            .is_subclass_of(self.runtime.exception_class(ExceptionKind::BaseException))
    }

    fn exception_args(instance: &Instance) -> Vec<Value> {
        match instance.dict.get("args") {
            Some(Value::Tuple(args)) => args.to_vec(),
            _ => Vec::new(),
        }
    }

    fn exception_str(&self, instance: &Instance) -> EvalResult<String> {
        let args = Self::exception_args(instance);
        match args.as_slice() {
            [] => Ok(String::new()),
            [arg] if instance
                .class
                .is_subclass_of(self.runtime.exception_class(ExceptionKind::KeyError)) =>
            {
                self.to_repr(arg)
            }
            [arg] => self.to_str(arg),
            _ => self.to_repr(&Value::tuple(args)),
        }
    }

    /// Render a container once; nested references to it print `placeholder`.
    fn guarded(
        &self,
        id: usize,
        placeholder: &str,
        render: impl FnOnce() -> EvalResult<String>,
    ) -> EvalResult<String> {
        if self.repr_guard.borrow().contains(&id) {
            return Ok(placeholder.to_owned());
        }
        self.repr_guard.borrow_mut().push(id);
        let result = render();
        self.repr_guard.borrow_mut().retain(|&entry| entry != id);
        result
    }

    fn join_reprs<'v>(&self, items: impl IntoIterator<Item = &'v Value>) -> EvalResult<String> {
        let parts = items
            .into_iter()
            .map(|item| self.to_repr(item))
            .collect::<EvalResult<Vec<_>>>()?;
        Ok(parts.join(", "))
    }

    pub(crate) fn to_repr(&self, value: &Value) -> EvalResult<String> {
        let address = value.identity().unwrap_or_default();
        Ok(match value {
            Value::None => "None".to_owned(),
            Value::Ellipsis => "Ellipsis".to_owned(),
            Value::Bool(true) => "True".to_owned(),
            Value::Bool(false) => "False".to_owned(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => float_repr(*f),
            Value::Complex(c) => complex_repr(c.re, c.im),
            Value::Str(s) => str_repr(s),
            Value::Bytes(b) => bytes_repr(b),
            Value::List(items) => {
                let items = items.borrow().clone();
                self.guarded(address, "[...]", || Ok(format!("[{}]", self.join_reprs(&items)?)))?
            }
            Value::Tuple(items) => match &**items {
                [single] => format!("({},)", self.to_repr(single)?),
                items => format!("({})", self.join_reprs(items)?),
            },
            Value::Dict(dict) => {
                let entries: Vec<(Value, Value)> = dict
                    .borrow()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                self.guarded(address, "{...}", || {
                    let parts = entries
                        .iter()
                        .map(|(k, v)| Ok(format!("{}: {}", self.to_repr(k)?, self.to_repr(v)?)))
                        .collect::<EvalResult<Vec<_>>>()?;
                    Ok(format!("{{{}}}", parts.join(", ")))
                })?
            }
            Value::Set(set) => {
                let members: Vec<Value> = set.borrow().iter().cloned().collect();
                if members.is_empty() {
                    "set()".to_owned()
                } else {
                    format!("{{{}}}", self.join_reprs(&members)?)
                }
            }
            Value::Range(range) if range.step == 1 => {
                format!("range({}, {})", range.start, range.stop)
            }
            Value::Range(range) => {
                format!("range({}, {}, {})", range.start, range.stop, range.step)
            }
            Value::Function(function) => {
                format!("<function {} at {address:#x}>", function.qualname)
            }
            Value::Builtin(builtin) => format!("<built-in function {}>", builtin.name()),
            Value::BoundMethod(method) => match &method.function {
                Value::Builtin(builtin) => format!(
                    "<built-in method {} of {} object at {:#x}>",
                    builtin.name(),
                    method.receiver.type_name(),
                    method.receiver.identity().unwrap_or_default()
                ),
                Value::Function(function) => format!(
                    "<bound method {} of {}>",
                    function.qualname,
                    self.to_repr(&method.receiver)?
                ),
                other => format!("<bound method of {}>", self.to_repr(other)?),
            },
            Value::Class(class) if class.module == "builtins" => {
                format!("<class '{}'>", class.name)
            }
            Value::Class(class) => format!("<class '{}.{}'>", class.module, class.qualname),
            Value::Instance(instance) => {
                if let Some(text) = self.call_dunder(value, "__repr__", Vec::new())? {
                    return self.expect_string(text, "__repr__");
                }
                if self.is_exception_instance(instance) {
                    let args = Self::exception_args(instance);
                    format!("{}({})", instance.class.name, self.join_reprs(&args)?)
                } else {
                    format!(
                        "<{}.{} object at {address:#x}>",
                        instance.class.module, instance.class.qualname
                    )
                }
            }
            Value::StaticMethod(inner) => format!("<staticmethod({})>", self.to_repr(inner)?),
            Value::ClassMethod(inner) => format!("<classmethod({})>", self.to_repr(inner)?),
            Value::Property(_) => format!("<property object at {address:#x}>"),
            Value::Coroutine(coroutine) => {
                format!("<coroutine object {} at {address:#x}>", coroutine.name)
            }
            Value::Generator(generator) => format!(
                "<{} object {} at {address:#x}>",
                value.type_name(),
                generator.name
            ),
            Value::Module(module) => match module.origin() {
                Some(origin) => format!("<module '{}' from '{}'>", module.name(), origin.display()),
                None => format!("<module '{}'>", module.name()),
            },
            Value::Session(session) => format!("<Session {} at {address:#x}>", session.id()),
            Value::Super(sup) => format!(
                "<super: <class '{}'>, <{} object>>",
                sup.class.name,
                sup.receiver.type_name()
            ),
        })
    }

    /// `==`, falling back to identity for values without an equality rule.
    pub(crate) fn values_equal(&self, left: &Value, right: &Value) -> EvalResult<bool> {
        if let (Some(a), Some(b)) = (Number::of(left), Number::of(right)) {
            return Ok(match (a, b) {
                (Number::Int(a), Number::Int(b)) => a == b,
                (a, b) => a.to_f64() == b.to_f64(),
            });
        }
        if matches!(left, Value::Complex(_)) || matches!(right, Value::Complex(_)) {
            if let (Some(a), Some(b)) = (complex_of(left), complex_of(right)) {
                return Ok(a == b);
            }
        }
        match (left, right) {
            (Value::Str(a), Value::Str(b)) => Ok(a == b),
            (Value::Bytes(a), Value::Bytes(b)) => Ok(a == b),
            (Value::Set(a), Value::Set(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                Ok(a.len() == b.len() && a.is_subset(&b))
            }
            (Value::List(a), Value::List(b)) => {
                if Rc::ptr_eq(a, b) {
                    return Ok(true);
                }
                let (a, b) = (a.borrow().clone(), b.borrow().clone());
                self.sequences_equal(&a, &b)
            }
            (Value::Tuple(a), Value::Tuple(b)) => self.sequences_equal(a, b),
            (Value::Dict(a), Value::Dict(b)) => {
                if Rc::ptr_eq(a, b) {
                    return Ok(true);
                }
                let entries: Vec<(Value, Value)> =
                    a.borrow().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                if entries.len() != b.borrow().len() {
                    return Ok(false);
                }
                for (key, value) in entries {
                    let Some(hash) = key.hash_key() else {
                        return Ok(false);
                    };
                    let other = b.borrow().get(&hash).cloned();
                    match other {
                        Some(other) if self.values_equal(&value, &other)? => {}
                        _ => return Ok(false),
                    }
                }
                Ok(true)
            }
            (Value::Range(a), Value::Range(b)) => Ok(a.iter().eq(b.iter())),
            (Value::Instance(_), _) => {
                match self.call_dunder(left, "__eq__", vec![right.clone()])? {
                    Some(result) => self.truthy(&result),
                    None => match self.call_dunder(right, "__eq__", vec![left.clone()])? {
                        Some(result) => self.truthy(&result),
                        None => Ok(left.is(right)),
                    },
                }
            }
            (_, Value::Instance(_)) => {
                match self.call_dunder(right, "__eq__", vec![left.clone()])? {
                    Some(result) => self.truthy(&result),
                    None => Ok(left.is(right)),
                }
            }
            _ => Ok(left.is(right)),
        }
    }

    fn sequences_equal(&self, a: &[Value], b: &[Value]) -> EvalResult<bool> {
        if a.len() != b.len() {
            return Ok(false);
        }
        for (x, y) in a.iter().zip(b) {
            if !x.is(y) && !self.values_equal(x, y)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Materialize the items `for` would visit.
    pub(crate) fn iterate(&self, value: &Value) -> EvalResult<Vec<Value>> {
        match value {
            Value::List(items) => Ok(items.borrow().clone()),
            Value::Tuple(items) => Ok(items.to_vec()),
            Value::Str(s) => Ok(s.chars().map(|c| Value::from(c.to_string())).collect()),
            Value::Bytes(b) => Ok(b.iter().map(|&byte| Value::Int(i64::from(byte))).collect()),
            Value::Dict(dict) => Ok(dict.borrow().keys().cloned().collect()),
            Value::Set(set) => Ok(set.borrow().iter().cloned().collect()),
            Value::Range(range) => Ok(range.iter().map(Value::Int).collect()),
            Value::Generator(generator) if !generator.is_async => self.generator_drain(generator),
            Value::Instance(instance) => {
                if let Some(iterator) = self.call_dunder(value, "__iter__", Vec::new())? {
                    return match &iterator {
                        Value::Instance(inner)
                            if user_method(&inner.class, "__next__").is_some() =>
                        {
                            self.drain_iterator(&iterator)
                        }
                        Value::Instance(inner) => Err(self.type_error(format!(
                            "iter() returned non-iterator of type '{}'",
                            inner.class.name
                        ))),
                        other => self.iterate(other),
                    };
                }
                if user_method(&instance.class, "__getitem__").is_some() {
                    return self.drain_sequence(value);
                }
                Err(self.not_iterable(value))
            }
            other => Err(self.not_iterable(other)),
        }
    }

    /// Materialize the items `async for` would visit: an async generator's
    /// values, or the awaited results of `__anext__` until
    /// `StopAsyncIteration`.
    pub(crate) fn async_iterate(&self, value: &Value) -> EvalResult<Vec<Value>> {
        if let Value::Generator(generator) = value {
            if generator.is_async {
                return self.generator_drain(generator);
            }
        }
        let Some(iterator) = self.call_dunder(value, "__aiter__", Vec::new())? else {
            return Err(self.type_error(format!(
                "'async for' requires an object with __aiter__ method, got {}",
                value.type_name()
            )));
        };
        if let Value::Generator(generator) = &iterator {
            if generator.is_async {
                return self.generator_drain(generator);
            }
        }
        let mut items = Vec::new();
        loop {
            let step = match self.call_dunder(&iterator, "__anext__", Vec::new())? {
                Some(awaitable) => self.await_value(&awaitable),
                None => {
                    return Err(self.type_error(format!(
                        "'async for' received an object from __aiter__ that does not implement \
                         __anext__: {}",
                        iterator.type_name()
                    )))
                }
            };
            match step {
                Ok(item) => items.push(item),
                Err(raised) if raised.is_instance_of("StopAsyncIteration") => return Ok(items),
                Err(raised) => return Err(raised),
            }
        }
    }

    fn drain_iterator(&self, iterator: &Value) -> EvalResult<Vec<Value>> {
        let mut items = Vec::new();
        loop {
            match self.call_dunder(iterator, "__next__", Vec::new()) {
                Ok(Some(item)) => items.push(item),
                Ok(None) => return Ok(items),
                Err(raised) if raised.is_instance_of("StopIteration") => return Ok(items),
                Err(raised) => return Err(raised),
            }
        }
    }

    fn drain_sequence(&self, sequence: &Value) -> EvalResult<Vec<Value>> {
        let mut items = Vec::new();
        for index in 0.. {
            match self.call_dunder(sequence, "__getitem__", vec![Value::Int(index)]) {
                Ok(Some(item)) => items.push(item),
                Ok(None) => break,
                Err(raised) if raised.is_instance_of("IndexError") => break,
                Err(raised) => return Err(raised),
            }
        }
        Ok(items)
    }

    fn not_iterable(&self, value: &Value) -> crate::exception::RaisedException {
        self.type_error(format!("'{}' object is not iterable", value.type_name()))
    }

    pub(crate) fn len_of(&self, value: &Value) -> EvalResult<usize> {
        match value {
            Value::List(items) => Ok(items.borrow().len()),
            Value::Tuple(items) => Ok(items.len()),
            Value::Str(s) => Ok(s.chars().count()),
            Value::Bytes(b) => Ok(b.len()),
            Value::Dict(dict) => Ok(dict.borrow().len()),
            Value::Set(set) => Ok(set.borrow().len()),
            Value::Range(range) => Ok(range.len()),
            Value::Instance(_) => match self.call_dunder(value, "__len__", Vec::new())? {
                Some(Value::Int(n)) => usize::try_from(n)
                    .map_err(|_| self.value_error("__len__() should return >= 0")),
                Some(other) => Err(self.type_error(format!(
                    "'{}' object cannot be interpreted as an integer",
                    other.type_name()
                ))),
                None => Err(self.no_len(value)),
            },
            other => Err(self.no_len(other)),
        }
    }

    fn no_len(&self, value: &Value) -> crate::exception::RaisedException {
        self.type_error(format!("object of type '{}' has no len()", value.type_name()))
    }

    pub(crate) fn hash_key_of(&self, value: &Value) -> EvalResult<HashKey> {
        value
            .hash_key()
            .ok_or_else(|| self.type_error(format!("unhashable type: '{}'", value.type_name())))
    }

    /// Integer value of `bool`/`int`, or a `TypeError` naming `context`.
    pub(crate) fn expect_int(&self, value: &Value, context: &str) -> EvalResult<i64> {
        match value {
            Value::Int(i) => Ok(*i),
            Value::Bool(b) => Ok(i64::from(*b)),
            other => Err(self.type_error(format!("{context}, not {}", other.type_name()))),
        }
    }

    /// Resolve a possibly negative index against `len`.
    fn normalize_index(&self, index: &Value, len: usize, kind: &str) -> EvalResult<Option<usize>> {
        let index = self.expect_int(index, &format!("{kind} indices must be integers or slices"))?;
        let len = i64::try_from(len).unwrap_or(i64::MAX);
        let index = if index < 0 { index + len } else { index };
        Ok(if (0..len).contains(&index) {
            usize::try_from(index).ok()
        } else {
            None
        })
    }

    pub(crate) fn get_item(&self, container: &Value, index: &Value) -> EvalResult {
        match container {
            Value::List(items) => {
                let items = items.borrow();
                let found = self
                    .normalize_index(index, items.len(), "list")?
                    .and_then(|i| items.get(i).cloned());
                found.ok_or_else(|| self.index_error("list index out of range"))
            }
            Value::Tuple(items) => self
                .normalize_index(index, items.len(), "tuple")?
                .and_then(|i| items.get(i).cloned())
                .ok_or_else(|| self.index_error("tuple index out of range")),
            Value::Str(s) => {
                let count = s.chars().count();
                self.normalize_index(index, count, "string")?
                    .and_then(|i| s.chars().nth(i))
                    .map(|c| Value::from(c.to_string()))
                    .ok_or_else(|| self.index_error("string index out of range"))
            }
            Value::Bytes(b) => self
                .normalize_index(index, b.len(), "byte")?
                .and_then(|i| b.get(i))
                .map(|&byte| Value::Int(i64::from(byte)))
                .ok_or_else(|| self.index_error("index out of range")),
            Value::Range(range) => self
                .normalize_index(index, range.len(), "range")?
                .and_then(|i| range.get(i))
                .map(Value::Int)
                .ok_or_else(|| self.index_error("range object index out of range")),
            Value::Dict(dict) => {
                let hash = self.hash_key_of(index)?;
                let found = dict.borrow().get(&hash).cloned();
                found.ok_or_else(|| self.key_error(index.clone()))
            }
            Value::Instance(_) => self
                .call_dunder(container, "__getitem__", vec![index.clone()])?
                .ok_or_else(|| self.not_subscriptable(container)),
            other => Err(self.not_subscriptable(other)),
        }
    }

    fn not_subscriptable(&self, value: &Value) -> crate::exception::RaisedException {
        self.type_error(format!("'{}' object is not subscriptable", value.type_name()))
    }

    pub(crate) fn set_item(
        &self,
        container: &Value,
        index: &Value,
        value: Value,
    ) -> EvalResult<()> {
        match container {
            Value::List(items) => {
                let len = items.borrow().len();
                let slot = self.normalize_index(index, len, "list")?;
                let mut items = items.borrow_mut();
                match slot.and_then(|i| items.get_mut(i)) {
                    Some(slot) => {
                        *slot = value;
                        Ok(())
                    }
                    None => Err(self.index_error("list assignment index out of range")),
                }
            }
            Value::Dict(dict) => {
                let hash = self.hash_key_of(index)?;
                dict.borrow_mut().insert(hash, index.clone(), value);
                Ok(())
            }
            Value::Instance(_) => self
                .call_dunder(container, "__setitem__", vec![index.clone(), value])?
                .map(drop)
                .ok_or_else(|| self.no_item_assignment(container)),
            other => Err(self.no_item_assignment(other)),
        }
    }

    fn no_item_assignment(&self, value: &Value) -> crate::exception::RaisedException {
        self.type_error(format!(
            "'{}' object does not support item assignment",
            value.type_name()
        ))
    }

    pub(crate) fn delete_item(&self, container: &Value, index: &Value) -> EvalResult<()> {
        match container {
            Value::List(items) => {
                let len = items.borrow().len();
                match self.normalize_index(index, len, "list")? {
                    Some(i) => {
                        items.borrow_mut().remove(i);
                        Ok(())
                    }
                    None => Err(self.index_error("list assignment index out of range")),
                }
            }
            Value::Dict(dict) => {
                let hash = self.hash_key_of(index)?;
                let removed = dict.borrow_mut().remove(&hash);
                removed
                    .map(drop)
                    .ok_or_else(|| self.key_error(index.clone()))
            }
            Value::Instance(_) => self
                .call_dunder(container, "__delitem__", vec![index.clone()])?
                .map(drop)
                .ok_or_else(|| self.no_item_deletion(container)),
            other => Err(self.no_item_deletion(other)),
        }
    }

    fn no_item_deletion(&self, value: &Value) -> crate::exception::RaisedException {
        self.type_error(format!(
            "'{}' object doesn't support item deletion",
            value.type_name()
        ))
    }

    fn slice_bound(&self, bound: Option<&Value>) -> EvalResult<Option<i64>> {
        match bound {
            None | Some(Value::None) => Ok(None),
            Some(value) => self
                .expect_int(
                    value,
                    "slice indices must be integers or None or have an __index__ method",
                )
                .map(Some),
        }
    }

    /// Indices selected by `[lower:upper:step]` over `len` items.
    fn resolve_slice(
        &self,
        len: usize,
        lower: Option<&Value>,
        upper: Option<&Value>,
        step: Option<&Value>,
    ) -> EvalResult<(Vec<usize>, i64)> {
        let step = self.slice_bound(step)?.unwrap_or(1);
        if step == 0 {
            return Err(self.value_error("slice step cannot be zero"));
        }
        let lower = self.slice_bound(lower)?;
        let upper = self.slice_bound(upper)?;
        Ok((slice_indices(len, lower, upper, step), step))
    }

    pub(crate) fn get_slice(
        &self,
        container: &Value,
        lower: Option<&Value>,
        upper: Option<&Value>,
        step: Option<&Value>,
    ) -> EvalResult {
        let pick = |items: &[Value]| -> EvalResult<Vec<Value>> {
            let (indices, _) = self.resolve_slice(items.len(), lower, upper, step)?;
            Ok(indices.into_iter().filter_map(|i| items.get(i).cloned()).collect())
        };
        match container {
            Value::List(items) => {
                let items = items.borrow().clone();
                Ok(Value::list(pick(&items)?))
            }
            Value::Tuple(items) => Ok(Value::tuple(pick(items)?)),
            Value::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                let (indices, _) = self.resolve_slice(chars.len(), lower, upper, step)?;
                Ok(Value::from(
                    indices.into_iter().filter_map(|i| chars.get(i)).collect::<String>(),
                ))
            }
            Value::Bytes(b) => {
                let (indices, _) = self.resolve_slice(b.len(), lower, upper, step)?;
                Ok(Value::bytes(
                    indices.into_iter().filter_map(|i| b.get(i).copied()).collect::<Vec<u8>>(),
                ))
            }
            Value::Range(range) => {
                let items: Vec<Value> = range.iter().map(Value::Int).collect();
                Ok(Value::list(pick(&items)?))
            }
            other => Err(self.not_subscriptable(other)),
        }
    }

    pub(crate) fn set_slice(
        &self,
        container: &Value,
        lower: Option<&Value>,
        upper: Option<&Value>,
        step: Option<&Value>,
        value: &Value,
    ) -> EvalResult<()> {
        let Value::List(items) = container else {
            return Err(self.no_item_assignment(container));
        };
        let replacement = self.iterate(value)?;
        let len = items.borrow().len();
        let (indices, step) = self.resolve_slice(len, lower, upper, step)?;
        if step == 1 {
            let len = i64::try_from(len).unwrap_or(i64::MAX);
            let clamp = |bound: i64| {
                let bound = if bound < 0 { bound + len } else { bound };
                usize::try_from(bound.clamp(0, len)).unwrap_or_default()
            };
            let start = self.slice_bound(lower)?.map_or(0, clamp);
            let end = self
                .slice_bound(upper)?
                .map_or(usize::try_from(len).unwrap_or_default(), clamp)
                .max(start);
            items.borrow_mut().splice(start..end, replacement);
            return Ok(());
        }
        if indices.len() != replacement.len() {
            return Err(self.value_error(format!(
                "attempt to assign sequence of size {} to extended slice of size {}",
                replacement.len(),
                indices.len()
            )));
        }
        let mut items = items.borrow_mut();
        for (index, item) in indices.into_iter().zip(replacement) {
            if let Some(slot) = items.get_mut(index) {
                *slot = item;
            }
        }
        Ok(())
    }

    pub(crate) fn delete_slice(
        &self,
        container: &Value,
        lower: Option<&Value>,
        upper: Option<&Value>,
        step: Option<&Value>,
    ) -> EvalResult<()> {
        let Value::List(items) = container else {
            return Err(self.no_item_deletion(container));
        };
        let len = items.borrow().len();
        let (mut indices, _) = self.resolve_slice(len, lower, upper, step)?;
        indices.sort_unstable();
        let mut items = items.borrow_mut();
        for index in indices.into_iter().rev() {
            items.remove(index);
        }
        Ok(())
    }

    /// `isinstance(value, class)` for a single class.
    pub(crate) fn is_instance(&self, value: &Value, class: &Rc<ClassObject>) -> bool {
        match (value, class.builtin) {
            (Value::Instance(instance), _) => instance.class.is_subclass_of(class),
            (other, Some(tag)) => other.type_tag().is_some_and(|t| t.is_subtype_of(tag)),
            _ => false,
        }
    }

    /// Docstring of a function, class or module value.
    pub(crate) fn doc_of(value: &Value) -> Value {
        match value {
            Value::Function(function) => match &function.source {
                FunctionSource::Def(_) => function.docstring().map_or(Value::None, Value::from),
                FunctionSource::Lambda(_) => Value::None,
            },
            Value::Class(class) => class.dict.get("__doc__").unwrap_or(Value::None),
            Value::Module(module) => module.get("__doc__").unwrap_or(Value::None),
            _ => Value::None,
        }
    }
}
