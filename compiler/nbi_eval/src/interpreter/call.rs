//! Calling values: argument binding, function frames, instantiation and
//! coroutines.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use nbi_stack::ensure_sufficient_stack;

use super::{EvalResult, Flow, Frame, Interpreter, Locals};
use crate::compile::ScopeInfo;
use crate::exception::ExceptionKind;
use crate::namespace::Namespace;
use crate::value::{
    Builtin, ClassObject, Coroutine, DictValue, FunctionObject, FunctionSource, Generator,
    GeneratorState, HashKey, Instance, Scope, Value,
};

/// Values a single generator run may yield before it is stopped.
const MAX_YIELDED: usize = 1 << 20;

/// Arguments at a call site, after `*` and `**` expansion.
#[derive(Default)]
pub(crate) struct CallArgs {
    pub(crate) args: Vec<Value>,
    pub(crate) keywords: Vec<(String, Value)>,
}

impl CallArgs {
    pub(crate) fn positional(args: Vec<Value>) -> Self {
        CallArgs {
            args,
            keywords: Vec::new(),
        }
    }

    #[must_use]
    pub(crate) fn with_receiver(mut self, receiver: Value) -> Self {
        self.args.insert(0, receiver);
        self
    }

    /// Remove and return keyword `name`.
    pub(crate) fn take_keyword(&mut self, name: &str) -> Option<Value> {
        let index = self.keywords.iter().position(|(key, _)| key == name)?;
        Some(self.keywords.remove(index).1)
    }
}

/// A bound function activation waiting to run. Coroutines hold one until
/// they are awaited, generators until they are first consumed.
pub(crate) struct PreparedCall {
    function: Rc<FunctionObject>,
    scope: Rc<Scope>,
    super_context: Option<(Rc<ClassObject>, Value)>,
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// `'a'`, `'a' and 'b'`, `'a', 'b', and 'c'`.
fn name_list(names: &[&str]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| format!("'{n}'")).collect();
    match quoted.as_slice() {
        [] => String::new(),
        [one] => one.clone(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}

impl Interpreter<'_> {
    pub(crate) fn call_value(&self, callee: &Value, args: CallArgs) -> EvalResult {
        match callee {
            Value::Function(function) => self.call_function(function, args),
            Value::Builtin(builtin) => self.call_builtin(*builtin, None, args),
            Value::BoundMethod(method) => match &method.function {
                Value::Builtin(builtin) => {
                    self.call_builtin(*builtin, Some(&method.receiver), args)
                }
                function => self.call_value(function, args.with_receiver(method.receiver.clone())),
            },
            Value::Class(class) => self.instantiate(class, args),
            Value::StaticMethod(inner) => self.call_value(inner, args),
            Value::Instance(instance) => match instance.class.lookup("__call__") {
                Some(method) => {
                    let bound = self.bind_attribute(method, callee, &instance.class, "__call__")?;
                    self.call_value(&bound, args)
                }
                None => Err(self.not_callable(callee)),
            },
            other => Err(self.not_callable(other)),
        }
    }

    #[tracing::instrument(level = "trace", skip_all, fields(function = %function.qualname))]
    pub(crate) fn call_function(
        &self,
        function: &Rc<FunctionObject>,
        args: CallArgs,
    ) -> EvalResult {
        let prepared = self.prepare_call(function, args)?;
        if function.is_generator {
            return Ok(Value::Generator(Rc::new(Generator::new(
                Rc::from(function.qualname.as_str()),
                function.is_async,
                prepared,
            ))));
        }
        if function.is_async {
            return Ok(Value::Coroutine(Rc::new(Coroutine {
                name: Rc::from(function.qualname.as_str()),
                state: RefCell::new(Some(prepared)),
            })));
        }
        self.run_prepared(prepared)
    }

    fn prepare_call(
        &self,
        function: &Rc<FunctionObject>,
        args: CallArgs,
    ) -> EvalResult<PreparedCall> {
        let scope = Scope::new(Rc::clone(&function.scope_info), function.closure.clone());
        self.bind_arguments(function, &scope, args)?;
        let super_context = function.defining_class().and_then(|class| {
            let first = function.params().positional.first()?;
            Some((class, scope.get(&first.name)?))
        });
        Ok(PreparedCall {
            function: Rc::clone(function),
            scope,
            super_context,
        })
    }

    /// Run a prepared activation in a fresh frame.
    pub(crate) fn run_prepared(&self, call: PreparedCall) -> EvalResult {
        self.activate(call, false).map(|(value, _)| value)
    }

    /// Run a prepared activation, collecting what it yields when
    /// `generator` is set.
    fn activate(&self, call: PreparedCall, generator: bool) -> EvalResult<(Value, Vec<Value>)> {
        let PreparedCall {
            function,
            scope,
            super_context,
        } = call;
        let depth = self.depth.get();
        if depth >= self.runtime.recursion_limit() {
            return Err(self.exception(
                ExceptionKind::RecursionError,
                "maximum recursion depth exceeded",
            ));
        }
        let line = match &function.source {
            FunctionSource::Def(def) => def.body.first().map_or(0, |stmt| stmt.line),
            FunctionSource::Lambda(lambda) => lambda.body.line,
        };
        let frame = Frame {
            globals: function.globals.clone(),
            locals: Locals::Function(scope),
            filename: Rc::clone(&function.filename),
            name: Rc::from(function.name.as_str()),
            line: Cell::new(line),
            super_context,
            qualname_prefix: format!("{}.<locals>.", function.qualname),
            yields: generator.then(|| RefCell::new(Vec::new())),
        };
        self.depth.set(depth + 1);
        let result = ensure_sufficient_stack(|| match &function.source {
            FunctionSource::Def(def) => self.exec_block(&def.body, &frame).map(|flow| match flow {
                Flow::Return(value) => value,
                Flow::Normal | Flow::Break | Flow::Continue => Value::None,
            }),
            FunctionSource::Lambda(lambda) => self.eval(&lambda.body, &frame),
        });
        self.depth.set(depth);
        let value = result.map_err(|mut raised| {
            raised.push_frame(frame.trace_frame());
            raised
        })?;
        let yielded = frame.yields.map(RefCell::into_inner).unwrap_or_default();
        Ok((value, yielded))
    }

    /// Record a `yield` in the generator running `frame`.
    pub(crate) fn push_yielded(&self, frame: &Frame, values: Vec<Value>) -> EvalResult<()> {
        let Some(sink) = &frame.yields else {
            return Err(self.runtime_error("'yield' outside generator"));
        };
        let mut sink = sink.borrow_mut();
        if sink.len().saturating_add(values.len()) > MAX_YIELDED {
            return Err(self.runtime_error(format!(
                "generator yielded more than {MAX_YIELDED} values"
            )));
        }
        sink.extend(values);
        Ok(())
    }

    /// Run a generator's body on first use. Later calls find its values
    /// already queued.
    fn resume_generator(&self, generator: &Generator) -> EvalResult<()> {
        let state = generator.state.replace(GeneratorState::Running);
        let ready = match state {
            GeneratorState::Pending(call) => match self.activate(call, true) {
                Ok((_, yielded)) => VecDeque::from(yielded),
                Err(raised) => {
                    *generator.state.borrow_mut() = GeneratorState::Ready(VecDeque::new());
                    return Err(raised);
                }
            },
            GeneratorState::Running => {
                return Err(self.value_error("generator already executing"));
            }
            GeneratorState::Ready(ready) => ready,
        };
        *generator.state.borrow_mut() = GeneratorState::Ready(ready);
        Ok(())
    }

    /// Next value of a generator, `None` once it is exhausted.
    pub(crate) fn generator_next(&self, generator: &Generator) -> EvalResult<Option<Value>> {
        self.resume_generator(generator)?;
        Ok(match &mut *generator.state.borrow_mut() {
            GeneratorState::Ready(ready) => ready.pop_front(),
            GeneratorState::Pending(_) | GeneratorState::Running => None,
        })
    }

    /// Every value a generator has left.
    pub(crate) fn generator_drain(&self, generator: &Generator) -> EvalResult<Vec<Value>> {
        self.resume_generator(generator)?;
        Ok(match &mut *generator.state.borrow_mut() {
            GeneratorState::Ready(ready) => ready.drain(..).collect(),
            GeneratorState::Pending(_) | GeneratorState::Running => Vec::new(),
        })
    }

    /// Run an awaited coroutine to completion.
    pub(crate) fn await_value(&self, value: &Value) -> EvalResult {
        let Value::Coroutine(coroutine) = value else {
            return Err(self.type_error(format!(
                "object {} can't be used in 'await' expression",
                value.type_name()
            )));
        };
        let prepared = coroutine.state.borrow_mut().take();
        match prepared {
            Some(prepared) => self.run_prepared(prepared),
            None => Err(self.runtime_error("cannot reuse already awaited coroutine")),
        }
    }

    fn bind_arguments(
        &self,
        function: &FunctionObject,
        scope: &Scope,
        call: CallArgs,
    ) -> EvalResult<()> {
        let params = function.params();
        let name = &function.qualname;
        let CallArgs { args, keywords } = call;

        let count = params.positional.len();
        let given = args.len();
        let mut slots: Vec<Option<Value>> = vec![None; count];
        let mut extra = Vec::new();
        for (i, value) in args.into_iter().enumerate() {
            match slots.get_mut(i) {
                Some(slot) => *slot = Some(value),
                None => extra.push(value),
            }
        }
        if !extra.is_empty() && params.vararg.is_none() {
            let required = function.defaults.iter().filter(|d| d.is_none()).count();
            let takes = if required == count {
                format!("{count} positional argument{}", plural(count))
            } else {
                format!("from {required} to {count} positional arguments")
            };
            let were = if given == 1 { "was" } else { "were" };
            return Err(self.type_error(format!("{name}() takes {takes} but {given} {were} given")));
        }

        let mut kwonly: Vec<Option<Value>> = vec![None; params.kwonly.len()];
        let mut kwargs = DictValue::new();
        for (key, value) in keywords {
            if let Some(i) = params.positional.iter().position(|p| p.name == key) {
                if slots[i].is_some() {
                    return Err(self.type_error(format!(
                        "{name}() got multiple values for argument '{key}'"
                    )));
                }
                slots[i] = Some(value);
            } else if let Some(i) = params.kwonly.iter().position(|p| p.name == key) {
                kwonly[i] = Some(value);
            } else if params.kwarg.is_some() {
                kwargs.insert(HashKey::Str(key.as_str().into()), Value::from(key), value);
            } else {
                return Err(self.type_error(format!(
                    "{name}() got an unexpected keyword argument '{key}'"
                )));
            }
        }

        let mut missing = Vec::new();
        for (i, slot) in slots.iter_mut().enumerate() {
            if slot.is_none() {
                match function.defaults.get(i).cloned().flatten() {
                    Some(default) => *slot = Some(default),
                    None => missing.push(params.positional[i].name.as_str()),
                }
            }
        }
        if !missing.is_empty() {
            return Err(self.type_error(format!(
                "{name}() missing {} required positional argument{}: {}",
                missing.len(),
                plural(missing.len()),
                name_list(&missing)
            )));
        }
        for (i, slot) in kwonly.iter_mut().enumerate() {
            if slot.is_none() {
                match function.kw_defaults.get(i).cloned().flatten() {
                    Some(default) => *slot = Some(default),
                    None => missing.push(params.kwonly[i].name.as_str()),
                }
            }
        }
        if !missing.is_empty() {
            return Err(self.type_error(format!(
                "{name}() missing {} required keyword-only argument{}: {}",
                missing.len(),
                plural(missing.len()),
                name_list(&missing)
            )));
        }

        for (param, value) in params.positional.iter().zip(slots) {
            if let Some(value) = value {
                scope.set(&param.name, value);
            }
        }
        if let Some(vararg) = &params.vararg {
            scope.set(vararg, Value::tuple(extra));
        }
        for (param, value) in params.kwonly.iter().zip(kwonly) {
            if let Some(value) = value {
                scope.set(&param.name, value);
            }
        }
        if let Some(kwarg) = &params.kwarg {
            scope.set(kwarg, Value::dict(kwargs));
        }
        Ok(())
    }

    /// Call a class: builtin conversion, or a new instance run through
    /// `__init__`.
    pub(crate) fn instantiate(&self, class: &Rc<ClassObject>, args: CallArgs) -> EvalResult {
        if let Some(tag) = class.builtin {
            return self.construct_builtin(tag, args);
        }
        let instance = Rc::new(Instance::new(Rc::clone(class)));
        if class.is_subclass_of(self.runtime.exception_class(ExceptionKind::BaseException)) {
            instance.dict.set("args", Value::tuple(args.args.clone()));
        }
        let value = Value::Instance(instance);
        match class.lookup("__init__") {
            None | Some(Value::Builtin(Builtin::ObjectInit)) => {
                if !args.args.is_empty() || !args.keywords.is_empty() {
                    return Err(self.type_error(format!("{}() takes no arguments", class.name)));
                }
            }
            Some(init) => {
                let bound = self.bind_attribute(init, &value, class, "__init__")?;
                let result = self.call_value(&bound, args)?;
                if !result.is_none() {
                    return Err(self.type_error(format!(
                        "__init__() should return None, not '{}'",
                        result.type_name()
                    )));
                }
            }
        }
        Ok(value)
    }

    /// Create a function value for `def` or `lambda`, evaluating defaults in
    /// `frame`.
    pub(crate) fn make_function(
        &self,
        source: FunctionSource,
        name: &str,
        frame: &Frame,
    ) -> EvalResult<Rc<FunctionObject>> {
        let params = source.params();
        let defaults = params
            .positional
            .iter()
            .map(|p| p.default.as_ref().map(|d| self.eval(d, frame)).transpose())
            .collect::<EvalResult<Vec<_>>>()?;
        let kw_defaults = params
            .kwonly
            .iter()
            .map(|p| p.default.as_ref().map(|d| self.eval(d, frame)).transpose())
            .collect::<EvalResult<Vec<_>>>()?;
        let (scope_info, is_async, is_generator) = match &source {
            FunctionSource::Def(def) => (
                ScopeInfo::for_function(&def.params, &def.body),
                def.is_async,
                def.is_generator(),
            ),
            FunctionSource::Lambda(lambda) => {
                (ScopeInfo::for_lambda(&lambda.params), false, false)
            }
        };
        Ok(Rc::new(FunctionObject {
            name: name.to_owned(),
            qualname: format!("{}{name}", frame.qualname_prefix),
            module: frame.module_name(),
            source,
            filename: Rc::clone(&frame.filename),
            is_async,
            is_generator,
            globals: frame.globals.clone(),
            attrs: Namespace::new(),
            defaults,
            kw_defaults,
            closure: frame.enclosing_scope(),
            scope_info: Rc::new(scope_info),
            defining_class: RefCell::new(Weak::new()),
        }))
    }

    /// Reject keyword arguments for builtins that take none.
    pub(crate) fn no_keywords(&self, name: &str, args: &CallArgs) -> EvalResult<()> {
        if args.keywords.is_empty() {
            Ok(())
        } else {
            Err(self.type_error(format!("{name}() takes no keyword arguments")))
        }
    }

    /// Reject leftover keyword arguments after the known ones were taken.
    pub(crate) fn no_extra_keywords(&self, name: &str, args: &CallArgs) -> EvalResult<()> {
        match args.keywords.first() {
            None => Ok(()),
            Some((key, _)) => Err(self.type_error(format!(
                "'{key}' is an invalid keyword argument for {name}()"
            ))),
        }
    }

    /// Check the positional argument count of a builtin.
    pub(crate) fn arity(
        &self,
        name: &str,
        args: &[Value],
        min: usize,
        max: usize,
    ) -> EvalResult<()> {
        let given = args.len();
        if (min..=max).contains(&given) {
            return Ok(());
        }
        let message = if min == max {
            format!("{name}() takes exactly {min} argument{} ({given} given)", plural(min))
        } else if given < min {
            format!("{name}() takes at least {min} argument{} ({given} given)", plural(min))
        } else {
            format!("{name}() takes at most {max} argument{} ({given} given)", plural(max))
        };
        Err(self.type_error(message))
    }
}

#[cfg(test)]
mod tests {
    use super::name_list;

    #[test]
    fn missing_names_read_like_prose() {
        assert_eq!(name_list(&["a"]), "'a'");
        assert_eq!(name_list(&["a", "b"]), "'a' and 'b'");
        assert_eq!(name_list(&["a", "b", "c"]), "'a', 'b', and 'c'");
    }
}
