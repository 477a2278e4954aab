//! Tree-walking interpreter.
//!
//! # Architecture
//!
//! - `stmt`: statement execution, producing [`Flow`]
//! - `expr`: expression evaluation
//! - `call`: argument binding, function frames, coroutines
//! - `attr`: attribute access, descriptors, class creation, `super()`
//! - `operators`: arithmetic, comparison, containment
//! - `convert`: truthiness, `str`/`repr`, equality, iteration, indexing
//! - `builtins`, `methods`: natively implemented functions and methods
//! - `format`: f-strings, `str.format` and `%` formatting
//! - `import`: `import` statements via the [`ImportHook`]
//! - `errors`: constructors for raised builtin exceptions
//!
//! Runtime exceptions travel as `Err(RaisedException)`; `return`, `break`
//! and `continue` travel as `Ok(Flow::..)`.

mod attr;
mod builtins;
mod call;
mod convert;
mod errors;
mod expr;
mod format;
mod import;
mod methods;
mod operators;
mod stmt;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::compile::CodeUnit;
use crate::exception::{RaisedException, TraceFrame};
use crate::import_hook::ImportHook;
use crate::namespace::Namespace;
use crate::runtime::Runtime;
use crate::traceback::render_traceback;
use crate::value::{ClassObject, Scope, Value};

pub(crate) use call::{CallArgs, PreparedCall};

/// How a statement finished.
pub(crate) enum Flow {
    Normal,
    Return(Value),
    Break,
    Continue,
}

pub(crate) type EvalResult<T = Value> = Result<T, RaisedException>;
pub(crate) type ExecResult = Result<Flow, RaisedException>;

/// Where a frame stores the names it binds.
pub(crate) enum Locals {
    /// Locals are the globals.
    Module,
    Function(Rc<Scope>),
    /// A class body. Free names skip the class namespace's own scope and
    /// resolve in the enclosing function, then globals.
    Class {
        namespace: Namespace,
        enclosing: Option<Rc<Scope>>,
    },
}

/// One activation: module code, a class body or a function call.
pub(crate) struct Frame {
    pub(crate) globals: Namespace,
    pub(crate) locals: Locals,
    pub(crate) filename: Rc<str>,
    pub(crate) name: Rc<str>,
    pub(crate) line: Cell<u32>,
    /// Defining class and first argument, for zero-argument `super()`.
    pub(crate) super_context: Option<(Rc<ClassObject>, Value)>,
    /// Prepended to the names of functions and classes defined here.
    pub(crate) qualname_prefix: String,
    /// Values produced by `yield`, when the frame runs a generator body.
    pub(crate) yields: Option<RefCell<Vec<Value>>>,
}

impl Frame {
    fn module(globals: Namespace, filename: Rc<str>) -> Self {
        Frame {
            globals,
            locals: Locals::Module,
            filename,
            name: Rc::from("<module>"),
            line: Cell::new(1),
            super_context: None,
            qualname_prefix: String::new(),
            yields: None,
        }
    }

    pub(crate) fn trace_frame(&self) -> TraceFrame {
        TraceFrame {
            filename: Rc::clone(&self.filename),
            line: self.line.get(),
            name: Rc::clone(&self.name),
        }
    }

    /// Innermost function scope visible to code nested in this frame.
    pub(crate) fn enclosing_scope(&self) -> Option<Rc<Scope>> {
        match &self.locals {
            Locals::Module => None,
            Locals::Function(scope) => Some(Rc::clone(scope)),
            Locals::Class { enclosing, .. } => enclosing.clone(),
        }
    }

    /// `__name__` of the frame's module.
    pub(crate) fn module_name(&self) -> String {
        self.globals
            .get("__name__")
            .and_then(|v| v.as_str().map(str::to_owned))
            .unwrap_or_else(|| "__main__".to_owned())
    }
}

/// Executes code units against namespaces of one [`Runtime`].
///
/// Cheap to create; hosts make one per cell.
pub struct Interpreter<'a> {
    runtime: &'a Runtime,
    importer: &'a dyn ImportHook,
    depth: Cell<usize>,
    /// Exceptions caught by enclosing `except` blocks, innermost last.
    handling: RefCell<Vec<RaisedException>>,
    /// Containers currently being rendered by `repr`.
    repr_guard: RefCell<Vec<usize>>,
}

impl<'a> Interpreter<'a> {
    pub fn new(runtime: &'a Runtime, importer: &'a dyn ImportHook) -> Self {
        Interpreter {
            runtime,
            importer,
            depth: Cell::new(0),
            handling: RefCell::new(Vec::new()),
            repr_guard: RefCell::new(Vec::new()),
        }
    }

    pub fn runtime(&self) -> &'a Runtime {
        self.runtime
    }

    /// Run `code` with `namespace` as both globals and locals.
    ///
    /// Statements that ran before a failure keep their bindings.
    #[tracing::instrument(level = "debug", skip_all, fields(filename = code.filename()))]
    pub fn exec_code(&self, code: &CodeUnit, namespace: &Namespace) -> Result<(), RaisedException> {
        let frame = Frame::module(namespace.clone(), code.filename_rc());
        match self.exec_block(&code.program().body, &frame) {
            Ok(_) => Ok(()),
            Err(mut raised) => {
                raised.push_frame(frame.trace_frame());
                tracing::debug!(exception = raised.type_name(), "code unit raised");
                Err(raised)
            }
        }
    }

    /// Call `callee` with positional arguments.
    pub fn call(&self, callee: &Value, args: Vec<Value>) -> Result<Value, RaisedException> {
        self.call_value(callee, CallArgs::positional(args))
    }

    /// Call `callee` with positional and keyword arguments.
    pub fn call_with_keywords(
        &self,
        callee: &Value,
        args: Vec<Value>,
        keywords: Vec<(String, Value)>,
    ) -> Result<Value, RaisedException> {
        self.call_value(callee, CallArgs { args, keywords })
    }

    /// `str(value)`, running `__str__` if the class defines one.
    pub fn str_of(&self, value: &Value) -> Result<String, RaisedException> {
        self.to_str(value)
    }

    /// `repr(value)`, running `__repr__` if the class defines one.
    pub fn repr_of(&self, value: &Value) -> Result<String, RaisedException> {
        self.to_repr(value)
    }

    /// Last line of a traceback: `"KeyError: 'x'"`.
    pub fn exception_summary(&self, exception: &Value) -> String {
        let name = exception.type_name().to_owned();
        match self.to_str(exception) {
            Ok(message) if message.is_empty() => name,
            Ok(message) => format!("{name}: {message}"),
            Err(_) => format!("{name}: <exception str() failed>"),
        }
    }

    /// Full traceback text, source lines taken from the runtime line cache.
    pub fn format_exception(&self, raised: &RaisedException) -> String {
        let summary = self.exception_summary(&raised.exception);
        let cause = raised
            .cause
            .as_ref()
            .map(|cause| self.exception_summary(&cause.exception));
        render_traceback(raised, self.runtime.line_cache(), &summary, cause.as_deref())
    }
}

#[cfg(test)]
mod tests;
