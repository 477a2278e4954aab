//! Tree-walking interpreter for notebook cell programs.
//!
//! Cells are parsed by `nbi_parse`, checked by [`compile`] into a
//! [`CodeUnit`], and run by an [`Interpreter`] against a caller-owned
//! [`Namespace`]. All modules loaded by one host share a single [`Runtime`]:
//! builtins, the exception hierarchy, the line cache used for tracebacks,
//! and the print sink.
//!
//! Import statements inside a cell are delegated to an [`ImportHook`], so the
//! interpreter has no knowledge of where modules come from.

mod compile;
mod exception;
mod import_hook;
mod interpreter;
mod line_cache;
mod module;
mod namespace;
mod print_handler;
mod runtime;
mod session;
mod traceback;
mod value;

pub use compile::{compile, CodeUnit, CompileError, CompileErrorKind};
pub use exception::{ExceptionKind, RaisedException, TraceFrame};
pub use import_hook::{ImportFailure, ImportHook, NoImports};
pub use interpreter::Interpreter;
pub use line_cache::{LineAttributionRecord, LineCache};
pub use module::ModuleObject;
pub use namespace::Namespace;
pub use print_handler::{
    buffer_sink, silent_sink, stderr_sink, stdout_sink, OutputSink, SharedOutput,
};
pub use runtime::Runtime;
pub use session::Session;
pub use traceback::render_syntax_error;
pub use value::{Builtin, ClassObject, FunctionObject, Instance, TypeTag, Value};
