//! Constructors for builtin exceptions raised by the interpreter itself.

use std::rc::Rc;

use super::Interpreter;
use crate::exception::{ExceptionKind, RaisedException};
use crate::value::{Instance, Value};

impl Interpreter<'_> {
    /// Instance of a builtin exception class with the given constructor
    /// arguments.
    pub(crate) fn exception_with_args(
        &self,
        kind: ExceptionKind,
        args: Vec<Value>,
    ) -> RaisedException {
        let instance = Instance::new(Rc::clone(self.runtime.exception_class(kind)));
        instance.dict.set("args", Value::tuple(args));
        RaisedException::new(Value::Instance(Rc::new(instance)))
    }

    pub(crate) fn exception(
        &self,
        kind: ExceptionKind,
        message: impl Into<String>,
    ) -> RaisedException {
        self.exception_with_args(kind, vec![Value::from(message.into())])
    }

    pub(crate) fn type_error(&self, message: impl Into<String>) -> RaisedException {
        self.exception(ExceptionKind::TypeError, message)
    }

    pub(crate) fn value_error(&self, message: impl Into<String>) -> RaisedException {
        self.exception(ExceptionKind::ValueError, message)
    }

    pub(crate) fn index_error(&self, message: impl Into<String>) -> RaisedException {
        self.exception(ExceptionKind::IndexError, message)
    }

    pub(crate) fn key_error(&self, key: Value) -> RaisedException {
        self.exception_with_args(ExceptionKind::KeyError, vec![key])
    }

    pub(crate) fn attribute_error(&self, message: impl Into<String>) -> RaisedException {
        self.exception(ExceptionKind::AttributeError, message)
    }

    pub(crate) fn name_error(&self, name: &str) -> RaisedException {
        self.exception(
            ExceptionKind::NameError,
            format!("name '{name}' is not defined"),
        )
    }

    pub(crate) fn unbound_local(&self, name: &str) -> RaisedException {
        self.exception(
            ExceptionKind::UnboundLocalError,
            format!(
                "cannot access local variable '{name}' where it is not associated with a value"
            ),
        )
    }

    pub(crate) fn zero_division(&self, message: &str) -> RaisedException {
        self.exception(ExceptionKind::ZeroDivisionError, message)
    }

    pub(crate) fn overflow(&self) -> RaisedException {
        self.exception(ExceptionKind::OverflowError, "integer overflow")
    }

    pub(crate) fn runtime_error(&self, message: impl Into<String>) -> RaisedException {
        self.exception(ExceptionKind::RuntimeError, message)
    }

    /// `'int' object is not callable` and friends.
    pub(crate) fn not_callable(&self, value: &Value) -> RaisedException {
        self.type_error(format!("'{}' object is not callable", value.type_name()))
    }
}
