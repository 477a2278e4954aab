//! Raised exceptions and the builtin exception hierarchy.

use std::fmt;
use std::rc::Rc;

use crate::value::Value;

/// Builtin exception classes, each with its parent.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExceptionKind {
    BaseException,
    Exception,
    ArithmeticError,
    ZeroDivisionError,
    OverflowError,
    LookupError,
    KeyError,
    IndexError,
    ValueError,
    TypeError,
    NameError,
    UnboundLocalError,
    AttributeError,
    ImportError,
    ModuleNotFoundError,
    RuntimeError,
    RecursionError,
    NotImplementedError,
    AssertionError,
    StopIteration,
    StopAsyncIteration,
    MemoryError,
}

impl ExceptionKind {
    /// Parents before children.
    pub const ALL: [ExceptionKind; 22] = [
        ExceptionKind::BaseException,
        ExceptionKind::Exception,
        ExceptionKind::ArithmeticError,
        ExceptionKind::ZeroDivisionError,
        ExceptionKind::OverflowError,
        ExceptionKind::LookupError,
        ExceptionKind::KeyError,
        ExceptionKind::IndexError,
        ExceptionKind::ValueError,
        ExceptionKind::TypeError,
        ExceptionKind::NameError,
        ExceptionKind::UnboundLocalError,
        ExceptionKind::AttributeError,
        ExceptionKind::ImportError,
        ExceptionKind::ModuleNotFoundError,
        ExceptionKind::RuntimeError,
        ExceptionKind::RecursionError,
        ExceptionKind::NotImplementedError,
        ExceptionKind::AssertionError,
        ExceptionKind::StopIteration,
        ExceptionKind::StopAsyncIteration,
        ExceptionKind::MemoryError,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::BaseException => "BaseException",
            Self::Exception => "Exception",
            Self::ArithmeticError => "ArithmeticError",
            Self::ZeroDivisionError => "ZeroDivisionError",
            Self::OverflowError => "OverflowError",
            Self::LookupError => "LookupError",
            Self::KeyError => "KeyError",
            Self::IndexError => "IndexError",
            Self::ValueError => "ValueError",
            Self::TypeError => "TypeError",
            Self::NameError => "NameError",
            Self::UnboundLocalError => "UnboundLocalError",
            Self::AttributeError => "AttributeError",
            Self::ImportError => "ImportError",
            Self::ModuleNotFoundError => "ModuleNotFoundError",
            Self::RuntimeError => "RuntimeError",
            Self::RecursionError => "RecursionError",
            Self::NotImplementedError => "NotImplementedError",
            Self::AssertionError => "AssertionError",
            Self::StopIteration => "StopIteration",
            Self::StopAsyncIteration => "StopAsyncIteration",
            Self::MemoryError => "MemoryError",
        }
    }

    pub const fn parent(self) -> Option<ExceptionKind> {
        Some(match self {
            Self::BaseException => return None,
            Self::Exception => Self::BaseException,
            Self::ZeroDivisionError | Self::OverflowError => Self::ArithmeticError,
            Self::KeyError | Self::IndexError => Self::LookupError,
            Self::UnboundLocalError => Self::NameError,
            Self::ModuleNotFoundError => Self::ImportError,
            Self::RecursionError | Self::NotImplementedError => Self::RuntimeError,
            Self::ArithmeticError
            | Self::LookupError
            | Self::ValueError
            | Self::TypeError
            | Self::NameError
            | Self::AttributeError
            | Self::ImportError
            | Self::RuntimeError
            | Self::AssertionError
            | Self::StopIteration
            | Self::StopAsyncIteration
            | Self::MemoryError => Self::Exception,
        })
    }
}

/// One line of a traceback: where a frame was when the exception passed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceFrame {
    pub filename: Rc<str>,
    pub line: u32,
    /// `<module>`, a function name or a class name.
    pub name: Rc<str>,
}

/// An exception propagating out of running code.
///
/// `traceback` is innermost-first: frames are appended as the exception
/// leaves them.
#[derive(Clone)]
pub struct RaisedException {
    /// Instance of a `BaseException` subclass.
    pub exception: Value,
    pub traceback: Vec<TraceFrame>,
    /// Set by `raise ... from cause`.
    pub cause: Option<Box<RaisedException>>,
}

impl RaisedException {
    pub fn new(exception: Value) -> Self {
        RaisedException {
            exception,
            traceback: Vec::new(),
            cause: None,
        }
    }

    pub(crate) fn push_frame(&mut self, frame: TraceFrame) {
        self.traceback.push(frame);
    }

    /// Class name of the exception instance.
    pub fn type_name(&self) -> &str {
        self.exception.type_name()
    }

    /// Whether the exception is an instance of the named class or one of
    /// its subclasses.
    pub fn is_instance_of(&self, class_name: &str) -> bool {
        match &self.exception {
            Value::Instance(instance) => instance
                .class
                .mro()
                .iter()
                .any(|class| class.name == class_name),
            _ => false,
        }
    }

    /// First constructor argument when it is a string.
    pub fn message(&self) -> Option<String> {
        let Value::Instance(instance) = &self.exception else {
            return None;
        };
        match instance.dict.get("args")? {
            Value::Tuple(args) => args.first()?.as_str().map(str::to_owned),
            _ => None,
        }
    }
}

impl fmt::Debug for RaisedException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RaisedException")
            .field("type", &self.type_name())
            .field("message", &self.message())
            .field("frames", &self.traceback.len())
            .finish()
    }
}
