//! Runtime values.
//!
//! [`Value`] is cheap to clone: scalars are inline and everything else is
//! behind an `Rc`. Mutable containers (`list`, `dict`, `set`) add a
//! `RefCell`, so aliasing behaves the way cell code expects.

mod builtin;
mod class;
mod dict;
mod function;
mod set;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

pub use builtin::Builtin;
pub use class::{ClassObject, Instance};
pub use dict::DictValue;
pub use function::{FunctionObject, FunctionSource};
pub use set::SetValue;

pub(crate) use builtin::GLOBALS;
pub(crate) use function::Scope;

use crate::module::ModuleObject;
use crate::session::Session;

#[derive(Clone)]
pub enum Value {
    None,
    Ellipsis,
    Bool(bool),
    Int(i64),
    Float(f64),
    Complex(Complex),
    Str(Rc<str>),
    Bytes(Rc<[u8]>),
    List(Rc<RefCell<Vec<Value>>>),
    Tuple(Rc<[Value]>),
    Dict(Rc<RefCell<DictValue>>),
    Set(Rc<RefCell<SetValue>>),
    Range(Rc<RangeValue>),
    Function(Rc<FunctionObject>),
    Builtin(Builtin),
    BoundMethod(Rc<BoundMethod>),
    Class(Rc<ClassObject>),
    Instance(Rc<Instance>),
    StaticMethod(Rc<Value>),
    ClassMethod(Rc<Value>),
    Property(Rc<Property>),
    Coroutine(Rc<Coroutine>),
    Generator(Rc<Generator>),
    Module(Rc<ModuleObject>),
    Session(Rc<Session>),
    Super(Rc<SuperObject>),
}

/// Builtin type of a non-instance value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Object,
    Type,
    NoneType,
    Ellipsis,
    Bool,
    Int,
    Float,
    Complex,
    Str,
    Bytes,
    List,
    Tuple,
    Dict,
    Set,
    Range,
    Function,
    BuiltinFunction,
    Method,
    StaticMethod,
    ClassMethod,
    Property,
    Coroutine,
    Generator,
    AsyncGenerator,
    Module,
    Session,
    Super,
}

impl TypeTag {
    pub const COUNT: usize = 27;

    pub const ALL: [TypeTag; Self::COUNT] = [
        TypeTag::Object,
        TypeTag::Type,
        TypeTag::NoneType,
        TypeTag::Ellipsis,
        TypeTag::Bool,
        TypeTag::Int,
        TypeTag::Float,
        TypeTag::Complex,
        TypeTag::Str,
        TypeTag::Bytes,
        TypeTag::List,
        TypeTag::Tuple,
        TypeTag::Dict,
        TypeTag::Set,
        TypeTag::Range,
        TypeTag::Function,
        TypeTag::BuiltinFunction,
        TypeTag::Method,
        TypeTag::StaticMethod,
        TypeTag::ClassMethod,
        TypeTag::Property,
        TypeTag::Coroutine,
        TypeTag::Generator,
        TypeTag::AsyncGenerator,
        TypeTag::Module,
        TypeTag::Session,
        TypeTag::Super,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            TypeTag::Object => "object",
            TypeTag::Type => "type",
            TypeTag::NoneType => "NoneType",
            TypeTag::Ellipsis => "ellipsis",
            TypeTag::Bool => "bool",
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::Complex => "complex",
            TypeTag::Str => "str",
            TypeTag::Bytes => "bytes",
            TypeTag::List => "list",
            TypeTag::Tuple => "tuple",
            TypeTag::Dict => "dict",
            TypeTag::Set => "set",
            TypeTag::Range => "range",
            TypeTag::Function => "function",
            TypeTag::BuiltinFunction => "builtin_function_or_method",
            TypeTag::Method => "method",
            TypeTag::StaticMethod => "staticmethod",
            TypeTag::ClassMethod => "classmethod",
            TypeTag::Property => "property",
            TypeTag::Coroutine => "coroutine",
            TypeTag::Generator => "generator",
            TypeTag::AsyncGenerator => "async_generator",
            TypeTag::Module => "module",
            TypeTag::Session => "Session",
            TypeTag::Super => "super",
        }
    }

    /// Whether values of this type are instances of `other`.
    pub fn is_subtype_of(self, other: TypeTag) -> bool {
        self == other
            || other == TypeTag::Object
            || (self == TypeTag::Bool && other == TypeTag::Int)
    }
}

/// `range(start, stop, step)`; `step` is never zero.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RangeValue {
    pub start: i64,
    pub stop: i64,
    pub step: i64,
}

impl RangeValue {
    pub fn len(&self) -> usize {
        let span = if self.step > 0 {
            i128::from(self.stop) - i128::from(self.start)
        } else {
            i128::from(self.start) - i128::from(self.stop)
        };
        if span <= 0 {
            return 0;
        }
        let step = i128::from(self.step).abs();
        usize::try_from((span + step - 1) / step).unwrap_or(usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<i64> {
        if index >= self.len() {
            return None;
        }
        let offset = i128::try_from(index).ok()? * i128::from(self.step);
        i64::try_from(i128::from(self.start) + offset).ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        (0..self.len()).map_while(|i| self.get(i))
    }
}

/// A function bound to the object it was looked up on.
pub struct BoundMethod {
    pub receiver: Value,
    pub function: Value,
}

pub struct Property {
    pub fget: Option<Value>,
    pub fset: Option<Value>,
}

/// Result of calling an `async def` function. The body runs when awaited.
pub struct Coroutine {
    pub name: Rc<str>,
    pub(crate) state: RefCell<Option<crate::interpreter::PreparedCall>>,
}

/// Result of calling a function whose body contains `yield`.
///
/// The body runs to completion the first time the generator is consumed;
/// its yielded values are then handed out in order.
pub struct Generator {
    pub name: Rc<str>,
    pub is_async: bool,
    pub(crate) state: RefCell<GeneratorState>,
}

pub(crate) enum GeneratorState {
    Pending(crate::interpreter::PreparedCall),
    Running,
    Ready(VecDeque<Value>),
}

impl Generator {
    pub(crate) fn new(
        name: Rc<str>,
        is_async: bool,
        call: crate::interpreter::PreparedCall,
    ) -> Self {
        Generator {
            name,
            is_async,
            state: RefCell::new(GeneratorState::Pending(call)),
        }
    }
}

/// `complex` value with `f64` parts.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const fn new(re: f64, im: f64) -> Self {
        Complex { re, im }
    }

    pub fn abs(self) -> f64 {
        self.re.hypot(self.im)
    }
}

/// `super()` proxy: looks up attributes after `class` in the receiver's MRO.
pub struct SuperObject {
    pub class: Rc<ClassObject>,
    pub receiver: Value,
}

/// Dictionary key derived from a hashable value.
///
/// Numerically equal ints, floats and bools share a key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HashKey {
    None,
    Ellipsis,
    Int(i64),
    Float(u64),
    Complex(u64, u64),
    Str(Rc<str>),
    Bytes(Rc<[u8]>),
    Tuple(Vec<HashKey>),
    Builtin(Builtin),
    Identity(usize),
}

fn addr<T: ?Sized>(rc: &Rc<T>) -> usize {
    Rc::as_ptr(rc).cast::<()>() as usize
}

impl Value {
    pub fn str(text: impl Into<Rc<str>>) -> Value {
        Value::Str(text.into())
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn tuple(items: Vec<Value>) -> Value {
        Value::Tuple(items.into())
    }

    pub fn dict(dict: DictValue) -> Value {
        Value::Dict(Rc::new(RefCell::new(dict)))
    }

    pub fn set(set: SetValue) -> Value {
        Value::Set(Rc::new(RefCell::new(set)))
    }

    pub fn bytes(bytes: impl Into<Rc<[u8]>>) -> Value {
        Value::Bytes(bytes.into())
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Builtin type, or `None` for class instances.
    pub fn type_tag(&self) -> Option<TypeTag> {
        Some(match self {
            Value::None => TypeTag::NoneType,
            Value::Ellipsis => TypeTag::Ellipsis,
            Value::Bool(_) => TypeTag::Bool,
            Value::Int(_) => TypeTag::Int,
            Value::Float(_) => TypeTag::Float,
            Value::Complex(_) => TypeTag::Complex,
            Value::Str(_) => TypeTag::Str,
            Value::Bytes(_) => TypeTag::Bytes,
            Value::List(_) => TypeTag::List,
            Value::Tuple(_) => TypeTag::Tuple,
            Value::Dict(_) => TypeTag::Dict,
            Value::Set(_) => TypeTag::Set,
            Value::Range(_) => TypeTag::Range,
            Value::Function(_) => TypeTag::Function,
            Value::Builtin(_) => TypeTag::BuiltinFunction,
            Value::BoundMethod(_) => TypeTag::Method,
            Value::Class(_) => TypeTag::Type,
            Value::StaticMethod(_) => TypeTag::StaticMethod,
            Value::ClassMethod(_) => TypeTag::ClassMethod,
            Value::Property(_) => TypeTag::Property,
            Value::Coroutine(_) => TypeTag::Coroutine,
            Value::Generator(generator) if generator.is_async => TypeTag::AsyncGenerator,
            Value::Generator(_) => TypeTag::Generator,
            Value::Module(_) => TypeTag::Module,
            Value::Session(_) => TypeTag::Session,
            Value::Super(_) => TypeTag::Super,
            Value::Instance(_) => return None,
        })
    }

    /// Name of the value's type, as shown in error messages.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Instance(instance) => &instance.class.name,
            other => other.type_tag().map_or("object", TypeTag::name),
        }
    }

    /// Truth value for everything except instances, which may define
    /// `__bool__` or `__len__`.
    pub fn builtin_truth(&self) -> Option<bool> {
        Some(match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Complex(c) => c.re != 0.0 || c.im != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Bytes(b) => !b.is_empty(),
            Value::List(items) => !items.borrow().is_empty(),
            Value::Tuple(items) => !items.is_empty(),
            Value::Dict(dict) => !dict.borrow().is_empty(),
            Value::Set(set) => !set.borrow().is_empty(),
            Value::Range(range) => !range.is_empty(),
            Value::Instance(_) => return None,
            _ => true,
        })
    }

    /// Identity comparison (`is`).
    pub fn is(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) | (Value::Ellipsis, Value::Ellipsis) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Complex(a), Value::Complex(b)) => {
                a.re.to_bits() == b.re.to_bits() && a.im.to_bits() == b.im.to_bits()
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            _ => match (self.identity(), other.identity()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    /// Address of the shared allocation, for reference-typed values.
    pub(crate) fn identity(&self) -> Option<usize> {
        Some(match self {
            Value::List(rc) => addr(rc),
            Value::Tuple(rc) => addr(rc),
            Value::Dict(rc) => addr(rc),
            Value::Set(rc) => addr(rc),
            Value::Bytes(rc) => addr(rc),
            Value::Range(rc) => addr(rc),
            Value::Function(rc) => addr(rc),
            Value::BoundMethod(rc) => addr(rc),
            Value::Class(rc) => addr(rc),
            Value::Instance(rc) => addr(rc),
            Value::StaticMethod(rc) | Value::ClassMethod(rc) => addr(rc),
            Value::Property(rc) => addr(rc),
            Value::Coroutine(rc) => addr(rc),
            Value::Generator(rc) => addr(rc),
            Value::Module(rc) => addr(rc),
            Value::Session(rc) => addr(rc),
            Value::Super(rc) => addr(rc),
            Value::Str(rc) => addr(rc),
            Value::None
            | Value::Ellipsis
            | Value::Bool(_)
            | Value::Int(_)
            | Value::Float(_)
            | Value::Complex(_)
            | Value::Builtin(_) => return None,
        })
    }

    /// Key for dict storage, or `None` if the value is unhashable.
    pub fn hash_key(&self) -> Option<HashKey> {
        Some(match self {
            Value::None => HashKey::None,
            Value::Ellipsis => HashKey::Ellipsis,
            Value::Bool(b) => HashKey::Int(i64::from(*b)),
            Value::Int(i) => HashKey::Int(*i),
            Value::Float(f) => float_key(*f),
            Value::Complex(c) if c.im == 0.0 => float_key(c.re),
            Value::Complex(c) => HashKey::Complex(c.re.to_bits(), c.im.to_bits()),
            Value::Str(s) => HashKey::Str(Rc::clone(s)),
            Value::Bytes(b) => HashKey::Bytes(Rc::clone(b)),
            Value::Tuple(items) => HashKey::Tuple(
                items
                    .iter()
                    .map(Value::hash_key)
                    .collect::<Option<Vec<_>>>()?,
            ),
            Value::Builtin(b) => HashKey::Builtin(*b),
            Value::List(_) | Value::Dict(_) | Value::Set(_) => return None,
            other => HashKey::Identity(other.identity()?),
        })
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    reason = "integral floats inside the i64 range share a key with the int"
)]
fn float_key(f: f64) -> HashKey {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        HashKey::Int(f as i64)
    } else {
        HashKey::Float(f.to_bits())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s.into())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::Ellipsis => f.write_str("Ellipsis"),
            Value::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Complex(c) => write!(f, "({:?}{:+?}j)", c.re, c.im),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Bytes(b) => write!(f, "b{:?}", String::from_utf8_lossy(b)),
            Value::List(items) => write!(f, "<list len={}>", items.borrow().len()),
            Value::Tuple(items) => write!(f, "<tuple len={}>", items.len()),
            Value::Dict(dict) => write!(f, "<dict len={}>", dict.borrow().len()),
            Value::Set(set) => write!(f, "<set len={}>", set.borrow().len()),
            Value::Range(r) => write!(f, "range({}, {}, {})", r.start, r.stop, r.step),
            Value::Function(func) => write!(f, "<function {}>", func.qualname),
            Value::Builtin(b) => write!(f, "<built-in {}>", b.name()),
            Value::Class(class) => write!(f, "<class {}>", class.name),
            Value::Instance(inst) => write!(f, "<{} instance>", inst.class.name),
            Value::Module(module) => write!(f, "<module {}>", module.name()),
            other => write!(f, "<{}>", other.type_name()),
        }
    }
}

#[cfg(test)]
mod tests;
