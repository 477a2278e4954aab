//! State shared by every module of one host: builtins, builtin classes, the
//! line cache and the print sink.

mod format;

use std::rc::Rc;

use crate::exception::ExceptionKind;
use crate::line_cache::LineCache;
use crate::namespace::Namespace;
use crate::print_handler::SharedOutput;
use crate::session::Session;
use crate::value::{Builtin, ClassObject, TypeTag, Value};

pub(crate) use format::{
    bytes_repr, complex_repr, float_repr, format_spec, str_repr, FormatArg,
};

/// Calls nested deeper than this raise `RecursionError`.
const DEFAULT_RECURSION_LIMIT: usize = 1000;

pub struct Runtime {
    builtins: Namespace,
    /// Indexed by `TypeTag as usize`.
    types: [Rc<ClassObject>; TypeTag::COUNT],
    /// Indexed by `ExceptionKind as usize`.
    exceptions: Vec<Rc<ClassObject>>,
    line_cache: LineCache,
    output: SharedOutput,
    session: Rc<Session>,
    recursion_limit: usize,
}

impl Runtime {
    pub fn new(output: SharedOutput) -> Self {
        let object = ClassObject::builtin_type(TypeTag::Object, None);
        object
            .dict
            .set("__init__", Value::Builtin(Builtin::ObjectInit));
        let int = ClassObject::builtin_type(TypeTag::Int, Some(&object));
        let types = TypeTag::ALL.map(|tag| match tag {
            TypeTag::Object => Rc::clone(&object),
            TypeTag::Int => Rc::clone(&int),
            TypeTag::Bool => ClassObject::builtin_type(tag, Some(&int)),
            other => ClassObject::builtin_type(other, Some(&object)),
        });

        let mut exceptions: Vec<Rc<ClassObject>> = Vec::with_capacity(ExceptionKind::ALL.len());
        for kind in ExceptionKind::ALL {
            let base = kind
                .parent()
                .map_or(&object, |parent| &exceptions[parent as usize]);
            let class = ClassObject::builtin_subclass(kind.name(), base);
            exceptions.push(class);
        }
        if let Some(base) = exceptions.first() {
            base.dict
                .set("__init__", Value::Builtin(Builtin::ExceptionInit));
        }

        let builtins = Namespace::new();
        for (name, builtin) in crate::value::GLOBALS {
            builtins.set(*name, Value::Builtin(*builtin));
        }
        for tag in [
            TypeTag::Object,
            TypeTag::Type,
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
        ] {
            builtins.set(tag.name(), Value::Class(Rc::clone(&types[tag as usize])));
        }
        for class in &exceptions {
            builtins.set(class.name.clone(), Value::Class(Rc::clone(class)));
        }
        builtins.set("Ellipsis", Value::Ellipsis);
        builtins.set("__name__", Value::from("builtins"));

        Runtime {
            builtins,
            types,
            exceptions,
            line_cache: LineCache::new(),
            output,
            session: Rc::new(Session::new()),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    pub fn builtins(&self) -> &Namespace {
        &self.builtins
    }

    /// Class standing in for builtin type `tag`.
    pub fn type_class(&self, tag: TypeTag) -> &Rc<ClassObject> {
        &self.types[tag as usize]
    }

    pub fn exception_class(&self, kind: ExceptionKind) -> &Rc<ClassObject> {
        &self.exceptions[kind as usize]
    }

    /// Class of any value.
    pub fn class_of(&self, value: &Value) -> Rc<ClassObject> {
        match value {
            Value::Instance(instance) => Rc::clone(&instance.class),
            other => Rc::clone(self.type_class(other.type_tag().unwrap_or(TypeTag::Object))),
        }
    }

    pub fn line_cache(&self) -> &LineCache {
        &self.line_cache
    }

    pub fn output(&self) -> &SharedOutput {
        &self.output
    }

    pub fn session(&self) -> &Rc<Session> {
        &self.session
    }

    pub fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }

    pub fn set_recursion_limit(&mut self, limit: usize) {
        self.recursion_limit = limit;
    }
}

#[cfg(test)]
mod tests;
