//! User-defined functions and their scopes.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use nbi_ir::{FunctionDef, Lambda, Parameters};
use rustc_hash::FxHashMap;

use super::{ClassObject, Value};
use crate::compile::ScopeInfo;
use crate::namespace::Namespace;

/// Syntax a function value was created from.
#[derive(Clone)]
pub enum FunctionSource {
    Def(Rc<FunctionDef>),
    Lambda(Rc<Lambda>),
}

impl FunctionSource {
    pub fn params(&self) -> &Parameters {
        match self {
            FunctionSource::Def(def) => &def.params,
            FunctionSource::Lambda(lambda) => &lambda.params,
        }
    }
}

pub struct FunctionObject {
    pub name: String,
    pub qualname: String,
    pub module: String,
    pub source: FunctionSource,
    /// Display name of the code unit the function was defined in.
    pub filename: Rc<str>,
    pub is_async: bool,
    /// The body contains `yield`; calls return a generator.
    pub is_generator: bool,
    /// Module globals, read at call time.
    pub globals: Namespace,
    /// Attributes assigned on the function object.
    pub attrs: Namespace,
    /// Evaluated defaults, parallel to `params.positional`.
    pub(crate) defaults: Vec<Option<Value>>,
    /// Evaluated defaults, parallel to `params.kwonly`.
    pub(crate) kw_defaults: Vec<Option<Value>>,
    pub(crate) closure: Option<Rc<Scope>>,
    pub(crate) scope_info: Rc<ScopeInfo>,
    /// Class whose body defined this function; used by zero-argument `super()`.
    pub(crate) defining_class: RefCell<Weak<ClassObject>>,
}

impl FunctionObject {
    pub fn params(&self) -> &Parameters {
        self.source.params()
    }

    /// First statement of the body when it is a string literal.
    pub fn docstring(&self) -> Option<&str> {
        let FunctionSource::Def(def) = &self.source else {
            return None;
        };
        match &def.body.first()?.kind {
            nbi_ir::StmtKind::Expr(nbi_ir::Expr {
                kind: nbi_ir::ExprKind::Constant(nbi_ir::Constant::Str(doc)),
                ..
            }) => Some(doc),
            _ => None,
        }
    }

    pub(crate) fn defining_class(&self) -> Option<Rc<ClassObject>> {
        self.defining_class.borrow().upgrade()
    }
}

/// Local variables of one function activation (or comprehension).
///
/// Nested functions keep their defining scope alive through `parent`, so
/// later assignments in the enclosing function stay visible to them.
pub(crate) struct Scope {
    pub(crate) vars: RefCell<FxHashMap<String, Value>>,
    pub(crate) info: Rc<ScopeInfo>,
    pub(crate) parent: Option<Rc<Scope>>,
}

impl Scope {
    pub(crate) fn new(info: Rc<ScopeInfo>, parent: Option<Rc<Scope>>) -> Rc<Self> {
        Rc::new(Scope {
            vars: RefCell::new(FxHashMap::default()),
            info,
            parent,
        })
    }

    pub(crate) fn get(&self, name: &str) -> Option<Value> {
        self.vars.borrow().get(name).cloned()
    }

    pub(crate) fn set(&self, name: &str, value: Value) {
        self.vars.borrow_mut().insert(name.to_owned(), value);
    }

    pub(crate) fn remove(&self, name: &str) -> Option<Value> {
        self.vars.borrow_mut().remove(name)
    }

    /// Nearest enclosing scope (starting at `self`) that owns `name`.
    pub(crate) fn owner_of(self: &Rc<Self>, name: &str) -> Option<Rc<Scope>> {
        let mut scope = Some(Rc::clone(self));
        while let Some(current) = scope {
            if current.info.is_local(name) {
                return Some(current);
            }
            scope = current.parent.clone();
        }
        None
    }
}
