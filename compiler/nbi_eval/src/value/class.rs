//! Classes, instances and method resolution order.

use std::rc::Rc;

use super::{TypeTag, Value};
use crate::namespace::Namespace;

pub struct ClassObject {
    pub name: String,
    pub qualname: String,
    /// `__module__` at class creation.
    pub module: String,
    pub bases: Vec<Rc<ClassObject>>,
    /// C3 linearization, excluding the class itself.
    ancestors: Vec<Rc<ClassObject>>,
    pub dict: Namespace,
    /// Set for the classes standing in for builtin types.
    pub builtin: Option<TypeTag>,
}

impl ClassObject {
    /// Create a class, linearizing `bases`. Returns `None` when no
    /// consistent method resolution order exists.
    pub fn new(
        name: impl Into<String>,
        qualname: impl Into<String>,
        module: impl Into<String>,
        bases: Vec<Rc<ClassObject>>,
        dict: Namespace,
    ) -> Option<Rc<Self>> {
        let ancestors = c3_linearize(&bases)?;
        Some(Rc::new(ClassObject {
            name: name.into(),
            qualname: qualname.into(),
            module: module.into(),
            bases,
            ancestors,
            dict,
            builtin: None,
        }))
    }

    pub(crate) fn builtin_type(tag: TypeTag, base: Option<&Rc<ClassObject>>) -> Rc<Self> {
        let bases: Vec<_> = base.into_iter().cloned().collect();
        let mut ancestors = Vec::new();
        if let Some(base) = base {
            ancestors.push(Rc::clone(base));
            ancestors.extend(base.ancestors.iter().cloned());
        }
        Rc::new(ClassObject {
            name: tag.name().to_owned(),
            qualname: tag.name().to_owned(),
            module: "builtins".to_owned(),
            bases,
            ancestors,
            dict: Namespace::new(),
            builtin: Some(tag),
        })
    }

    /// A builtin class with a single base, such as an exception type.
    pub(crate) fn builtin_subclass(name: &str, base: &Rc<ClassObject>) -> Rc<Self> {
        Rc::new(ClassObject {
            name: name.to_owned(),
            qualname: name.to_owned(),
            module: "builtins".to_owned(),
            bases: vec![Rc::clone(base)],
            ancestors: base.mro(),
            dict: Namespace::new(),
            builtin: None,
        })
    }

    /// The class followed by its ancestors.
    pub fn mro(self: &Rc<Self>) -> Vec<Rc<ClassObject>> {
        let mut mro = Vec::with_capacity(self.ancestors.len() + 1);
        mro.push(Rc::clone(self));
        mro.extend(self.ancestors.iter().cloned());
        mro
    }

    pub fn ancestors(&self) -> &[Rc<ClassObject>] {
        &self.ancestors
    }

    /// Find `name` in the class dict or the first ancestor defining it.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.dict
            .get(name)
            .or_else(|| self.ancestors.iter().find_map(|class| class.dict.get(name)))
    }

    pub fn is_subclass_of(&self, other: &Rc<ClassObject>) -> bool {
        std::ptr::eq(self, Rc::as_ptr(other))
            || self.ancestors.iter().any(|class| Rc::ptr_eq(class, other))
    }

    /// First builtin type in the MRO other than `object`.
    pub fn builtin_base(&self) -> Option<TypeTag> {
        std::iter::once(self)
            .chain(self.ancestors.iter().map(AsRef::as_ref))
            .find_map(|class| class.builtin.filter(|tag| *tag != TypeTag::Object))
    }
}

/// An instance of a user-defined class.
pub struct Instance {
    pub class: Rc<ClassObject>,
    pub dict: Namespace,
}

impl Instance {
    pub fn new(class: Rc<ClassObject>) -> Self {
        Instance {
            class,
            dict: Namespace::new(),
        }
    }
}

/// C3 merge of the bases' linearizations followed by the bases themselves.
pub(crate) fn c3_linearize(bases: &[Rc<ClassObject>]) -> Option<Vec<Rc<ClassObject>>> {
    let mut sequences: Vec<Vec<Rc<ClassObject>>> = bases.iter().map(ClassObject::mro).collect();
    sequences.push(bases.to_vec());

    let mut result = Vec::new();
    loop {
        sequences.retain(|seq| !seq.is_empty());
        if sequences.is_empty() {
            return Some(result);
        }
        let head = sequences.iter().map(|seq| &seq[0]).find(|candidate| {
            !sequences
                .iter()
                .any(|seq| seq[1..].iter().any(|c| Rc::ptr_eq(c, candidate)))
        })?;
        let head = Rc::clone(head);
        for seq in &mut sequences {
            if Rc::ptr_eq(&seq[0], &head) {
                seq.remove(0);
            }
        }
        result.push(head);
    }
}
