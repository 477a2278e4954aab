//! Attribute access, descriptors, class creation and `super()`.

use std::cell::Cell;
use std::rc::Rc;

use nbi_ir::{ClassDef, Constant, ExprKind, StmtKind};

use super::{EvalResult, Frame, Interpreter, Locals};
use crate::exception::RaisedException;
use crate::namespace::Namespace;
use crate::value::{
    BoundMethod, Builtin, ClassObject, DictValue, HashKey, Property, SuperObject, TypeTag, Value,
};

fn bound(receiver: Value, function: Value) -> Value {
    Value::BoundMethod(Rc::new(BoundMethod { receiver, function }))
}

/// Snapshot of a namespace as a `dict` keyed by name.
pub(crate) fn namespace_dict(namespace: &Namespace) -> Value {
    let mut dict = DictValue::new();
    for (name, value) in namespace.entries() {
        dict.insert(HashKey::Str(name.as_str().into()), Value::from(name), value);
    }
    Value::dict(dict)
}

/// Bind an attribute looked up on the class object itself.
fn bind_to_class(attr: Value, class: &Rc<ClassObject>) -> Value {
    match attr {
        Value::ClassMethod(function) => bound(Value::Class(Rc::clone(class)), (*function).clone()),
        Value::StaticMethod(function) => (*function).clone(),
        other => other,
    }
}

/// Record `class` as the defining class of every function in its body.
fn attach_defining_class(value: &Value, class: &Rc<ClassObject>) {
    match value {
        Value::Function(function) => *function.defining_class.borrow_mut() = Rc::downgrade(class),
        Value::StaticMethod(inner) | Value::ClassMethod(inner) => {
            attach_defining_class(inner, class)
        }
        Value::Property(property) => {
            for accessor in [&property.fget, &property.fset].into_iter().flatten() {
                attach_defining_class(accessor, class);
            }
        }
        _ => {}
    }
}

impl Interpreter<'_> {
    pub(crate) fn get_attr(&self, object: &Value, name: &str) -> EvalResult {
        match self.lookup_attr(object, name)? {
            Some(value) => Ok(value),
            None => Err(self.missing_attribute(object, name)),
        }
    }

    /// Attribute `name` of `object`, or `None` when it has none.
    pub(crate) fn lookup_attr(&self, object: &Value, name: &str) -> EvalResult<Option<Value>> {
        match object {
            Value::Instance(instance) => {
                let class_attr = instance.class.lookup(name);
                if let Some(Value::Property(property)) = &class_attr {
                    return self.property_get(property, object, name).map(Some);
                }
                if let Some(value) = instance.dict.get(name) {
                    return Ok(Some(value));
                }
                if let Some(attr) = class_attr {
                    return self.bind_attribute(attr, object, &instance.class, name).map(Some);
                }
                match name {
                    "__class__" => return Ok(Some(Value::Class(Rc::clone(&instance.class)))),
                    "__dict__" => return Ok(Some(namespace_dict(&instance.dict))),
                    _ => {}
                }
                match instance.class.lookup("__getattr__") {
                    Some(hook) => {
                        let hook = self.bind_attribute(
                            hook,
                            object,
                            &instance.class,
                            "__getattr__",
                        )?;
                        self.call(&hook, vec![Value::from(name)]).map(Some)
                    }
                    None => Ok(None),
                }
            }
            Value::Class(class) => {
                if let Some(attr) = class.lookup(name) {
                    return Ok(Some(bind_to_class(attr, class)));
                }
                Ok(match name {
                    "__name__" => Some(Value::from(class.name.as_str())),
                    "__qualname__" => Some(Value::from(class.qualname.as_str())),
                    "__module__" => Some(Value::from(class.module.as_str())),
                    "__doc__" => Some(Value::None),
                    "__mro__" => Some(Value::tuple(
                        class.mro().into_iter().map(Value::Class).collect(),
                    )),
                    "__bases__" => Some(Value::tuple(
                        class.bases.iter().cloned().map(Value::Class).collect(),
                    )),
                    "__dict__" => Some(namespace_dict(&class.dict)),
                    "__class__" => Some(Value::Class(Rc::clone(
                        self.runtime.type_class(TypeTag::Type),
                    ))),
                    _ => class
                        .builtin
                        .and_then(|tag| Builtin::method(tag, name))
                        .map(Value::Builtin),
                })
            }
            Value::Module(module) => Ok(module.get(name).or_else(|| match name {
                "__dict__" => Some(namespace_dict(module.namespace())),
                "__class__" => Some(Value::Class(Rc::clone(
                    self.runtime.type_class(TypeTag::Module),
                ))),
                _ => None,
            })),
            Value::Function(function) => Ok(match name {
                "__name__" => Some(Value::from(function.name.as_str())),
                "__qualname__" => Some(Value::from(function.qualname.as_str())),
                "__module__" => Some(Value::from(function.module.as_str())),
                "__doc__" => Some(Self::doc_of(object)),
                "__dict__" => Some(namespace_dict(&function.attrs)),
                "__globals__" => Some(namespace_dict(&function.globals)),
                "__class__" => Some(Value::Class(Rc::clone(
                    self.runtime.type_class(TypeTag::Function),
                ))),
                _ => function.attrs.get(name),
            }),
            Value::BoundMethod(method) => match name {
                "__self__" => Ok(Some(method.receiver.clone())),
                "__func__" => Ok(Some(method.function.clone())),
                _ => self.lookup_attr(&method.function, name),
            },
            Value::Super(sup) => self.super_attr(sup, name),
            Value::StaticMethod(inner) | Value::ClassMethod(inner) if name == "__func__" => {
                Ok(Some((**inner).clone()))
            }
            Value::Property(property) => Ok(match name {
                "fget" => Some(property.fget.clone().unwrap_or(Value::None)),
                "fset" => Some(property.fset.clone().unwrap_or(Value::None)),
                _ => self.native_method(object, name),
            }),
            Value::Builtin(builtin) if name == "__name__" => Ok(Some(Value::from(builtin.name()))),
            Value::Complex(c) if matches!(name, "real" | "imag") => {
                Ok(Some(Value::Float(if name == "real" { c.re } else { c.im })))
            }
            Value::Generator(generator) if name == "__name__" => {
                Ok(Some(Value::from(&*generator.name)))
            }
            other if name == "__class__" => Ok(Some(Value::Class(self.runtime.class_of(other)))),
            other => Ok(self.native_method(other, name)),
        }
    }

    /// Method of a builtin type bound to `receiver`.
    fn native_method(&self, receiver: &Value, name: &str) -> Option<Value> {
        let tag = receiver.type_tag()?;
        Builtin::method(tag, name).map(|method| bound(receiver.clone(), Value::Builtin(method)))
    }

    pub(crate) fn missing_attribute(&self, object: &Value, name: &str) -> RaisedException {
        let message = match object {
            Value::Module(module) => {
                format!("module '{}' has no attribute '{name}'", module.name())
            }
            Value::Class(class) => {
                format!("type object '{}' has no attribute '{name}'", class.name)
            }
            other => format!("'{}' object has no attribute '{name}'", other.type_name()),
        };
        self.attribute_error(message)
    }

    /// Bind a class attribute found on `class` for access through `receiver`.
    pub(crate) fn bind_attribute(
        &self,
        attr: Value,
        receiver: &Value,
        class: &Rc<ClassObject>,
        name: &str,
    ) -> EvalResult {
        Ok(match attr {
            Value::Function(_) | Value::Builtin(Builtin::ObjectInit | Builtin::ExceptionInit) => {
                bound(receiver.clone(), attr)
            }
            Value::ClassMethod(function) => {
                bound(Value::Class(Rc::clone(class)), (*function).clone())
            }
            Value::StaticMethod(function) => (*function).clone(),
            Value::Property(property) => return self.property_get(&property, receiver, name),
            other => other,
        })
    }

    fn property_get(&self, property: &Property, receiver: &Value, name: &str) -> EvalResult {
        match &property.fget {
            Some(getter) => self.call(getter, vec![receiver.clone()]),
            None => Err(self.attribute_error(format!(
                "property '{name}' of '{}' object has no getter",
                receiver.type_name()
            ))),
        }
    }

    /// Attribute lookup that starts after `sup.class` in the receiver's MRO.
    fn super_attr(&self, sup: &SuperObject, name: &str) -> EvalResult<Option<Value>> {
        let start = match &sup.receiver {
            Value::Class(class) => Rc::clone(class),
            other => self.runtime.class_of(other),
        };
        let mro = start.mro();
        let Some(position) = mro.iter().position(|class| Rc::ptr_eq(class, &sup.class)) else {
            return Ok(None);
        };
        for class in &mro[position + 1..] {
            if let Some(attr) = class.dict.get(name) {
                return match &sup.receiver {
                    Value::Class(owner) => Ok(Some(bind_to_class(attr, owner))),
                    receiver => self.bind_attribute(attr, receiver, &start, name).map(Some),
                };
            }
        }
        Ok(None)
    }

    /// Build a `super` proxy, checking that `receiver` derives from `class`.
    pub(crate) fn make_super(&self, class: &Rc<ClassObject>, receiver: Value) -> EvalResult {
        let derives = match &receiver {
            Value::Class(other) => other.is_subclass_of(class),
            other => self.is_instance(other, class),
        };
        if !derives {
            return Err(self.type_error(
                "super(type, obj): obj must be an instance or subtype of type",
            ));
        }
        Ok(Value::Super(Rc::new(SuperObject {
            class: Rc::clone(class),
            receiver,
        })))
    }

    pub(crate) fn set_attr(&self, object: &Value, name: &str, value: Value) -> EvalResult<()> {
        match object {
            Value::Instance(instance) => {
                if let Some(Value::Property(property)) = instance.class.lookup(name) {
                    return match &property.fset {
                        Some(setter) => self.call(setter, vec![object.clone(), value]).map(drop),
                        None => Err(self.attribute_error(format!(
                            "property '{name}' of '{}' object has no setter",
                            instance.class.name
                        ))),
                    };
                }
                instance.dict.set(name, value);
                Ok(())
            }
            Value::Class(class) if class.module == "builtins" => Err(self.type_error(format!(
                "cannot set '{name}' attribute of immutable type '{}'",
                class.name
            ))),
            Value::Class(class) => {
                if let Value::Function(_) | Value::StaticMethod(_) | Value::ClassMethod(_) = &value
                {
                    attach_defining_class(&value, class);
                }
                class.dict.set(name, value);
                Ok(())
            }
            Value::Module(module) => {
                module.namespace().set(name, value);
                Ok(())
            }
            Value::Function(function) => {
                function.attrs.set(name, value);
                Ok(())
            }
            other => Err(self.missing_attribute(other, name)),
        }
    }

    pub(crate) fn delete_attr(&self, object: &Value, name: &str) -> EvalResult<()> {
        let removed = match object {
            Value::Instance(instance) => instance.dict.remove(name),
            Value::Class(class) if class.module != "builtins" => class.dict.remove(name),
            Value::Module(module) => module.namespace().remove(name),
            Value::Function(function) => function.attrs.remove(name),
            _ => None,
        };
        removed
            .map(drop)
            .ok_or_else(|| self.missing_attribute(object, name))
    }

    /// Execute a `class` statement and bind the resulting class.
    pub(crate) fn exec_class_def(&self, def: &ClassDef, frame: &Frame) -> EvalResult<()> {
        let decorators = def
            .decorators
            .iter()
            .map(|decorator| self.eval(decorator, frame))
            .collect::<EvalResult<Vec<_>>>()?;
        let mut bases = Vec::with_capacity(def.bases.len());
        for base in &def.bases {
            match self.eval(base, frame)? {
                Value::Class(class) => {
                    if let Some(tag) = class.builtin_base() {
                        return Err(self.type_error(format!(
                            "subclassing builtin type '{}' is not supported",
                            tag.name()
                        )));
                    }
                    bases.push(class);
                }
                other => {
                    return Err(self.type_error(format!(
                        "bases must be types, not '{}'",
                        other.type_name()
                    )))
                }
            }
        }
        if bases.is_empty() {
            bases.push(Rc::clone(self.runtime.type_class(TypeTag::Object)));
        }
        for (keyword, _) in &def.keywords {
            tracing::debug!(class = %def.name, keyword = %keyword, "ignoring class keyword");
        }

        let qualname = format!("{}{}", frame.qualname_prefix, def.name);
        let module = frame.module_name();
        let namespace = Namespace::new();
        namespace.set("__module__", Value::from(module.as_str()));
        namespace.set("__qualname__", Value::from(qualname.as_str()));
        if let Some(StmtKind::Expr(expr)) = def.body.first().map(|stmt| &stmt.kind) {
            if let ExprKind::Constant(Constant::Str(doc)) = &expr.kind {
                namespace.set("__doc__", Value::from(doc.as_str()));
            }
        }
        let body_frame = Frame {
            globals: frame.globals.clone(),
            locals: Locals::Class {
                namespace: namespace.clone(),
                enclosing: frame.enclosing_scope(),
            },
            filename: Rc::clone(&frame.filename),
            name: Rc::from(def.name.as_str()),
            line: Cell::new(frame.line.get()),
            super_context: None,
            qualname_prefix: format!("{qualname}."),
            yields: None,
        };
        if let Err(mut raised) = self.exec_block(&def.body, &body_frame) {
            raised.push_frame(body_frame.trace_frame());
            return Err(raised);
        }

        let base_names: Vec<&str> = bases.iter().map(|base| base.name.as_str()).collect();
        let base_names = base_names.join(", ");
        let class = ClassObject::new(def.name.as_str(), qualname, module, bases, namespace.clone())
            .ok_or_else(|| {
                self.type_error(format!(
                    "Cannot create a consistent method resolution order (MRO) for bases {base_names}"
                ))
            })?;
        for (_, value) in namespace.entries() {
            attach_defining_class(&value, &class);
        }
        tracing::trace!(class = %class.qualname, "class created");

        let mut value = Value::Class(class);
        for decorator in decorators.iter().rev() {
            value = self.call(decorator, vec![value])?;
        }
        self.store_name(&def.name, value, frame)
    }
}
