//! `import` and `from ... import` statements.

use std::rc::Rc;

use nbi_ir::{Alias, ImportFrom, ImportNames};

use super::{EvalResult, Frame, Interpreter};
use crate::exception::{ExceptionKind, RaisedException};
use crate::import_hook::ImportFailure;
use crate::module::ModuleObject;
use crate::value::Value;

impl Interpreter<'_> {
    /// `import a.b.c` binds `a`; `import a.b.c as d` binds the leaf.
    pub(crate) fn exec_import(&self, aliases: &[Alias], frame: &Frame) -> EvalResult<()> {
        for alias in aliases {
            let leaf = self.import(&alias.name)?;
            match &alias.asname {
                Some(asname) => self.store_name(asname, Value::Module(leaf), frame)?,
                None => {
                    let top = alias.name.split('.').next().unwrap_or(&alias.name);
                    let module = if top == alias.name {
                        leaf
                    } else {
                        self.import(top)?
                    };
                    self.store_name(top, Value::Module(module), frame)?;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn exec_import_from(&self, node: &ImportFrom, frame: &Frame) -> EvalResult<()> {
        let target = self.absolute_name(node, frame)?;
        let module = self.import(&target)?;
        match &node.names {
            ImportNames::Star => {
                for name in self.public_names(&module)? {
                    let value = self.from_module(&module, &name)?;
                    self.store_name(&name, value, frame)?;
                }
            }
            ImportNames::List(aliases) => {
                for alias in aliases {
                    let value = self.from_module(&module, &alias.name)?;
                    let bound = alias.asname.as_deref().unwrap_or(&alias.name);
                    self.store_name(bound, value, frame)?;
                }
            }
        }
        Ok(())
    }

    fn import(&self, name: &str) -> EvalResult<Rc<ModuleObject>> {
        self.importer.import_module(name).map_err(|failure| match failure {
            ImportFailure::NotFound { name, message } => {
                let raised = self.exception(ExceptionKind::ModuleNotFoundError, message);
                set_exception_attr(&raised, "name", Value::from(name));
                raised
            }
            ImportFailure::Failed { message } => {
                self.exception(ExceptionKind::ImportError, message)
            }
        })
    }

    /// Absolute dotted name of a possibly relative `from` target.
    fn absolute_name(&self, node: &ImportFrom, frame: &Frame) -> EvalResult<String> {
        if node.level == 0 {
            return Ok(node.module.clone().unwrap_or_default());
        }
        let package = match frame.globals.get("__package__") {
            Some(Value::Str(package)) if !package.is_empty() => package.to_string(),
            _ => {
                return Err(self.exception(
                    ExceptionKind::ImportError,
                    "attempted relative import with no known parent package",
                ))
            }
        };
        let mut parts: Vec<&str> = package.split('.').collect();
        let up = usize::try_from(node.level - 1).unwrap_or(usize::MAX);
        if up >= parts.len() {
            return Err(self.exception(
                ExceptionKind::ImportError,
                "attempted relative import beyond top-level package",
            ));
        }
        parts.truncate(parts.len() - up);
        let mut name = parts.join(".");
        if let Some(module) = &node.module {
            name.push('.');
            name.push_str(module);
        }
        Ok(name)
    }

    /// `from module import name`: an attribute, else a submodule.
    fn from_module(&self, module: &Rc<ModuleObject>, name: &str) -> EvalResult {
        if let Some(value) = module.get(name) {
            return Ok(value);
        }
        if module.is_package() {
            let submodule = format!("{}.{name}", module.name());
            match self.importer.import_module(&submodule) {
                Ok(found) => return Ok(Value::Module(found)),
                Err(ImportFailure::NotFound { .. }) => {}
                Err(ImportFailure::Failed { message }) => {
                    return Err(self.exception(ExceptionKind::ImportError, message))
                }
            }
        }
        let origin = module
            .origin()
            .map_or_else(|| "unknown location".to_owned(), |path| path.display().to_string());
        let raised = self.exception(
            ExceptionKind::ImportError,
            format!("cannot import name '{name}' from '{}' ({origin})", module.name()),
        );
        set_exception_attr(&raised, "name", Value::from(module.name()));
        Err(raised)
    }

    /// Names bound by `from module import *`.
    fn public_names(&self, module: &ModuleObject) -> EvalResult<Vec<String>> {
        let Some(all) = module.get("__all__") else {
            return Ok(module
                .namespace()
                .names()
                .into_iter()
                .filter(|name| !name.starts_with('_'))
                .collect());
        };
        self.iterate(&all)?
            .into_iter()
            .map(|item| match item {
                Value::Str(name) => Ok(name.to_string()),
                other => Err(self.type_error(format!(
                    "Item in {}.__all__ must be str, not {}",
                    module.name(),
                    other.type_name()
                ))),
            })
            .collect()
    }
}

fn set_exception_attr(raised: &RaisedException, name: &str, value: Value) {
    if let Value::Instance(instance) = &raised.exception {
        instance.dict.set(name, value);
    }
}
