//! Seam between the interpreter and the host import system.

use std::rc::Rc;

use crate::module::ModuleObject;

/// Why an import requested by running code failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportFailure {
    /// Raised in the cell as `ModuleNotFoundError`.
    NotFound { name: String, message: String },
    /// Raised in the cell as `ImportError`.
    Failed { message: String },
}

/// Resolves absolute dotted module names for `import` statements.
pub trait ImportHook {
    /// Import `name` and every parent package, returning the leaf module.
    fn import_module(&self, name: &str) -> Result<Rc<ModuleObject>, ImportFailure>;
}

/// Hook for code that may not import anything.
pub struct NoImports;

impl ImportHook for NoImports {
    fn import_module(&self, name: &str) -> Result<Rc<ModuleObject>, ImportFailure> {
        Err(ImportFailure::NotFound {
            name: name.to_owned(),
            message: format!("No module named '{name}'"),
        })
    }
}
