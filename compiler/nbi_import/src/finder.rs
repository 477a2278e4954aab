//! The finder protocol.
//!
//! The environment asks each registered finder, in registration order, for a
//! [`ModuleSpec`]. The first finder to answer creates the module, which is
//! registered before [`Finder::exec_module`] populates it.

use std::path::PathBuf;
use std::rc::Rc;

use nbi_eval::ModuleObject;

use crate::environment::ImportEnvironment;
use crate::error::ImportError;
use crate::module_spec::ModuleSpec;

pub trait Finder {
    /// Short name recorded as the module's `__loader__`.
    fn tag(&self) -> &'static str;

    /// Locate `name` in `path`. `None` lets the next finder try.
    ///
    /// `target` is the already-loaded module when reloading; the built-in
    /// providers ignore it.
    fn find_spec(
        &self,
        name: &str,
        path: &[PathBuf],
        target: Option<&ModuleObject>,
    ) -> Option<ModuleSpec>;

    /// Build the empty module for `spec`. Does not register it.
    fn create_module(&self, env: &ImportEnvironment, spec: &ModuleSpec) -> Rc<ModuleObject>;

    /// Populate a registered module.
    fn exec_module(
        &self,
        env: &ImportEnvironment,
        module: &Rc<ModuleObject>,
    ) -> Result<(), ImportError>;
}
