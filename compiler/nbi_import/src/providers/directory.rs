use std::path::PathBuf;
use std::rc::Rc;

use nbi_eval::ModuleObject;

use super::install_session_accessor;
use crate::environment::ImportEnvironment;
use crate::error::ImportError;
use crate::finder::Finder;
use crate::module_spec::ModuleSpec;
use crate::resolver::{resolve, EntryKind};

/// Turns a matching directory into an empty package.
///
/// The package's only search location is the directory itself, so its
/// notebooks and subdirectories become importable as submodules.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectoryModuleProvider;

impl DirectoryModuleProvider {
    pub const TAG: &'static str = "directory";

    pub fn new() -> Self {
        DirectoryModuleProvider
    }
}

impl Finder for DirectoryModuleProvider {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn find_spec(
        &self,
        name: &str,
        path: &[PathBuf],
        _target: Option<&ModuleObject>,
    ) -> Option<ModuleSpec> {
        let origin = resolve(name, path, EntryKind::Directory)?;
        Some(ModuleSpec::new(name, Self::TAG, origin))
    }

    fn create_module(&self, _env: &ImportEnvironment, spec: &ModuleSpec) -> Rc<ModuleObject> {
        tracing::debug!(module = %spec.name, origin = %spec.origin.display(), "creating package");
        let module = ModuleObject::package(
            spec.name.as_str(),
            Some(spec.origin.clone()),
            Some(Self::TAG),
            vec![spec.origin.clone()],
        );
        install_session_accessor(&module);
        Rc::new(module)
    }

    fn exec_module(
        &self,
        _env: &ImportEnvironment,
        _module: &Rc<ModuleObject>,
    ) -> Result<(), ImportError> {
        Ok(())
    }
}
