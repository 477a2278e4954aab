use std::path::PathBuf;
use std::rc::Rc;

use nbi_eval::ModuleObject;

use super::install_session_accessor;
use crate::config::DEFAULT_NOTEBOOK_EXTENSION;
use crate::document::read_notebook;
use crate::environment::ImportEnvironment;
use crate::error::ImportError;
use crate::executor::CellFilterExecutor;
use crate::finder::Finder;
use crate::module_spec::ModuleSpec;
use crate::resolver::{resolve, EntryKind};

/// Loads a notebook file as a module built from its code cells.
///
/// Each code cell runs through [`CellFilterExecutor`] in document order, so
/// later cells override names bound by earlier ones. A failing cell is
/// reported and skipped; only an unreadable document fails the import.
#[derive(Debug, Clone)]
pub struct NotebookModuleProvider {
    extension: String,
}

impl Default for NotebookModuleProvider {
    fn default() -> Self {
        Self::new(DEFAULT_NOTEBOOK_EXTENSION)
    }
}

impl NotebookModuleProvider {
    pub const TAG: &'static str = "notebook";

    /// `extension` includes the leading dot.
    pub fn new(extension: impl Into<String>) -> Self {
        NotebookModuleProvider {
            extension: extension.into(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }
}

impl Finder for NotebookModuleProvider {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn find_spec(
        &self,
        name: &str,
        path: &[PathBuf],
        _target: Option<&ModuleObject>,
    ) -> Option<ModuleSpec> {
        let kind = EntryKind::Notebook {
            extension: &self.extension,
        };
        let origin = resolve(name, path, kind)?;
        Some(ModuleSpec::new(name, Self::TAG, origin))
    }

    fn create_module(&self, _env: &ImportEnvironment, spec: &ModuleSpec) -> Rc<ModuleObject> {
        tracing::info!(
            module = %spec.name,
            origin = %spec.origin.display(),
            "loading notebook module"
        );
        let module = ModuleObject::new(
            spec.name.as_str(),
            Some(spec.origin.clone()),
            Some(Self::TAG),
        );
        install_session_accessor(&module);
        Rc::new(module)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(module = module.name()))]
    fn exec_module(
        &self,
        env: &ImportEnvironment,
        module: &Rc<ModuleObject>,
    ) -> Result<(), ImportError> {
        let Some(origin) = module.origin() else {
            tracing::debug!("module has no origin; nothing to run");
            return Ok(());
        };
        let document = read_notebook(origin)?;
        let executor = CellFilterExecutor::new(env.runtime(), env, env.diagnostics());
        let mut failed = 0usize;
        for cell in document.code_cells() {
            let outcome =
                executor.run(&cell.source, module.namespace(), origin, Some(cell.ordinal));
            if outcome.is_failure() {
                failed += 1;
            }
        }
        tracing::debug!(cells = document.cells.len(), failed, "notebook populated");
        Ok(())
    }
}
