//! The host import system.
//!
//! An [`ImportEnvironment`] owns everything imported modules share: the
//! ordered finder list, the module registry, the interpreter [`Runtime`]
//! (builtins, line cache, print sink, session) and the diagnostics sink.
//! `import` statements inside cells come back here through [`ImportHook`].
//!
//! The environment is single-threaded. Imports re-enter it while a notebook
//! is still populating, so registry and finder borrows never outlive a
//! single lookup.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use nbi_eval::{
    stderr_sink, stdout_sink, ImportFailure, ImportHook, Interpreter, ModuleObject,
    RaisedException, Runtime, SharedOutput, Value,
};
use rustc_hash::FxHashMap;

use crate::config::ImportConfig;
use crate::error::ImportError;
use crate::finder::Finder;
use crate::module_spec::ModuleSpec;
use crate::providers::{DirectoryModuleProvider, NotebookModuleProvider};

pub struct ImportEnvironment {
    config: ImportConfig,
    runtime: Runtime,
    finders: RefCell<Vec<Rc<dyn Finder>>>,
    registry: RefCell<FxHashMap<String, Rc<ModuleObject>>>,
    diagnostics: SharedOutput,
}

impl ImportEnvironment {
    /// Environment with the notebook finder followed by the directory
    /// finder. `print` goes to stdout, cell diagnostics to stderr.
    pub fn new(config: ImportConfig) -> Self {
        Self::with_output(config, stdout_sink(), stderr_sink())
    }

    /// Like [`ImportEnvironment::new`] with explicit sinks.
    pub fn with_output(
        config: ImportConfig,
        output: SharedOutput,
        diagnostics: SharedOutput,
    ) -> Self {
        let env = Self::bare_with_output(config, output, diagnostics);
        env.add_finder(Rc::new(NotebookModuleProvider::new(
            env.config.notebook_extension.clone(),
        )));
        env.add_finder(Rc::new(DirectoryModuleProvider::new()));
        env
    }

    /// Environment without any finders.
    pub fn bare(config: ImportConfig) -> Self {
        Self::bare_with_output(config, stdout_sink(), stderr_sink())
    }

    pub fn bare_with_output(
        config: ImportConfig,
        output: SharedOutput,
        diagnostics: SharedOutput,
    ) -> Self {
        ImportEnvironment {
            config,
            runtime: Runtime::new(output),
            finders: RefCell::new(Vec::new()),
            registry: RefCell::new(FxHashMap::default()),
            diagnostics,
        }
    }

    /// Append `finder`; it is asked after every finder added before it.
    pub fn add_finder(&self, finder: Rc<dyn Finder>) {
        tracing::debug!(finder = finder.tag(), "finder registered");
        self.finders.borrow_mut().push(finder);
    }

    pub fn finder_tags(&self) -> Vec<&'static str> {
        self.finders.borrow().iter().map(|finder| finder.tag()).collect()
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn diagnostics(&self) -> &SharedOutput {
        &self.diagnostics
    }

    /// First spec any finder produces for `name` in `path`.
    pub fn find_spec(&self, name: &str, path: &[PathBuf]) -> Option<ModuleSpec> {
        self.find_with(name, path).map(|(_, spec)| spec)
    }

    fn find_with(&self, name: &str, path: &[PathBuf]) -> Option<(Rc<dyn Finder>, ModuleSpec)> {
        let finders = self.finders.borrow().clone();
        let target = self.module(name);
        finders.into_iter().find_map(|finder| {
            let spec = finder.find_spec(name, path, target.as_deref())?;
            Some((finder, spec))
        })
    }

    /// Import `name`, loading its parent packages first.
    ///
    /// A module already in the registry is returned as is, even while it is
    /// still being populated. A newly loaded module is bound as an attribute
    /// of its parent.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn import_module(&self, name: &str) -> Result<Rc<ModuleObject>, ImportError> {
        if let Some(module) = self.module(name) {
            return Ok(module);
        }
        if name.is_empty() || name.split('.').any(str::is_empty) {
            return Err(ImportError::InvalidName(name.to_owned()));
        }

        let (parent, search_paths) = match name.rsplit_once('.') {
            Some((parent_name, _)) => {
                let parent = self.import_module(parent_name)?;
                // Loading the parent may have imported this module already.
                if let Some(module) = self.module(name) {
                    return Ok(module);
                }
                let Some(paths) = parent.search_paths().map(<[PathBuf]>::to_vec) else {
                    return Err(ImportError::NotAPackage {
                        parent: parent_name.to_owned(),
                        name: name.to_owned(),
                    });
                };
                (Some(parent), paths)
            }
            None => (None, self.config.top_level_paths()),
        };

        let Some((finder, spec)) = self.find_with(name, &search_paths) else {
            tracing::debug!("no finder matched");
            return Err(ImportError::NotFound(name.to_owned()));
        };
        let module = finder.create_module(self, &spec);
        self.insert_module(Rc::clone(&module));
        if let Err(err) = finder.exec_module(self, &module) {
            tracing::warn!(module = name, error = %err, "import failed");
            self.remove_module(name);
            return Err(err);
        }
        if let Some(parent) = parent {
            parent
                .namespace()
                .set(spec.leaf(), Value::Module(Rc::clone(&module)));
        }
        Ok(module)
    }

    pub fn module(&self, name: &str) -> Option<Rc<ModuleObject>> {
        self.registry.borrow().get(name).cloned()
    }

    /// Register `module` under its own name, replacing any previous entry.
    pub fn insert_module(&self, module: Rc<ModuleObject>) -> Option<Rc<ModuleObject>> {
        self.registry
            .borrow_mut()
            .insert(module.name().to_owned(), module)
    }

    pub fn remove_module(&self, name: &str) -> Option<Rc<ModuleObject>> {
        self.registry.borrow_mut().remove(name)
    }

    /// Registered module names, sorted.
    pub fn module_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    /// Call a value taken from an imported module.
    pub fn call(&self, callee: &Value, args: Vec<Value>) -> Result<Value, RaisedException> {
        Interpreter::new(&self.runtime, self).call(callee, args)
    }

    /// Traceback text for `raised`, with source lines from the line cache.
    pub fn render_traceback(&self, raised: &RaisedException) -> String {
        Interpreter::new(&self.runtime, self).format_exception(raised)
    }
}

impl From<ImportError> for ImportFailure {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::NotFound(ref name) => ImportFailure::NotFound {
                name: name.clone(),
                message: err.to_string(),
            },
            ImportError::NotAPackage { ref name, .. } => ImportFailure::NotFound {
                name: name.clone(),
                message: err.to_string(),
            },
            ImportError::InvalidName(_) | ImportError::Document(_) => ImportFailure::Failed {
                message: err.to_string(),
            },
        }
    }
}

impl ImportHook for ImportEnvironment {
    fn import_module(&self, name: &str) -> Result<Rc<ModuleObject>, ImportFailure> {
        ImportEnvironment::import_module(self, name).map_err(ImportFailure::from)
    }
}

#[cfg(test)]
mod tests;
