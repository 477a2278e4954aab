//! Module objects.

use std::path::{Path, PathBuf};

use crate::namespace::Namespace;
use crate::value::Value;

/// A loaded (or loading) module.
///
/// Identity metadata is mirrored into the namespace as `__name__`,
/// `__file__`, `__loader__`, `__package__` and, for packages, `__path__`.
pub struct ModuleObject {
    name: String,
    origin: Option<PathBuf>,
    loader: Option<&'static str>,
    search_paths: Option<Vec<PathBuf>>,
    namespace: Namespace,
}

impl ModuleObject {
    /// A plain module. `__package__` is the parent package name.
    pub fn new(
        name: impl Into<String>,
        origin: Option<PathBuf>,
        loader: Option<&'static str>,
    ) -> Self {
        let name = name.into();
        let package = name.rsplit_once('.').map_or("", |(parent, _)| parent).to_owned();
        Self::build(name, origin, loader, None, package)
    }

    /// A package searched for submodules in `search_paths`.
    pub fn package(
        name: impl Into<String>,
        origin: Option<PathBuf>,
        loader: Option<&'static str>,
        search_paths: Vec<PathBuf>,
    ) -> Self {
        let name = name.into();
        let package = name.clone();
        Self::build(name, origin, loader, Some(search_paths), package)
    }

    fn build(
        name: String,
        origin: Option<PathBuf>,
        loader: Option<&'static str>,
        search_paths: Option<Vec<PathBuf>>,
        package: String,
    ) -> Self {
        let namespace = Namespace::new();
        namespace.set("__name__", Value::from(name.as_str()));
        namespace.set("__package__", Value::from(package));
        namespace.set("__doc__", Value::None);
        namespace.set(
            "__file__",
            origin
                .as_deref()
                .map_or(Value::None, |path| Value::from(path.display().to_string())),
        );
        namespace.set("__loader__", loader.map_or(Value::None, Value::from));
        if let Some(paths) = &search_paths {
            let paths = paths
                .iter()
                .map(|path| Value::from(path.display().to_string()))
                .collect();
            namespace.set("__path__", Value::list(paths));
        }
        ModuleObject {
            name,
            origin,
            loader,
            search_paths,
            namespace,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// Tag of the provider that created the module.
    pub fn loader(&self) -> Option<&'static str> {
        self.loader
    }

    pub fn is_package(&self) -> bool {
        self.search_paths.is_some()
    }

    /// Submodule search locations; `None` for non-packages.
    pub fn search_paths(&self) -> Option<&[PathBuf]> {
        self.search_paths.as_deref()
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.namespace.get(name)
    }

    /// Value of `__package__`, used to resolve relative imports.
    pub fn package_name(&self) -> Option<String> {
        self.namespace.get("__package__")?.as_str().map(str::to_owned)
    }
}

#[cfg(test)]
mod tests;
