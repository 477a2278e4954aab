//! Import environment configuration.

use std::ffi::OsString;
use std::path::PathBuf;

use crate::resolver::FILESYSTEM_ROOT;

/// Environment variable holding the top-level search path, in the
/// platform's path-list syntax (`:`-separated on Unix).
pub const PATH_VAR: &str = "NBIMPORT_PATH";

/// Environment variable overriding the notebook file extension.
pub const NOTEBOOK_EXT_VAR: &str = "NBIMPORT_NOTEBOOK_EXT";

/// Extension appended to requested names by notebook lookups.
pub const DEFAULT_NOTEBOOK_EXTENSION: &str = ".ipynb";

/// Where and how top-level modules are looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    /// Directories searched for top-level names. `None` or an empty list
    /// falls back to `default_root`.
    pub search_paths: Option<Vec<PathBuf>>,
    /// Suffix notebook files carry, including the leading dot.
    pub notebook_extension: String,
    /// Search location used when no search path is configured.
    pub default_root: PathBuf,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            search_paths: None,
            notebook_extension: DEFAULT_NOTEBOOK_EXTENSION.to_owned(),
            default_root: PathBuf::from(FILESYSTEM_ROOT),
        }
    }
}

impl ImportConfig {
    /// Configuration searching exactly `paths` for top-level names.
    #[must_use]
    pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self::default().with_search_paths(paths)
    }

    /// Read [`PATH_VAR`] and [`NOTEBOOK_EXT_VAR`]; unset variables keep the
    /// defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var_os(PATH_VAR),
            std::env::var(NOTEBOOK_EXT_VAR).ok(),
        )
    }

    pub(crate) fn from_vars(path: Option<OsString>, extension: Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(path) = path.filter(|p| !p.is_empty()) {
            config.search_paths = Some(std::env::split_paths(&path).collect());
        }
        if let Some(extension) = extension.filter(|e| !e.trim().is_empty()) {
            config = config.with_notebook_extension(extension.trim());
        }
        config
    }

    #[must_use]
    pub fn with_search_paths(
        mut self,
        paths: impl IntoIterator<Item = impl Into<PathBuf>>,
    ) -> Self {
        self.search_paths = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    /// Set the notebook extension. A missing leading dot is added.
    #[must_use]
    pub fn with_notebook_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.notebook_extension = if extension.starts_with('.') {
            extension
        } else {
            format!(".{extension}")
        };
        self
    }

    #[must_use]
    pub fn with_default_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.default_root = root.into();
        self
    }

    /// Directories searched for a top-level name.
    pub fn top_level_paths(&self) -> Vec<PathBuf> {
        match &self.search_paths {
            Some(paths) if !paths.is_empty() => paths.clone(),
            _ => vec![self.default_root.clone()],
        }
    }
}

#[cfg(test)]
mod tests;
