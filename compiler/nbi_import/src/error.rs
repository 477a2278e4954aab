//! Errors returned by [`ImportEnvironment::import_module`].
//!
//! [`ImportEnvironment::import_module`]: crate::ImportEnvironment::import_module

use thiserror::Error;

use crate::document::DocumentError;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid module name '{0}'")]
    InvalidName(String),

    /// Every finder missed.
    #[error("No module named '{0}'")]
    NotFound(String),

    #[error("No module named '{name}'; '{parent}' is not a package")]
    NotAPackage { parent: String, name: String },

    /// The notebook behind a resolved module could not be read. The module
    /// has been removed from the registry again.
    #[error(transparent)]
    Document(#[from] DocumentError),
}
