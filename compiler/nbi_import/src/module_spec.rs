//! Resolution results handed from a finder back to the environment.

use std::path::PathBuf;

/// Where a module lives and which finder loads it.
///
/// Built per resolution attempt and consumed right away; never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSpec {
    /// Fully qualified dotted name.
    pub name: String,
    /// Tag of the finder that produced this spec.
    pub loader: &'static str,
    /// Matched directory or notebook file.
    pub origin: PathBuf,
}

impl ModuleSpec {
    pub fn new(name: impl Into<String>, loader: &'static str, origin: impl Into<PathBuf>) -> Self {
        ModuleSpec {
            name: name.into(),
            loader,
            origin: origin.into(),
        }
    }

    /// Last dotted segment of the name.
    pub fn leaf(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}
