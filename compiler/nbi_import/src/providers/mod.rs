//! Built-in finders: notebooks and convention-named directories.

mod directory;
mod notebook;

pub use directory::DirectoryModuleProvider;
pub use notebook::NotebookModuleProvider;

use nbi_eval::{Builtin, ModuleObject, Value};

/// Make the session accessor visible to code in `module`.
fn install_session_accessor(module: &ModuleObject) {
    module
        .namespace()
        .set("get_ipython", Value::Builtin(Builtin::GetIpython));
}

#[cfg(test)]
mod tests;
