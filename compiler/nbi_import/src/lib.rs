//! Import Jupyter notebooks and plain directories as modules.
//!
//! A dotted import name is matched leniently against the filesystem:
//! `import data_prep` finds `"2. Data Prep.ipynb"` or a directory named
//! `data prep`. Directories become empty packages; notebooks become modules
//! built from the declarations in their code cells (functions, classes and
//! imports). Everything else in a cell is dropped, so importing a notebook
//! never re-runs its analysis.
//!
//! ```no_run
//! use nbi_import::{ImportConfig, ImportEnvironment};
//!
//! let env = ImportEnvironment::new(ImportConfig::new(["/work/notebooks"]));
//! let module = env.import_module("analysis.data_prep")?;
//! let clean = module.get("clean").ok_or("no clean()")?;
//! env.call(&clean, Vec::new()).map_err(|err| env.render_traceback(&err))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod document;
mod environment;
mod error;
mod executor;
mod finder;
mod module_spec;
mod providers;
mod resolver;

use std::sync::Once;

pub use config::{ImportConfig, DEFAULT_NOTEBOOK_EXTENSION, NOTEBOOK_EXT_VAR, PATH_VAR};
pub use document::{
    parse_notebook, read_notebook, CellRecord, CellType, DocumentError, DocumentErrorKind,
    NotebookDocument,
};
pub use environment::ImportEnvironment;
pub use error::ImportError;
pub use executor::{display_name, select_declarations, CellFilterExecutor, CellOutcome};
pub use finder::Finder;
pub use module_spec::ModuleSpec;
pub use providers::{DirectoryModuleProvider, NotebookModuleProvider};
pub use resolver::{normalize_entry_name, resolve, target_token, EntryKind, FILESYSTEM_ROOT};

pub use nbi_eval::{ModuleObject, Namespace, RaisedException, Value};

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset; safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
