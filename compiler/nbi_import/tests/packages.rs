//! Directory packages, submodules and imports between notebooks.

mod common;

use std::path::PathBuf;
use std::rc::Rc;

use common::{as_int, as_string, call_ok, Workspace};
use nbi_eval::buffer_sink;
use nbi_import::{ImportConfig, ImportEnvironment, ImportError, Value};
use pretty_assertions::assert_eq;

#[test]
fn directories_become_packages() {
    let ws = Workspace::new();
    let projects = ws.dir("Projects");
    let analysis = ws.dir("Projects/1. Analysis");
    ws.notebook(
        "Projects/1. Analysis/2. Data Prep.ipynb",
        &["def prep():\n    return __package__\n"],
    );
    let env = ws.env();

    let leaf = env
        .import_module("projects.analysis.data_prep")
        .unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(
        env.module_names(),
        ["projects", "projects.analysis", "projects.analysis.data_prep"]
    );

    let package = env.module("projects").unwrap_or_else(|| panic!("projects"));
    assert!(package.is_package());
    assert_eq!(package.loader(), Some("directory"));
    assert_eq!(package.search_paths(), Some(&[projects][..]));
    let sub = env.module("projects.analysis").unwrap_or_else(|| panic!("analysis"));
    assert_eq!(sub.origin(), Some(analysis.as_path()));

    let Some(Value::Module(bound)) = sub.get("data_prep") else {
        panic!("data_prep not bound on its package");
    };
    assert!(Rc::ptr_eq(&bound, &leaf));
    assert_eq!(
        as_string(&call_ok(&env, "projects.analysis.data_prep", "prep")),
        "projects.analysis"
    );
    assert_eq!(ws.diagnostics.get_output(), "");
}

#[test]
fn notebooks_win_over_directories() {
    let ws = Workspace::new();
    ws.dir("shared");
    ws.notebook("shared.ipynb", &["def kind():\n    return 'notebook'\n"]);
    let env = ws.env();
    let module = env.import_module("shared").unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(module.loader(), Some("notebook"));
}

#[test]
fn notebooks_cannot_have_children() {
    let ws = Workspace::new();
    ws.notebook("flat.ipynb", &["def f():\n    return 1\n"]);
    ws.dir("flat/child");
    let env = ws.env();
    assert!(matches!(
        env.import_module("flat.child"),
        Err(ImportError::NotAPackage { parent, .. }) if parent == "flat"
    ));
}

#[test]
fn missing_parents_stop_the_import() {
    let ws = Workspace::new();
    let env = ws.env();
    assert!(matches!(
        env.import_module("ghost.child"),
        Err(ImportError::NotFound(name)) if name == "ghost"
    ));
    assert!(env.module_names().is_empty());
}

#[test]
fn cells_import_packages_and_siblings() {
    let ws = Workspace::new();
    ws.notebook("lib/1. Helpers.ipynb", &["def double(x):\n    return x * 2\n"]);
    ws.notebook(
        "lib/main.ipynb",
        &[
            "from .helpers import double\nfrom . import helpers as mod\n",
            "def run():\n    return double(20) + mod.double(1)\n",
        ],
    );
    ws.notebook(
        "app.ipynb",
        &["import lib.main\ndef start():\n    return lib.main.run()\n"],
    );
    let env = ws.env();
    env.import_module("app").unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(ws.diagnostics.get_output(), "");
    assert_eq!(as_int(&call_ok(&env, "app", "start")), 42);
    assert_eq!(as_int(&call_ok(&env, "lib.main", "run")), 42);
}

#[test]
fn star_imports_skip_private_names() {
    let ws = Workspace::new();
    ws.notebook(
        "pkg/tools.ipynb",
        &["def visible():\n    return 'v'\ndef _hidden():\n    return 'h'\n"],
    );
    ws.notebook(
        "pkg/user.ipynb",
        &[
            "from .tools import *\n",
            "def check():\n    try:\n        _hidden\n    except NameError:\n        return visible()\n    return 'leaked'\n",
        ],
    );
    let env = ws.env();
    env.import_module("pkg.user").unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(as_string(&call_ok(&env, "pkg.user", "check")), "v");
}

#[test]
fn relative_imports_need_a_package() {
    let ws = Workspace::new();
    let origin = ws.notebook("top.ipynb", &["from . import sibling\n"]);
    let env = ws.env();
    env.import_module("top").unwrap_or_else(|err| panic!("{err}"));
    let report = ws.diagnostics.get_output();
    assert!(
        report.contains(&format!("File \"{} (cell 1)\", line 1, in <module>", origin.display())),
        "{report}"
    );
    assert!(
        report.ends_with("ImportError: attempted relative import with no known parent package\n"),
        "{report}"
    );
}

#[test]
fn circular_imports_see_partial_modules() {
    let ws = Workspace::new();
    let alpha = ws.notebook(
        "alpha.ipynb",
        &[
            "def early():\n    return 'a'\n",
            "import beta\n",
            "def late():\n    return beta.peek()\n",
        ],
    );
    ws.notebook(
        "beta.ipynb",
        &[
            "from alpha import early\n",
            "from alpha import late\n",
            "def peek():\n    return early()\n",
        ],
    );
    let env = ws.env();
    env.import_module("alpha").unwrap_or_else(|err| panic!("{err}"));

    assert_eq!(env.module_names(), ["alpha", "beta"]);
    let beta = env.module("beta").unwrap_or_else(|| panic!("beta"));
    assert!(beta.get("early").is_some());
    assert!(beta.get("late").is_none());
    assert_eq!(as_string(&call_ok(&env, "alpha", "late")), "a");

    let report = ws.diagnostics.get_output();
    assert!(
        report.contains(&format!(
            "ImportError: cannot import name 'late' from 'alpha' ({})\n",
            alpha.display()
        )),
        "{report}"
    );
}

#[test]
fn empty_search_path_uses_the_default_root() {
    let ws = Workspace::new();
    ws.dir("Shared/1. Tools");
    ws.notebook("Shared/1. Tools/helpers.ipynb", &["def two():\n    return 2\n"]);
    let config = ImportConfig::new(Vec::<PathBuf>::new()).with_default_root(ws.root());
    let env = ImportEnvironment::with_output(config, buffer_sink(), buffer_sink());

    let package = env.import_module("shared").unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(package.origin(), Some(ws.path("Shared").as_path()));
    env.import_module("shared.tools.helpers").unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(as_int(&call_ok(&env, "shared.tools.helpers", "two")), 2);
}
