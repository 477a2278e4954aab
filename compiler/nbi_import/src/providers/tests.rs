use std::fs;
use std::path::{Path, PathBuf};

use nbi_eval::{buffer_sink, Value};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use super::*;
use crate::{Finder, ImportConfig, ImportEnvironment, ModuleSpec};

fn tree() -> TempDir {
    let dir = tempfile::tempdir().unwrap_or_else(|err| panic!("tempdir: {err}"));
    fs::create_dir(dir.path().join("1. Data Prep")).unwrap_or_else(|err| panic!("{err}"));
    fs::write(dir.path().join("2. Data Prep.ipynb"), "{}").unwrap_or_else(|err| panic!("{err}"));
    fs::write(dir.path().join("Report.txt"), "").unwrap_or_else(|err| panic!("{err}"));
    dir
}

fn env() -> ImportEnvironment {
    ImportEnvironment::bare_with_output(ImportConfig::default(), buffer_sink(), buffer_sink())
}

fn paths(dir: &TempDir) -> Vec<PathBuf> {
    vec![dir.path().to_path_buf()]
}

fn str_attr(module: &nbi_eval::ModuleObject, name: &str) -> Option<String> {
    module.get(name)?.as_str().map(str::to_owned)
}

#[test]
fn directory_provider_only_matches_directories() {
    let dir = tree();
    let spec = DirectoryModuleProvider
        .find_spec("pkg.data_prep", &paths(&dir), None)
        .unwrap_or_else(|| panic!("no spec"));
    assert_eq!(
        spec,
        ModuleSpec::new("pkg.data_prep", "directory", dir.path().join("1. Data Prep"))
    );
    assert_eq!(DirectoryModuleProvider.find_spec("report", &paths(&dir), None), None);
}

#[cfg(unix)]
#[test]
fn empty_path_searches_the_filesystem_root() {
    let spec = DirectoryModuleProvider.find_spec("tmp", &[], None);
    assert_eq!(spec.map(|spec| spec.origin), Some(PathBuf::from("/tmp")));
    assert_eq!(
        NotebookModuleProvider::default().find_spec("tmp", &[], None),
        None
    );
}

#[test]
fn notebook_provider_only_matches_notebook_files() {
    let dir = tree();
    let provider = NotebookModuleProvider::default();
    assert_eq!(provider.extension(), ".ipynb");
    let spec = provider
        .find_spec("data_prep", &paths(&dir), None)
        .unwrap_or_else(|| panic!("no spec"));
    assert_eq!(spec.origin, dir.path().join("2. Data Prep.ipynb"));
    assert_eq!(spec.loader, "notebook");
    assert_eq!(provider.find_spec("report", &paths(&dir), None), None);
}

#[test]
fn notebook_provider_honours_custom_extension() {
    let dir = tree();
    let provider = NotebookModuleProvider::new(".txt");
    let spec = provider.find_spec("REPORT", &paths(&dir), None);
    assert_eq!(spec.map(|spec| spec.origin), Some(dir.path().join("Report.txt")));
}

#[test]
fn directory_modules_are_empty_packages() {
    let env = env();
    let origin = Path::new("/work/1. Data Prep");
    let spec = ModuleSpec::new("work.data_prep", DirectoryModuleProvider::TAG, origin);
    let module = DirectoryModuleProvider.create_module(&env, &spec);
    assert!(module.is_package());
    assert_eq!(module.search_paths(), Some(&[origin.to_path_buf()][..]));
    assert_eq!(str_attr(&module, "__package__").as_deref(), Some("work.data_prep"));
    assert_eq!(str_attr(&module, "__file__").as_deref(), Some("/work/1. Data Prep"));
    assert_eq!(str_attr(&module, "__loader__").as_deref(), Some("directory"));
    assert!(matches!(module.get("get_ipython"), Some(Value::Builtin(_))));

    DirectoryModuleProvider
        .exec_module(&env, &module)
        .unwrap_or_else(|err| panic!("{err}"));
    let mut names = module.namespace().names();
    names.sort();
    assert_eq!(
        names,
        [
            "__doc__",
            "__file__",
            "__loader__",
            "__name__",
            "__package__",
            "__path__",
            "get_ipython"
        ]
    );
}

#[test]
fn notebook_modules_are_not_packages() {
    let env = env();
    let spec = ModuleSpec::new("work.report", NotebookModuleProvider::TAG, "/work/Report.ipynb");
    let module = NotebookModuleProvider::default().create_module(&env, &spec);
    assert!(!module.is_package());
    assert!(module.get("__path__").is_none());
    assert_eq!(str_attr(&module, "__package__").as_deref(), Some("work"));
    assert_eq!(str_attr(&module, "__name__").as_deref(), Some("work.report"));
    assert!(module.get("get_ipython").is_some());
}

#[test]
fn unreadable_notebook_fails_exec() {
    let env = env();
    let spec = ModuleSpec::new("gone", NotebookModuleProvider::TAG, "/nonexistent/gone.ipynb");
    let module = NotebookModuleProvider::default().create_module(&env, &spec);
    let err = NotebookModuleProvider::default()
        .exec_module(&env, &module)
        .err()
        .unwrap_or_else(|| panic!("exec succeeded"));
    assert!(err.to_string().starts_with("cannot read notebook /nonexistent/gone.ipynb"));
}
