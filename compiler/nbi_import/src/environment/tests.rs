use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use nbi_eval::{buffer_sink, ImportFailure, ImportHook, ModuleObject, Value};
use pretty_assertions::assert_eq;

use super::*;
use crate::document::{DocumentError, DocumentErrorKind};

/// Finder answering for a fixed set of names without touching the disk.
struct StubFinder {
    tag: &'static str,
    names: &'static [&'static str],
    packages: bool,
    fail: bool,
    reenter: bool,
    seen_self: Cell<bool>,
}

impl StubFinder {
    fn new(tag: &'static str, names: &'static [&'static str]) -> Self {
        StubFinder {
            tag,
            names,
            packages: false,
            fail: false,
            reenter: false,
            seen_self: Cell::new(false),
        }
    }
}

impl Finder for StubFinder {
    fn tag(&self) -> &'static str {
        self.tag
    }

    fn find_spec(
        &self,
        name: &str,
        path: &[PathBuf],
        _target: Option<&ModuleObject>,
    ) -> Option<ModuleSpec> {
        let dir = path.first()?;
        self.names
            .contains(&name)
            .then(|| ModuleSpec::new(name, self.tag, dir.join(name)))
    }

    fn create_module(&self, _env: &ImportEnvironment, spec: &ModuleSpec) -> Rc<ModuleObject> {
        let origin = Some(spec.origin.clone());
        Rc::new(if self.packages {
            let paths = vec![spec.origin.clone()];
            ModuleObject::package(spec.name.as_str(), origin, Some(self.tag), paths)
        } else {
            ModuleObject::new(spec.name.as_str(), origin, Some(self.tag))
        })
    }

    fn exec_module(
        &self,
        env: &ImportEnvironment,
        module: &Rc<ModuleObject>,
    ) -> Result<(), ImportError> {
        if self.reenter {
            let again = env.import_module(module.name())?;
            self.seen_self.set(Rc::ptr_eq(&again, module));
        }
        if self.fail {
            return Err(ImportError::Document(DocumentError {
                path: PathBuf::from("/stub"),
                kind: DocumentErrorKind::UnsupportedVersion(9),
            }));
        }
        module.namespace().set("loaded_by", Value::from(self.tag));
        Ok(())
    }
}

fn bare() -> ImportEnvironment {
    ImportEnvironment::bare_with_output(ImportConfig::new(["/stub"]), buffer_sink(), buffer_sink())
}

fn loaded_by(module: &ModuleObject) -> Option<String> {
    module.get("loaded_by")?.as_str().map(str::to_owned)
}

#[test]
fn default_finders_are_notebook_then_directory() {
    let env = ImportEnvironment::with_output(ImportConfig::default(), buffer_sink(), buffer_sink());
    assert_eq!(env.finder_tags(), ["notebook", "directory"]);
    assert!(bare().finder_tags().is_empty());
}

#[test]
fn first_finder_wins() {
    let env = bare();
    env.add_finder(Rc::new(StubFinder::new("first", &["shared"])));
    env.add_finder(Rc::new(StubFinder::new("second", &["shared", "only_second"])));

    let shared = env.import_module("shared").unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(loaded_by(&shared).as_deref(), Some("first"));
    let second = env.import_module("only_second").unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(loaded_by(&second).as_deref(), Some("second"));
    assert_eq!(
        env.find_spec("shared", &[PathBuf::from("/x")]).map(|spec| spec.loader),
        Some("first")
    );
}

#[test]
fn registry_returns_the_same_module() {
    let env = bare();
    env.add_finder(Rc::new(StubFinder::new("stub", &["m"])));
    let first = env.import_module("m").unwrap_or_else(|err| panic!("{err}"));
    let second = env.import_module("m").unwrap_or_else(|err| panic!("{err}"));
    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(env.module_names(), ["m"]);

    let removed = env.remove_module("m").unwrap_or_else(|| panic!("not registered"));
    assert!(Rc::ptr_eq(&removed, &first));
    assert!(env.module("m").is_none());
}

#[test]
fn inserted_modules_short_circuit_finders() {
    let env = bare();
    let module = Rc::new(ModuleObject::new("virtual", None, None));
    assert!(env.insert_module(Rc::clone(&module)).is_none());
    let found = env.import_module("virtual").unwrap_or_else(|err| panic!("{err}"));
    assert!(Rc::ptr_eq(&found, &module));
}

#[test]
fn misses_and_bad_names() {
    let env = bare();
    assert!(matches!(
        env.import_module("nowhere"),
        Err(ImportError::NotFound(name)) if name == "nowhere"
    ));
    assert!(matches!(env.import_module(""), Err(ImportError::InvalidName(_))));
    assert!(matches!(env.import_module("a..b"), Err(ImportError::InvalidName(_))));
}

#[test]
fn children_need_a_package_parent() {
    let env = bare();
    env.add_finder(Rc::new(StubFinder::new("stub", &["plain", "plain.child"])));
    let err = env
        .import_module("plain.child")
        .err()
        .unwrap_or_else(|| panic!("imported through a non-package"));
    assert_eq!(err.to_string(), "No module named 'plain.child'; 'plain' is not a package");
    assert!(env.module("plain").is_some());
}

#[test]
fn children_are_bound_on_their_parent() {
    let env = bare();
    let mut packages = StubFinder::new("pkg", &["outer", "outer.inner"]);
    packages.packages = true;
    env.add_finder(Rc::new(packages));
    env.add_finder(Rc::new(StubFinder::new("leaf", &["outer.inner.leaf"])));

    let leaf = env.import_module("outer.inner.leaf").unwrap_or_else(|err| panic!("{err}"));
    assert_eq!(env.module_names(), ["outer", "outer.inner", "outer.inner.leaf"]);
    let outer = env.module("outer").unwrap_or_else(|| panic!("outer missing"));
    let Some(Value::Module(inner)) = outer.get("inner") else {
        panic!("inner not bound on outer");
    };
    let Some(Value::Module(bound)) = inner.get("leaf") else {
        panic!("leaf not bound on inner");
    };
    assert!(Rc::ptr_eq(&bound, &leaf));
    let origin = PathBuf::from("/stub/outer/outer.inner/outer.inner.leaf");
    assert_eq!(leaf.origin(), Some(origin.as_path()));
}

#[test]
fn failed_exec_unregisters_the_module() {
    let env = bare();
    let mut failing = StubFinder::new("broken", &["broken"]);
    failing.fail = true;
    env.add_finder(Rc::new(failing));
    assert!(matches!(env.import_module("broken"), Err(ImportError::Document(_))));
    assert!(env.module("broken").is_none());
    assert!(env.module_names().is_empty());
}

#[test]
fn reentrant_import_sees_the_loading_module() {
    let env = bare();
    let mut finder = StubFinder::new("loop", &["cycle"]);
    finder.reenter = true;
    let finder = Rc::new(finder);
    env.add_finder(Rc::clone(&finder) as Rc<dyn Finder>);
    env.import_module("cycle").unwrap_or_else(|err| panic!("{err}"));
    assert!(finder.seen_self.get());
}

#[test]
fn hook_maps_errors_to_failures() {
    let env = bare();
    let mut failing = StubFinder::new("broken", &["broken"]);
    failing.fail = true;
    env.add_finder(Rc::new(failing));
    env.add_finder(Rc::new(StubFinder::new("stub", &["plain"])));

    let hook: &dyn ImportHook = &env;
    assert_eq!(
        hook.import_module("missing").err(),
        Some(ImportFailure::NotFound {
            name: "missing".to_owned(),
            message: "No module named 'missing'".to_owned(),
        })
    );
    assert!(matches!(
        hook.import_module("plain.sub").err(),
        Some(ImportFailure::NotFound { name, .. }) if name == "plain.sub"
    ));
    assert!(matches!(
        hook.import_module("broken").err(),
        Some(ImportFailure::Failed { message }) if message.contains("unsupported nbformat version 9")
    ));
}
