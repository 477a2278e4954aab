use std::path::PathBuf;

use pretty_assertions::assert_eq;

use super::*;

fn text(module: &ModuleObject, name: &str) -> Option<String> {
    module.get(name)?.as_str().map(str::to_owned)
}

#[test]
fn plain_module_metadata() {
    let module = ModuleObject::new(
        "pkg.analysis",
        Some(PathBuf::from("/nb/pkg/Analysis.ipynb")),
        Some("notebook"),
    );
    assert_eq!(text(&module, "__name__").as_deref(), Some("pkg.analysis"));
    assert_eq!(text(&module, "__package__").as_deref(), Some("pkg"));
    assert_eq!(
        text(&module, "__file__").as_deref(),
        Some("/nb/pkg/Analysis.ipynb")
    );
    assert_eq!(text(&module, "__loader__").as_deref(), Some("notebook"));
    assert!(!module.is_package());
    assert!(module.get("__path__").is_none());
}

#[test]
fn top_level_module_has_empty_package() {
    let module = ModuleObject::new("solo", None, None);
    assert_eq!(module.package_name().as_deref(), Some(""));
    assert!(module.get("__file__").is_some_and(|v| v.is_none()));
}

#[test]
fn package_exposes_search_paths() {
    let dir = PathBuf::from("/nb/pkg");
    let module = ModuleObject::package("pkg", Some(dir.clone()), Some("directory"), vec![dir.clone()]);
    assert!(module.is_package());
    assert_eq!(module.search_paths(), Some(&[dir][..]));
    assert_eq!(module.package_name().as_deref(), Some("pkg"));
    match module.get("__path__") {
        Some(Value::List(items)) => assert_eq!(items.borrow().len(), 1),
        other => panic!("unexpected __path__: {other:?}"),
    }
}
