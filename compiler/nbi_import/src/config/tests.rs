use std::ffi::OsString;
use std::path::PathBuf;

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn defaults_search_the_filesystem_root() {
    let config = ImportConfig::default();
    assert_eq!(config.search_paths, None);
    assert_eq!(config.notebook_extension, ".ipynb");
    assert_eq!(config.top_level_paths(), vec![PathBuf::from("/")]);
}

#[test]
fn explicit_paths_replace_the_root() {
    let config = ImportConfig::new(["/a", "/b"]).with_default_root("/ignored");
    assert_eq!(
        config.top_level_paths(),
        vec![PathBuf::from("/a"), PathBuf::from("/b")]
    );
}

#[test]
fn empty_search_path_falls_back_to_the_root() {
    let config = ImportConfig::new(Vec::<PathBuf>::new());
    assert_eq!(config.top_level_paths(), vec![PathBuf::from("/")]);
    let config = config.with_default_root("/srv/notebooks");
    assert_eq!(
        config.top_level_paths(),
        vec![PathBuf::from("/srv/notebooks")]
    );
}

#[test]
fn extension_gains_a_leading_dot() {
    assert_eq!(
        ImportConfig::default()
            .with_notebook_extension("nb")
            .notebook_extension,
        ".nb"
    );
    assert_eq!(
        ImportConfig::default()
            .with_notebook_extension(".json")
            .notebook_extension,
        ".json"
    );
}

#[test]
fn environment_values_are_split_and_trimmed() {
    let joined = std::env::join_paths(["/one", "/two"]).unwrap_or_else(|err| panic!("{err}"));
    let config = ImportConfig::from_vars(Some(joined), Some(" nb ".to_owned()));
    assert_eq!(
        config.search_paths,
        Some(vec![PathBuf::from("/one"), PathBuf::from("/two")])
    );
    assert_eq!(config.notebook_extension, ".nb");
}

#[test]
fn empty_environment_values_keep_defaults() {
    let config = ImportConfig::from_vars(Some(OsString::new()), Some(String::new()));
    assert_eq!(config, ImportConfig::default());
}
