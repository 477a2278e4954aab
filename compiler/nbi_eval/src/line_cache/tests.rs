use pretty_assertions::assert_eq;

use super::*;

#[test]
fn record_keeps_line_endings() {
    let record = LineAttributionRecord::new("nb.ipynb (cell 1)", "x = 1\r\ndef f():\n    pass");
    assert_eq!(record.lines, vec!["x = 1\r\n", "def f():\n", "    pass"]);
    assert_eq!(record.size, 24);
    assert_eq!(record.mtime, None);
}

#[test]
fn lines_are_one_based_and_trimmed() {
    let cache = LineCache::new();
    cache.install(LineAttributionRecord::new("cell", "a = 1\nb = 2\n"));
    assert_eq!(cache.line("cell", 2).as_deref(), Some("b = 2"));
    assert_eq!(cache.line("cell", 0), None);
    assert_eq!(cache.line("cell", 3), None);
    assert_eq!(cache.line("other", 1), None);
}

#[test]
fn install_replaces_existing_record() {
    let cache = LineCache::new();
    cache.install(LineAttributionRecord::new("cell", "old\n"));
    cache.install(LineAttributionRecord::new("cell", "new\n"));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.line("cell", 1).as_deref(), Some("new"));
}
