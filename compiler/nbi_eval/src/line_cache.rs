//! Source lines for traceback rendering.
//!
//! Code units are keyed by display name (for notebook cells,
//! `"<origin> (cell N)"`). The record holds the cell's original lines, so
//! line numbers in a traceback point at what the user wrote even though only
//! part of the cell was executed.

use std::cell::RefCell;
use std::time::SystemTime;

use rustc_hash::FxHashMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineAttributionRecord {
    /// Length of the source text in bytes.
    pub size: usize,
    /// Always `None`: cell text has no modification time.
    pub mtime: Option<SystemTime>,
    /// Lines with their endings kept.
    pub lines: Vec<String>,
    pub display_name: String,
}

impl LineAttributionRecord {
    pub fn new(display_name: impl Into<String>, source: &str) -> Self {
        LineAttributionRecord {
            size: source.len(),
            mtime: None,
            lines: source.split_inclusive('\n').map(str::to_owned).collect(),
            display_name: display_name.into(),
        }
    }
}

#[derive(Default)]
pub struct LineCache {
    records: RefCell<FxHashMap<String, LineAttributionRecord>>,
}

impl LineCache {
    pub fn new() -> Self {
        LineCache::default()
    }

    /// Install or replace the record for its display name.
    pub fn install(&self, record: LineAttributionRecord) {
        tracing::trace!(
            name = %record.display_name,
            lines = record.lines.len(),
            "line cache entry"
        );
        self.records
            .borrow_mut()
            .insert(record.display_name.clone(), record);
    }

    pub fn get(&self, display_name: &str) -> Option<LineAttributionRecord> {
        self.records.borrow().get(display_name).cloned()
    }

    pub fn contains(&self, display_name: &str) -> bool {
        self.records.borrow().contains_key(display_name)
    }

    /// 1-based `line` of `display_name`, without its line ending.
    pub fn line(&self, display_name: &str, line: u32) -> Option<String> {
        let records = self.records.borrow();
        let text = records
            .get(display_name)?
            .lines
            .get(usize::try_from(line).ok()?.checked_sub(1)?)?;
        Some(text.trim_end_matches(['\r', '\n']).to_owned())
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests;
