//! Insertion-ordered dictionary storage.

use rustc_hash::FxHashMap;

use super::{HashKey, Value};

/// Entries in insertion order plus a hash index into them.
///
/// Callers compute [`HashKey`]s (and report unhashable keys) before touching
/// the dictionary.
#[derive(Clone, Default)]
pub struct DictValue {
    entries: Vec<(Value, Value)>,
    index: FxHashMap<HashKey, usize>,
}

impl DictValue {
    pub fn new() -> Self {
        DictValue::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &HashKey) -> Option<&Value> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn contains(&self, key: &HashKey) -> bool {
        self.index.contains_key(key)
    }

    /// Insert or overwrite. An existing entry keeps its original key and
    /// position.
    pub fn insert(&mut self, hash: HashKey, key: Value, value: Value) {
        if let Some(&i) = self.index.get(&hash) {
            self.entries[i].1 = value;
        } else {
            self.index.insert(hash, self.entries.len());
            self.entries.push((key, value));
        }
    }

    pub fn remove(&mut self, hash: &HashKey) -> Option<(Value, Value)> {
        let removed = self.index.remove(hash)?;
        for slot in self.index.values_mut() {
            if *slot > removed {
                *slot -= 1;
            }
        }
        Some(self.entries.remove(removed))
    }

    /// Remove and return the most recently inserted entry.
    pub fn pop_last(&mut self) -> Option<(Value, Value)> {
        let (key, value) = self.entries.pop()?;
        self.index.retain(|_, slot| *slot < self.entries.len());
        Some((key, value))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}
