//! Insertion-ordered set storage.

use super::{DictValue, HashKey, Value};

/// Members in insertion order, kept as the keys of a [`DictValue`].
///
/// Like dicts, callers compute [`HashKey`]s before touching the set. Members
/// are always hashable, so the set algebra below recomputes their keys.
#[derive(Clone, Default)]
pub struct SetValue {
    members: DictValue,
}

impl SetValue {
    pub fn new() -> Self {
        SetValue::default()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, key: &HashKey) -> bool {
        self.members.contains(key)
    }

    /// Add `value` unless an equal member is present. Returns whether it
    /// was added.
    pub fn insert(&mut self, hash: HashKey, value: Value) -> bool {
        if self.members.contains(&hash) {
            return false;
        }
        self.members.insert(hash, value, Value::None);
        true
    }

    pub fn remove(&mut self, hash: &HashKey) -> Option<Value> {
        self.members.remove(hash).map(|(member, _)| member)
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.members.pop_last().map(|(member, _)| member)
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.members.keys()
    }

    fn keyed(&self) -> impl Iterator<Item = (HashKey, &Value)> {
        self.iter().filter_map(|member| Some((member.hash_key()?, member)))
    }

    fn filtered(&self, keep: impl Fn(&HashKey) -> bool) -> SetValue {
        let mut out = SetValue::new();
        for (hash, member) in self.keyed() {
            if keep(&hash) {
                out.insert(hash, member.clone());
            }
        }
        out
    }

    /// Add every member of `other`.
    pub fn extend(&mut self, other: &SetValue) {
        for (hash, member) in other.keyed() {
            self.insert(hash, member.clone());
        }
    }

    pub fn union(&self, other: &SetValue) -> SetValue {
        let mut out = self.clone();
        out.extend(other);
        out
    }

    pub fn intersection(&self, other: &SetValue) -> SetValue {
        self.filtered(|hash| other.contains(hash))
    }

    pub fn difference(&self, other: &SetValue) -> SetValue {
        self.filtered(|hash| !other.contains(hash))
    }

    pub fn symmetric_difference(&self, other: &SetValue) -> SetValue {
        let mut out = self.difference(other);
        out.extend(&other.difference(self));
        out
    }

    pub fn is_subset(&self, other: &SetValue) -> bool {
        self.len() <= other.len() && self.keyed().all(|(hash, _)| other.contains(&hash))
    }
}
