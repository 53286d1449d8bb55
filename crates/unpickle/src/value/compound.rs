//! Compound value types: dicts and sets

use indexmap::{IndexMap, IndexSet};

use super::compare::{Comparison, GuardedKey};
use super::{HashableValue, Value};

/// An insertion-ordered mapping from value to value.
///
/// Uses IndexMap so that iteration (and JSON output) follows first
/// insertion. Setting an existing key replaces its value in place without
/// moving it.
#[derive(Debug, Clone, Default)]
pub struct Dict {
    entries: IndexMap<HashableValue, Value>,
}

impl Dict {
    /// Create an empty dict
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty dict with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Set a key/value pair (builder pattern)
    pub fn with_entry(mut self, key: impl Into<Value>, value: impl Into<Value>) -> Self {
        self.insert(key.into(), value.into());
        self
    }

    /// Set a key/value pair, returning the previous value for the key
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        self.entries.insert(HashableValue(key), value)
    }

    /// Get the value for a key
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(&HashableValue(key.clone()))
    }

    /// Get the value for a text key
    pub fn get_str(&self, key: &str) -> Option<&Value> {
        self.get(&Value::text(key))
    }

    /// Get an entry by insertion index
    pub fn get_index(&self, index: usize) -> Option<(&Value, &Value)> {
        self.entries.get_index(index).map(|(k, v)| (&k.0, v))
    }

    /// Check whether a key is present
    pub fn contains_key(&self, key: &Value) -> bool {
        self.get(key).is_some()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dict is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (&k.0, v))
    }

    /// Iterate keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.keys().map(|k| &k.0)
    }

    pub(crate) fn get_guarded(&self, key: &GuardedKey<'_>) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Move every key and value out, leaving the dict empty.
    pub(crate) fn drain_into(&mut self, out: &mut Vec<Value>) {
        for (key, value) in self.entries.drain(..) {
            out.push(key.0);
            out.push(value);
        }
    }
}

impl FromIterator<(Value, Value)> for Dict {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        let mut dict = Dict::new();
        dict.extend(iter);
        dict
    }
}

impl Extend<(Value, Value)> for Dict {
    fn extend<I: IntoIterator<Item = (Value, Value)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

/// A collection of distinct values, iterated in first-insertion order.
#[derive(Debug, Clone, Default)]
pub struct Set {
    items: IndexSet<HashableValue>,
}

impl Set {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value; returns false if an equal value was already present
    pub fn add(&mut self, value: Value) -> bool {
        self.items.insert(HashableValue(value))
    }

    /// Check whether an equal value is present
    pub fn contains(&self, value: &Value) -> bool {
        self.items.contains(&HashableValue(value.clone()))
    }

    /// Number of distinct values
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate values in first-insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter().map(|v| &v.0)
    }

    pub(crate) fn contains_guarded(&self, value: &GuardedKey<'_>) -> bool {
        self.items.contains(value)
    }

    /// Move every member out, leaving the set empty.
    pub(crate) fn drain_into(&mut self, out: &mut Vec<Value>) {
        out.extend(self.items.drain(..).map(|v| v.0));
    }
}

impl FromIterator<Value> for Set {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut set = Set::new();
        set.extend(iter);
        set
    }
}

impl Extend<Value> for Set {
    fn extend<I: IntoIterator<Item = Value>>(&mut self, iter: I) {
        for v in iter {
            self.add(v);
        }
    }
}

impl PartialEq for Dict {
    /// Order-insensitive comparison, like a plain mapping
    fn eq(&self, other: &Self) -> bool {
        Comparison::default().dicts(self, other)
    }
}

impl Dict {
    /// Order-sensitive comparison, like an ordered mapping
    pub fn eq_ordered(&self, other: &Self) -> bool {
        Comparison::default().dicts_ordered(self, other)
    }
}

impl PartialEq for Set {
    fn eq(&self, other: &Self) -> bool {
        Comparison::default().sets(self, other)
    }
}
