// ── Persistent map ──
//
// String-keyed table of state nodes. Updates copy the key table (a
// shallow clone of `Arc` handles) and leave every child shared.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use super::State;
use crate::error::StateError;

/// An immutable map from string keys to state nodes.
///
/// Callers must not rely on key order; iteration happens to be sorted
/// but that is an artifact of the backing table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Map {
    entries: Arc<BTreeMap<Arc<str>, State>>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_entries(entries: BTreeMap<Arc<str>, State>) -> Self {
        Self {
            entries: Arc::new(entries),
        }
    }

    pub fn get(&self, key: &str) -> Option<&State> {
        self.entries.get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(AsRef::as_ref)
    }

    pub fn values(&self) -> impl Iterator<Item = &State> {
        self.entries.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &State)> {
        self.entries.iter().map(|(k, v)| (k.as_ref(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Same backing table, i.e. one map was derived from the other by a no-op.
    pub fn ptr_eq(&self, other: &Map) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }

    // ── Updates ──────────────────────────────────────────────────────

    /// Return a new map with `key` set to `value`.
    pub fn put(&self, key: impl Into<Arc<str>>, value: impl Into<State>) -> Map {
        let mut entries = BTreeMap::clone(&self.entries);
        entries.insert(key.into(), value.into());
        Self::from_entries(entries)
    }

    /// Like [`put`](Self::put), but `None` removes the key.
    pub fn put_opt(&self, key: impl Into<Arc<str>>, value: Option<State>) -> Map {
        let key = key.into();
        match value {
            Some(value) => self.put(key, value),
            None => self.remove(&key),
        }
    }

    /// Return a map without `key`.
    ///
    /// When `key` is absent the returned map shares this map's table, so
    /// `map.remove(absent).ptr_eq(&map)` holds.
    pub fn remove(&self, key: &str) -> Map {
        if !self.has(key) {
            return self.clone();
        }
        let mut entries = BTreeMap::clone(&self.entries);
        entries.remove(key);
        Self::from_entries(entries)
    }

    /// Shallow merge: every key of `other` overwrites the same key here.
    pub fn merge(&self, other: &Map) -> Map {
        if other.is_empty() {
            return self.clone();
        }
        let mut entries = BTreeMap::clone(&self.entries);
        for (key, value) in other.entries.iter() {
            entries.insert(Arc::clone(key), value.clone());
        }
        Self::from_entries(entries)
    }

    /// Recursive merge.
    ///
    /// Descends only where both sides hold a map under the same key. Any
    /// other incoming value, lists included, replaces the existing one.
    pub fn deep_merge(&self, other: &Map) -> Map {
        if other.is_empty() {
            return self.clone();
        }
        let mut entries = BTreeMap::clone(&self.entries);
        for (key, incoming) in other.entries.iter() {
            let merged = match (entries.get(key), incoming) {
                (Some(State::Map(current)), State::Map(incoming)) => {
                    State::Map(current.deep_merge(incoming))
                }
                _ => incoming.clone(),
            };
            entries.insert(Arc::clone(key), merged);
        }
        Self::from_entries(entries)
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_json()))
                .collect(),
        )
    }
}

impl<K: Into<Arc<str>>, V: Into<State>> FromIterator<(K, V)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_entries(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl TryFrom<Value> for Map {
    type Error = StateError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match State::from(value) {
            State::Map(map) => Ok(map),
            other => Err(StateError::NotAMap {
                found: other.type_name(),
            }),
        }
    }
}

impl TryFrom<State> for Map {
    type Error = StateError;

    fn try_from(state: State) -> Result<Self, Self::Error> {
        match state {
            State::Map(map) => Ok(map),
            other => Err(StateError::NotAMap {
                found: other.type_name(),
            }),
        }
    }
}
