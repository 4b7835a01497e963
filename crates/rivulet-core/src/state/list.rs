// ── Persistent list ──
//
// Index-addressed sequence of state nodes. Insertion positions are
// clamped into `0..=len`; removals outside the list are no-ops that
// hand back the same backing vector.

use std::sync::Arc;

use serde_json::Value;

use super::State;
use crate::error::StateError;

/// An immutable, ordered sequence of state nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct List {
    items: Arc<Vec<State>>,
}

impl List {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_items(items: Vec<State>) -> Self {
        Self {
            items: Arc::new(items),
        }
    }

    pub fn get(&self, index: usize) -> Option<&State> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, State> {
        self.items.iter()
    }

    pub fn ptr_eq(&self, other: &List) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }

    // ── Updates ──────────────────────────────────────────────────────

    /// Insert `item` at `index`, clamped to the end of the list.
    pub fn insert(&self, index: usize, item: impl Into<State>) -> List {
        let index = index.min(self.len());
        let mut items = Vec::with_capacity(self.len() + 1);
        items.extend_from_slice(&self.items[..index]);
        items.push(item.into());
        items.extend_from_slice(&self.items[index..]);
        Self::from_items(items)
    }

    /// Insert one slot past the end. Clamping turns this into an append.
    pub fn add(&self, item: impl Into<State>) -> List {
        self.insert(self.len() + 1, item)
    }

    /// Append `item`.
    pub fn push(&self, item: impl Into<State>) -> List {
        self.insert(self.len(), item)
    }

    /// Remove the *first* element.
    pub fn pop(&self) -> List {
        self.remove(0)
    }

    /// Remove the *last* element.
    pub fn shift(&self) -> List {
        match self.len().checked_sub(1) {
            Some(last) => self.remove(last),
            None => self.clone(),
        }
    }

    /// Prepend `item`.
    pub fn unshift(&self, item: impl Into<State>) -> List {
        self.insert(0, item)
    }

    /// Remove the element at `index`.
    ///
    /// Out-of-range indices return a list sharing this list's storage.
    pub fn remove(&self, index: usize) -> List {
        if index >= self.len() {
            return self.clone();
        }
        let mut items = Vec::clone(&self.items);
        items.remove(index);
        Self::from_items(items)
    }

    pub fn to_json(&self) -> Value {
        Value::Array(self.items.iter().map(State::to_json).collect())
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a State;
    type IntoIter = std::slice::Iter<'a, State>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V: Into<State>> FromIterator<V> for List {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::from_items(iter.into_iter().map(Into::into).collect())
    }
}

impl TryFrom<Value> for List {
    type Error = StateError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match State::from(value) {
            State::List(list) => Ok(list),
            other => Err(StateError::NotAList {
                found: other.type_name(),
            }),
        }
    }
}

impl TryFrom<State> for List {
    type Error = StateError;

    fn try_from(state: State) -> Result<Self, Self::Error> {
        match state {
            State::List(list) => Ok(list),
            other => Err(StateError::NotAList {
                found: other.type_name(),
            }),
        }
    }
}
