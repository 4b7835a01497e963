// ── Persistent state tree ──
//
// Immutable, structurally shared values. Maps and lists hold their
// children behind an `Arc`, so every update clones one table and shares
// every untouched subtree with the value it was derived from.

mod list;
mod map;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

pub use list::List;
pub use map::Map;

/// A node of a persistent state tree.
///
/// Scalars are stored inline; maps and lists are reference-counted and
/// never mutated after construction. "No value" is expressed as
/// `Option<State>::None` wherever an operation may yield nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum State {
    Null,
    Bool(bool),
    Number(Number),
    String(Arc<str>),
    List(List),
    Map(Map),
}

impl State {
    /// Wrap a value into a state node.
    ///
    /// Plain JSON input is classified recursively (arrays become lists,
    /// objects become maps). Wrapping a `State` returns it unchanged.
    pub fn wrap(input: impl Into<State>) -> State {
        input.into()
    }

    /// An empty map node.
    pub fn empty_map() -> State {
        State::Map(Map::new())
    }

    /// Short name of the variant, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Self::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Self::Map(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Look up `key` when this node is a map.
    pub fn get(&self, key: &str) -> Option<&State> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Look up `index` when this node is a list.
    pub fn at(&self, index: usize) -> Option<&State> {
        self.as_list().and_then(|list| list.get(index))
    }

    /// Reference identity for maps and lists, value equality for scalars.
    pub fn ptr_eq(&self, other: &State) -> bool {
        match (self, other) {
            (Self::Map(a), Self::Map(b)) => a.ptr_eq(b),
            (Self::List(a), Self::List(b)) => a.ptr_eq(b),
            (Self::Map(_) | Self::List(_), _) | (_, Self::Map(_) | Self::List(_)) => false,
            (a, b) => a == b,
        }
    }

    /// Recursively unwrap into plain JSON.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::String(s) => Value::String(s.to_string()),
            Self::List(list) => list.to_json(),
            Self::Map(map) => map.to_json(),
        }
    }
}

impl Default for State {
    fn default() -> Self {
        Self::empty_map()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<Value> for State {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s.into()),
            Value::Array(items) => Self::List(items.into_iter().map(State::from).collect()),
            Value::Object(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, State::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&Value> for State {
    fn from(value: &Value) -> Self {
        Self::from(value.clone())
    }
}

impl From<Map> for State {
    fn from(map: Map) -> Self {
        Self::Map(map)
    }
}

impl From<List> for State {
    fn from(list: List) -> Self {
        Self::List(list)
    }
}

impl From<Vec<State>> for State {
    fn from(items: Vec<State>) -> Self {
        Self::List(items.into_iter().collect())
    }
}

impl From<bool> for State {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for State {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<String> for State {
    fn from(s: String) -> Self {
        Self::String(s.into())
    }
}

impl From<Arc<str>> for State {
    fn from(s: Arc<str>) -> Self {
        Self::String(s)
    }
}

impl From<i32> for State {
    fn from(n: i32) -> Self {
        Self::Number(n.into())
    }
}

impl From<i64> for State {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<u32> for State {
    fn from(n: u32) -> Self {
        Self::Number(n.into())
    }
}

impl From<u64> for State {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

impl From<usize> for State {
    fn from(n: usize) -> Self {
        Self::Number(n.into())
    }
}

/// Non-finite floats have no JSON representation and become `Null`.
impl From<f64> for State {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Self::Null, Self::Number)
    }
}

impl From<&State> for Value {
    fn from(state: &State) -> Self {
        state.to_json()
    }
}

impl From<State> for Value {
    fn from(state: State) -> Self {
        state.to_json()
    }
}

// ── Serde ────────────────────────────────────────────────────────────

impl Serialize for State {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::List(list) => serializer.collect_seq(list.iter()),
            Self::Map(map) => serializer.collect_map(map.iter()),
        }
    }
}

impl<'de> Deserialize<'de> for State {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(State::from)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn wrap_classifies_nested_input() {
        let state = State::wrap(json!({"a": [1, {"b": true}], "c": null, "d": "x"}));
        let map = state.as_map().unwrap();
        assert!(map.get("a").unwrap().is_list());
        assert!(map.get("a").unwrap().at(1).unwrap().is_map());
        assert!(map.get("c").unwrap().is_null());
        assert_eq!(map.get("d").unwrap().as_str(), Some("x"));
    }

    #[test]
    fn wrap_is_idempotent() {
        let state = State::wrap(json!({"a": {"b": 1}}));
        let again = State::wrap(state.clone());
        assert!(again.ptr_eq(&state));
    }

    #[test]
    fn scalars_are_not_wrapped() {
        assert_eq!(State::wrap(json!(3)).as_i64(), Some(3));
        assert_eq!(State::wrap(json!("s")).as_str(), Some("s"));
        assert!(State::wrap(json!(null)).is_null());
        assert_eq!(State::wrap(false).as_bool(), Some(false));
    }

    #[test]
    fn round_trips_plain_json() {
        let input = json!({
            "user": {"name": "ada", "tags": ["x", "y"], "age": 36, "ratio": 0.5},
            "flags": [true, false, null],
            "empty": {},
            "nested": [[1, 2], [3]]
        });
        assert_eq!(State::wrap(input.clone()).to_json(), input);
    }

    #[test]
    fn non_finite_floats_become_null() {
        assert!(State::from(f64::NAN).is_null());
    }

    #[test]
    fn get_on_non_map_is_none() {
        assert!(State::from(1).get("a").is_none());
        assert!(State::from("s").at(0).is_none());
    }

    #[test]
    fn serializes_as_plain_json() {
        let state = State::wrap(json!({"a": [1, "b"]}));
        let text = serde_json::to_string(&state).unwrap();
        let back: State = serde_json::from_str(&text).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn display_prints_strings_bare() {
        assert_eq!(State::from("hi").to_string(), "hi");
        assert_eq!(State::wrap(json!([1, 2])).to_string(), "[1,2]");
    }
}
