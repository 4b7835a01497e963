// ── Actions ──
//
// Named state transitions registered on a model. An action sees the
// current state through an explicit context and reports the next state
// as an `Outcome`; returning `Err` kills the model.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::Model;
use crate::error::ActionError;
use crate::state::{List, Map, State};

/// Type-erased action body.
pub type ActionFn =
    dyn Fn(&ActionContext, Vec<State>) -> Result<Outcome, ActionError> + Send + Sync;

/// What an action asks the model to do with its state.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Keep the current state; nothing is published.
    Unchanged,
    /// Replace the state with an empty map.
    Reset,
    /// Replace the state with the given node.
    Replace(State),
}

impl From<State> for Outcome {
    fn from(state: State) -> Self {
        Self::Replace(state)
    }
}

impl From<Map> for Outcome {
    fn from(map: Map) -> Self {
        Self::Replace(State::Map(map))
    }
}

impl From<List> for Outcome {
    fn from(list: List) -> Self {
        Self::Replace(State::List(list))
    }
}

impl From<Option<State>> for Outcome {
    fn from(state: Option<State>) -> Self {
        state.map_or(Self::Unchanged, Self::Replace)
    }
}

impl From<Option<Map>> for Outcome {
    fn from(map: Option<Map>) -> Self {
        map.map_or(Self::Unchanged, Self::from)
    }
}

/// JSON `null` resets, anything else is wrapped.
impl From<Value> for Outcome {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Reset,
            other => Self::Replace(State::from(other)),
        }
    }
}

/// What an action body can see while it runs.
pub struct ActionContext {
    pub(crate) state: Option<State>,
    pub(crate) model: Model,
}

impl ActionContext {
    /// The current state, or an empty map before the first transition.
    pub fn state(&self) -> State {
        self.state.clone().unwrap_or_default()
    }

    /// The current state when it is a map, otherwise an empty map.
    ///
    /// Convenience for merge-style actions:
    /// `Ok(ctx.state_map().merge(&patch).into())`.
    pub fn state_map(&self) -> Map {
        match &self.state {
            Some(State::Map(map)) => map.clone(),
            _ => Map::new(),
        }
    }

    /// Whether any state has been set yet.
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// The model running this action.
    ///
    /// Actions dispatched through it are queued behind the current one and
    /// run only after it has completed.
    pub fn model(&self) -> &Model {
        &self.model
    }
}

impl fmt::Debug for ActionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionContext")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Builder for the action table a [`Model`] is constructed from.
#[derive(Clone, Default)]
pub struct Actions {
    pub(crate) table: BTreeMap<String, Arc<ActionFn>>,
}

impl Actions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `action` under `name`, replacing any earlier registration.
    pub fn on<F, O>(mut self, name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&ActionContext, Vec<State>) -> Result<O, ActionError> + Send + Sync + 'static,
        O: Into<Outcome>,
    {
        let body: Arc<ActionFn> = Arc::new(move |ctx: &ActionContext, args: Vec<State>| {
            action(ctx, args).map(Into::into)
        });
        self.table.insert(name.into(), body);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl fmt::Debug for Actions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}
