// ── Core error types ──
//
// `StateError` covers construction of typed state nodes. `ActionError`
// is what an action body fails with; it becomes a model's terminal
// state, so it is cheap to clone and compares by message.
// `ModelError` is what callers of a model observe.

use std::sync::Arc;

use thiserror::Error;

/// Failure to build a typed state node from an untyped value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("cannot build a state map from a {found}")]
    NotAMap { found: &'static str },

    #[error("cannot build a state list from a {found}")]
    NotAList { found: &'static str },
}

/// The error an action returns to kill its model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ActionError {
    message: Arc<str>,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into().into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<StateError> for ActionError {
    fn from(err: StateError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<serde_json::Error> for ActionError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("invalid JSON: {err}"))
    }
}

/// Errors returned to callers of a [`Model`](crate::Model).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The model is in its terminal state. Carries the error that killed it.
    #[error("model is dead: {0}")]
    Dead(ActionError),

    #[error("unknown action '{name}'")]
    UnknownAction { name: String },

    /// The processor task is gone (its runtime shut down).
    #[error("model processor has shut down")]
    Closed,
}

impl ModelError {
    /// The terminal error, when this is a dead-model failure.
    pub fn action_error(&self) -> Option<&ActionError> {
        match self {
            Self::Dead(err) => Some(err),
            _ => None,
        }
    }
}
