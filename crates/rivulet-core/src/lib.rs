//! Core of the rivulet UI toolkit.
//!
//! - [`State`], [`Map`], [`List`]: immutable, structurally shared state trees.
//! - [`Model`]: a named set of actions over one current state, with
//!   serialized dispatch, ordered subscriber notification and a terminal
//!   dead state.
//! - [`StateStream`]: filterable, mergeable views over published states.
//! - [`Component`]: glue between a model and an external render surface.
//!
//! ```no_run
//! use rivulet_core::{ActionError, Actions, Model};
//! use serde_json::json;
//!
//! # async fn demo() -> Result<(), rivulet_core::ModelError> {
//! let model = Model::new(
//!     Actions::new().on("init", |_, _| Ok::<_, ActionError>(json!({"count": 0}))),
//! );
//! let state = model.call("init").await?;
//! # Ok(())
//! # }
//! ```

pub mod component;
pub mod error;
pub mod model;
pub mod state;
pub mod stream;

pub use component::{Component, ComponentOptions, Surface};
pub use error::{ActionError, ModelError, StateError};
pub use model::{
    ActionContext, Actions, Model, Outcome, Pending, Phase, Snapshot, SnapshotStream,
    Subscription,
};
pub use state::{List, Map, State};
pub use stream::{Observable, StateStream, shallow_merge};
