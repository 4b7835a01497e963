// ── Derived state streams ──
//
// A `StateStream` is a model with a single forwarding action, fed by a
// subscription on some upstream model or stream. Filters and merges are
// further streams whose backing action applies the user function. Death
// upstream is forwarded as death downstream.

use std::sync::{Arc, Mutex, PoisonError};

use crate::error::ActionError;
use crate::model::{Actions, Model, Outcome, Pending, Snapshot, SnapshotStream, Subscription};
use crate::state::State;

const IN: &str = "in";
const OURS: &str = "ours";
const THEIRS: &str = "theirs";

/// Anything that publishes snapshots: a [`Model`] or a [`StateStream`].
pub trait Observable {
    fn observe<F>(&self, subscriber: F) -> Subscription
    where
        F: FnMut(&Snapshot) + Send + 'static;
}

impl Observable for Model {
    fn observe<F>(&self, subscriber: F) -> Subscription
    where
        F: FnMut(&Snapshot) + Send + 'static,
    {
        self.subscribe(subscriber)
    }
}

impl Observable for StateStream {
    fn observe<F>(&self, subscriber: F) -> Subscription
    where
        F: FnMut(&Snapshot) + Send + 'static,
    {
        self.subscribe(subscriber)
    }
}

/// A derived, read-only view over a published state sequence.
///
/// Dropping a stream does not disconnect it; call
/// [`disconnect`](Self::disconnect) to stop forwarding.
#[derive(Debug)]
pub struct StateStream {
    backing: Model,
    upstream: Vec<Subscription>,
}

impl StateStream {
    /// Forward every state `source` publishes into a new stream.
    pub fn new(source: &impl Observable) -> Self {
        let backing = Model::new(Actions::new().on(IN, |_, args| {
            Ok::<_, ActionError>(args.into_iter().next())
        }));
        let feed = source.observe(forward_into(backing.clone(), IN));
        Self {
            backing,
            upstream: vec![feed],
        }
    }

    pub fn subscribe<F>(&self, subscriber: F) -> Subscription
    where
        F: FnMut(&Snapshot) + Send + 'static,
    {
        self.backing.subscribe(subscriber)
    }

    /// The last state this stream published, `None` before the first one.
    pub fn out(&self) -> Option<State> {
        self.backing.state()
    }

    /// Published snapshots as a `Stream`.
    pub fn changes(&self) -> SnapshotStream {
        self.backing.changes()
    }

    /// A stream of `map` applied to every state this one publishes.
    ///
    /// `map` returning `None` (or [`Outcome::Unchanged`]) drops the value.
    pub fn filter<F, O>(&self, map: F) -> StateStream
    where
        F: Fn(&State) -> O + Send + Sync + 'static,
        O: Into<Outcome>,
    {
        let backing = Model::new(Actions::new().on(IN, move |_, args| {
            Ok::<_, ActionError>(args.first().map_or(Outcome::Unchanged, |state| map(state).into()))
        }));
        let feed = self.backing.subscribe(forward_into(backing.clone(), IN));
        Self {
            backing,
            upstream: vec![feed],
        }
    }

    /// A stream of `merge(ours, theirs)`, recomputed whenever either side
    /// publishes. A side that has not published yet is passed as `None`.
    pub fn merge<S, F, O>(&self, other: &S, merge: F) -> StateStream
    where
        S: Observable,
        F: Fn(Option<&State>, Option<&State>) -> O + Send + Sync + 'static,
        O: Into<Outcome>,
    {
        let sides = Mutex::new(Sides::default());
        let update = Arc::new(move |side: Side, state: State| -> Outcome {
            let mut sides = sides.lock().unwrap_or_else(PoisonError::into_inner);
            match side {
                Side::Ours => sides.ours = Some(state),
                Side::Theirs => sides.theirs = Some(state),
            }
            merge(sides.ours.as_ref(), sides.theirs.as_ref()).into()
        });
        let update_ours = Arc::clone(&update);

        let backing = Model::new(
            Actions::new()
                .on(OURS, move |_, args| {
                    Ok::<_, ActionError>(
                        args.into_iter()
                            .next()
                            .map_or(Outcome::Unchanged, |state| update_ours(Side::Ours, state)),
                    )
                })
                .on(THEIRS, move |_, args| {
                    Ok::<_, ActionError>(
                        args.into_iter()
                            .next()
                            .map_or(Outcome::Unchanged, |state| update(Side::Theirs, state)),
                    )
                }),
        );

        let theirs = other.observe(forward_into(backing.clone(), THEIRS));
        let ours = self.backing.subscribe(forward_into(backing.clone(), OURS));
        Self {
            backing,
            upstream: vec![ours, theirs],
        }
    }

    /// [`merge`](Self::merge) with [`shallow_merge`].
    pub fn merge_default<S: Observable>(&self, other: &S) -> StateStream {
        self.merge(other, shallow_merge)
    }

    /// An independent stream over the same sequence.
    pub fn pipe(&self) -> StateStream {
        StateStream::new(self)
    }

    /// Publish `state` through this stream as if it came from upstream.
    pub fn emit(&self, state: impl Into<State>) -> Pending {
        self.backing.dispatch(IN, [state.into()])
    }

    /// Stop forwarding upstream states into this stream. Idempotent.
    pub fn disconnect(&self) {
        for feed in &self.upstream {
            feed.unsubscribe();
        }
    }

    pub fn is_connected(&self) -> bool {
        self.upstream.iter().any(Subscription::is_active)
    }

    /// The model backing this stream.
    pub fn model(&self) -> &Model {
        &self.backing
    }
}

/// Right-biased shallow merge used by [`StateStream::merge_default`].
///
/// Two maps merge key by key; otherwise the newest available side wins.
pub fn shallow_merge(ours: Option<&State>, theirs: Option<&State>) -> Outcome {
    match (ours, theirs) {
        (Some(State::Map(ours)), Some(State::Map(theirs))) => ours.merge(theirs).into(),
        (_, Some(theirs)) => Outcome::Replace(theirs.clone()),
        (Some(ours), None) => Outcome::Replace(ours.clone()),
        (None, None) => Outcome::Unchanged,
    }
}

#[derive(Clone, Copy)]
enum Side {
    Ours,
    Theirs,
}

#[derive(Default)]
struct Sides {
    ours: Option<State>,
    theirs: Option<State>,
}

fn forward_into(target: Model, action: &'static str) -> impl FnMut(&Snapshot) + Send + 'static {
    move |snapshot| match snapshot {
        Snapshot::Active(state) => target.dispatch(action, [state.clone()]).detach(),
        Snapshot::Dead(error) => target.kill(error.clone()).detach(),
    }
}
