// ── Model processor task ──
//
// Drains a model's queue one envelope at a time. This task is the only
// owner of the current state and the subscriber registry.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use super::{
    ActionContext, ActionFn, Envelope, Model, ModelInner, Outcome, Snapshot, SubscriberEntry,
};
use crate::error::{ActionError, ModelError};
use crate::state::State;

enum Slot {
    Uninitialized,
    Active(State),
    Dead(ActionError),
}

impl Slot {
    fn state(&self) -> Option<&State> {
        match self {
            Self::Active(state) => Some(state),
            Self::Uninitialized | Self::Dead(_) => None,
        }
    }
}

pub(super) struct Processor {
    actions: BTreeMap<String, Arc<ActionFn>>,
    slot: Slot,
    subscribers: BTreeMap<u64, SubscriberEntry>,
    publisher: watch::Sender<Option<Snapshot>>,
    subscriber_count: Arc<AtomicUsize>,
    model: Weak<ModelInner>,
}

impl Processor {
    pub(super) fn new(
        actions: BTreeMap<String, Arc<ActionFn>>,
        publisher: watch::Sender<Option<Snapshot>>,
        subscriber_count: Arc<AtomicUsize>,
        model: Weak<ModelInner>,
    ) -> Self {
        Self {
            actions,
            slot: Slot::Uninitialized,
            subscribers: BTreeMap::new(),
            publisher,
            subscriber_count,
            model,
        }
    }

    pub(super) async fn run(mut self, mut queue: mpsc::UnboundedReceiver<Envelope>) {
        while let Some(envelope) = queue.recv().await {
            match envelope {
                Envelope::Dispatch {
                    action,
                    args,
                    reply,
                } => {
                    let result = self.dispatch(&action, args);
                    let _ = reply.send(result);
                }
                Envelope::Kill { error, reply } => {
                    let _ = reply.send(Err(self.terminate(error)));
                }
                Envelope::Subscribe(entry) => self.register(entry),
                Envelope::Unsubscribe { id } => {
                    self.subscribers.remove(&id);
                    self.sync_count();
                }
            }
        }
        debug!("model processor stopped");
    }

    fn dispatch(&mut self, action: &str, args: Vec<State>) -> Result<Option<State>, ModelError> {
        if let Slot::Dead(error) = &self.slot {
            debug!(action, "rejecting action on dead model");
            return Err(ModelError::Dead(error.clone()));
        }
        let Some(body) = self.actions.get(action).map(Arc::clone) else {
            return Err(ModelError::UnknownAction {
                name: action.to_owned(),
            });
        };

        let ctx = ActionContext {
            state: self.slot.state().cloned(),
            model: self.handle(),
        };
        debug!(action, "running action");
        let outcome = catch_unwind(AssertUnwindSafe(|| body(&ctx, args))).unwrap_or_else(|panic| {
            Err(ActionError::new(format!(
                "action '{action}' panicked: {}",
                panic_message(&*panic)
            )))
        });
        drop(ctx);

        match outcome {
            Ok(Outcome::Unchanged) => Ok(None),
            Ok(Outcome::Reset) => Ok(Some(self.publish(State::empty_map()))),
            Ok(Outcome::Replace(state)) => Ok(Some(self.publish(state))),
            Err(error) => Err(self.terminate(error)),
        }
    }

    fn publish(&mut self, state: State) -> State {
        self.slot = Slot::Active(state.clone());
        let snapshot = Snapshot::Active(state.clone());
        self.publisher.send_replace(Some(snapshot.clone()));
        for entry in self.subscribers.values_mut() {
            deliver(entry, &snapshot);
        }
        state
    }

    /// Enter the dead state, notify everyone once, then drop every subscriber.
    fn terminate(&mut self, error: ActionError) -> ModelError {
        if let Slot::Dead(existing) = &self.slot {
            return ModelError::Dead(existing.clone());
        }
        warn!(%error, "model entered dead state");
        self.slot = Slot::Dead(error.clone());
        let snapshot = Snapshot::Dead(error.clone());
        self.publisher.send_replace(Some(snapshot.clone()));
        for entry in self.subscribers.values_mut() {
            deliver(entry, &snapshot);
        }
        for entry in self.subscribers.values() {
            entry.active.store(false, Ordering::Release);
        }
        self.subscribers.clear();
        self.sync_count();
        ModelError::Dead(error)
    }

    fn register(&mut self, mut entry: SubscriberEntry) {
        if !entry.active.load(Ordering::Acquire) {
            return;
        }
        match &self.slot {
            Slot::Dead(_) => {
                entry.active.store(false, Ordering::Release);
                return;
            }
            Slot::Active(state) => deliver(&mut entry, &Snapshot::Active(state.clone())),
            Slot::Uninitialized => {}
        }
        self.subscribers.insert(entry.id, entry);
        self.sync_count();
    }

    fn sync_count(&self) {
        self.subscriber_count
            .store(self.subscribers.len(), Ordering::Release);
    }

    fn handle(&self) -> Model {
        self.model
            .upgrade()
            .map_or_else(Model::detached, |inner| Model { inner })
    }
}

fn deliver(entry: &mut SubscriberEntry, snapshot: &Snapshot) {
    if !entry.active.load(Ordering::Acquire) {
        return;
    }
    let callback = &mut entry.callback;
    if let Err(panic) = catch_unwind(AssertUnwindSafe(|| callback(snapshot))) {
        warn!(
            subscription = entry.id,
            error = %panic_message(&*panic),
            "subscriber panicked"
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
