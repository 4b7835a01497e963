// ── Action-dispatching model ──
//
// One current-state slot plus a subscriber registry, both owned by a
// single processor task. Dispatch, subscribe and kill requests travel
// through one unbounded queue, so action bodies for a model never
// interleave and always run in call order.

mod action;
mod processor;

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};
use std::{fmt, iter};

use futures_core::Stream;
use tokio::sync::{mpsc, oneshot, watch};
use tokio_stream::wrappers::WatchStream;
use tracing::debug;

use crate::error::{ActionError, ModelError};
use crate::state::State;
use crate::stream::StateStream;

pub use action::{ActionContext, ActionFn, Actions, Outcome};

use processor::Processor;

/// Callback invoked with every state a model publishes.
pub type Subscriber = Box<dyn FnMut(&Snapshot) + Send>;

type Reply = oneshot::Sender<Result<Option<State>, ModelError>>;

/// A value published to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    Active(State),
    /// Terminal: the model was killed by this error.
    Dead(ActionError),
}

impl Snapshot {
    pub fn state(&self) -> Option<&State> {
        match self {
            Self::Active(state) => Some(state),
            Self::Dead(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ActionError> {
        match self {
            Self::Active(_) => None,
            Self::Dead(err) => Some(err),
        }
    }

    pub fn is_dead(&self) -> bool {
        matches!(self, Self::Dead(_))
    }
}

/// Lifecycle of a model. `Dead` has no outgoing transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Active,
    Dead,
}

// ── Queue protocol ───────────────────────────────────────────────────

enum Envelope {
    Dispatch {
        action: String,
        args: Vec<State>,
        reply: Reply,
    },
    Kill {
        error: ActionError,
        reply: Reply,
    },
    Subscribe(SubscriberEntry),
    Unsubscribe {
        id: u64,
    },
}

struct SubscriberEntry {
    id: u64,
    active: Arc<AtomicBool>,
    callback: Subscriber,
}

// ── Model ────────────────────────────────────────────────────────────

/// A named set of actions closed over one current state.
///
/// Cheaply cloneable; all clones drive the same processor task. Must be
/// created inside a tokio runtime. The processor stops once every handle
/// (including those captured by subscribers of other models) is dropped
/// and the queue has drained.
#[derive(Clone)]
pub struct Model {
    inner: Arc<ModelInner>,
}

struct ModelInner {
    queue: mpsc::UnboundedSender<Envelope>,
    published: watch::Receiver<Option<Snapshot>>,
    subscriber_count: Arc<AtomicUsize>,
    next_subscription: AtomicU64,
    actions: Vec<String>,
}

impl Model {
    /// Create a model and spawn its processor task.
    pub fn new(actions: Actions) -> Self {
        let (queue, queue_rx) = mpsc::unbounded_channel();
        let (publisher, published) = watch::channel(None);
        let subscriber_count = Arc::new(AtomicUsize::new(0));

        let inner = Arc::new(ModelInner {
            queue,
            published,
            subscriber_count: Arc::clone(&subscriber_count),
            next_subscription: AtomicU64::new(1),
            actions: actions.names().map(str::to_owned).collect(),
        });

        let processor = Processor::new(
            actions.table,
            publisher,
            subscriber_count,
            Arc::downgrade(&inner),
        );
        tokio::spawn(processor.run(queue_rx));

        debug!(actions = ?inner.actions, "model created");
        Self { inner }
    }

    /// A handle whose queue is already closed. Handed to actions that run
    /// after every real handle has been dropped.
    fn detached() -> Self {
        let (queue, _) = mpsc::unbounded_channel();
        let (_, published) = watch::channel(None);
        Self {
            inner: Arc::new(ModelInner {
                queue,
                published,
                subscriber_count: Arc::default(),
                next_subscription: AtomicU64::new(1),
                actions: Vec::new(),
            }),
        }
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Queue `action` with `args`.
    ///
    /// The request is enqueued before this returns, so dispatch order is
    /// call order. The returned future resolves once the action body has
    /// run: with the new state, `None` when the action left the state
    /// unchanged, or [`ModelError::Dead`] when the model is (or just
    /// became) dead. Dropping the future does not cancel the action.
    pub fn dispatch<I>(&self, action: &str, args: I) -> Pending
    where
        I: IntoIterator,
        I::Item: Into<State>,
    {
        let (reply, reply_rx) = oneshot::channel();
        let envelope = Envelope::Dispatch {
            action: action.to_owned(),
            args: args.into_iter().map(Into::into).collect(),
            reply,
        };
        // A closed queue drops `reply`, which resolves the future as `Closed`.
        let _ = self.inner.queue.send(envelope);
        Pending { reply: reply_rx }
    }

    /// Queue `action` without arguments.
    pub fn call(&self, action: &str) -> Pending {
        self.dispatch(action, iter::empty::<State>())
    }

    /// Queue a transition straight into the dead state.
    pub(crate) fn kill(&self, error: ActionError) -> Pending {
        let (reply, reply_rx) = oneshot::channel();
        let _ = self.inner.queue.send(Envelope::Kill { error, reply });
        Pending { reply: reply_rx }
    }

    // ── Subscriptions ────────────────────────────────────────────────

    /// Register `subscriber`.
    ///
    /// If the model already holds a live state, that state is delivered to
    /// the new subscriber alone, asynchronously. Afterwards it receives
    /// every published state in registration order. Panics inside the
    /// callback are caught and logged.
    pub fn subscribe<F>(&self, subscriber: F) -> Subscription
    where
        F: FnMut(&Snapshot) + Send + 'static,
    {
        let id = self.inner.next_subscription.fetch_add(1, Ordering::Relaxed);
        let active = Arc::new(AtomicBool::new(true));
        let entry = SubscriberEntry {
            id,
            active: Arc::clone(&active),
            callback: Box::new(subscriber),
        };
        if self.inner.queue.send(Envelope::Subscribe(entry)).is_err() {
            active.store(false, Ordering::Release);
        }
        Subscription {
            id,
            active,
            model: Arc::downgrade(&self.inner),
        }
    }

    /// Number of registered subscribers as of the last processed request.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscriber_count.load(Ordering::Acquire)
    }

    // ── Observation ──────────────────────────────────────────────────

    /// The last published snapshot, `None` before the first transition.
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.inner.published.borrow().clone()
    }

    /// The last published live state.
    pub fn state(&self) -> Option<State> {
        self.snapshot().and_then(|snapshot| snapshot.state().cloned())
    }

    pub fn phase(&self) -> Phase {
        match &*self.inner.published.borrow() {
            None => Phase::Uninitialized,
            Some(Snapshot::Active(_)) => Phase::Active,
            Some(Snapshot::Dead(_)) => Phase::Dead,
        }
    }

    /// Published snapshots as a `Stream`, starting with the current one.
    ///
    /// Backed by a watch channel: a slow consumer sees the latest snapshot,
    /// not every intermediate one. Use [`subscribe`](Self::subscribe) to
    /// observe every transition.
    pub fn changes(&self) -> SnapshotStream {
        SnapshotStream {
            inner: WatchStream::new(self.inner.published.clone()),
        }
    }

    /// A derived stream fed by this model.
    pub fn stream(&self) -> StateStream {
        StateStream::new(self)
    }

    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.inner.actions.iter().map(String::as_str)
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.inner.actions.iter().any(|a| a == name)
    }

    pub fn ptr_eq(&self, other: &Model) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("actions", &self.inner.actions)
            .field("phase", &self.phase())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

// ── Subscription handle ──────────────────────────────────────────────

/// Handle returned by [`Model::subscribe`].
///
/// Dropping the handle does not unsubscribe.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    active: Arc<AtomicBool>,
    model: Weak<ModelInner>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// False after `unsubscribe` or once the model has died.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Stop deliveries to this subscriber. Idempotent; no delivery starts
    /// after this returns.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(inner) = self.model.upgrade() {
            let _ = inner.queue.send(Envelope::Unsubscribe { id: self.id });
        }
    }
}

// ── Futures ──────────────────────────────────────────────────────────

/// Result of a queued action.
pub struct Pending {
    reply: oneshot::Receiver<Result<Option<State>, ModelError>>,
}

impl Pending {
    /// Let the action run without waiting for its result.
    pub fn detach(self) {}
}

impl Future for Pending {
    type Output = Result<Option<State>, ModelError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.reply)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|_| Err(ModelError::Closed)))
    }
}

impl fmt::Debug for Pending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pending").finish_non_exhaustive()
    }
}

/// `Stream` adapter over a model's published snapshots.
pub struct SnapshotStream {
    inner: WatchStream<Option<Snapshot>>,
}

impl Stream for SnapshotStream {
    type Item = Snapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Some(snapshot))) => return Poll::Ready(Some(snapshot)),
                // Nothing published yet; wait for the first transition.
                Poll::Ready(Some(None)) => {}
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
