// ── Component glue ──
//
// Binds a model to a render target. The template and the DOM patcher
// live outside this crate; this module only sequences them: mount on the
// first render, patch afterwards, tear down when the model dies.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use crate::model::{Snapshot, Subscription};
use crate::state::State;
use crate::stream::Observable;

/// Renders a state to markup. `None` skips the render.
pub type Template = Box<dyn Fn(&State) -> Option<String> + Send + Sync>;

/// Lifecycle hook run against one rendered node.
pub type Hook<N> = Box<dyn Fn(&N) + Send + Sync>;

/// The render target a component draws into.
///
/// Implemented by whatever owns the real node tree (a virtual DOM patcher,
/// a terminal buffer, a test double).
pub trait Surface: Send + 'static {
    type Node: Send + 'static;

    /// Replace the target elements with nodes rendered from `html`.
    /// An empty result means there was nothing to mount into.
    fn mount(&mut self, html: &str) -> Vec<Self::Node>;

    /// Bring previously mounted nodes in line with `html`.
    fn patch(&mut self, nodes: &mut [Self::Node], html: &str);

    /// Put the original target elements back.
    fn restore(&mut self, nodes: Vec<Self::Node>);
}

/// Template plus optional lifecycle hooks. Omitted hooks are no-ops.
pub struct ComponentOptions<N> {
    template: Template,
    attach: Option<Hook<N>>,
    update: Option<Hook<N>>,
    detach: Option<Hook<N>>,
}

impl<N> ComponentOptions<N> {
    pub fn new<F>(template: F) -> Self
    where
        F: Fn(&State) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            template: Box::new(template),
            attach: None,
            update: None,
            detach: None,
        }
    }

    /// Run once per node right after the first mount.
    pub fn on_attach(mut self, hook: impl Fn(&N) + Send + Sync + 'static) -> Self {
        self.attach = Some(Box::new(hook));
        self
    }

    /// Run per node after every render, including the first.
    pub fn on_update(mut self, hook: impl Fn(&N) + Send + Sync + 'static) -> Self {
        self.update = Some(Box::new(hook));
        self
    }

    /// Run per node when the model dies, before the original content returns.
    pub fn on_detach(mut self, hook: impl Fn(&N) + Send + Sync + 'static) -> Self {
        self.detach = Some(Box::new(hook));
        self
    }
}

impl<N> fmt::Debug for ComponentOptions<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentOptions")
            .field("attach", &self.attach.is_some())
            .field("update", &self.update.is_some())
            .field("detach", &self.detach.is_some())
            .finish_non_exhaustive()
    }
}

struct Renderer<S: Surface> {
    surface: S,
    options: ComponentOptions<S::Node>,
    nodes: Option<Vec<S::Node>>,
    destroyed: bool,
}

impl<S: Surface> Renderer<S> {
    fn apply(&mut self, snapshot: &Snapshot) {
        if self.destroyed {
            return;
        }
        match snapshot {
            Snapshot::Active(state) => self.render(state),
            Snapshot::Dead(error) => {
                debug!(%error, "tearing down component");
                self.destroy();
            }
        }
    }

    fn render(&mut self, state: &State) {
        let Some(html) = (self.options.template)(state).filter(|html| !html.trim().is_empty())
        else {
            return;
        };

        if let Some(nodes) = self.nodes.as_mut() {
            // A mount that found no targets disables rendering.
            if nodes.is_empty() {
                return;
            }
            self.surface.patch(nodes, &html);
            for node in nodes.iter() {
                run_hook(self.options.update.as_ref(), "update", node);
            }
            return;
        }

        let nodes = self.surface.mount(&html);
        if nodes.is_empty() {
            debug!("component found no target to mount into");
        }
        for node in &nodes {
            run_hook(self.options.attach.as_ref(), "attach", node);
            run_hook(self.options.update.as_ref(), "update", node);
        }
        self.nodes = Some(nodes);
    }

    fn destroy(&mut self) {
        self.destroyed = true;
        let Some(nodes) = self.nodes.take() else {
            return;
        };
        for node in &nodes {
            run_hook(self.options.detach.as_ref(), "detach", node);
        }
        self.surface.restore(nodes);
    }
}

fn run_hook<N>(hook: Option<&Hook<N>>, name: &str, node: &N) {
    let Some(hook) = hook else {
        return;
    };
    if catch_unwind(AssertUnwindSafe(|| hook(node))).is_err() {
        warn!(hook = name, "component hook panicked");
    }
}

/// A model bound to a [`Surface`].
pub struct Component<S: Surface> {
    renderer: Arc<Mutex<Renderer<S>>>,
    subscription: Subscription,
}

impl<S: Surface> Component<S> {
    /// Subscribe a renderer for `options` on `source`.
    pub fn mount(
        source: &impl Observable,
        options: ComponentOptions<S::Node>,
        surface: S,
    ) -> Self {
        let renderer = Arc::new(Mutex::new(Renderer {
            surface,
            options,
            nodes: None,
            destroyed: false,
        }));
        let handle = Arc::clone(&renderer);
        let subscription = source.observe(move |snapshot| {
            handle
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .apply(snapshot);
        });
        Self {
            renderer,
            subscription,
        }
    }

    /// Stop rendering. Mounted nodes are left in place.
    pub fn unmount(&self) {
        self.subscription.unsubscribe();
    }

    /// True once the model has died and the original content was restored.
    pub fn is_destroyed(&self) -> bool {
        self.lock().destroyed
    }

    /// Number of nodes currently mounted.
    pub fn node_count(&self) -> usize {
        self.lock().nodes.as_ref().map_or(0, Vec::len)
    }

    /// Inspect the surface.
    pub fn with_surface<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.lock().surface)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Renderer<S>> {
        self.renderer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: Surface> fmt::Debug for Component<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("subscription", &self.subscription.id())
            .field("destroyed", &self.is_destroyed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::error::ActionError;
    use crate::model::{Actions, Model};

    type Log = Arc<Mutex<Vec<String>>>;

    struct Recorder {
        log: Log,
        targets: usize,
    }

    impl Surface for Recorder {
        type Node = usize;

        fn mount(&mut self, html: &str) -> Vec<usize> {
            self.log.lock().unwrap().push(format!("mount {html}"));
            (0..self.targets).collect()
        }

        fn patch(&mut self, _nodes: &mut [usize], html: &str) {
            self.log.lock().unwrap().push(format!("patch {html}"));
        }

        fn restore(&mut self, nodes: Vec<usize>) {
            self.log.lock().unwrap().push(format!("restore {}", nodes.len()));
        }
    }

    fn model() -> Model {
        Model::new(
            Actions::new()
                .on("set", |_, args| Ok::<_, ActionError>(args.into_iter().next()))
                .on("fail", |_, _| Err::<State, _>(ActionError::new("boom"))),
        )
    }

    fn options(log: &Log) -> ComponentOptions<usize> {
        let (attach, update, detach) = (log.clone(), log.clone(), log.clone());
        ComponentOptions::new(|state: &State| state.get("html").map(ToString::to_string))
            .on_attach(move |n| attach.lock().unwrap().push(format!("attach {n}")))
            .on_update(move |n| update.lock().unwrap().push(format!("update {n}")))
            .on_detach(move |n| detach.lock().unwrap().push(format!("detach {n}")))
    }

    #[tokio::test]
    async fn mounts_then_patches_then_restores() {
        let log = Log::default();
        let model = model();
        let surface = Recorder {
            log: log.clone(),
            targets: 1,
        };
        let component = Component::mount(&model, options(&log), surface);

        model.dispatch("set", [json!({"html": "<p>1</p>"})]).await.unwrap();
        model.dispatch("set", [json!({"html": "<p>2</p>"})]).await.unwrap();
        model.dispatch("set", [json!({})]).await.unwrap();
        assert_eq!(component.node_count(), 1);
        model.call("fail").await.unwrap_err();
        model.dispatch("set", [json!({"html": "x"})]).await.unwrap_err();

        assert!(component.is_destroyed());
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "mount <p>1</p>",
                "attach 0",
                "update 0",
                "patch <p>2</p>",
                "update 0",
                "detach 0",
                "restore 1",
            ]
        );
    }

    #[tokio::test]
    async fn empty_mount_skips_later_renders() {
        let log = Log::default();
        let model = model();
        let surface = Recorder {
            log: log.clone(),
            targets: 0,
        };
        let component = Component::mount(&model, options(&log), surface);

        model.dispatch("set", [json!({"html": "a"})]).await.unwrap();
        model.dispatch("set", [json!({"html": "b"})]).await.unwrap();

        assert_eq!(component.node_count(), 0);
        assert_eq!(*log.lock().unwrap(), vec!["mount a"]);
    }

    #[tokio::test]
    async fn hooks_default_to_no_ops_and_panics_are_contained() {
        let log = Log::default();
        let model = model();
        let surface = Recorder {
            log: log.clone(),
            targets: 2,
        };
        let options = ComponentOptions::new(|state: &State| state.get("html").map(ToString::to_string))
            .on_update(|_| panic!("hook failure"));
        let component = Component::mount(&model, options, surface);

        model.dispatch("set", [json!({"html": "a"})]).await.unwrap();
        model.dispatch("set", [json!({"html": "b"})]).await.unwrap();

        assert_eq!(component.node_count(), 2);
        assert_eq!(*log.lock().unwrap(), vec!["mount a", "patch b"]);
    }

    #[tokio::test]
    async fn unmount_stops_rendering() {
        let log = Log::default();
        let model = model();
        let surface = Recorder {
            log: log.clone(),
            targets: 1,
        };
        let component = Component::mount(&model, options(&log), surface);
        component.unmount();

        model.dispatch("set", [json!({"html": "a"})]).await.unwrap();
        assert!(component.with_surface(|s| s.targets == 1));
        assert!(log.lock().unwrap().is_empty());
    }
}
