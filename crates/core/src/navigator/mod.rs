//! Per-surface view stacks and the operations that move between them.
//!
//! The [`Navigator`] owns one stack of views for every surface it has been
//! asked about. Stack edits happen synchronously. Everything that touches the
//! screen is delegated: the [`TransitionEngine`] performs the visible swap and
//! reports back through the [`Hub`], and views are only torn down once the
//! engine says they finished hiding.
//!
//! # Surface resolution
//!
//! Every operation targets one surface, chosen in this order:
//! 1. `options.surface`
//! 2. the engine's active surface
//! 3. the navigator's default surface
//! 4. the root surface created from settings
//!
//! # Stack shape
//!
//! ```text
//!   index 0              ...               len - 1
//!   +--------+--------+--------+--------+--------+
//!   | root   |        |        |        | top    |  <-- visible
//!   +--------+--------+--------+--------+--------+
//! ```
//!
//! The root is never popped implicitly; only `replace_view` and
//! `replace_all` can take it off.
//!
//! # Example
//!
//! ```
//! use navstack_core::navigator::{NavigationOptions, Navigator};
//! use navstack_core::surface::Surface;
//! use navstack_core::transition::{
//!     ChangeId, ChangeRequest, Hub, LifecycleSignal, TransitionEngine,
//! };
//! use navstack_core::view::{ElementId, View, ID_FEEDER};
//!
//! #[derive(Default)]
//! struct Instant {
//!     hub: Option<Hub>,
//!     started: bool,
//!     visible: Option<ElementId>,
//! }
//!
//! impl TransitionEngine for Instant {
//!     fn connect(&mut self, hub: Hub) {
//!         self.hub = Some(hub);
//!     }
//!
//!     fn is_initialized(&self) -> bool {
//!         self.started
//!     }
//!
//!     fn initialize(&mut self, _surface: &Surface, element: ElementId, change: ChangeId) {
//!         self.started = true;
//!         self.visible = Some(element);
//!         if let Some(hub) = &self.hub {
//!             hub.send(LifecycleSignal::Shown(element, change)).ok();
//!         }
//!     }
//!
//!     fn change(&mut self, _surface: &Surface, request: ChangeRequest) {
//!         if let Some(hub) = &self.hub {
//!             if let Some(previous) = self.visible.replace(request.target) {
//!                 hub.send(LifecycleSignal::Hidden(previous, request.id)).ok();
//!             }
//!             hub.send(LifecycleSignal::Shown(request.target, request.id)).ok();
//!         }
//!     }
//! }
//!
//! struct Page(ElementId);
//!
//! impl View for Page {
//!     fn element(&self) -> ElementId {
//!         self.0
//!     }
//!     fn render(&mut self) {}
//!     fn remove(&mut self) {}
//! }
//!
//! let mut navigator = Navigator::new(Instant::default());
//! let home = ID_FEEDER.next();
//! let details = ID_FEEDER.next();
//!
//! navigator.push_view(Box::new(Page(home)), NavigationOptions::default(), None)?;
//! navigator.push_view(Box::new(Page(details)), NavigationOptions::default(), None)?;
//! navigator.dispatch_pending();
//!
//! assert!(navigator.pop_view(NavigationOptions::default()));
//! navigator.dispatch_pending();
//!
//! let current = navigator.current_view(&NavigationOptions::default()).map(|v| v.element());
//! assert_eq!(current, Some(home));
//! # Ok::<(), navstack_core::navigator::NavigationError>(())
//! ```

mod error;
mod options;
mod queue;
mod registry;

pub use self::error::{Navigation, NavigationError};
pub use self::options::{NavigationOptions, TransitionOptions};
pub use self::queue::ShownCallback;
pub use self::registry::ViewStackEntry;

use self::options::{change_request, Direction};
use self::queue::{Operation, PendingOperation};
use self::registry::Registry;
use crate::settings::{NavigatorSettings, OverlapPolicy};
use crate::surface::Surface;
use crate::transition::{ChangeId, Hub, LifecycleSignal, SignalReceiver, TransitionEngine};
use crate::view::{ElementId, View};
use fxhash::FxHashMap;
use std::collections::hash_map::Entry;
use std::sync::mpsc;

/// Views waiting for an element's hide signal before being torn down.
struct Teardown {
    surface: Surface,
    views: Vec<Box<dyn View>>,
    /// First request whose hide signal counts.
    since: ChangeId,
}

/// Callback waiting for an element's show signal.
struct PendingShown {
    since: ChangeId,
    callback: ShownCallback,
}

/// Owns the surface registry and coordinates stack edits with transitions.
///
/// One navigator is meant to be created per application and passed around by
/// reference. Several may coexist; they never share stacks.
pub struct Navigator<E: TransitionEngine> {
    engine: E,
    registry: Registry,
    root: Surface,
    default_surface: Option<Surface>,
    policy: OverlapPolicy,
    hub: Hub,
    signals: SignalReceiver,
    /// Keyed by the outgoing element whose hide completes the teardown.
    pending_hidden: FxHashMap<ElementId, Teardown>,
    pending_shown: FxHashMap<ElementId, PendingShown>,
    /// Id handed to the next engine request.
    next_change: ChangeId,
}

impl<E: TransitionEngine> Navigator<E> {
    pub fn new(engine: E) -> Self {
        Self::with_settings(engine, &NavigatorSettings::default())
    }

    pub fn with_settings(mut engine: E, settings: &NavigatorSettings) -> Self {
        let (hub, signals) = mpsc::channel();
        engine.connect(hub.clone());

        Navigator {
            engine,
            registry: Registry::default(),
            root: Surface::new(settings.root_surface.as_str()),
            default_surface: None,
            policy: settings.overlap_policy,
            hub,
            signals,
            pending_hidden: FxHashMap::default(),
            pending_shown: FxHashMap::default(),
            next_change: ChangeId::default(),
        }
    }

    /// Sets the surface used when neither the caller nor the engine names one.
    pub fn set_default_surface(&mut self, surface: Option<Surface>) {
        self.default_surface = surface;
    }

    pub fn default_surface(&self) -> Option<&Surface> {
        self.default_surface.as_ref()
    }

    pub fn root_surface(&self) -> &Surface {
        &self.root
    }

    pub fn overlap_policy(&self) -> OverlapPolicy {
        self.policy
    }

    /// Another sender for the lifecycle signal channel.
    pub fn hub(&self) -> Hub {
        self.hub.clone()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Number of registered surfaces.
    pub fn surface_count(&self) -> usize {
        self.registry.len()
    }

    pub fn entries(&self) -> impl Iterator<Item = &ViewStackEntry> {
        self.registry.iter()
    }

    /// Number of element hides still awaited before teardown.
    pub fn pending_teardowns(&self) -> usize {
        self.pending_hidden.len()
    }

    fn target_surface(&self, options: &NavigationOptions) -> Surface {
        options
            .surface
            .clone()
            .or_else(|| self.engine.active_surface())
            .or_else(|| self.default_surface.clone())
            .unwrap_or_else(|| self.root.clone())
    }

    /// Returns the stack for the surface `options` resolve to, creating it on
    /// first reference.
    pub fn resolve_surface_entry(&mut self, options: &NavigationOptions) -> &ViewStackEntry {
        let surface = self.target_surface(options);
        let index = self.registry.resolve(&surface);
        self.registry.entry(index)
    }

    /// The visible view of the resolved surface, if its stack is non-empty.
    ///
    /// Unlike the mutating operations this does not register the surface.
    pub fn current_view(&self, options: &NavigationOptions) -> Option<&dyn View> {
        let surface = self.target_surface(options);
        self.registry.get(&surface).and_then(|entry| entry.top())
    }

    /// The stack of `surface`, or of the engine's active surface when `None`.
    ///
    /// Returns `None` if that surface has never been navigated.
    pub fn get_views(&self, surface: Option<&Surface>) -> Option<&[Box<dyn View>]> {
        let surface = surface.cloned().or_else(|| self.engine.active_surface())?;
        self.registry.get(&surface).map(|entry| entry.views())
    }

    /// Pushes `view` on top of the resolved stack and shows it.
    ///
    /// The very first view handed to an uninitialized engine starts the page
    /// system instead of requesting an animated change. `on_shown` runs once,
    /// the first time the view's element is shown.
    pub fn push_view(
        &mut self,
        view: Box<dyn View>,
        options: NavigationOptions,
        on_shown: Option<ShownCallback>,
    ) -> Result<Navigation, NavigationError> {
        self.submit(Operation::Push { view, on_shown }, options)
    }

    /// Pops the top view and transitions back to the one below.
    ///
    /// Returns `false` when the stack holds one view or fewer.
    pub fn pop_view(&mut self, options: NavigationOptions) -> bool {
        self.submit(Operation::Pop, options).is_ok()
    }

    /// Discards the top `n` views, landing on index `len - 1 - n`.
    ///
    /// Requires `1 <= n <= len - 1`.
    pub fn pop_back_n_views(
        &mut self,
        n: usize,
        options: NavigationOptions,
    ) -> Result<Navigation, NavigationError> {
        self.submit(Operation::PopBack(n), options)
    }

    /// Discards every view above the first one.
    pub fn pop_to_first(&mut self, options: NavigationOptions) -> Result<Navigation, NavigationError> {
        self.submit(Operation::PopToFirst, options)
    }

    /// Swaps the top view for `view`, keeping the stack depth.
    pub fn replace_view(
        &mut self,
        view: Box<dyn View>,
        options: NavigationOptions,
        on_shown: Option<ShownCallback>,
    ) -> Result<Navigation, NavigationError> {
        self.submit(Operation::Replace { view, on_shown }, options)
    }

    /// Discards the whole stack and makes `view` its only entry.
    pub fn replace_all(
        &mut self,
        view: Box<dyn View>,
        options: NavigationOptions,
    ) -> Result<Navigation, NavigationError> {
        self.submit(Operation::ReplaceAll { view }, options)
    }

    /// Handles every signal the engine has sent so far.
    ///
    /// Returns the number of signals handled.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut count = 0;
        while let Ok(signal) = self.signals.try_recv() {
            self.handle_signal(signal);
            count += 1;
        }
        count
    }

    /// Routes one engine signal to the teardown, callback and queue waiting
    /// on its element. Each of them ignores signals from changes requested
    /// before it was registered.
    pub fn handle_signal(&mut self, signal: LifecycleSignal) {
        tracing::trace!(?signal, "lifecycle signal");
        match signal {
            LifecycleSignal::Hidden(element, change) => self.tear_down(element, change),
            LifecycleSignal::Shown(element, change) => {
                if let Entry::Occupied(pending) = self.pending_shown.entry(element) {
                    if change >= pending.get().since {
                        (pending.remove().callback)();
                    }
                }
                self.settle(element, change);
            }
        }
    }

    fn submit(
        &mut self,
        operation: Operation,
        mut options: NavigationOptions,
    ) -> Result<Navigation, NavigationError> {
        let surface = self.target_surface(&options);
        let index = self.registry.resolve(&surface);

        if self.policy == OverlapPolicy::Queue && self.registry.entry(index).is_transitioning() {
            tracing::debug!(
                surface = %surface,
                operation = operation.name(),
                queued = self.registry.entry(index).queued() + 1,
                "transition in flight, queueing operation"
            );
            options.surface = Some(surface);
            self.registry
                .entry_mut(index)
                .queue
                .push_back(PendingOperation { operation, options });
            return Ok(Navigation::Queued);
        }

        let name = operation.name();
        self.apply(index, operation, &options)
            .map(|()| Navigation::Applied)
            .inspect_err(|err| report(&surface, name, err))
    }

    fn apply(
        &mut self,
        index: usize,
        operation: Operation,
        options: &NavigationOptions,
    ) -> Result<(), NavigationError> {
        match operation {
            Operation::Push { view, on_shown } => self.apply_push(index, view, options, on_shown),
            Operation::Pop => self.apply_pop(index, options),
            Operation::PopBack(n) => self.apply_pop_back(index, n, options),
            Operation::PopToFirst => self.apply_pop_to_first(index, options),
            Operation::Replace { view, on_shown } => {
                self.apply_replace(index, view, options, on_shown)
            }
            Operation::ReplaceAll { view } => self.apply_replace_all(index, view, options),
        }
    }

    fn apply_push(
        &mut self,
        index: usize,
        view: Box<dyn View>,
        options: &NavigationOptions,
        on_shown: Option<ShownCallback>,
    ) -> Result<(), NavigationError> {
        self.ensure_unique(view.element())?;

        if self.engine.is_initialized() {
            self.show(index, view, options, on_shown);
            return Ok(());
        }

        let mut view = view;
        let element = view.element();
        let surface = self.registry.entry(index).surface.clone();

        self.mount(&surface, view.as_mut(), on_shown);
        view.mark_initial_page();

        let change = self.issue_change();
        let entry = self.registry.entry_mut(index);
        entry.views.push(view);
        entry.in_flight = Some((element, change));

        tracing::info!(surface = %surface, element = %element, %change, "initializing page system");
        self.engine.initialize(&surface, element, change);

        Ok(())
    }

    fn apply_pop(&mut self, index: usize, options: &NavigationOptions) -> Result<(), NavigationError> {
        let entry = self.registry.entry_mut(index);
        let depth = entry.views.len();
        if depth <= 1 {
            return Err(NavigationError::InvalidPop { depth, count: 1 });
        }

        let Some(from) = entry.views.pop() else {
            return Err(NavigationError::InvalidPop { depth, count: 1 });
        };

        let from_element = from.element();
        let surface = entry.surface.clone();
        self.schedule_teardown(from_element, &surface, vec![from]);

        tracing::debug!(surface = %surface, element = %from_element, depth = depth - 1, "popped view");
        self.change_back(index, options);

        Ok(())
    }

    fn apply_pop_back(
        &mut self,
        index: usize,
        n: usize,
        options: &NavigationOptions,
    ) -> Result<(), NavigationError> {
        let entry = self.registry.entry_mut(index);
        let depth = entry.views.len();
        if depth <= 1 || n >= depth {
            return Err(NavigationError::InvalidPop { depth, count: n });
        }
        if n == 0 {
            return Err(NavigationError::NothingToPop);
        }

        // Ascending index order: the views in the middle first, the old top last.
        let removed: Vec<Box<dyn View>> = entry.views.drain(depth - n..).collect();
        let surface = entry.surface.clone();
        let from_element = removed[removed.len() - 1].element();

        tracing::debug!(surface = %surface, count = n, depth = depth - n, "popped back views");
        self.schedule_teardown(from_element, &surface, removed);
        self.change_back(index, options);

        Ok(())
    }

    fn apply_pop_to_first(
        &mut self,
        index: usize,
        options: &NavigationOptions,
    ) -> Result<(), NavigationError> {
        let entry = self.registry.entry_mut(index);
        let depth = entry.views.len();
        if depth <= 1 {
            return Err(NavigationError::InvalidPop { depth, count: 1 });
        }

        let removed: Vec<Box<dyn View>> = entry.views.drain(1..).collect();
        let surface = entry.surface.clone();
        let from_element = removed[removed.len() - 1].element();

        tracing::debug!(surface = %surface, count = depth - 1, "popped to first view");
        self.schedule_teardown(from_element, &surface, removed);
        self.change_back(index, options);

        Ok(())
    }

    fn apply_replace(
        &mut self,
        index: usize,
        view: Box<dyn View>,
        options: &NavigationOptions,
        on_shown: Option<ShownCallback>,
    ) -> Result<(), NavigationError> {
        self.ensure_unique(view.element())?;

        let entry = self.registry.entry_mut(index);
        let Some(from) = entry.views.pop() else {
            return Err(NavigationError::EmptyStack(entry.surface.name().to_string()));
        };

        let surface = entry.surface.clone();
        self.schedule_teardown(from.element(), &surface, vec![from]);
        self.show(index, view, options, on_shown);

        Ok(())
    }

    fn apply_replace_all(
        &mut self,
        index: usize,
        view: Box<dyn View>,
        options: &NavigationOptions,
    ) -> Result<(), NavigationError> {
        self.ensure_unique(view.element())?;

        let entry = self.registry.entry_mut(index);
        if entry.views.is_empty() {
            return Err(NavigationError::EmptyStack(entry.surface.name().to_string()));
        }

        let removed: Vec<Box<dyn View>> = entry.views.drain(..).collect();
        let surface = entry.surface.clone();
        let from_element = removed[removed.len() - 1].element();

        tracing::debug!(surface = %surface, count = removed.len(), "replacing all views");
        self.schedule_teardown(from_element, &surface, removed);
        self.show(index, view, options, None);

        Ok(())
    }

    /// Mounts, renders and pushes `view`, then requests a forward change to it.
    fn show(
        &mut self,
        index: usize,
        mut view: Box<dyn View>,
        options: &NavigationOptions,
        on_shown: Option<ShownCallback>,
    ) {
        let element = view.element();
        let surface = self.registry.entry(index).surface.clone();

        self.mount(&surface, view.as_mut(), on_shown);

        let change = self.issue_change();
        let entry = self.registry.entry_mut(index);
        entry.views.push(view);
        entry.in_flight = Some((element, change));

        tracing::debug!(
            surface = %surface,
            element = %element,
            depth = entry.views.len(),
            %change,
            "showing view"
        );
        let request = change_request(change, element, Direction::Forward, &options.transition);
        self.engine.change(&surface, request);
    }

    fn mount(&mut self, surface: &Surface, view: &mut dyn View, on_shown: Option<ShownCallback>) {
        let element = view.element();
        surface.mount(element);
        view.render();

        if let Some(callback) = on_shown {
            let since = self.next_change;
            self.pending_shown.insert(element, PendingShown { since, callback });
        }
    }

    /// Requests a reverse change to the current top of the stack at `index`.
    fn change_back(&mut self, index: usize, options: &NavigationOptions) {
        let Some(target) = self.registry.entry(index).top().map(|view| view.element()) else {
            return;
        };

        let change = self.issue_change();
        let entry = self.registry.entry_mut(index);
        entry.in_flight = Some((target, change));
        let surface = entry.surface.clone();
        let request = change_request(change, target, Direction::Back, &options.transition);
        self.engine.change(&surface, request);
    }

    fn ensure_unique(&self, element: ElementId) -> Result<(), NavigationError> {
        let awaiting_teardown = self
            .pending_hidden
            .values()
            .any(|teardown| teardown.views.iter().any(|view| view.element() == element));

        if awaiting_teardown || self.registry.contains_element(element) {
            return Err(NavigationError::DuplicateView(element));
        }

        Ok(())
    }

    fn issue_change(&mut self) -> ChangeId {
        let change = self.next_change;
        self.next_change = change.next();
        change
    }

    /// Parks `views` until `key` is hidden by the next request or a later one.
    fn schedule_teardown(&mut self, key: ElementId, surface: &Surface, views: Vec<Box<dyn View>>) {
        let since = self.next_change;
        self.pending_hidden
            .entry(key)
            .or_insert_with(|| Teardown {
                surface: surface.clone(),
                views: Vec::new(),
                since,
            })
            .views
            .extend(views);
    }

    fn tear_down(&mut self, hidden: ElementId, change: ChangeId) {
        match self.pending_hidden.get(&hidden) {
            Some(teardown) if change >= teardown.since => (),
            Some(teardown) => {
                tracing::trace!(
                    element = %hidden,
                    %change,
                    since = %teardown.since,
                    "ignoring hide signal from an earlier change"
                );
                return;
            }
            None => return,
        }

        let Some(teardown) = self.pending_hidden.remove(&hidden) else {
            return;
        };

        for mut view in teardown.views {
            let element = view.element();
            // A view that never got shown must not call back after it is gone.
            self.pending_shown.remove(&element);
            view.remove();
            teardown.surface.detach(element);
            self.settle(element, change);
            tracing::debug!(surface = %teardown.surface, element = %element, "view torn down");
        }
    }

    /// Marks the transition towards `element` as finished and replays any
    /// operations that were waiting for it.
    fn settle(&mut self, element: ElementId, change: ChangeId) {
        let Some(index) = self.registry.position_in_flight(element, change) else {
            return;
        };

        self.registry.entry_mut(index).in_flight = None;

        while !self.registry.entry(index).is_transitioning() {
            let Some(pending) = self.registry.entry_mut(index).queue.pop_front() else {
                break;
            };

            let name = pending.operation.name();
            if let Err(err) = self.apply(index, pending.operation, &pending.options) {
                let surface = self.registry.entry(index).surface.clone();
                report(&surface, name, &err);
            }
        }
    }
}

/// Sends an advisory condition to the log.
fn report(surface: &Surface, operation: &str, err: &NavigationError) {
    match err {
        NavigationError::EmptyStack(_) => {
            tracing::debug!(surface = %surface, operation, %err, "operation skipped");
        }
        _ => {
            tracing::warn!(surface = %surface, operation, %err, "operation rejected");
        }
    }
}
