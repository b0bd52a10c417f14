use navstack_core::surface::Surface;
use navstack_core::transition::{ChangeId, ChangeRequest, Hub, LifecycleSignal, TransitionEngine};
use navstack_core::view::ElementId;

/// Transition engine that finishes every change instantly and logs it.
#[derive(Default)]
pub struct ConsoleEngine {
    hub: Option<Hub>,
    initialized: bool,
    visible: Vec<(Surface, ElementId)>,
}

impl ConsoleEngine {
    fn signal(&self, signal: LifecycleSignal) {
        if let Some(hub) = &self.hub {
            hub.send(signal).ok();
        }
    }

    fn show(&mut self, surface: &Surface, element: ElementId, change: ChangeId) {
        let previous = match self.visible.iter_mut().find(|(s, _)| s == surface) {
            Some((_, visible)) => Some(std::mem::replace(visible, element)),
            None => {
                self.visible.push((surface.clone(), element));
                None
            }
        };

        if let Some(previous) = previous.filter(|previous| *previous != element) {
            self.signal(LifecycleSignal::Hidden(previous, change));
        }
        self.signal(LifecycleSignal::Shown(element, change));
    }
}

impl TransitionEngine for ConsoleEngine {
    fn connect(&mut self, hub: Hub) {
        self.hub = Some(hub);
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn initialize(&mut self, surface: &Surface, element: ElementId, change: ChangeId) {
        tracing::info!(surface = %surface, element = %element, "page system initialized");
        self.initialized = true;
        self.show(surface, element, change);
    }

    fn change(&mut self, surface: &Surface, request: ChangeRequest) {
        tracing::info!(
            surface = %surface,
            target = %request.target,
            change = %request.id,
            reverse = request.reverse,
            transition = request.transition.as_deref().unwrap_or("default"),
            "changing page"
        );
        self.show(surface, request.target, request.id);
    }
}
