//! Test doubles for the transition engine and views.

use crate::surface::Surface;
use crate::transition::{ChangeId, ChangeRequest, Hub, LifecycleSignal, TransitionEngine};
use crate::view::{ElementId, View, ID_FEEDER};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Initialize {
        surface: Surface,
        element: ElementId,
        change: ChangeId,
    },
    Change {
        surface: Surface,
        request: ChangeRequest,
    },
}

impl EngineCall {
    pub fn change(&self) -> ChangeId {
        match self {
            EngineCall::Initialize { change, .. } => *change,
            EngineCall::Change { request, .. } => request.id,
        }
    }
}

/// Records every request. In automatic mode it immediately reports the
/// previously visible element as hidden and the target as shown.
pub struct RecordingEngine {
    hub: Option<Hub>,
    initialized: bool,
    automatic: bool,
    visible: Vec<(Surface, ElementId)>,
    pub calls: Vec<EngineCall>,
    pub active: Option<Surface>,
}

impl RecordingEngine {
    pub fn automatic() -> Self {
        RecordingEngine {
            hub: None,
            initialized: false,
            automatic: true,
            visible: Vec::new(),
            calls: Vec::new(),
            active: None,
        }
    }

    /// Signals are left to the test.
    pub fn manual() -> Self {
        RecordingEngine {
            automatic: false,
            ..Self::automatic()
        }
    }

    pub fn already_initialized(mut self) -> Self {
        self.initialized = true;
        self
    }

    pub fn last_change(&self) -> Option<&ChangeRequest> {
        self.calls.iter().rev().find_map(|call| match call {
            EngineCall::Change { request, .. } => Some(request),
            EngineCall::Initialize { .. } => None,
        })
    }

    pub fn change_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, EngineCall::Change { .. }))
            .count()
    }

    /// Id of the most recent request, which is what an engine finishing its
    /// outstanding work would stamp on its signals.
    pub fn latest_change(&self) -> ChangeId {
        self.calls.last().map(EngineCall::change).unwrap_or_default()
    }

    pub fn hidden(&self, element: ElementId) -> LifecycleSignal {
        LifecycleSignal::Hidden(element, self.latest_change())
    }

    pub fn shown(&self, element: ElementId) -> LifecycleSignal {
        LifecycleSignal::Shown(element, self.latest_change())
    }

    fn swap_visible(&mut self, surface: &Surface, element: ElementId) -> Option<ElementId> {
        match self.visible.iter_mut().find(|(s, _)| s.same_node(surface)) {
            Some((_, visible)) => Some(std::mem::replace(visible, element)),
            None => {
                self.visible.push((surface.clone(), element));
                None
            }
        }
    }

    fn send(&self, signal: LifecycleSignal) {
        if let Some(hub) = &self.hub {
            hub.send(signal).ok();
        }
    }
}

impl TransitionEngine for RecordingEngine {
    fn connect(&mut self, hub: Hub) {
        self.hub = Some(hub);
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn initialize(&mut self, surface: &Surface, element: ElementId, change: ChangeId) {
        self.initialized = true;
        self.calls.push(EngineCall::Initialize {
            surface: surface.clone(),
            element,
            change,
        });
        self.swap_visible(surface, element);
        if self.automatic {
            self.send(LifecycleSignal::Shown(element, change));
        }
    }

    fn change(&mut self, surface: &Surface, request: ChangeRequest) {
        let (target, change) = (request.target, request.id);
        self.calls.push(EngineCall::Change {
            surface: surface.clone(),
            request,
        });
        let previous = self.swap_visible(surface, target);
        if self.automatic {
            if let Some(previous) = previous {
                self.send(LifecycleSignal::Hidden(previous, change));
            }
            self.send(LifecycleSignal::Shown(target, change));
        }
    }

    fn active_surface(&self) -> Option<Surface> {
        self.active.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Render(&'static str),
    Remove(&'static str),
    InitialPage(&'static str),
}

pub type Journal = Rc<RefCell<Vec<ViewEvent>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

pub struct TestView {
    element: ElementId,
    name: &'static str,
    journal: Journal,
}

impl TestView {
    pub fn boxed(name: &'static str, journal: &Journal) -> (Box<dyn View>, ElementId) {
        let element = ID_FEEDER.next();
        let view = TestView {
            element,
            name,
            journal: Rc::clone(journal),
        };
        (Box::new(view), element)
    }

    pub fn with_element(name: &'static str, element: ElementId, journal: &Journal) -> Box<dyn View> {
        Box::new(TestView {
            element,
            name,
            journal: Rc::clone(journal),
        })
    }
}

impl View for TestView {
    fn element(&self) -> ElementId {
        self.element
    }

    fn render(&mut self) {
        self.journal.borrow_mut().push(ViewEvent::Render(self.name));
    }

    fn remove(&mut self) {
        self.journal.borrow_mut().push(ViewEvent::Remove(self.name));
    }

    fn mark_initial_page(&mut self) {
        self.journal.borrow_mut().push(ViewEvent::InitialPage(self.name));
    }
}

pub fn removals(journal: &Journal) -> Vec<&'static str> {
    journal
        .borrow()
        .iter()
        .filter_map(|event| match event {
            ViewEvent::Remove(name) => Some(*name),
            _ => None,
        })
        .collect()
}

pub fn renders(journal: &Journal) -> Vec<&'static str> {
    journal
        .borrow()
        .iter()
        .filter_map(|event| match event {
            ViewEvent::Render(name) => Some(*name),
            _ => None,
        })
        .collect()
}
