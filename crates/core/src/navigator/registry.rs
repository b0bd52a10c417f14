use super::queue::PendingOperation;
use crate::surface::Surface;
use crate::transition::ChangeId;
use crate::view::{ElementId, View};
use std::collections::VecDeque;

/// One surface and the history of views shown on it.
///
/// The last view is the one currently visible.
pub struct ViewStackEntry {
    pub(crate) surface: Surface,
    pub(crate) views: Vec<Box<dyn View>>,
    /// Element whose show transition has been requested but not yet
    /// signalled, with the request that shows it.
    pub(crate) in_flight: Option<(ElementId, ChangeId)>,
    pub(crate) queue: VecDeque<PendingOperation>,
}

impl ViewStackEntry {
    fn new(surface: Surface) -> Self {
        ViewStackEntry {
            surface,
            views: Vec::new(),
            in_flight: None,
            queue: VecDeque::new(),
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn views(&self) -> &[Box<dyn View>] {
        &self.views
    }

    pub fn depth(&self) -> usize {
        self.views.len()
    }

    pub fn top(&self) -> Option<&dyn View> {
        self.views.last().map(|view| view.as_ref())
    }

    pub fn is_transitioning(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }
}

/// Append-only set of stacks, one per distinct surface node.
#[derive(Default)]
pub(crate) struct Registry {
    entries: Vec<ViewStackEntry>,
}

impl Registry {
    pub(crate) fn position(&self, surface: &Surface) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.surface.same_node(surface))
    }

    /// Returns the index of the entry for `surface`, registering an empty one
    /// on first reference.
    pub(crate) fn resolve(&mut self, surface: &Surface) -> usize {
        if let Some(index) = self.position(surface) {
            return index;
        }

        tracing::debug!(surface = %surface, "registering view stack");
        self.entries.push(ViewStackEntry::new(surface.clone()));
        self.entries.len() - 1
    }

    pub(crate) fn get(&self, surface: &Surface) -> Option<&ViewStackEntry> {
        self.position(surface).map(|index| &self.entries[index])
    }

    #[inline]
    pub(crate) fn entry(&self, index: usize) -> &ViewStackEntry {
        &self.entries[index]
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self, index: usize) -> &mut ViewStackEntry {
        &mut self.entries[index]
    }

    pub(crate) fn contains_element(&self, element: ElementId) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.views.iter().any(|view| view.element() == element))
    }

    /// Finds the entry waiting on `element`, provided `change` is not older
    /// than the request it waits on.
    pub(crate) fn position_in_flight(&self, element: ElementId, change: ChangeId) -> Option<usize> {
        self.entries.iter().position(|entry| {
            matches!(entry.in_flight, Some((awaited, since)) if awaited == element && change >= since)
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &ViewStackEntry> {
        self.entries.iter()
    }
}
