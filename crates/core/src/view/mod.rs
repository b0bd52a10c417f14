//! The view capability set consumed by the navigator.
//!
//! A view is an externally owned unit of UI content. The navigator only needs
//! three things from it: a stable root element, a way to render into that
//! element, and a way to tear it down once it is no longer visible.
//!
//! # Example
//!
//! ```
//! use navstack_core::view::{ElementId, View, ID_FEEDER};
//!
//! struct Label {
//!     element: ElementId,
//!     text: String,
//!     rendered: bool,
//! }
//!
//! impl View for Label {
//!     fn element(&self) -> ElementId {
//!         self.element
//!     }
//!
//!     fn render(&mut self) {
//!         self.rendered = true;
//!     }
//!
//!     fn remove(&mut self) {
//!         self.rendered = false;
//!     }
//! }
//!
//! let label = Label { element: ID_FEEDER.next(), text: "Home".to_string(), rendered: false };
//! assert!(!label.rendered);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of a view's root element.
///
/// Stable for the lifetime of the view. Two views never share an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

impl ElementId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out process-unique element identifiers.
pub struct IdFeeder(AtomicU64);

impl IdFeeder {
    pub const fn new() -> Self {
        IdFeeder(AtomicU64::new(1))
    }

    pub fn next(&self) -> ElementId {
        ElementId(self.0.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for IdFeeder {
    fn default() -> Self {
        Self::new()
    }
}

pub static ID_FEEDER: IdFeeder = IdFeeder::new();

/// A renderable, removable unit of content with a stable root element.
///
/// # Lifecycle
///
/// 1. The navigator mounts `element()` into a surface.
/// 2. `render()` is called once, before the transition that shows the view.
/// 3. `remove()` is called exactly once, after the element finished hiding.
///
/// Views handed to the navigator are owned by it until they are torn down.
pub trait View {
    /// Root element of this view.
    fn element(&self) -> ElementId;

    /// Populates or refreshes the element. Safe to call before display.
    fn render(&mut self);

    /// Detaches and tears down the element.
    fn remove(&mut self);

    /// Called when this view becomes the structural first page of the
    /// page system, right before the system is initialized.
    fn mark_initial_page(&mut self) {}
}

impl fmt::Debug for dyn View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("element", &self.element())
            .finish()
    }
}
