//! Seam to the external transition engine.
//!
//! The navigator never flips visibility itself. It asks a [`TransitionEngine`]
//! to show a target element, and the engine reports back through the [`Hub`]
//! once elements have finished showing or hiding.
//!
//! # Signal flow
//!
//! ```text
//!   Navigator ──change(request)──▶ TransitionEngine
//!       ▲                               │
//!       │                               │ animates, then
//!       └──── Hub (Shown / Hidden) ◀────┘
//! ```
//!
//! Every request carries a [`ChangeId`] and the engine echoes it in the
//! signals that finish the request. A pending teardown or show callback only
//! answers to signals stamped with the request issued when it was registered,
//! or a later one, and is consumed by the first of them.

use crate::surface::Surface;
use crate::view::ElementId;
use std::fmt;
use std::sync::mpsc::{Receiver, Sender};
use std::time::Duration;

/// Sending half of the lifecycle signal channel.
pub type Hub = Sender<LifecycleSignal>;

/// Receiving half of the lifecycle signal channel.
pub type SignalReceiver = Receiver<LifecycleSignal>;

/// Sequence number of a request handed to the engine.
///
/// Ids grow monotonically per navigator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ChangeId(u64);

impl ChangeId {
    pub(crate) fn next(self) -> ChangeId {
        ChangeId(self.0 + 1)
    }
}

impl fmt::Display for ChangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "change {}", self.0)
    }
}

/// Completion signals emitted by the transition engine, stamped with the
/// request that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleSignal {
    /// The element became fully visible.
    Shown(ElementId, ChangeId),
    /// The element finished its hide transition.
    Hidden(ElementId, ChangeId),
}

impl LifecycleSignal {
    pub fn element(&self) -> ElementId {
        match *self {
            LifecycleSignal::Shown(element, _) | LifecycleSignal::Hidden(element, _) => element,
        }
    }

    pub fn change(&self) -> ChangeId {
        match *self {
            LifecycleSignal::Shown(_, change) | LifecycleSignal::Hidden(_, change) => change,
        }
    }
}

/// Structural role requested for the target element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageRole {
    #[default]
    Page,
}

/// A request to make `target` the visible element of a surface.
///
/// `role` and `change_hash` are fixed by the navigator. The remaining
/// fields come from the caller's transition options.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRequest {
    /// Echoed back in the signals that finish this request.
    pub id: ChangeId,
    pub target: ElementId,
    pub role: PageRole,
    pub change_hash: bool,
    pub reverse: bool,
    pub transition: Option<String>,
    pub show_load_msg: Option<bool>,
    pub load_msg_delay: Option<Duration>,
}

/// Host-side transition machinery.
pub trait TransitionEngine {
    /// Hands the engine the channel it reports lifecycle signals on.
    ///
    /// Called once, when the engine is attached to a navigator.
    fn connect(&mut self, hub: Hub);

    /// Returns true once the page system displayed its first page.
    fn is_initialized(&self) -> bool;

    /// One-time page system start, showing `element` without animation.
    ///
    /// Implementations must eventually emit [`LifecycleSignal::Shown`] for
    /// `element`, stamped with `change`.
    fn initialize(&mut self, surface: &Surface, element: ElementId, change: ChangeId);

    /// Animated swap of the visible element on `surface`.
    ///
    /// Implementations must eventually emit [`LifecycleSignal::Hidden`] for
    /// the element being replaced and [`LifecycleSignal::Shown`] for the
    /// target, both stamped with `request.id`.
    fn change(&mut self, surface: &Surface, request: ChangeRequest);

    /// Surface the host currently treats as the default, if any.
    fn active_surface(&self) -> Option<Surface> {
        None
    }
}
