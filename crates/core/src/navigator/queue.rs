//! Deferred operations for surfaces with a transition in flight.
//!
//! Only used under [`OverlapPolicy::Queue`](crate::settings::OverlapPolicy).
//! Each queued operation carries its resolved surface, so a later change of
//! the default surface cannot redirect it.

use super::options::NavigationOptions;
use crate::view::View;

pub type ShownCallback = Box<dyn FnOnce()>;

pub(crate) enum Operation {
    Push {
        view: Box<dyn View>,
        on_shown: Option<ShownCallback>,
    },
    Pop,
    PopBack(usize),
    PopToFirst,
    Replace {
        view: Box<dyn View>,
        on_shown: Option<ShownCallback>,
    },
    ReplaceAll {
        view: Box<dyn View>,
    },
}

impl Operation {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Operation::Push { .. } => "push",
            Operation::Pop => "pop",
            Operation::PopBack(_) => "pop-back",
            Operation::PopToFirst => "pop-to-first",
            Operation::Replace { .. } => "replace",
            Operation::ReplaceAll { .. } => "replace-all",
        }
    }
}

pub(crate) struct PendingOperation {
    pub(crate) operation: Operation,
    pub(crate) options: NavigationOptions,
}
