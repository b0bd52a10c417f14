use crate::surface::Surface;
use crate::transition::{ChangeId, ChangeRequest, PageRole};
use crate::view::ElementId;
use std::time::Duration;

/// Transition parameters passed through verbatim to the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionOptions {
    /// Named transition effect, e.g. `"slide"`.
    pub transition: Option<String>,
    /// Direction hint.
    pub reverse: Option<bool>,
    pub show_load_msg: Option<bool>,
    pub load_msg_delay: Option<Duration>,
}

/// Options accepted by every navigator operation.
#[derive(Debug, Clone, Default)]
pub struct NavigationOptions {
    /// Target surface. Falls back to the default resolution chain when unset.
    pub surface: Option<Surface>,
    pub transition: TransitionOptions,
}

impl NavigationOptions {
    pub fn on(surface: &Surface) -> Self {
        NavigationOptions {
            surface: Some(surface.clone()),
            ..Default::default()
        }
    }

    pub fn with_transition(mut self, name: impl Into<String>) -> Self {
        self.transition.transition = Some(name.into());
        self
    }

    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.transition.reverse = Some(reverse);
        self
    }

    pub fn with_load_msg(mut self, delay: Option<Duration>) -> Self {
        self.transition.show_load_msg = Some(true);
        self.transition.load_msg_delay = delay;
        self
    }
}

/// Direction of a requested change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Forward,
    Back,
}

/// Merges caller options over the navigator's defaults.
///
/// Forward changes default to `reverse = false` and let the caller override
/// it. Backward changes always run reversed. Role and hash recording are
/// pinned in both directions.
pub(crate) fn change_request(
    id: ChangeId,
    target: ElementId,
    direction: Direction,
    options: &TransitionOptions,
) -> ChangeRequest {
    let reverse = match direction {
        Direction::Forward => options.reverse.unwrap_or(false),
        Direction::Back => true,
    };

    ChangeRequest {
        id,
        target,
        role: PageRole::Page,
        change_hash: false,
        reverse,
        transition: options.transition.clone(),
        show_load_msg: options.show_load_msg,
        load_msg_delay: options.load_msg_delay,
    }
}
