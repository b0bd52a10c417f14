use crate::view::ElementId;

/// Advisory conditions reported by navigator operations.
///
/// None of these are fatal. The operation that produced one left every
/// stack untouched.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// A pop would remove the first view of a stack, or go below it.
    #[error("cannot pop {count} view(s) off a stack of {depth}; replace the first view instead")]
    InvalidPop { depth: usize, count: usize },

    /// `pop_back_n_views(0)` names no view to discard.
    #[error("popping back zero views leaves nothing to transition to")]
    NothingToPop,

    /// Replace requested on a surface that shows no view yet.
    #[error("no view to replace on surface '{0}'")]
    EmptyStack(String),

    /// The view's element is already owned by a stack or awaiting teardown.
    #[error("element {0} is already on a stack")]
    DuplicateView(ElementId),
}

/// Outcome of an accepted operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The stack was edited and a transition requested.
    Applied,
    /// A transition is in flight on the surface; the operation runs once it settles.
    Queued,
}
