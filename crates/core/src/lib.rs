//! Multi-surface navigation stacks.
//!
//! Each display surface keeps an ordered history of views. The
//! [`navigator::Navigator`] edits those histories (push, pop, pop back N,
//! pop to first, replace, replace all) and keeps them in step with view
//! lifecycle and an external [`transition::TransitionEngine`].

pub mod helpers;
pub mod logging;
pub mod navigator;
pub mod settings;
pub mod surface;
pub mod transition;
pub mod view;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use crate::navigator::{NavigationError, NavigationOptions, Navigator};
pub use crate::surface::Surface;
pub use crate::transition::{LifecycleSignal, TransitionEngine};
pub use crate::view::View;
