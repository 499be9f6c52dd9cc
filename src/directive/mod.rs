//! Directives - Bindings that drive the registry from the UI.
//!
//! - [`show`] / [`hide`] / [`link`] - visibility directives
//! - [`TransitionWaiter`] - seam for transition-end detection
//! - [`TransitionQueue`] - tick-driven default waiter

mod transition;
mod visibility;

pub use transition::{TransitionConfig, TransitionQueue, TransitionStyle, TransitionWaiter};
pub use visibility::{hide, link, show, VisibilityKind};
