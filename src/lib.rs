//! # spark-resize
//!
//! Hierarchical resize notifications for a reactive component tree.
//!
//! When a subtree is hidden or shown, components inside it may need to
//! re-measure (canvas sizing, virtualized lists). This crate lets such
//! components listen for "layout may have changed" and lets visibility
//! directives announce it.
//!
//! ## Architecture
//!
//! ```text
//! ScopeTree (scope ids, parent table, destroy hooks)
//!     ↑ upward walk
//! ResizeRegistry (node arena, per-scope node lists)
//!     ↑ add_resizer / has_listeners / fire_resize
//! show / hide directives ── TransitionWaiter
//! ```
//!
//! Everything is single-threaded and driven from the UI thread. Fires are
//! synchronous; the only deferred work is the post-transition fire.
//!
//! ## Modules
//!
//! - [`types`] - Ids, listener and cleanup types
//! - [`engine`] - Scope tree
//! - [`resize`] - Resize nodes and registry
//! - [`directive`] - Visibility directives and transition waiting
//! - [`error`] - Scope mutation errors

pub mod directive;
pub mod engine;
pub mod error;
pub mod resize;
pub mod types;

pub use types::*;

pub use engine::{DestroyHookId, ScopeTree};

pub use error::ScopeError;

pub use resize::{ResizeNode, ResizeRegistry};

pub use directive::{
    TransitionConfig, TransitionQueue, TransitionStyle, TransitionWaiter, VisibilityKind,
};
