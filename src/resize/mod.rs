//! Resize notification - Node hierarchy and the per-tree registry.
//!
//! - [`ResizeNode`]: one registration point (children, listeners, parent)
//! - [`ResizeRegistry`]: register / resolve / fire over a [`crate::engine::ScopeTree`]
//!
//! Nodes mirror only the scopes that registered as resizers:
//!
//! ```text
//! scopes:  root ── panel ── toolbar
//!                       └── body ── canvas
//! nodes:   n0(panel) ── n1(body)
//! ```
//!
//! A listener on `canvas` lands on `n1`; firing `panel` reaches it through
//! `n0 → n1`.

mod node;
mod registry;

pub use node::ResizeNode;
pub use registry::ResizeRegistry;
