//! Scope engine - The UI scope hierarchy resize nodes mirror.
//!
//! Scopes are NOT objects. They are ids in a side table:
//!
//! ```text
//! s0: root   (parent=s0)
//! s1: panel  (parent=s0)
//! s2: canvas (parent=s1)
//! ```
//!
//! Walking upward is a table lookup per step, and the root's self-parent
//! entry is the walk's terminator.

mod scope_tree;

pub use scope_tree::{DestroyHookId, ScopeTree};
pub(crate) use scope_tree::WeakScopeTree;
