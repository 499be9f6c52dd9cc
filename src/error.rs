//! Error types for structural scope mutations.
//!
//! Resize operations themselves never fail; they no-op on missing state.
//! Only changes to the shape of the scope tree can be rejected.

use thiserror::Error;

use crate::types::ScopeId;

/// Scope tree mutation error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    /// The scope was never created or has been destroyed
    #[error("scope {scope} is not alive in this tree")]
    UnknownScope { scope: ScopeId },

    /// The root is its own parent and cannot be moved
    #[error("the root scope {root} cannot be reparented")]
    RootReparent { root: ScopeId },

    /// Moving the scope would make it its own ancestor
    #[error("reparenting {scope} under {new_parent} would create a cycle")]
    WouldCycle { scope: ScopeId, new_parent: ScopeId },
}
