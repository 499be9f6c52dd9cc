//! Core types shared across the crate.
//!
//! Scopes, nodes and elements are all plain indices. Nothing here owns
//! anything; the tables that give these ids meaning live in
//! [`crate::engine::ScopeTree`] and [`crate::resize::ResizeRegistry`].

use std::fmt;
use std::rc::Rc;

// =============================================================================
// Cleanup Function
// =============================================================================

/// Cleanup function returned by registrations.
///
/// Call this to detach whatever the registration attached. Every cleanup in
/// this crate is safe to run after the thing it detaches is already gone.
pub type Cleanup = Box<dyn FnOnce()>;

// =============================================================================
// Listener
// =============================================================================

/// Resize listener callback.
///
/// Listeners are compared by `Rc` pointer identity, so registering the same
/// `Rc` twice is a no-op while two separately allocated closures with the
/// same body are two listeners.
pub type ResizeListener = Rc<dyn Fn()>;

/// Pointer identity for listeners (ignores the vtable half of the fat pointer).
pub(crate) fn same_listener(a: &ResizeListener, b: &ResizeListener) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

// =============================================================================
// Ids
// =============================================================================

/// Identifier of a UI scope within one [`crate::engine::ScopeTree`].
///
/// Ids are allocated monotonically and never reused, so a stale id simply
/// stops resolving once its scope is destroyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub(crate) usize);

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Identifier of a resize node within one [`crate::resize::ResizeRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Component index of the element a directive is attached to.
///
/// Only the transition waiter interprets it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementId(pub usize);
