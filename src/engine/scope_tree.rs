//! Scope Tree - Explicit arena of UI scopes.
//!
//! Manages the lifecycle of scopes:
//! - Monotonic scope ids (never reused)
//! - Side table mapping scope → parent scope (root is its own parent)
//! - Child lists for recursive destruction
//! - Destroy callbacks per scope, run children-first
//!
//! The tree is a cheap-to-clone handle. Every clone refers to the same
//! scopes, so a component binding can keep one around for cleanup without
//! borrowing from its owner.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};

use crate::error::ScopeError;
use crate::types::{Cleanup, ScopeId};

// =============================================================================
// Tree State
// =============================================================================

/// Handle for a registered destroy callback, used to cancel it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DestroyHookId(usize);

struct TreeState {
    root: ScopeId,

    /// Map scope → parent scope. The root maps to itself.
    parents: HashMap<ScopeId, ScopeId>,

    /// Map scope → child scopes, in creation order.
    children: HashMap<ScopeId, Vec<ScopeId>>,

    /// Destroy callbacks registered per scope.
    destroy_callbacks: HashMap<ScopeId, Vec<(DestroyHookId, Cleanup)>>,

    next_scope: usize,
    next_hook: usize,
}

impl TreeState {
    fn new() -> Self {
        let root = ScopeId(0);
        let mut parents = HashMap::new();
        parents.insert(root, root);
        let mut children = HashMap::new();
        children.insert(root, Vec::new());

        Self {
            root,
            parents,
            children,
            destroy_callbacks: HashMap::new(),
            next_scope: 1,
            next_hook: 0,
        }
    }

    fn is_alive(&self, scope: ScopeId) -> bool {
        self.parents.contains_key(&scope)
    }

    fn self_and_ancestors(&self, scope: ScopeId) -> Vec<ScopeId> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = scope;

        while self.is_alive(current) && seen.insert(current) {
            chain.push(current);
            match self.parents.get(&current) {
                // Root sentinel: parent == self.
                Some(&parent) if parent == current => break,
                Some(&parent) => current = parent,
                None => break,
            }
        }

        chain
    }

    /// Subtree rooted at `scope`, deepest scopes first.
    fn post_order(&self, scope: ScopeId) -> Vec<ScopeId> {
        let mut out = Vec::new();
        let mut stack = vec![(scope, false)];

        while let Some((current, expanded)) = stack.pop() {
            if expanded {
                out.push(current);
                continue;
            }
            stack.push((current, true));
            if let Some(children) = self.children.get(&current) {
                for &child in children.iter().rev() {
                    stack.push((child, false));
                }
            }
        }

        out
    }

    fn forget(&mut self, scope: ScopeId) -> Vec<(DestroyHookId, Cleanup)> {
        if let Some(parent) = self.parents.remove(&scope) {
            if parent != scope {
                if let Some(siblings) = self.children.get_mut(&parent) {
                    siblings.retain(|&s| s != scope);
                }
            }
        }
        self.children.remove(&scope);
        self.destroy_callbacks.remove(&scope).unwrap_or_default()
    }
}

// =============================================================================
// Scope Tree
// =============================================================================

/// Arena of UI scopes with parent links and destroy hooks.
#[derive(Clone)]
pub struct ScopeTree {
    state: Rc<RefCell<TreeState>>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    /// Create a tree holding only its root scope.
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(TreeState::new())),
        }
    }

    /// The root scope. It is its own parent.
    pub fn root(&self) -> ScopeId {
        self.state.borrow().root
    }

    /// Create a new scope under `parent`.
    ///
    /// # Errors
    /// [`ScopeError::UnknownScope`] if `parent` is not alive.
    pub fn create_scope(&self, parent: ScopeId) -> Result<ScopeId, ScopeError> {
        let mut state = self.state.borrow_mut();
        if !state.is_alive(parent) {
            return Err(ScopeError::UnknownScope { scope: parent });
        }

        let scope = ScopeId(state.next_scope);
        state.next_scope += 1;
        state.parents.insert(scope, parent);
        state.children.insert(scope, Vec::new());
        state.children.entry(parent).or_default().push(scope);

        tracing::trace!(%scope, %parent, "scope created");
        Ok(scope)
    }

    /// Raw parent pointer of `scope`. The root returns itself.
    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.state.borrow().parents.get(&scope).copied()
    }

    /// Direct children of `scope`, in creation order.
    pub fn children(&self, scope: ScopeId) -> Vec<ScopeId> {
        self.state
            .borrow()
            .children
            .get(&scope)
            .cloned()
            .unwrap_or_default()
    }

    /// Check if a scope is currently alive.
    pub fn is_alive(&self, scope: ScopeId) -> bool {
        self.state.borrow().is_alive(scope)
    }

    /// Number of live scopes, root included.
    pub fn len(&self) -> usize {
        self.state.borrow().parents.len()
    }

    /// True once the root itself has been destroyed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `scope` followed by each ancestor up to and including the root.
    ///
    /// Stops at the root's self-parent sentinel, at a missing parent, or at
    /// the first revisited scope. Empty if `scope` is not alive.
    pub fn self_and_ancestors(&self, scope: ScopeId) -> Vec<ScopeId> {
        self.state.borrow().self_and_ancestors(scope)
    }

    /// Move `scope` under `new_parent`.
    ///
    /// Resize nodes already attached below `scope` keep the parent node they
    /// resolved at creation.
    ///
    /// # Errors
    /// - [`ScopeError::UnknownScope`] if either scope is not alive
    /// - [`ScopeError::RootReparent`] if `scope` is the root
    /// - [`ScopeError::WouldCycle`] if `new_parent` is `scope` or below it
    pub fn reparent(&self, scope: ScopeId, new_parent: ScopeId) -> Result<(), ScopeError> {
        let mut state = self.state.borrow_mut();

        for id in [scope, new_parent] {
            if !state.is_alive(id) {
                return Err(ScopeError::UnknownScope { scope: id });
            }
        }
        if scope == state.root {
            return Err(ScopeError::RootReparent { root: scope });
        }
        if state.self_and_ancestors(new_parent).contains(&scope) {
            return Err(ScopeError::WouldCycle { scope, new_parent });
        }

        let old_parent = state.parents.insert(scope, new_parent);
        if let Some(old) = old_parent {
            if let Some(siblings) = state.children.get_mut(&old) {
                siblings.retain(|&s| s != scope);
            }
        }
        state.children.entry(new_parent).or_default().push(scope);

        tracing::trace!(%scope, %new_parent, "scope reparented");
        Ok(())
    }

    // =========================================================================
    // Destroy Callbacks
    // =========================================================================

    /// Register a callback to run when `scope` is destroyed.
    ///
    /// Returns `None` (and drops the callback) if the scope is not alive.
    pub fn on_destroy(
        &self,
        scope: ScopeId,
        callback: impl FnOnce() + 'static,
    ) -> Option<DestroyHookId> {
        let mut state = self.state.borrow_mut();
        if !state.is_alive(scope) {
            return None;
        }

        let id = DestroyHookId(state.next_hook);
        state.next_hook += 1;
        state
            .destroy_callbacks
            .entry(scope)
            .or_default()
            .push((id, Box::new(callback)));
        Some(id)
    }

    /// Drop a destroy callback without running it. No-op if already run.
    pub fn cancel_destroy(&self, scope: ScopeId, hook: DestroyHookId) {
        let mut state = self.state.borrow_mut();
        if let Some(callbacks) = state.destroy_callbacks.get_mut(&scope) {
            callbacks.retain(|(id, _)| *id != hook);
        }
    }

    /// Destroy `scope` and everything below it.
    ///
    /// Descendants go first, deepest first. Each scope is removed from the
    /// tree before its callbacks run, so callbacks observe it as dead.
    /// Destroying an unknown scope is a no-op.
    pub fn destroy_scope(&self, scope: ScopeId) {
        let order = {
            let state = self.state.borrow();
            if !state.is_alive(scope) {
                return;
            }
            state.post_order(scope)
        };

        tracing::debug!(%scope, count = order.len(), "destroying scope subtree");

        for current in order {
            let callbacks = self.state.borrow_mut().forget(current);
            for (_, callback) in callbacks {
                callback();
            }
        }
    }

    pub(crate) fn downgrade(&self) -> WeakScopeTree {
        WeakScopeTree(Rc::downgrade(&self.state))
    }
}

/// Non-owning tree handle held by cleanups.
#[derive(Clone)]
pub(crate) struct WeakScopeTree(Weak<RefCell<TreeState>>);

impl WeakScopeTree {
    pub(crate) fn upgrade(&self) -> Option<ScopeTree> {
        self.0.upgrade().map(|state| ScopeTree { state })
    }
}
