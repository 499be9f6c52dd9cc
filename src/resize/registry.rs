//! Resize Registry - Per-tree resize notification service.
//!
//! Exposes four operations over the scope hierarchy:
//! - [`ResizeRegistry::add_resizer`] - attach a node to a scope
//! - [`ResizeRegistry::add_listener`] - listen on the nearest node(s) above a scope
//! - [`ResizeRegistry::has_listeners`] - check the nearest node(s) for listeners
//! - [`ResizeRegistry::fire_resize`] - fire the nearest node(s), cascading down
//!
//! # Resolution
//!
//! All lookups share one upward walk: start at the scope, step to the parent
//! until a scope carrying nodes is found. The first match wins; scopes above
//! it are not considered. The walk stops at the root's self-parent entry.
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use spark_resize::{ResizeRegistry, ScopeTree};
//!
//! let tree = ScopeTree::new();
//! let registry = ResizeRegistry::new(&tree);
//!
//! let panel = tree.create_scope(tree.root())?;
//! let canvas = tree.create_scope(panel)?;
//!
//! let _detach = registry.add_resizer(panel);
//! let _unlisten = registry.add_listener(canvas, Rc::new(|| println!("re-measure")));
//!
//! registry.fire_resize(panel); // prints "re-measure"
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::engine::ScopeTree;
use crate::types::{Cleanup, NodeId, ResizeListener, ScopeId};

use super::node::{NodeTable, ResizeNode};

// =============================================================================
// Registry
// =============================================================================

/// Resize notification service for one UI tree.
///
/// Cloning is cheap and every clone shares the same node table.
#[derive(Clone)]
pub struct ResizeRegistry {
    tree: ScopeTree,
    table: Rc<RefCell<NodeTable>>,
}

impl ResizeRegistry {
    /// Create an empty registry over `tree`.
    pub fn new(tree: &ScopeTree) -> Self {
        Self {
            tree: tree.clone(),
            table: Rc::new(RefCell::new(NodeTable::new())),
        }
    }

    /// The scope tree this registry resolves against.
    pub fn tree(&self) -> &ScopeTree {
        &self.tree
    }

    /// Nodes of the nearest scope in `chain` that carries any.
    fn resolve_chain(&self, chain: &[ScopeId]) -> Vec<NodeId> {
        let table = self.table.borrow();
        for &scope in chain {
            if let Some(nodes) = table.nodes_for_scope(scope) {
                tracing::trace!(%scope, count = nodes.len(), "resolved resizer scope");
                return nodes.to_vec();
            }
        }
        Vec::new()
    }

    /// Nodes of the nearest self-or-ancestor scope of `scope` carrying any.
    ///
    /// Empty if no scope in the chain has a resizer, or `scope` is dead.
    pub fn resolve(&self, scope: ScopeId) -> Vec<NodeId> {
        self.resolve_chain(&self.tree.self_and_ancestors(scope))
    }

    // =========================================================================
    // Resizers
    // =========================================================================

    /// Register `scope` as a resizer.
    ///
    /// Creates a node whose parent is the first node of the nearest ancestor
    /// scope carrying nodes (the scope itself is skipped). A scope may hold
    /// several nodes. The node is detached automatically when `scope` is
    /// destroyed.
    ///
    /// # Returns
    /// An idempotent detach function.
    pub fn add_resizer(&self, scope: ScopeId) -> Cleanup {
        let chain = self.tree.self_and_ancestors(scope);
        if chain.is_empty() {
            tracing::warn!(%scope, "add_resizer on a scope that is not alive");
            return Box::new(|| {});
        }

        let parent = self.resolve_chain(&chain[1..]).first().copied();
        let id = self.table.borrow_mut().insert(scope, parent);
        tracing::debug!(%scope, node = %id, parent = ?parent, "resizer added");

        let weak_table = Rc::downgrade(&self.table);
        let hook = self.tree.on_destroy(scope, {
            let weak_table = weak_table.clone();
            move || detach_node(&weak_table, id)
        });

        let weak_tree = self.tree.downgrade();
        Box::new(move || {
            detach_node(&weak_table, id);
            if let (Some(hook), Some(tree)) = (hook, weak_tree.upgrade()) {
                tree.cancel_destroy(scope, hook);
            }
        })
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Register `callback` on the nodes resolved from `scope`.
    ///
    /// The callback is removed automatically when `scope` (the listening
    /// scope, not the resizer's) is destroyed. The resolved node set is fixed
    /// now; resizers added later are not picked up.
    ///
    /// # Returns
    /// `None` if no resizer is reachable from `scope`, otherwise a function
    /// removing the callback from every resolved node.
    pub fn add_listener(&self, scope: ScopeId, callback: ResizeListener) -> Option<Cleanup> {
        let nodes = self.resolve(scope);
        if nodes.is_empty() {
            tracing::debug!(%scope, "no resizer above listener scope");
            return None;
        }

        {
            let mut table = self.table.borrow_mut();
            for &id in &nodes {
                if let Some(node) = table.get_mut(id) {
                    node.add_listener(callback.clone());
                }
            }
        }
        tracing::debug!(%scope, nodes = nodes.len(), "listener added");

        let weak_table = Rc::downgrade(&self.table);
        let nodes: Rc<[NodeId]> = nodes.into();
        let hook = self.tree.on_destroy(scope, {
            let weak_table = weak_table.clone();
            let nodes = nodes.clone();
            let callback = callback.clone();
            move || remove_listener(&weak_table, &nodes, &callback)
        });

        let weak_tree = self.tree.downgrade();
        Some(Box::new(move || {
            remove_listener(&weak_table, &nodes, &callback);
            if let (Some(hook), Some(tree)) = (hook, weak_tree.upgrade()) {
                tree.cancel_destroy(scope, hook);
            }
        }))
    }

    /// True if any node resolved from `scope` has a direct listener.
    ///
    /// Listeners on descendant nodes do not count.
    pub fn has_listeners(&self, scope: ScopeId) -> bool {
        let nodes = self.resolve(scope);
        let table = self.table.borrow();
        nodes
            .iter()
            .filter_map(|&id| table.get(id))
            .any(ResizeNode::has_listeners)
    }

    // =========================================================================
    // Fire
    // =========================================================================

    /// Fire every node resolved from `scope`, cascading to descendants.
    ///
    /// Listeners are collected first and run after the node table is
    /// released, so a listener may register, detach or fire again.
    pub fn fire_resize(&self, scope: ScopeId) {
        let nodes = self.resolve(scope);
        if nodes.is_empty() {
            tracing::trace!(%scope, "fire_resize with no resizer");
            return;
        }

        let mut listeners = Vec::new();
        self.table.borrow().collect_fire(&nodes, &mut listeners);
        tracing::debug!(
            %scope,
            nodes = nodes.len(),
            listeners = listeners.len(),
            "firing resize"
        );

        for listener in listeners {
            listener();
        }
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Total number of live nodes.
    pub fn node_count(&self) -> usize {
        self.table.borrow().len()
    }

    /// Nodes attached directly to `scope`.
    pub fn resizers(&self, scope: ScopeId) -> Vec<NodeId> {
        self.table
            .borrow()
            .nodes_for_scope(scope)
            .map(<[NodeId]>::to_vec)
            .unwrap_or_default()
    }

    /// Number of direct listeners across the nodes attached to `scope`.
    pub fn listener_count(&self, scope: ScopeId) -> usize {
        let table = self.table.borrow();
        table
            .nodes_for_scope(scope)
            .unwrap_or_default()
            .iter()
            .filter_map(|&id| table.get(id))
            .map(ResizeNode::listener_count)
            .sum()
    }

    /// Run `f` on `node` if it is alive.
    ///
    /// The node table stays borrowed while `f` runs, so `f` must not call
    /// back into the registry.
    pub fn with_node<R>(&self, node: NodeId, f: impl FnOnce(&ResizeNode) -> R) -> Option<R> {
        self.table.borrow().get(node).map(f)
    }

    /// Parent node of `node`, if the node is alive and has one.
    pub fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.table.borrow().get(node).and_then(ResizeNode::parent)
    }

    /// Children of `node`, in fire order.
    pub fn children_of(&self, node: NodeId) -> Vec<NodeId> {
        self.table
            .borrow()
            .get(node)
            .map(|n| n.children().to_vec())
            .unwrap_or_default()
    }
}

// =============================================================================
// Cleanup Helpers
// =============================================================================

fn detach_node(table: &Weak<RefCell<NodeTable>>, id: NodeId) {
    let Some(table) = table.upgrade() else { return };
    if table.borrow_mut().destroy(id) {
        tracing::debug!(node = %id, "resizer detached");
    }
}

fn remove_listener(table: &Weak<RefCell<NodeTable>>, nodes: &[NodeId], callback: &ResizeListener) {
    let Some(table) = table.upgrade() else { return };
    let mut table = table.borrow_mut();
    let mut removed = 0;
    for &id in nodes {
        if let Some(node) = table.get_mut(id) {
            if node.remove_listener(callback) {
                removed += 1;
            }
        }
    }
    if removed > 0 {
        tracing::debug!(nodes = removed, "listener removed");
    }
}
