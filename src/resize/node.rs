//! ResizeNode - One registration point in the resize hierarchy.
//!
//! Nodes live in a [`NodeTable`] arena and refer to each other by
//! [`NodeId`]. A node's parent is resolved once, when it is created, from the
//! scope hierarchy; it never follows later scope moves.
//!
//! # Fire Order
//!
//! ```text
//! n0 [a, b]
//! ├── n1 [c]
//! │   └── n3 [d]
//! └── n2 [e]
//!
//! fire(n0) → a, b, c, d, e
//! ```
//!
//! Listeners of a node run in registration order, then each child subtree in
//! child order (pre-order, parent before children).

use std::collections::{HashMap, HashSet};

use crate::types::{same_listener, NodeId, ResizeListener, ScopeId};

// =============================================================================
// ResizeNode
// =============================================================================

/// A node in the resize hierarchy.
pub struct ResizeNode {
    scope: ScopeId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    listeners: Vec<ResizeListener>,
}

impl ResizeNode {
    fn new(scope: ScopeId, parent: Option<NodeId>) -> Self {
        Self {
            scope,
            parent,
            children: Vec::new(),
            listeners: Vec::new(),
        }
    }

    /// Scope this node is attached to.
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Nearest ancestor node, if any.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child nodes in creation order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Add a child. Returns false if it was already a child.
    pub(crate) fn add_child(&mut self, child: NodeId) -> bool {
        if self.children.contains(&child) {
            return false;
        }
        self.children.push(child);
        true
    }

    /// Remove a child. Returns false if it was not a child.
    pub(crate) fn remove_child(&mut self, child: NodeId) -> bool {
        match self.children.iter().position(|&c| c == child) {
            Some(index) => {
                self.children.remove(index);
                true
            }
            None => false,
        }
    }

    /// Add a listener. Returns false if this exact listener is already registered.
    pub(crate) fn add_listener(&mut self, listener: ResizeListener) -> bool {
        if self.listeners.iter().any(|l| same_listener(l, &listener)) {
            return false;
        }
        self.listeners.push(listener);
        true
    }

    /// Remove a listener. Returns false if it was not registered.
    pub(crate) fn remove_listener(&mut self, listener: &ResizeListener) -> bool {
        match self.listeners.iter().position(|l| same_listener(l, listener)) {
            Some(index) => {
                self.listeners.remove(index);
                true
            }
            None => false,
        }
    }

    /// True if any listener is registered directly on this node.
    pub fn has_listeners(&self) -> bool {
        !self.listeners.is_empty()
    }

    /// Number of listeners registered directly on this node.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

// =============================================================================
// NodeTable
// =============================================================================

/// Arena owning every node of one registry, plus the per-scope node lists.
pub(crate) struct NodeTable {
    nodes: HashMap<NodeId, ResizeNode>,

    /// Nodes attached to each scope, in registration order.
    by_scope: HashMap<ScopeId, Vec<NodeId>>,

    next_id: usize,
}

impl NodeTable {
    pub(crate) fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            by_scope: HashMap::new(),
            next_id: 0,
        }
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&ResizeNode> {
        self.nodes.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut ResizeNode> {
        self.nodes.get_mut(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes attached to `scope`, if it carries any.
    pub(crate) fn nodes_for_scope(&self, scope: ScopeId) -> Option<&[NodeId]> {
        self.by_scope
            .get(&scope)
            .map(Vec::as_slice)
            .filter(|nodes| !nodes.is_empty())
    }

    /// Create a node for `scope` under `parent` and record it on the scope.
    ///
    /// `parent` must already be in the table, which keeps the hierarchy
    /// acyclic: a new node can only ever be a leaf.
    pub(crate) fn insert(&mut self, scope: ScopeId, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;

        let parent = parent.filter(|p| self.nodes.contains_key(p));
        if let Some(parent_node) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent_node.add_child(id);
        }

        self.nodes.insert(id, ResizeNode::new(scope, parent));
        self.by_scope.entry(scope).or_default().push(id);
        id
    }

    /// Remove a node.
    ///
    /// The node leaves its parent's child set and its scope's node list. Its
    /// children are adopted by its parent, or become parentless when it had
    /// none. A child list stays in node creation order. Returns false if the
    /// node was already gone.
    pub(crate) fn destroy(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.remove(&id) else {
            return false;
        };

        if let Some(list) = self.by_scope.get_mut(&node.scope) {
            list.retain(|&n| n != id);
            if list.is_empty() {
                self.by_scope.remove(&node.scope);
            }
        }

        for &child in &node.children {
            if let Some(child_node) = self.nodes.get_mut(&child) {
                child_node.parent = node.parent;
            }
        }

        if let Some(parent_node) = node.parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent_node.remove_child(id);
            for &child in &node.children {
                parent_node.add_child(child);
            }
            // Ids are allocated in creation order.
            parent_node.children.sort_unstable();
        }

        true
    }

    /// Listeners reached by firing each of `roots` in turn, in call order.
    ///
    /// Collected up front so the caller can release its borrow before any
    /// listener runs. A node is visited at most once per collection, and a
    /// listener registered on several reached nodes is collected once, at
    /// its first position.
    pub(crate) fn collect_fire(&self, roots: &[NodeId], out: &mut Vec<ResizeListener>) {
        let mut seen = HashSet::new();
        let mut stack: Vec<NodeId> = roots.iter().rev().copied().collect();

        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            for listener in &node.listeners {
                if !out.iter().any(|l| same_listener(l, listener)) {
                    out.push(listener.clone());
                }
            }
            stack.extend(node.children.iter().rev().copied());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> ResizeListener {
        let log = log.clone();
        Rc::new(move || log.borrow_mut().push(name))
    }

    fn fire(table: &NodeTable, id: NodeId) {
        let mut listeners = Vec::new();
        table.collect_fire(&[id], &mut listeners);
        for listener in listeners {
            listener();
        }
    }

    #[test]
    fn test_add_child_idempotent() {
        let mut node = ResizeNode::new(ScopeId(0), None);

        assert!(node.add_child(NodeId(1)));
        assert!(!node.add_child(NodeId(1)));
        assert_eq!(node.children(), &[NodeId(1)]);
    }

    #[test]
    fn test_remove_child_mutates() {
        let mut node = ResizeNode::new(ScopeId(0), None);
        node.add_child(NodeId(1));
        node.add_child(NodeId(2));

        assert!(node.remove_child(NodeId(1)));
        assert_eq!(node.children(), &[NodeId(2)]);
        assert!(!node.remove_child(NodeId(1)));
    }

    #[test]
    fn test_listener_set_semantics() {
        let mut node = ResizeNode::new(ScopeId(0), None);
        let a: ResizeListener = Rc::new(|| {});
        let never_added: ResizeListener = Rc::new(|| {});

        assert!(!node.has_listeners());
        assert!(node.add_listener(a.clone()));
        assert!(!node.add_listener(a.clone()));
        assert_eq!(node.listener_count(), 1);

        assert!(!node.remove_listener(&never_added));
        assert!(node.remove_listener(&a));
        assert!(!node.has_listeners());
    }

    #[test]
    fn test_fire_pre_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut table = NodeTable::new();

        let n0 = table.insert(ScopeId(0), None);
        let n1 = table.insert(ScopeId(1), Some(n0));
        let n2 = table.insert(ScopeId(2), Some(n0));
        let n3 = table.insert(ScopeId(3), Some(n1));

        table.get_mut(n0).unwrap().add_listener(recorder(&log, "a"));
        table.get_mut(n0).unwrap().add_listener(recorder(&log, "b"));
        table.get_mut(n1).unwrap().add_listener(recorder(&log, "c"));
        table.get_mut(n3).unwrap().add_listener(recorder(&log, "d"));
        table.get_mut(n2).unwrap().add_listener(recorder(&log, "e"));

        fire(&table, n0);
        assert_eq!(*log.borrow(), vec!["a", "b", "c", "d", "e"]);

        log.borrow_mut().clear();
        fire(&table, n1);
        assert_eq!(*log.borrow(), vec!["c", "d"]);
    }

    #[test]
    fn test_destroy_detaches_and_adopts() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut table = NodeTable::new();

        let n0 = table.insert(ScopeId(0), None);
        let n1 = table.insert(ScopeId(1), Some(n0));
        let n2 = table.insert(ScopeId(2), Some(n0));
        let n3 = table.insert(ScopeId(3), Some(n1));
        let n4 = table.insert(ScopeId(3), Some(n1));

        table.get_mut(n1).unwrap().add_listener(recorder(&log, "gone"));
        table.get_mut(n3).unwrap().add_listener(recorder(&log, "d"));
        table.get_mut(n4).unwrap().add_listener(recorder(&log, "f"));
        table.get_mut(n2).unwrap().add_listener(recorder(&log, "e"));

        assert!(table.destroy(n1));
        assert!(!table.destroy(n1));

        assert_eq!(table.get(n0).unwrap().children(), &[n2, n3, n4]);
        assert_eq!(table.get(n3).unwrap().parent(), Some(n0));
        assert!(table.nodes_for_scope(ScopeId(1)).is_none());

        fire(&table, n0);
        assert_eq!(*log.borrow(), vec!["e", "d", "f"]);
    }

    #[test]
    fn test_shared_listener_collected_once() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut table = NodeTable::new();

        let n0 = table.insert(ScopeId(0), None);
        let n1 = table.insert(ScopeId(0), None);
        let n2 = table.insert(ScopeId(1), Some(n0));

        let shared = recorder(&log, "shared");
        table.get_mut(n0).unwrap().add_listener(shared.clone());
        table.get_mut(n1).unwrap().add_listener(shared.clone());
        table.get_mut(n2).unwrap().add_listener(recorder(&log, "child"));
        table.get_mut(n2).unwrap().add_listener(shared);

        let mut listeners = Vec::new();
        table.collect_fire(&[n0, n1], &mut listeners);
        assert_eq!(listeners.len(), 2);

        for listener in listeners {
            listener();
        }
        assert_eq!(*log.borrow(), vec!["shared", "child"]);
    }

    #[test]
    fn test_destroy_uses_remove_child() {
        let mut table = NodeTable::new();
        let n0 = table.insert(ScopeId(0), None);
        let n1 = table.insert(ScopeId(1), Some(n0));
        let n2 = table.insert(ScopeId(2), Some(n0));

        table.destroy(n1);
        assert_eq!(table.get(n0).unwrap().children(), &[n2]);
        assert!(!table.get_mut(n0).unwrap().remove_child(n1));
    }

    #[test]
    fn test_destroy_root_orphans_children() {
        let mut table = NodeTable::new();
        let n0 = table.insert(ScopeId(0), None);
        let n1 = table.insert(ScopeId(1), Some(n0));

        table.destroy(n0);
        assert_eq!(table.get(n1).unwrap().parent(), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_insert_with_missing_parent() {
        let mut table = NodeTable::new();
        let n0 = table.insert(ScopeId(0), Some(NodeId(42)));

        assert_eq!(table.get(n0).unwrap().parent(), None);
    }

    #[test]
    fn test_scope_lists() {
        let mut table = NodeTable::new();
        let a = table.insert(ScopeId(5), None);
        let b = table.insert(ScopeId(5), None);

        assert_eq!(table.nodes_for_scope(ScopeId(5)), Some(&[a, b][..]));
        table.destroy(a);
        assert_eq!(table.nodes_for_scope(ScopeId(5)), Some(&[b][..]));
        table.destroy(b);
        assert_eq!(table.nodes_for_scope(ScopeId(5)), None);
    }
}
