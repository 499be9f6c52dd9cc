//! End-to-end visibility directive scenarios.
//!
//! Drives show/hide directives with signals and the tick-driven transition
//! queue, the way a host event loop would.
//!
//! Run with: cargo test --test show_hide

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use spark_resize::directive::{hide, show};
use spark_resize::{
    ElementId, ResizeListener, ResizeRegistry, ScopeTree, TransitionQueue, TransitionStyle,
};
use spark_signals::signal;

// =============================================================================
// Helpers
// =============================================================================

fn counter() -> (Rc<Cell<usize>>, ResizeListener) {
    let count = Rc::new(Cell::new(0));
    let count_clone = count.clone();
    (count, Rc::new(move || count_clone.set(count_clone.get() + 1)))
}

fn later(ms: u64) -> Instant {
    Instant::now() + Duration::from_millis(ms)
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_hide_notifies_when_the_node_unhides() {
    let tree = ScopeTree::new();
    let registry = ResizeRegistry::new(&tree);
    let queue = Rc::new(TransitionQueue::default());
    let scope = tree.create_scope(tree.root()).unwrap();

    let hidden = signal(true);
    let hidden_clone = hidden.clone();
    let _unlink = hide(&registry, scope, ElementId(1), queue.clone(), move || {
        hidden_clone.get()
    });

    let canvas = tree.create_scope(scope).unwrap();
    let (count, spy) = counter();
    let _unlisten = registry.add_listener(canvas, spy);
    assert_eq!(count.get(), 0);

    // Showing: immediate notification
    hidden.set(false);
    assert_eq!(count.get(), 1);
    assert_eq!(queue.pending_count(), 1);

    // No transition on the element: resolves on the next tick
    queue.tick(Instant::now());
    assert_eq!(count.get(), 2);

    // Hiding again: nothing
    hidden.set(true);
    queue.tick(later(5000));
    assert_eq!(count.get(), 2);
    assert_eq!(queue.pending_count(), 0);
}

#[test]
fn test_show_waits_for_transition_end() {
    let tree = ScopeTree::new();
    let registry = ResizeRegistry::new(&tree);
    let queue = Rc::new(TransitionQueue::default());
    let element = ElementId(7);
    queue.set_style(element, TransitionStyle::new(Duration::from_millis(2000)));

    let scope = tree.create_scope(tree.root()).unwrap();
    let visible = signal(false);
    let visible_clone = visible.clone();
    let _unlink = show(&registry, scope, element, queue.clone(), move || {
        visible_clone.get()
    });

    let (count, spy) = counter();
    let _unlisten = registry.add_listener(scope, spy);

    visible.set(true);
    assert_eq!(count.get(), 1);

    queue.tick(Instant::now());
    assert_eq!(count.get(), 1, "transition still running");

    queue.transition_ended(element);
    assert_eq!(count.get(), 2);
}

#[test]
fn test_fallback_timeout_resolves_missing_end_event() {
    let tree = ScopeTree::new();
    let registry = ResizeRegistry::new(&tree);
    let queue = Rc::new(TransitionQueue::default());
    let element = ElementId(3);
    queue.set_style(element, TransitionStyle::new(Duration::from_secs(60)));

    let scope = tree.create_scope(tree.root()).unwrap();
    let visible = signal(false);
    let visible_clone = visible.clone();
    let _unlink = show(&registry, scope, element, queue.clone(), move || {
        visible_clone.get()
    });

    let (count, spy) = counter();
    let _unlisten = registry.add_listener(scope, spy);
    visible.set(true);

    queue.tick(later(3500));
    assert_eq!(count.get(), 2);
}

#[test]
fn test_show_without_listeners_does_not_wait() {
    let tree = ScopeTree::new();
    let registry = ResizeRegistry::new(&tree);
    let queue = Rc::new(TransitionQueue::default());
    let scope = tree.create_scope(tree.root()).unwrap();

    let visible = signal(false);
    let visible_clone = visible.clone();
    let _unlink = show(&registry, scope, ElementId(0), queue.clone(), move || {
        visible_clone.get()
    });

    visible.set(true);
    assert_eq!(queue.pending_count(), 0);
}

#[test]
fn test_nested_directives_cascade() {
    let tree = ScopeTree::new();
    let registry = ResizeRegistry::new(&tree);
    let queue = Rc::new(TransitionQueue::default());

    let outer = tree.create_scope(tree.root()).unwrap();
    let inner = tree.create_scope(outer).unwrap();
    let leaf = tree.create_scope(inner).unwrap();

    let outer_hidden = signal(true);
    let outer_clone = outer_hidden.clone();
    let _outer = hide(&registry, outer, ElementId(1), queue.clone(), move || {
        outer_clone.get()
    });
    let _inner = show(&registry, inner, ElementId(2), queue.clone(), || true);

    let (outer_count, outer_spy) = counter();
    let (leaf_count, leaf_spy) = counter();
    let _a = registry.add_listener(outer, outer_spy);
    let _b = registry.add_listener(leaf, leaf_spy);

    outer_hidden.set(false);
    queue.flush();

    assert_eq!(outer_count.get(), 2);
    assert_eq!(leaf_count.get(), 2, "inner node is a child of the outer node");
}

#[test]
fn test_destroying_listener_scope_stops_notifications() {
    let tree = ScopeTree::new();
    let registry = ResizeRegistry::new(&tree);
    let queue = Rc::new(TransitionQueue::default());
    let scope = tree.create_scope(tree.root()).unwrap();
    let list = tree.create_scope(scope).unwrap();

    let hidden = signal(true);
    let hidden_clone = hidden.clone();
    let _unlink = hide(&registry, scope, ElementId(1), queue.clone(), move || {
        hidden_clone.get()
    });

    let (count, spy) = counter();
    let _unlisten = registry.add_listener(list, spy);
    tree.destroy_scope(list);

    hidden.set(false);
    queue.flush();
    assert_eq!(count.get(), 0);
}

#[test]
fn test_scope_destroyed_mid_transition() {
    let tree = ScopeTree::new();
    let registry = ResizeRegistry::new(&tree);
    let queue = Rc::new(TransitionQueue::default());
    let scope = tree.create_scope(tree.root()).unwrap();

    let hidden = signal(true);
    let hidden_clone = hidden.clone();
    let _unlink = hide(&registry, scope, ElementId(1), queue.clone(), move || {
        hidden_clone.get()
    });

    let (count, spy) = counter();
    let _unlisten = registry.add_listener(scope, spy);

    hidden.set(false);
    assert_eq!(count.get(), 1);

    tree.destroy_scope(scope);
    assert_eq!(queue.flush(), 1, "continuation still runs");
    assert_eq!(count.get(), 1, "but does not fire");
    assert_eq!(registry.node_count(), 0);
}
