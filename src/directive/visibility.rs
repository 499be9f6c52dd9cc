//! Visibility Directives - Fire resize when a subtree becomes visible.
//!
//! Two variants share one state machine, keyed by the value that means
//! "visible" for the bound condition:
//! - [`show`] - visible when the condition is `true`
//! - [`hide`] - visible when the condition is `false`
//!
//! # Lifecycle
//!
//! On link:
//! 1. The scope is registered as a resizer
//! 2. The element's transition style is captured for later
//! 3. An effect starts watching the condition
//!
//! On each change into the visible state, if anything below is listening:
//! 1. Fire immediately (listeners that care about the unhide itself)
//! 2. Wait for the transition to end, then fire again (final layout)
//!
//! Changes into the hidden state never fire. With no listeners at change
//! time there is no fire and no wait; a listener added during the
//! transition misses the immediate fire.
//!
//! On unlink (returned cleanup, or scope destruction) the watch stops, the
//! resizer is detached, and a pending post-transition fire is dropped.
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use spark_signals::signal;
//! use spark_resize::{directive, ElementId, ResizeRegistry, ScopeTree, TransitionQueue};
//!
//! let tree = ScopeTree::new();
//! let registry = ResizeRegistry::new(&tree);
//! let queue = Rc::new(TransitionQueue::default());
//!
//! let hidden = signal(true);
//! let hidden_clone = hidden.clone();
//! let unlink = directive::hide(&registry, tree.root(), ElementId(0), queue.clone(), move || {
//!     hidden_clone.get()
//! });
//!
//! hidden.set(false); // fires now, and again once the transition ends
//! unlink();
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use spark_signals::effect;

use crate::engine::DestroyHookId;
use crate::resize::ResizeRegistry;
use crate::types::{Cleanup, ElementId, ScopeId};

use super::transition::{TransitionStyle, TransitionWaiter};

// =============================================================================
// Kind
// =============================================================================

/// Which condition value means "visible".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VisibilityKind {
    /// Visible while the condition is true.
    Show,
    /// Visible while the condition is false.
    Hide,
}

impl VisibilityKind {
    /// Condition value that makes the element visible.
    pub fn target_value(self) -> bool {
        matches!(self, Self::Show)
    }

    /// Attribute name this directive augments.
    pub fn attribute(self) -> &'static str {
        match self {
            Self::Show => "show",
            Self::Hide => "hide",
        }
    }
}

// =============================================================================
// Binding
// =============================================================================

/// Live state of one linked directive.
struct Binding {
    kind: VisibilityKind,
    registry: ResizeRegistry,
    scope: ScopeId,
    element: ElementId,
    waiter: Rc<dyn TransitionWaiter>,
    cached_style: TransitionStyle,

    /// Last condition value seen. `None` before the first evaluation.
    last_value: Cell<Option<bool>>,
    /// Cleared on unlink; pending continuations check it.
    linked: Cell<bool>,

    stop_watch: RefCell<Option<Cleanup>>,
    detach_resizer: RefCell<Option<Cleanup>>,
    destroy_hook: Cell<Option<DestroyHookId>>,
}

impl Binding {
    fn on_condition(self: &Rc<Self>, value: bool) {
        if self.last_value.replace(Some(value)) == Some(value) {
            return;
        }
        if value != self.kind.target_value() || !self.linked.get() {
            return;
        }
        if !self.registry.has_listeners(self.scope) {
            tracing::trace!(scope = %self.scope, kind = ?self.kind, "became visible, no listeners");
            return;
        }

        tracing::debug!(scope = %self.scope, kind = ?self.kind, "became visible, firing resize");
        self.registry.fire_resize(self.scope);

        let binding = Rc::clone(self);
        self.waiter.wait_transition_end(
            self.element,
            &self.cached_style,
            Box::new(move || binding.after_transition()),
        );
    }

    fn after_transition(&self) {
        if !self.linked.get() {
            tracing::debug!(scope = %self.scope, "transition ended after unlink, skipping fire");
            return;
        }
        tracing::debug!(scope = %self.scope, kind = ?self.kind, "transition ended, firing resize");
        self.registry.fire_resize(self.scope);
    }

    fn unlink(&self) {
        if !self.linked.replace(false) {
            return;
        }

        let stop = self.stop_watch.borrow_mut().take();
        if let Some(stop) = stop {
            stop();
        }
        let detach = self.detach_resizer.borrow_mut().take();
        if let Some(detach) = detach {
            detach();
        }
        if let Some(hook) = self.destroy_hook.take() {
            self.registry.tree().cancel_destroy(self.scope, hook);
        }

        tracing::debug!(scope = %self.scope, kind = ?self.kind, "visibility directive unlinked");
    }
}

// =============================================================================
// Link
// =============================================================================

/// Link a visibility directive to `scope`.
///
/// # Arguments
///
/// * `kind` - Show or hide semantics for `condition`
/// * `registry` - Registry of the tree `scope` belongs to
/// * `scope` - Scope the directive sits in; registered as a resizer
/// * `element` - Element whose transition is awaited
/// * `waiter` - Transition detection
/// * `condition` - Getter for the bound expression (creates reactive dependency)
///
/// # Returns
///
/// A cleanup that unlinks the directive. Destroying `scope` unlinks it too.
pub fn link(
    kind: VisibilityKind,
    registry: &ResizeRegistry,
    scope: ScopeId,
    element: ElementId,
    waiter: Rc<dyn TransitionWaiter>,
    condition: impl Fn() -> bool + 'static,
) -> Cleanup {
    let detach_resizer = registry.add_resizer(scope);
    let cached_style = waiter.snapshot(element);

    let binding = Rc::new(Binding {
        kind,
        registry: registry.clone(),
        scope,
        element,
        waiter,
        cached_style,
        last_value: Cell::new(None),
        linked: Cell::new(true),
        stop_watch: RefCell::new(None),
        detach_resizer: RefCell::new(Some(detach_resizer)),
        destroy_hook: Cell::new(None),
    });

    // Initial evaluation runs inside effect() and counts as a change.
    let watcher = Rc::clone(&binding);
    let stop = effect(move || {
        let value = condition();
        watcher.on_condition(value);
    });
    *binding.stop_watch.borrow_mut() = Some(Box::new(stop));

    let on_destroy = Rc::clone(&binding);
    let hook = registry.tree().on_destroy(scope, move || on_destroy.unlink());
    binding.destroy_hook.set(hook);

    tracing::debug!(%scope, ?element, kind = kind.attribute(), "visibility directive linked");

    Box::new(move || binding.unlink())
}

/// Link a show directive: visible while `condition` is true.
pub fn show(
    registry: &ResizeRegistry,
    scope: ScopeId,
    element: ElementId,
    waiter: Rc<dyn TransitionWaiter>,
    condition: impl Fn() -> bool + 'static,
) -> Cleanup {
    link(VisibilityKind::Show, registry, scope, element, waiter, condition)
}

/// Link a hide directive: visible while `condition` is false.
pub fn hide(
    registry: &ResizeRegistry,
    scope: ScopeId,
    element: ElementId,
    waiter: Rc<dyn TransitionWaiter>,
    condition: impl Fn() -> bool + 'static,
) -> Cleanup {
    link(VisibilityKind::Hide, registry, scope, element, waiter, condition)
}
