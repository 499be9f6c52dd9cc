//! Transition waiting - When a visibility change has finished animating.
//!
//! [`TransitionWaiter`] is the seam between directives and whatever knows
//! about element styles. [`TransitionQueue`] is the tick-driven default:
//! the host feeds it computed styles and transition-end events, and calls
//! [`TransitionQueue::tick`] from its event loop.
//!
//! # Pattern
//!
//! - No transition on the element: resolves on the next tick
//! - Transition running: resolves on the transition-end event, or when its
//!   duration (plus delay) has elapsed
//! - Either way, never later than the fallback timeout
//!
//! # Example
//!
//! ```ignore
//! use std::time::{Duration, Instant};
//! use spark_resize::{ElementId, TransitionQueue, TransitionStyle, TransitionWaiter};
//!
//! let queue = TransitionQueue::default();
//! let panel = ElementId(4);
//! queue.set_style(panel, TransitionStyle::new(Duration::from_millis(200)));
//!
//! let cached = queue.snapshot(panel);
//! queue.wait_transition_end(panel, &cached, Box::new(|| println!("settled")));
//!
//! // Host event loop
//! queue.transition_ended(panel); // prints "settled"
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::types::{Cleanup, ElementId};

// =============================================================================
// TransitionStyle
// =============================================================================

/// Snapshot of the transition-related part of an element's computed style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransitionStyle {
    /// Transition duration. Zero means no transition.
    pub duration: Duration,
    /// Delay before the transition starts.
    pub delay: Duration,
}

impl TransitionStyle {
    /// No transition.
    pub fn none() -> Self {
        Self::default()
    }

    /// Transition of `duration` with no delay.
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            delay: Duration::ZERO,
        }
    }

    /// Set the delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// True if a transition would run.
    pub fn has_transition(&self) -> bool {
        !self.duration.is_zero()
    }
}

// =============================================================================
// TransitionWaiter
// =============================================================================

/// Detects when an element's transition is over.
pub trait TransitionWaiter {
    /// Capture the element's current transition style.
    fn snapshot(&self, element: ElementId) -> TransitionStyle;

    /// Run `on_end` once the transition on `element` is over.
    ///
    /// `cached` is the style captured before the visibility change; the
    /// element's live style may already reflect the hidden state. `on_end`
    /// runs exactly once. Implementations may run it before returning when
    /// no transition is involved.
    fn wait_transition_end(&self, element: ElementId, cached: &TransitionStyle, on_end: Cleanup);
}

// =============================================================================
// Config
// =============================================================================

/// Deadline policy for [`TransitionQueue`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionConfig {
    /// Upper bound on any wait, in case the end event never arrives.
    pub fallback_timeout: Duration,
    /// Count the transition delay toward the deadline.
    pub honor_delay: bool,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            fallback_timeout: Duration::from_millis(3000),
            honor_delay: true,
        }
    }
}

impl TransitionConfig {
    /// Set the fallback timeout.
    pub fn with_fallback_timeout(mut self, timeout: Duration) -> Self {
        self.fallback_timeout = timeout;
        self
    }

    /// Set whether the delay counts toward the deadline.
    pub fn with_honor_delay(mut self, honor: bool) -> Self {
        self.honor_delay = honor;
        self
    }

    /// How long a wait on `style` may take at most.
    pub fn wait_budget(&self, style: &TransitionStyle) -> Duration {
        if !style.has_transition() {
            return Duration::ZERO;
        }
        let mut total = style.duration;
        if self.honor_delay {
            total += style.delay;
        }
        total.min(self.fallback_timeout)
    }
}

// =============================================================================
// TransitionQueue
// =============================================================================

struct PendingWait {
    element: ElementId,
    deadline: Instant,
    /// Deadline was clamped to the fallback timeout.
    clamped: bool,
    on_end: Cleanup,
}

/// Tick-driven [`TransitionWaiter`].
#[derive(Default)]
pub struct TransitionQueue {
    config: TransitionConfig,
    styles: RefCell<HashMap<ElementId, TransitionStyle>>,
    pending: RefCell<Vec<PendingWait>>,
}

impl TransitionQueue {
    /// Create a queue with the given deadline policy.
    pub fn new(config: TransitionConfig) -> Self {
        Self {
            config,
            styles: RefCell::new(HashMap::new()),
            pending: RefCell::new(Vec::new()),
        }
    }

    /// Current deadline policy.
    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }

    /// Record the computed transition style of `element`.
    pub fn set_style(&self, element: ElementId, style: TransitionStyle) {
        self.styles.borrow_mut().insert(element, style);
    }

    /// Forget the style of a removed element.
    pub fn clear_style(&self, element: ElementId) {
        self.styles.borrow_mut().remove(&element);
    }

    /// Number of waits not yet resolved.
    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Resolve every wait on `element` now (transition-end event).
    ///
    /// Returns the number of continuations run.
    pub fn transition_ended(&self, element: ElementId) -> usize {
        let due = self.take_where(|wait| wait.element == element);
        tracing::trace!(?element, resolved = due.len(), "transition ended");
        run_all(due)
    }

    /// Resolve every wait whose deadline is at or before `now`.
    ///
    /// Returns the number of continuations run.
    pub fn tick(&self, now: Instant) -> usize {
        let due = self.take_where(|wait| wait.deadline <= now);
        for wait in due.iter().filter(|wait| wait.clamped) {
            tracing::warn!(
                element = ?wait.element,
                timeout = ?self.config.fallback_timeout,
                "transition end not observed, resolved by fallback timeout"
            );
        }
        if !due.is_empty() {
            tracing::trace!(resolved = due.len(), "transition queue tick");
        }
        run_all(due)
    }

    /// Resolve every wait regardless of deadlines.
    pub fn flush(&self) -> usize {
        let due = self.take_where(|_| true);
        run_all(due)
    }

    /// Remove matching waits, preserving their order.
    fn take_where(&self, mut predicate: impl FnMut(&PendingWait) -> bool) -> Vec<PendingWait> {
        let mut pending = self.pending.borrow_mut();
        let (due, rest): (Vec<_>, Vec<_>) = pending.drain(..).partition(|wait| predicate(wait));
        *pending = rest;
        due
    }
}

/// Run continuations after every internal borrow is released.
fn run_all(due: Vec<PendingWait>) -> usize {
    let count = due.len();
    for wait in due {
        (wait.on_end)();
    }
    count
}

impl TransitionWaiter for TransitionQueue {
    fn snapshot(&self, element: ElementId) -> TransitionStyle {
        self.styles
            .borrow()
            .get(&element)
            .copied()
            .unwrap_or_default()
    }

    fn wait_transition_end(&self, element: ElementId, cached: &TransitionStyle, on_end: Cleanup) {
        // A live transition wins over the cached one; the cached style covers
        // elements whose transition is only declared on the visible state.
        let live = self.snapshot(element);
        let style = if live.has_transition() { live } else { *cached };

        let budget = self.config.wait_budget(&style);
        let clamped = style.has_transition() && budget == self.config.fallback_timeout;
        tracing::trace!(?element, ?budget, "waiting for transition end");

        self.pending.borrow_mut().push(PendingWait {
            element,
            deadline: Instant::now() + budget,
            clamped,
            on_end,
        });
    }
}
