//! Timer Scheduling
//!
//! Explicit scheduler abstraction over the host's timer facility (in the
//! browser, `setTimeout`/`setInterval`). The manager never sleeps; it arms
//! timers and is called back with the fired id, which keeps the whole state
//! machine synchronous and testable.

use std::time::Duration;

/// Opaque handle to an armed timer.
pub type TimerId = u64;

/// Host timer facility.
///
/// Implementations deliver fired ids back to the owner; a one-shot timer
/// fires once, an interval fires repeatedly with the same id until cleared.
pub trait Scheduler {
    /// Arm a one-shot timer.
    fn set_timeout(&mut self, delay: Duration) -> TimerId;

    /// Arm a repeating timer.
    fn set_interval(&mut self, period: Duration) -> TimerId;

    /// Cancel an armed timer. Unknown ids are ignored.
    fn clear(&mut self, id: TimerId);
}

/// Named one-shot timer handle that is always cancelled before re-arming.
///
/// Makes the invariant "at most one pending timer of this kind" explicit:
/// `reschedule` is cancel-then-arm, so overlapping paths (activity events,
/// visibility regain, extend) can all call it without stacking timers.
#[derive(Debug, Default)]
pub struct Debounce {
    pending: Option<TimerId>,
}

impl Debounce {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any pending timer and arm a new one.
    pub fn reschedule(&mut self, scheduler: &mut dyn Scheduler, delay: Duration) -> TimerId {
        if let Some(id) = self.pending.take() {
            scheduler.clear(id);
        }
        let id = scheduler.set_timeout(delay);
        self.pending = Some(id);
        id
    }

    /// Cancel the pending timer, if any.
    pub fn cancel(&mut self, scheduler: &mut dyn Scheduler) {
        if let Some(id) = self.pending.take() {
            scheduler.clear(id);
        }
    }

    /// Consume a fired id if it belongs to this handle.
    pub fn acknowledge(&mut self, id: TimerId) -> bool {
        if self.pending == Some(id) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }
}
