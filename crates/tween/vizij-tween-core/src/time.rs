//! Host timing sources for the scheduler.

use std::cell::Cell;
use std::time::{Duration, Instant};

use crate::scheduler::Scheduler;

/// Monotonic clock plus a way to ask for a future wake.
///
/// The scheduler calls `schedule_wake` whenever it wants
/// [`Scheduler::wake`] to run again after `delay_ms`; a new request replaces
/// the previous one.
pub trait TimeSource {
    /// Current time in milliseconds. Must never go backwards.
    fn now(&self) -> f64;

    fn schedule_wake(&self, delay_ms: f64);

    /// Drop any pending wake request.
    fn cancel_wake(&self) {}
}

/// Clock advanced by the host, for deterministic driving and tests.
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    now: Cell<f64>,
    pending: Cell<Option<f64>>,
}

impl ManualTimeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }

    /// Absolute time of the requested wake, if any.
    pub fn pending_wake(&self) -> Option<f64> {
        self.pending.get()
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> f64 {
        self.now.get()
    }

    fn schedule_wake(&self, delay_ms: f64) {
        self.pending.set(Some(self.now.get() + delay_ms));
    }

    fn cancel_wake(&self) {
        self.pending.set(None);
    }
}

/// Wall clock backed by [`Instant`].
#[derive(Debug)]
pub struct SystemTimeSource {
    origin: Instant,
    deadline: Cell<Option<Instant>>,
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            deadline: Cell::new(None),
        }
    }

    /// Sleep until the pending wake is due. Returns false when nothing is
    /// pending.
    pub fn wait(&self) -> bool {
        let Some(deadline) = self.deadline.take() else {
            return false;
        };
        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
        true
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    fn schedule_wake(&self, delay_ms: f64) {
        let delay = Duration::from_secs_f64(delay_ms.max(0.0) / 1000.0);
        self.deadline.set(Some(Instant::now() + delay));
    }

    fn cancel_wake(&self) {
        self.deadline.set(None);
    }
}

/// Block, waking `scheduler` on `clock`'s requests until it goes idle.
pub fn drive(scheduler: &Scheduler, clock: &SystemTimeSource) {
    while clock.wait() {
        scheduler.wake();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_tracks_requests() {
        let clock = ManualTimeSource::new();
        clock.advance(10.0);
        clock.schedule_wake(5.0);
        assert_eq!(clock.pending_wake(), Some(15.0));
        clock.schedule_wake(2.0);
        assert_eq!(clock.pending_wake(), Some(12.0));
        clock.cancel_wake();
        assert_eq!(clock.pending_wake(), None);
        clock.set(100.0);
        assert_eq!(clock.now(), 100.0);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemTimeSource::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn system_clock_waits_for_pending_wake() {
        let clock = SystemTimeSource::new();
        assert!(!clock.wait());
        let before = clock.now();
        clock.schedule_wake(1.0);
        assert!(clock.wait());
        assert!(clock.now() - before >= 0.9);
        assert!(!clock.wait());
    }
}
