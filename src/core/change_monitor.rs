//! Process-wide change notification for blocked withdrawers
//!
//! `ChangeMonitor` is a single lock plus a single broadcast condition shared by
//! every account in the ledger. A deposit on any account wakes every thread
//! waiting in [`MonitorGuard::await_change`], whichever account it is
//! interested in; woken threads re-check their own balance.
//!
//! The lock protects a generation counter that is bumped on every
//! notification. Waiters compare against the generation they entered with, so
//! an OS-level spurious wakeup does not end a wait early while a real
//! notification always does.

use log::trace;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// How a call to [`MonitorGuard::await_change`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// A `notify_change` happened while waiting
    Notified,
    /// The timeout elapsed with no notification
    TimedOut,
}

/// Shared lock and broadcast condition
#[derive(Debug, Default)]
pub struct ChangeMonitor {
    /// Number of notifications issued so far
    generation: Mutex<u64>,
    changed: Condvar,
}

/// Exclusive hold on the monitor lock
///
/// Everything a caller does between `ChangeMonitor::enter` and dropping the
/// guard is one critical section, except while suspended in `await_change`,
/// which releases the lock for the duration of the wait.
#[derive(Debug)]
pub struct MonitorGuard<'a> {
    changed: &'a Condvar,
    generation: MutexGuard<'a, u64>,
}

impl ChangeMonitor {
    /// Create a new monitor with no waiters
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the monitor lock
    ///
    /// A poisoned lock is recovered: the only state behind it is the
    /// generation counter, which is always left valid.
    pub fn enter(&self) -> MonitorGuard<'_> {
        let generation = self
            .generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        MonitorGuard {
            changed: &self.changed,
            generation,
        }
    }

    /// Acquire the lock, notify every waiter and release
    pub fn notify_change(&self) {
        self.enter().notify_change();
    }

    /// Number of notifications issued since the monitor was created
    pub fn generation(&self) -> u64 {
        self.enter().generation()
    }
}

impl<'a> MonitorGuard<'a> {
    /// Wake every thread currently blocked in `await_change`
    pub fn notify_change(&mut self) {
        *self.generation = self.generation.wrapping_add(1);
        self.changed.notify_all();
        trace!("change monitor notified (generation {})", *self.generation);
    }

    /// Release the lock until notified or until `timeout` elapses
    ///
    /// The lock is re-acquired before returning, so the caller's critical
    /// section continues with the returned guard. This waits for exactly one
    /// notification; a caller that needs a specific condition must re-check
    /// it afterwards.
    pub fn await_change(self, timeout: Duration) -> (MonitorGuard<'a>, WaitOutcome) {
        let observed = *self.generation;
        let changed = self.changed;

        trace!("waiting up to {:?} for a change", timeout);
        let (generation, result) = changed
            .wait_timeout_while(self.generation, timeout, |current| *current == observed)
            .unwrap_or_else(PoisonError::into_inner);

        let outcome = if result.timed_out() {
            WaitOutcome::TimedOut
        } else {
            WaitOutcome::Notified
        };
        trace!("change wait ended: {:?}", outcome);

        (MonitorGuard { changed, generation }, outcome)
    }

    /// Generation observed under the lock
    pub fn generation(&self) -> u64 {
        *self.generation
    }
}
