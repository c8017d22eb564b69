//! Per-key mutual exclusion registry
//!
//! `KeyedMutex` hands out one mutex per string key, created on first use and
//! kept for the lifetime of the registry. It is independent of the account
//! store and the change monitor: holding a key here never blocks a deposit or
//! withdraw on the same account.

use dashmap::DashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Lazily populated map of per-key mutexes
#[derive(Debug, Default)]
pub struct KeyedMutex {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl KeyedMutex {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the mutex for `key`
    ///
    /// Calls with the same key are serialized; calls with different keys run
    /// concurrently. If a previous holder panicked, the lock is recovered and
    /// `f` still runs.
    pub fn with_lock<R>(&self, key: &str, f: impl FnOnce() -> R) -> R {
        // Clone the Arc out so the DashMap shard is not held while `f` runs
        let lock = self.lock_for(key);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Number of keys that have been locked at least once
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no key has been locked yet
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        if let Some(existing) = self.locks.get(key) {
            return Arc::clone(existing.value());
        }
        Arc::clone(
            self.locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }
}
