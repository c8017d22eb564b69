//! Parallel reward distribution
//!
//! `LotteryDistributor` fans out one task per account identifier, mines a
//! reward for it under that account's advisory key lock, deposits the reward
//! and joins every task before returning.
//!
//! # Architecture
//!
//! ```text
//! LotteryDistributor
//!     ├── AccountOperations   (deposit + change notification)
//!     ├── Arc<KeyedMutex>     (per-account exclusion around `mine`)
//!     └── LotteryConfig       (runtime sizing)
//! ```
//!
//! Each call builds a tokio multi-threaded runtime sized from the config.
//! Miners are synchronous, so every account runs on the runtime's blocking
//! pool via `spawn_blocking`; the async side only awaits the join.
//!
//! The key lock covers only the `mine` call. The deposit happens after it is
//! released and goes through the normal deposit path, so a slow miner never
//! holds up deposits or withdraws elsewhere in the ledger.

use std::sync::Arc;
use std::thread;

use futures::future::join_all;
use log::{debug, error, warn};

use super::traits::Miner;
use super::{AccountOperations, KeyedMutex};
use crate::types::{AccountId, Balance, BankError};

/// Configuration for the lottery worker pool
///
/// Miners run on the runtime's blocking pool, which is sized to the number of
/// identifiers in each call so that every `mine` runs at the same time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LotteryConfig {
    /// Async worker threads driving the join
    pub worker_threads: usize,
}

impl Default for LotteryConfig {
    fn default() -> Self {
        Self {
            worker_threads: num_cpus::get(),
        }
    }
}

impl LotteryConfig {
    /// Create a LotteryConfig with a custom worker count
    ///
    /// Zero is replaced by the default.
    pub fn new(worker_threads: usize) -> Self {
        let default = Self::default();

        let worker_threads = if worker_threads == 0 {
            warn!(
                "Invalid worker_threads ({}), using default ({})",
                worker_threads, default.worker_threads
            );
            default.worker_threads
        } else {
            worker_threads
        };

        Self { worker_threads }
    }
}

/// Outcome of the lottery for one account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payout {
    /// Account the reward was mined for
    pub id: AccountId,

    /// Reward returned by the miner
    pub reward: Balance,

    /// Whether the deposit was accepted
    ///
    /// `false` when the account does not exist or the balance would overflow.
    pub deposited: bool,
}

/// Fan-out/join reward distributor
#[derive(Debug, Clone)]
pub struct LotteryDistributor {
    operations: AccountOperations,
    key_locks: Arc<KeyedMutex>,
    config: LotteryConfig,
}

impl LotteryDistributor {
    /// Create a distributor that deposits through `operations`
    pub fn new(
        operations: AccountOperations,
        key_locks: Arc<KeyedMutex>,
        config: LotteryConfig,
    ) -> Self {
        Self {
            operations,
            key_locks,
            config,
        }
    }

    /// The worker pool configuration
    pub fn config(&self) -> &LotteryConfig {
        &self.config
    }

    /// Run the lottery and discard the per-account results
    ///
    /// Failures are logged, never returned.
    pub fn do_lottery(&self, ids: &[String], miner: Arc<dyn Miner>) {
        match self.run(ids, miner) {
            Ok(payouts) => {
                let deposited = payouts.iter().filter(|p| p.deposited).count();
                debug!(
                    "lottery finished: {} of {} rewards deposited",
                    deposited,
                    ids.len()
                );
            }
            Err(e) => error!("lottery aborted: {}", e),
        }
    }

    /// Mine and deposit a reward for every identifier, in parallel
    ///
    /// Blocks until every dispatched task has finished. Payouts are returned in
    /// input order. A task whose miner panicked has no payout; the panic is
    /// logged and the remaining tasks are still joined.
    ///
    /// Duplicate identifiers are mined once per occurrence, one at a time.
    ///
    /// When the caller is already inside a tokio runtime (for example on a
    /// `spawn_blocking` thread), the lottery's own runtime is driven from a
    /// separate thread, since a runtime cannot be blocked on from within
    /// another.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Runtime` without mining anything if the worker
    /// runtime cannot be built or its driving thread panics.
    pub fn run(&self, ids: &[String], miner: Arc<dyn Miner>) -> Result<Vec<Payout>, BankError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        if tokio::runtime::Handle::try_current().is_err() {
            return self.run_on_own_runtime(ids, miner);
        }

        debug!("lottery called inside a runtime, driving it from a separate thread");
        thread::scope(|scope| {
            thread::Builder::new()
                .name("lottery-driver".to_string())
                .spawn_scoped(scope, || self.run_on_own_runtime(ids, miner))?
                .join()
                .map_err(|_| BankError::Runtime {
                    message: "lottery driver thread panicked".to_string(),
                })?
        })
    }

    fn run_on_own_runtime(
        &self,
        ids: &[String],
        miner: Arc<dyn Miner>,
    ) -> Result<Vec<Payout>, BankError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.worker_threads)
            .max_blocking_threads(ids.len())
            .thread_name("lottery-worker")
            .build()?;

        let payouts = runtime.block_on(async {
            let tasks: Vec<_> = ids
                .iter()
                .map(|id| {
                    let distributor = self.clone();
                    let miner = Arc::clone(&miner);
                    let id = id.clone();
                    tokio::task::spawn_blocking(move || distributor.pay_one(id, miner.as_ref()))
                })
                .collect();

            let mut payouts = Vec::with_capacity(tasks.len());
            for (id, joined) in ids.iter().zip(join_all(tasks).await) {
                match joined {
                    Ok(payout) => payouts.push(payout),
                    Err(e) => error!("lottery task for '{}' failed: {}", id, e),
                }
            }
            payouts
        });

        Ok(payouts)
    }

    fn pay_one(&self, id: AccountId, miner: &dyn Miner) -> Payout {
        let reward = self.key_locks.with_lock(&id, || miner.mine(&id));

        let deposited = match self.operations.try_deposit(&id, reward) {
            Ok(_) => true,
            Err(e) => {
                warn!("lottery reward {} for '{}' not deposited: {}", reward, id, e);
                false
            }
        };

        Payout {
            id,
            reward,
            deposited,
        }
    }
}
