//! Core ledger components
//!
//! This module contains the concurrency-coordinated ledger, leaves first:
//! - `account_store` - Concurrent balance map with atomic adjustment
//! - `change_monitor` - Shared lock and broadcast wakeup for withdrawers
//! - `key_lock` - Per-key advisory mutual exclusion
//! - `operations` - Deposit, blocking withdraw and transfer
//! - `lottery` - Parallel reward fan-out and join
//! - `bank` - `ConcurrentBank`, the `Bank` implementation
//! - `traits` - The `Bank` surface and the `Miner` capability

pub mod account_store;
pub mod bank;
pub mod change_monitor;
pub mod key_lock;
pub mod lottery;
pub mod operations;
pub mod traits;

pub use account_store::AccountStore;
pub use bank::ConcurrentBank;
pub use change_monitor::{ChangeMonitor, MonitorGuard, WaitOutcome};
pub use key_lock::KeyedMutex;
pub use lottery::{LotteryConfig, LotteryDistributor, Payout};
pub use operations::AccountOperations;
pub use traits::{Bank, Miner};
