//! Concurrent Ledger Library
//! # Overview
//!
//! A shared ledger of named accounts supporting concurrent deposits,
//! timeout-bounded withdrawals, transfers, and a lottery that pays
//! independently computed rewards to many accounts in parallel.
//!
//! # Architecture
//!
//! - [`types`] - Identifiers, snapshots and the `BankError` taxonomy
//! - [`core`] - The ledger itself:
//!   - [`core::account_store`] - Concurrent balance map, single serialization point per balance
//!   - [`core::change_monitor`] - Shared lock and broadcast wakeup for blocked withdrawers
//!   - [`core::operations`] - Deposit, blocking withdraw and transfer
//!   - [`core::key_lock`] - Per-account advisory locks used by the lottery
//!   - [`core::lottery`] - Parallel mine-and-deposit fan-out with full join
//!   - [`core::bank`] - `ConcurrentBank`, the [`Bank`] implementation
//! - [`io`] - CSV output of balances
//! - [`simulation`] - Workload driver used by the `ledger-sim` binary
//! - [`cli`] - CLI arguments parsing
//!
//! # Failure Reporting
//!
//! The [`Bank`] surface reports failures as `false` or `None`:
//!
//! - **Unknown account**: any operation on an identifier that was never created
//! - **Duplicate account**: `add_account` on an existing identifier
//! - **Insufficient funds**: withdraw still short after waiting once for a deposit
//! - **Partial transfer loss**: the withdraw half of a transfer succeeded but the
//!   deposit half failed; the funds are not refunded
//!
//! The `try_*` functions on [`AccountOperations`] return the matching
//! [`BankError`] instead.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod simulation;
pub mod types;

pub use crate::core::{
    AccountOperations, AccountStore, Bank, ChangeMonitor, ConcurrentBank, KeyedMutex,
    LotteryConfig, LotteryDistributor, Miner, Payout,
};
pub use crate::io::write_balances_csv;
pub use crate::types::{AccountId, AccountSnapshot, Balance, BankError};
