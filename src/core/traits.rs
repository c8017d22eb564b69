//! Core traits for the ledger surface and the reward capability
//!
//! `Bank` is the in-process contract exposed to callers. `Miner` is the only
//! capability the core consumes from outside.

use std::sync::Arc;
use std::time::Duration;

use crate::types::Balance;

/// Reward computation for the lottery
///
/// `mine` is synchronous and may take arbitrarily long; the lottery imposes no
/// timeout on it.
pub trait Miner: Send + Sync {
    /// Compute the reward for one account
    fn mine(&self, id: &str) -> Balance;
}

impl<F> Miner for F
where
    F: Fn(&str) -> Balance + Send + Sync,
{
    fn mine(&self, id: &str) -> Balance {
        self(id)
    }
}

/// Shared ledger of named accounts
///
/// Every failure is reported through the return value: `false` for rejected
/// operations and `None` for unknown accounts. Nothing here panics or blocks
/// indefinitely except a `Miner` that never returns.
pub trait Bank: Send + Sync {
    /// Create an account; `false` if the identifier already exists
    fn add_account(&self, id: &str, initial_balance: Balance) -> bool;

    /// Credit an account; `false` if it does not exist
    fn deposit(&self, id: &str, amount: Balance) -> bool;

    /// Debit an account, waiting up to `timeout` once for a deposit
    fn withdraw(&self, id: &str, amount: Balance, timeout: Duration) -> bool;

    /// Withdraw from `src` then deposit into `dst`
    ///
    /// Not atomic: if the deposit fails the withdrawn funds are lost and
    /// `false` is returned.
    fn transfer(&self, src: &str, dst: &str, amount: Balance, timeout: Duration) -> bool;

    /// Current balance, or `None` if the account does not exist
    fn get_balance(&self, id: &str) -> Option<Balance>;

    /// Mine and deposit a reward for every identifier in parallel
    ///
    /// Returns once every reward has been deposited (or rejected).
    fn do_lottery(&self, ids: &[String], miner: Arc<dyn Miner>);
}
