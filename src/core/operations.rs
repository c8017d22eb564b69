//! Deposit, blocking withdraw and transfer
//!
//! `AccountOperations` combines the `AccountStore` with the shared
//! `ChangeMonitor`.
//!
//! # Locking
//!
//! Deposits and withdraws both run under the monitor lock. The store's own
//! entry locks are only ever taken while the monitor lock is already held (or
//! with no other lock held at all), so the two never deadlock.
//!
//! - A deposit adjusts the balance and broadcasts a change before releasing
//!   the lock, so a withdrawer that has just found its balance short cannot
//!   miss it.
//! - A withdraw checks the balance, waits at most once, re-checks and
//!   decrements inside one critical section. No other decrement can land
//!   between the re-check and the decrement.
//!
//! # Known limitations
//!
//! - Every deposit wakes every blocked withdrawer in the ledger, not just
//!   those waiting on the deposited account.
//! - A withdraw waits for a single change. If that change is a deposit to
//!   another account, or is drained by another withdrawer first, the
//!   withdraw fails even if time remains on its timeout.
//! - A transfer is a withdraw followed by a deposit. If the deposit fails the
//!   withdrawn funds are not returned to the source.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use super::change_monitor::WaitOutcome;
use super::{AccountStore, ChangeMonitor};
use crate::types::{Balance, BankError};

/// Balance-mutating operations over a shared store
#[derive(Debug, Clone)]
pub struct AccountOperations {
    /// Owner of every balance
    store: Arc<AccountStore>,

    /// Shared lock and broadcast condition for deposits and withdraws
    monitor: Arc<ChangeMonitor>,
}

impl AccountOperations {
    /// Create operations over an existing store and monitor
    pub fn new(store: Arc<AccountStore>, monitor: Arc<ChangeMonitor>) -> Self {
        Self { store, monitor }
    }

    /// The store these operations mutate
    pub fn store(&self) -> &Arc<AccountStore> {
        &self.store
    }

    /// Credit `amount` to an account and wake every blocked withdrawer
    ///
    /// Returns `false` if the account does not exist.
    pub fn deposit(&self, id: &str, amount: Balance) -> bool {
        self.try_deposit(id, amount).is_ok()
    }

    /// Fallible form of [`AccountOperations::deposit`]
    ///
    /// # Returns
    ///
    /// * `Ok(balance)` - the balance after the deposit
    /// * `Err(BankError::UnknownAccount)` - the account does not exist
    /// * `Err(BankError::ArithmeticOverflow)` - the balance would overflow
    pub fn try_deposit(&self, id: &str, amount: Balance) -> Result<Balance, BankError> {
        if !self.store.contains(id) {
            return Err(BankError::unknown_account(id));
        }

        let mut monitor = self.monitor.enter();
        let balance = self.store.try_adjust(id, amount)?;
        monitor.notify_change();
        drop(monitor);

        debug!("deposited {} into '{}', balance {}", amount, id, balance);
        Ok(balance)
    }

    /// Debit `amount`, waiting up to `timeout` for a deposit if funds are short
    ///
    /// Returns `false` if the account does not exist or the balance still
    /// cannot cover `amount` after the wait.
    pub fn withdraw(&self, id: &str, amount: Balance, timeout: Duration) -> bool {
        self.try_withdraw(id, amount, timeout).is_ok()
    }

    /// Fallible form of [`AccountOperations::withdraw`]
    ///
    /// The sequence is check, wait once, re-check, decrement, all under the
    /// monitor lock. The wait ends on the first change anywhere in the ledger
    /// or when `timeout` elapses, whichever comes first. It is not repeated.
    ///
    /// # Returns
    ///
    /// * `Ok(balance)` - the balance after the withdrawal
    /// * `Err(BankError::UnknownAccount)` - the account does not exist
    /// * `Err(BankError::InsufficientFunds)` - the balance at the final check
    ///   was below `amount`
    /// * `Err(BankError::ArithmeticOverflow)` - `amount` cannot be negated or
    ///   the resulting balance does not fit; nothing is withdrawn
    pub fn try_withdraw(
        &self,
        id: &str,
        amount: Balance,
        timeout: Duration,
    ) -> Result<Balance, BankError> {
        if !self.store.contains(id) {
            return Err(BankError::unknown_account(id));
        }

        let mut monitor = self.monitor.enter();
        let mut balance = self.current_balance(id)?;

        if balance < amount {
            let (reacquired, outcome) = monitor.await_change(timeout);
            monitor = reacquired;
            balance = self.current_balance(id)?;
            if outcome == WaitOutcome::TimedOut {
                debug!("withdraw of {} from '{}' timed out waiting for funds", amount, id);
            }
        }

        if balance < amount {
            return Err(BankError::insufficient_funds(id, balance, amount));
        }

        let delta = amount
            .checked_neg()
            .ok_or_else(|| BankError::arithmetic_overflow("withdraw", id))?;
        let remaining = self.store.try_adjust(id, delta)?;
        drop(monitor);

        debug!("withdrew {} from '{}', balance {}", amount, id, remaining);
        Ok(remaining)
    }

    /// Withdraw from `src`, then deposit into `dst`
    ///
    /// Returns `true` only if both phases succeed. If the withdraw succeeds and
    /// the deposit fails, the funds are gone: they are not returned to `src`.
    pub fn transfer(&self, src: &str, dst: &str, amount: Balance, timeout: Duration) -> bool {
        self.try_transfer(src, dst, amount, timeout).is_ok()
    }

    /// Fallible form of [`AccountOperations::transfer`]
    ///
    /// # Returns
    ///
    /// * `Ok(balance)` - the destination balance after the deposit
    /// * `Err(_)` from the withdraw phase - nothing was moved
    /// * `Err(BankError::PartialTransferLoss)` - `src` was debited but `dst`
    ///   rejected the deposit; `amount` no longer exists in any account
    pub fn try_transfer(
        &self,
        src: &str,
        dst: &str,
        amount: Balance,
        timeout: Duration,
    ) -> Result<Balance, BankError> {
        self.try_withdraw(src, amount, timeout)?;

        self.try_deposit(dst, amount).map_err(|cause| {
            warn!(
                "transfer of {} from '{}' to '{}' lost funds: {}",
                amount, src, dst, cause
            );
            BankError::partial_transfer_loss(src, dst, amount)
        })
    }

    fn current_balance(&self, id: &str) -> Result<Balance, BankError> {
        self.store
            .get_balance(id)
            .ok_or_else(|| BankError::unknown_account(id))
    }
}
