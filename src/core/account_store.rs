//! Thread-safe account storage
//!
//! This module provides the `AccountStore` struct, which owns every account
//! balance in the ledger.
//!
//! # Design
//!
//! The store uses `DashMap` (a concurrent HashMap) so that creation, reads and
//! single-entry adjustments on different accounts proceed without a global
//! lock. Each adjustment holds the entry's shard lock for the duration of one
//! checked add, which makes `adjust` the single serialization point for a
//! balance.
//!
//! # Thread Safety
//!
//! Accounts are never removed, so a successful lookup stays valid for the
//! lifetime of the store. Callers must never read a balance, compute a new
//! value and write it back; all mutation goes through `adjust`.

use crate::types::{AccountId, AccountSnapshot, Balance, BankError};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::debug;

/// Concurrent map from account identifier to balance
#[derive(Debug, Default)]
pub struct AccountStore {
    /// Balances keyed by account identifier
    ///
    /// DashMap shards the map internally; an adjustment locks only the shard
    /// holding the account.
    accounts: DashMap<AccountId, Balance>,
}

impl AccountStore {
    /// Create a new empty AccountStore
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }

    /// Create an account if the identifier is not already present
    ///
    /// # Returns
    ///
    /// * `true` if the account was created with `initial_balance`
    /// * `false` if the identifier already exists; the existing balance is kept
    ///
    /// # Thread Safety
    ///
    /// The vacancy check and the insert happen under the same entry lock, so
    /// when several threads race on the same identifier exactly one of them
    /// observes `true`.
    pub fn add_account(&self, id: &str, initial_balance: Balance) -> bool {
        self.try_add_account(id, initial_balance).is_ok()
    }

    /// Fallible form of [`AccountStore::add_account`]
    pub fn try_add_account(&self, id: &str, initial_balance: Balance) -> Result<(), BankError> {
        match self.accounts.entry(id.to_string()) {
            Entry::Occupied(_) => Err(BankError::duplicate_account(id)),
            Entry::Vacant(slot) => {
                slot.insert(initial_balance);
                debug!("created account '{}' with balance {}", id, initial_balance);
                Ok(())
            }
        }
    }

    /// Point-in-time balance of an account, or `None` if it does not exist
    pub fn get_balance(&self, id: &str) -> Option<Balance> {
        self.accounts.get(id).map(|balance| *balance)
    }

    /// Atomically add `delta` to a balance and return the new value
    ///
    /// Returns `None` if the account does not exist or the addition would
    /// overflow.
    pub fn adjust(&self, id: &str, delta: Balance) -> Option<Balance> {
        self.try_adjust(id, delta).ok()
    }

    /// Fallible form of [`AccountStore::adjust`]
    ///
    /// # Errors
    ///
    /// * `BankError::UnknownAccount` if `id` was never created
    /// * `BankError::ArithmeticOverflow` if the new balance does not fit; the
    ///   stored balance is left unchanged
    pub fn try_adjust(&self, id: &str, delta: Balance) -> Result<Balance, BankError> {
        let mut balance = self
            .accounts
            .get_mut(id)
            .ok_or_else(|| BankError::unknown_account(id))?;

        let updated = balance
            .checked_add(delta)
            .ok_or_else(|| BankError::arithmetic_overflow("adjust", id))?;
        *balance = updated;

        Ok(updated)
    }

    /// Whether an account with this identifier exists
    pub fn contains(&self, id: &str) -> bool {
        self.accounts.contains_key(id)
    }

    /// Number of accounts in the store
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the store holds no accounts
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Copy every account, sorted by identifier
    ///
    /// Each entry is read independently; the result is not a consistent cut
    /// across accounts while writers are active.
    pub fn snapshot(&self) -> Vec<AccountSnapshot> {
        let mut accounts: Vec<AccountSnapshot> = self
            .accounts
            .iter()
            .map(|entry| AccountSnapshot::new(entry.key().clone(), *entry.value()))
            .collect();
        accounts.sort_by(|a, b| a.id.cmp(&b.id));
        accounts
    }
}
