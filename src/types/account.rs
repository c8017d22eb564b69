//! Account-related types for the concurrent ledger
//!
//! This module defines the identifier and balance aliases shared by every
//! component, plus the point-in-time snapshot used for reporting.

use serde::Serialize;

/// Account identifier
///
/// Unique, immutable string key assigned when the account is created.
pub type AccountId = String;

/// Account balance
///
/// Deposits and withdrawals are applied to it as positive and negative deltas.
pub type Balance = i64;

/// Point-in-time copy of a single account
///
/// Produced by `AccountStore::snapshot`. Concurrent mutations after the
/// snapshot is taken are not reflected in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSnapshot {
    /// The account identifier
    pub id: AccountId,

    /// Balance observed when the snapshot was taken
    pub balance: Balance,
}

impl AccountSnapshot {
    /// Create a snapshot for the given identifier and balance
    pub fn new(id: impl Into<AccountId>, balance: Balance) -> Self {
        AccountSnapshot {
            id: id.into(),
            balance,
        }
    }
}
