//! Types module
//!
//! Contains core data structures used throughout the ledger.
//! This module organizes types into logical submodules:
//! - `account`: Account identifiers, balances and snapshots
//! - `error`: Error types for ledger operations

pub mod account;
pub mod error;

pub use account::{AccountId, AccountSnapshot, Balance};
pub use error::BankError;
