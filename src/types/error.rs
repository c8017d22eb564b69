//! Error types for the concurrent ledger
//!
//! The public `Bank` surface reports failures as `false` / `None`. Underneath,
//! every fallible operation returns a `BankError` so the reason is available to
//! callers of the `try_*` functions and to the log output.
//!
//! # Error Categories
//!
//! - **Lookup Errors**: unknown or duplicate account identifiers
//! - **Funds Errors**: insufficient funds after the withdraw wait
//! - **Transfer Errors**: funds lost between the withdraw and deposit phases
//! - **Arithmetic Errors**: overflow in balance calculations
//! - **Runtime Errors**: the lottery worker pool could not be started

use super::account::Balance;
use thiserror::Error;

/// Main error type for ledger operations
///
/// No variant is fatal; every failure is local to the operation that produced
/// it and leaves the rest of the ledger usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    /// Operation targeted an account that was never created
    #[error("Account '{id}' not found")]
    UnknownAccount {
        /// The identifier that was not found
        id: String,
    },

    /// `add_account` was called for an identifier that already exists
    ///
    /// The existing account is left untouched.
    #[error("Account '{id}' already exists")]
    DuplicateAccount {
        /// The identifier that already exists
        id: String,
    },

    /// Withdraw could not be covered, even after waiting for a deposit
    ///
    /// This covers both "balance too low" and "timed out waiting"; the caller
    /// decides whether to retry.
    #[error("Insufficient funds in '{id}': balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Account identifier
        id: String,
        /// Balance observed at the final check
        balance: Balance,
        /// Requested withdrawal amount
        requested: Balance,
    },

    /// Transfer withdrew from the source but could not deposit to the destination
    ///
    /// The withdrawn amount is not refunded. Transfers are two independent
    /// operations and this variant is how the resulting loss is reported.
    #[error("Transfer of {amount} from '{src}' to '{dst}' lost funds: deposit to destination failed")]
    PartialTransferLoss {
        /// Source account (already debited)
        src: String,
        /// Destination account that rejected the deposit
        dst: String,
        /// Amount that left the source and arrived nowhere
        amount: Balance,
    },

    /// Applying the delta would overflow the balance type
    #[error("Arithmetic overflow in {operation} for account '{id}'")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account identifier
        id: String,
    },

    /// The lottery worker runtime could not be created or driven
    #[error("Runtime error: {message}")]
    Runtime {
        /// Description of the runtime failure
        message: String,
    },
}

impl From<std::io::Error> for BankError {
    fn from(error: std::io::Error) -> Self {
        BankError::Runtime {
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl BankError {
    /// Create an UnknownAccount error
    pub fn unknown_account(id: &str) -> Self {
        BankError::UnknownAccount { id: id.to_string() }
    }

    /// Create a DuplicateAccount error
    pub fn duplicate_account(id: &str) -> Self {
        BankError::DuplicateAccount { id: id.to_string() }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(id: &str, balance: Balance, requested: Balance) -> Self {
        BankError::InsufficientFunds {
            id: id.to_string(),
            balance,
            requested,
        }
    }

    /// Create a PartialTransferLoss error
    pub fn partial_transfer_loss(src: &str, dst: &str, amount: Balance) -> Self {
        BankError::PartialTransferLoss {
            src: src.to_string(),
            dst: dst.to_string(),
            amount,
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, id: &str) -> Self {
        BankError::ArithmeticOverflow {
            operation: operation.to_string(),
            id: id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::unknown_account(
        BankError::UnknownAccount { id: "bob".to_string() },
        "Account 'bob' not found"
    )]
    #[case::duplicate_account(
        BankError::DuplicateAccount { id: "alice".to_string() },
        "Account 'alice' already exists"
    )]
    #[case::insufficient_funds(
        BankError::InsufficientFunds { id: "alice".to_string(), balance: 100, requested: 150 },
        "Insufficient funds in 'alice': balance 100, requested 150"
    )]
    #[case::partial_transfer_loss(
        BankError::PartialTransferLoss { src: "a".to_string(), dst: "b".to_string(), amount: 10 },
        "Transfer of 10 from 'a' to 'b' lost funds: deposit to destination failed"
    )]
    #[case::arithmetic_overflow(
        BankError::ArithmeticOverflow { operation: "deposit".to_string(), id: "a".to_string() },
        "Arithmetic overflow in deposit for account 'a'"
    )]
    #[case::runtime(
        BankError::Runtime { message: "no threads".to_string() },
        "Runtime error: no threads"
    )]
    fn test_error_display(#[case] error: BankError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::unknown_account(
        BankError::unknown_account("x"),
        BankError::UnknownAccount { id: "x".to_string() }
    )]
    #[case::insufficient_funds(
        BankError::insufficient_funds("x", 5, 10),
        BankError::InsufficientFunds { id: "x".to_string(), balance: 5, requested: 10 }
    )]
    #[case::partial_transfer_loss(
        BankError::partial_transfer_loss("a", "b", 10),
        BankError::PartialTransferLoss { src: "a".to_string(), dst: "b".to_string(), amount: 10 }
    )]
    fn test_helper_functions(#[case] result: BankError, #[case] expected: BankError) {
        assert_eq!(result, expected);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::Other, "spawn failed");
        let error: BankError = io_error.into();
        assert!(matches!(error, BankError::Runtime { .. }));
        assert_eq!(error.to_string(), "Runtime error: spawn failed");
    }
}
