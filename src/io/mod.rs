//! I/O module
//!
//! Handles CSV output of account balances.
//!
//! # Components
//!
//! - `csv_format` - Balance output serialization

pub mod csv_format;

pub use csv_format::write_balances_csv;
