//! CSV output for account balances
//!
//! Balances are written with columns `id,balance`, sorted by identifier for
//! deterministic output. The header is always written, even with no accounts.

use crate::types::AccountSnapshot;
use csv::WriterBuilder;
use std::io::Write;

/// Write account balances to CSV format
///
/// # Arguments
///
/// * `accounts` - Snapshots to write; sorted by id before writing
/// * `output` - Writer receiving the CSV text
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_balances_csv(accounts: &[AccountSnapshot], output: &mut dyn Write) -> Result<(), String> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(output);

    writer
        .write_record(["id", "balance"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted_accounts = accounts.to_vec();
    sorted_accounts.sort_by(|a, b| a.id.cmp(&b.id));

    for account in &sorted_accounts {
        writer
            .serialize(account)
            .map_err(|e| format!("Failed to write account record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
