//! End-to-end simulation tests
//!
//! These tests run the complete `ledger-sim` pipeline: accounts are created,
//! concurrent workers drive deposits, withdrawals and transfers, lottery rounds
//! pay rewards, and final balances are written as CSV to a temporary file.
//! The CSV is then read back and checked against the run's summary.

#[cfg(test)]
mod tests {
    use concurrent_ledger::simulation::{run_simulation, SimulationConfig};
    use concurrent_ledger::{Balance, LotteryConfig};
    use rstest::rstest;
    use std::fs;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    /// Run a simulation into a temp file and return the parsed `(id, balance)` rows
    fn run_to_file(config: &SimulationConfig) -> (Vec<(String, Balance)>, Balance) {
        let mut temp_output = NamedTempFile::new().expect("Failed to create temp file");

        let summary = run_simulation(config, LotteryConfig::new(2), &mut temp_output)
            .unwrap_or_else(|e| panic!("Simulation failed: {}", e));

        temp_output.flush().expect("Failed to flush temp file");

        let output = fs::read_to_string(temp_output.path())
            .unwrap_or_else(|e| panic!("Failed to read temp output file: {}", e));

        let mut lines = output.lines();
        assert_eq!(lines.next(), Some("id,balance"));

        let rows = lines
            .map(|line| {
                let (id, balance) = line.split_once(',').expect("malformed row");
                (id.to_string(), balance.parse::<Balance>().expect("bad balance"))
            })
            .collect();

        (rows, summary.expected_total())
    }

    #[rstest]
    #[case::single_account(1, 2)]
    #[case::few_accounts(3, 4)]
    #[case::many_accounts(16, 8)]
    fn test_simulation_output_matches_summary(
        #[case] accounts: usize,
        #[case] workers: usize,
        #[values(0, 2)] lottery_rounds: usize,
    ) {
        let config = SimulationConfig {
            accounts,
            initial_balance: 50,
            workers,
            operations_per_worker: 40,
            timeout: Duration::from_millis(2),
            mine_latency: Duration::from_millis(1),
            max_reward: 20,
            lottery_rounds,
        };

        let (rows, expected_total) = run_to_file(&config);

        assert_eq!(rows.len(), accounts);
        assert!(rows.windows(2).all(|pair| pair[0].0 < pair[1].0), "rows not sorted");
        assert!(rows.iter().all(|(_, balance)| *balance >= 0));
        assert_eq!(rows.iter().map(|(_, b)| b).sum::<Balance>(), expected_total);
    }
}
