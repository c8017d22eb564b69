use crate::core::LotteryConfig;
use crate::simulation::SimulationConfig;
use clap::Parser;
use std::time::Duration;

/// Simulate concurrent deposits, withdrawals, transfers and lottery payouts
#[derive(Parser, Debug)]
#[command(name = "ledger-sim")]
#[command(about = "Simulate a concurrent ledger and print final balances as CSV", long_about = None)]
pub struct CliArgs {
    /// Number of accounts to create
    #[arg(long = "accounts", value_name = "COUNT", default_value_t = 8)]
    pub accounts: usize,

    /// Starting balance of every account
    #[arg(
        long = "initial-balance",
        value_name = "AMOUNT",
        default_value_t = 100,
        allow_negative_numbers = true
    )]
    pub initial_balance: i64,

    /// Number of concurrent workers
    #[arg(
        long = "workers",
        value_name = "COUNT",
        help = "Number of concurrent workers (default: CPU cores)"
    )]
    pub workers: Option<usize>,

    /// Operations performed by each worker
    #[arg(long = "operations", value_name = "COUNT", default_value_t = 100)]
    pub operations: usize,

    /// Withdraw and transfer timeout in milliseconds
    #[arg(long = "timeout-ms", value_name = "MILLIS", default_value_t = 50)]
    pub timeout_ms: u64,

    /// Simulated latency of each reward computation in milliseconds
    #[arg(long = "mine-latency-ms", value_name = "MILLIS", default_value_t = 5)]
    pub mine_latency_ms: u64,

    /// Number of lottery rounds over all accounts
    #[arg(long = "lottery-rounds", value_name = "COUNT", default_value_t = 1)]
    pub lottery_rounds: usize,

    /// Worker threads for the lottery runtime
    #[arg(
        long = "lottery-workers",
        value_name = "COUNT",
        help = "Worker threads driving the lottery (default: CPU cores)"
    )]
    pub lottery_workers: Option<usize>,
}

impl CliArgs {
    /// Create a SimulationConfig from CLI arguments
    ///
    /// A missing or zero worker count falls back to the default.
    pub fn to_simulation_config(&self) -> SimulationConfig {
        let default = SimulationConfig::default();
        SimulationConfig {
            accounts: self.accounts,
            initial_balance: self.initial_balance,
            workers: self
                .workers
                .filter(|&workers| workers > 0)
                .unwrap_or(default.workers),
            operations_per_worker: self.operations,
            timeout: Duration::from_millis(self.timeout_ms),
            mine_latency: Duration::from_millis(self.mine_latency_ms),
            max_reward: default.max_reward,
            lottery_rounds: self.lottery_rounds,
        }
    }

    /// Create a LotteryConfig from CLI arguments
    pub fn to_lottery_config(&self) -> LotteryConfig {
        match self.lottery_workers {
            Some(workers) => LotteryConfig::new(workers),
            None => LotteryConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let parsed = CliArgs::try_parse_from(["program"]).unwrap();
        let config = parsed.to_simulation_config();

        assert_eq!(config, SimulationConfig::default());
        assert_eq!(parsed.to_lottery_config(), LotteryConfig::default());
    }

    #[rstest]
    #[case::accounts(&["program", "--accounts", "3"], 3, 100, 1)]
    #[case::balance(&["program", "--initial-balance", "-5"], 8, -5, 1)]
    #[case::rounds(&["program", "--lottery-rounds", "4"], 8, 100, 4)]
    #[case::all_options(
        &["program", "--accounts", "2", "--initial-balance", "7", "--lottery-rounds", "0"],
        2,
        7,
        0
    )]
    fn test_config_options(
        #[case] args: &[&str],
        #[case] accounts: usize,
        #[case] initial_balance: i64,
        #[case] rounds: usize,
    ) {
        let config = CliArgs::try_parse_from(args).unwrap().to_simulation_config();

        assert_eq!(config.accounts, accounts);
        assert_eq!(config.initial_balance, initial_balance);
        assert_eq!(config.lottery_rounds, rounds);
    }

    #[rstest]
    #[case::timeout(&["program", "--timeout-ms", "250"], Duration::from_millis(250), Duration::from_millis(5))]
    #[case::latency(&["program", "--mine-latency-ms", "0"], Duration::from_millis(50), Duration::ZERO)]
    fn test_duration_options(
        #[case] args: &[&str],
        #[case] timeout: Duration,
        #[case] mine_latency: Duration,
    ) {
        let config = CliArgs::try_parse_from(args).unwrap().to_simulation_config();

        assert_eq!(config.timeout, timeout);
        assert_eq!(config.mine_latency, mine_latency);
    }

    // Zero values should fall back to defaults
    #[rstest]
    #[case::zero_workers(&["program", "--workers", "0"], num_cpus::get())]
    #[case::custom_workers(&["program", "--workers", "3"], 3)]
    fn test_workers_fallback(#[case] args: &[&str], #[case] expected: usize) {
        let config = CliArgs::try_parse_from(args).unwrap().to_simulation_config();

        assert_eq!(config.workers, expected);
    }

    #[rstest]
    #[case::zero_lottery_workers(&["program", "--lottery-workers", "0"], num_cpus::get())]
    #[case::custom_lottery_workers(&["program", "--lottery-workers", "6"], 6)]
    fn test_lottery_config_conversion(#[case] args: &[&str], #[case] expected: usize) {
        let config = CliArgs::try_parse_from(args).unwrap().to_lottery_config();

        assert_eq!(config.worker_threads, expected);
    }

    #[rstest]
    #[case::negative_accounts(&["program", "--accounts", "-1"])]
    #[case::not_a_number(&["program", "--timeout-ms", "soon"])]
    #[case::unknown_flag(&["program", "--strategy", "async"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        let result = CliArgs::try_parse_from(args);
        assert!(result.is_err());
    }
}
