//! Concurrent workload driver
//!
//! Runs a deterministic mix of deposits, withdraws and transfers from many
//! workers against one `ConcurrentBank`, then runs the configured number of
//! lottery rounds and writes the final balances as CSV.
//!
//! # Architecture
//!
//! ```text
//! run_simulation
//!     ├── ConcurrentBank (LotteryConfig)
//!     ├── tokio runtime  (one blocking task per worker, joined)
//!     ├── SimulatedMiner (lottery rounds, after the workers finish)
//!     └── write_balances_csv
//! ```
//!
//! Worker operations block (withdraw waits on the change monitor), so each
//! worker runs on the runtime's blocking pool.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use log::{error, info};

use super::SimulatedMiner;
use crate::core::{Bank, ConcurrentBank, LotteryConfig, Miner};
use crate::io::write_balances_csv;
use crate::types::Balance;

/// Parameters of a simulation run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Number of accounts, named `acct-0` upwards
    pub accounts: usize,
    /// Balance every account starts with
    pub initial_balance: Balance,
    /// Number of concurrent workers
    pub workers: usize,
    /// Operations each worker performs
    pub operations_per_worker: usize,
    /// Timeout for every withdraw and transfer
    pub timeout: Duration,
    /// Latency of each simulated `mine` call
    pub mine_latency: Duration,
    /// Upper bound of a single lottery reward
    pub max_reward: Balance,
    /// Number of lottery rounds over all accounts
    pub lottery_rounds: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            accounts: 8,
            initial_balance: 100,
            workers: num_cpus::get(),
            operations_per_worker: 100,
            timeout: Duration::from_millis(50),
            mine_latency: Duration::from_millis(5),
            max_reward: 50,
            lottery_rounds: 1,
        }
    }
}

/// Counts and amounts of every operation the simulation attempted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationSummary {
    /// Deposits that were applied
    pub deposits_ok: usize,
    /// Deposits rejected for an unknown account or overflow
    pub deposits_failed: usize,
    /// Withdrawals that were applied
    pub withdrawals_ok: usize,
    /// Withdrawals that timed out or were rejected
    pub withdrawals_failed: usize,
    /// Transfers that moved funds to the destination
    pub transfers_ok: usize,
    /// Transfers that failed, including those that lost funds
    pub transfers_failed: usize,
    /// Lottery rewards deposited across all rounds
    pub lottery_payouts: usize,
    /// Sum of successful deposits
    pub deposited: Balance,
    /// Sum of successful withdrawals
    pub withdrawn: Balance,
    /// Sum of lottery rewards that reached an account
    pub rewarded: Balance,
    /// Sum of balances before any worker ran
    pub initial_total: Balance,
}

impl SimulationSummary {
    /// Fold another worker's counts into this one
    pub fn merge(&mut self, other: &SimulationSummary) {
        self.deposits_ok += other.deposits_ok;
        self.deposits_failed += other.deposits_failed;
        self.withdrawals_ok += other.withdrawals_ok;
        self.withdrawals_failed += other.withdrawals_failed;
        self.transfers_ok += other.transfers_ok;
        self.transfers_failed += other.transfers_failed;
        self.lottery_payouts += other.lottery_payouts;
        self.deposited += other.deposited;
        self.withdrawn += other.withdrawn;
        self.rewarded += other.rewarded;
    }

    /// Total the ledger must hold if no funds were created or lost
    ///
    /// Transfers between existing accounts move funds without changing the
    /// total, and the workload only transfers between existing accounts.
    pub fn expected_total(&self) -> Balance {
        self.initial_total + self.deposited - self.withdrawn + self.rewarded
    }
}

/// Identifier of the `index`-th simulated account
pub fn account_id(index: usize) -> String {
    format!("acct-{}", index)
}

/// Run the workload and lottery, then write final balances to `output`
///
/// # Returns
///
/// * `Ok(SimulationSummary)` once every worker and lottery round has finished
/// * `Err(String)` if the worker runtime cannot be created or output fails
pub fn run_simulation(
    config: &SimulationConfig,
    lottery: LotteryConfig,
    output: &mut dyn Write,
) -> Result<SimulationSummary, String> {
    let bank = ConcurrentBank::with_config(lottery);
    let ids: Vec<String> = (0..config.accounts).map(account_id).collect();

    let mut summary = SimulationSummary::default();
    for id in &ids {
        if bank.add_account(id, config.initial_balance) {
            summary.initial_total += config.initial_balance;
        }
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .max_blocking_threads(config.workers.max(1))
        .build()
        .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

    let worker_summaries = runtime.block_on(async {
        let tasks: Vec<_> = (0..config.workers)
            .map(|worker| {
                let bank = bank.clone();
                let config = config.clone();
                tokio::task::spawn_blocking(move || run_worker(&bank, &config, worker))
            })
            .collect();

        let mut summaries = Vec::with_capacity(tasks.len());
        for joined in join_all(tasks).await {
            match joined {
                Ok(worker_summary) => summaries.push(worker_summary),
                Err(e) => error!("Worker panicked: {:?}", e),
            }
        }
        summaries
    });
    drop(runtime);

    for worker_summary in &worker_summaries {
        summary.merge(worker_summary);
    }

    let miner = Arc::new(SimulatedMiner::new(config.mine_latency, config.max_reward));
    for round in 0..config.lottery_rounds {
        let payouts = bank
            .run_lottery(&ids, Arc::clone(&miner) as Arc<dyn Miner>)
            .map_err(|e| format!("Lottery round {} failed: {}", round, e))?;
        for payout in payouts.iter().filter(|p| p.deposited) {
            summary.lottery_payouts += 1;
            summary.rewarded += payout.reward;
        }
    }

    info!(
        "deposits {}/{} withdrawals {}/{} transfers {}/{} lottery payouts {}",
        summary.deposits_ok,
        summary.deposits_ok + summary.deposits_failed,
        summary.withdrawals_ok,
        summary.withdrawals_ok + summary.withdrawals_failed,
        summary.transfers_ok,
        summary.transfers_ok + summary.transfers_failed,
        summary.lottery_payouts,
    );

    write_balances_csv(&bank.snapshot(), output)?;

    Ok(summary)
}

/// One worker's share of the workload
///
/// The operation, accounts and amount of each step depend only on the worker
/// index and step number.
fn run_worker(bank: &ConcurrentBank, config: &SimulationConfig, worker: usize) -> SimulationSummary {
    let mut summary = SimulationSummary::default();
    if config.accounts == 0 {
        return summary;
    }

    for step in 0..config.operations_per_worker {
        let src = account_id((worker * 7 + step) % config.accounts);
        let dst = account_id((worker * 7 + step + 1) % config.accounts);
        let amount = 1 + ((worker * 31 + step * 17) % 50) as Balance;

        match (worker + step) % 3 {
            0 => {
                if bank.deposit(&src, amount) {
                    summary.deposits_ok += 1;
                    summary.deposited += amount;
                } else {
                    summary.deposits_failed += 1;
                }
            }
            1 => {
                if bank.withdraw(&src, amount, config.timeout) {
                    summary.withdrawals_ok += 1;
                    summary.withdrawn += amount;
                } else {
                    summary.withdrawals_failed += 1;
                }
            }
            _ => {
                if bank.transfer(&src, &dst, amount, config.timeout) {
                    summary.transfers_ok += 1;
                } else {
                    summary.transfers_failed += 1;
                }
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SimulationConfig {
        SimulationConfig {
            accounts: 4,
            initial_balance: 100,
            workers: 4,
            operations_per_worker: 30,
            timeout: Duration::from_millis(5),
            mine_latency: Duration::ZERO,
            max_reward: 10,
            lottery_rounds: 2,
        }
    }

    fn parse_total(csv_output: &str) -> Balance {
        csv_output
            .lines()
            .skip(1)
            .map(|line| line.rsplit(',').next().unwrap().parse::<Balance>().unwrap())
            .sum()
    }

    #[test]
    fn test_account_id_format() {
        assert_eq!(account_id(0), "acct-0");
        assert_eq!(account_id(12), "acct-12");
    }

    #[test]
    fn test_simulation_conserves_funds() {
        let config = small_config();
        let mut output = Vec::new();

        let summary = run_simulation(&config, LotteryConfig::new(2), &mut output).unwrap();

        let output_str = String::from_utf8(output).unwrap();
        assert!(output_str.starts_with("id,balance\n"));
        assert_eq!(output_str.lines().count(), 1 + config.accounts);
        assert_eq!(parse_total(&output_str), summary.expected_total());
        assert_eq!(summary.initial_total, 400);
    }

    #[test]
    fn test_simulation_counts_every_operation() {
        let config = small_config();
        let mut output = Vec::new();

        let summary = run_simulation(&config, LotteryConfig::new(2), &mut output).unwrap();

        let attempted = summary.deposits_ok
            + summary.deposits_failed
            + summary.withdrawals_ok
            + summary.withdrawals_failed
            + summary.transfers_ok
            + summary.transfers_failed;
        assert_eq!(attempted, config.workers * config.operations_per_worker);
        assert_eq!(summary.deposits_failed, 0);
        assert_eq!(summary.lottery_payouts, config.accounts * config.lottery_rounds);
    }

    #[test]
    fn test_simulation_with_no_accounts() {
        let config = SimulationConfig {
            accounts: 0,
            ..small_config()
        };
        let mut output = Vec::new();

        let summary = run_simulation(&config, LotteryConfig::default(), &mut output).unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), "id,balance\n");
        assert_eq!(summary, SimulationSummary::default());
    }

    #[test]
    fn test_summary_merge() {
        let mut total = SimulationSummary {
            deposits_ok: 1,
            deposited: 10,
            ..Default::default()
        };
        total.merge(&SimulationSummary {
            deposits_ok: 2,
            withdrawals_ok: 1,
            deposited: 5,
            withdrawn: 3,
            ..Default::default()
        });

        assert_eq!(total.deposits_ok, 3);
        assert_eq!(total.withdrawals_ok, 1);
        assert_eq!(total.expected_total(), 12);
    }
}
