//! Concurrent ledger simulator
//!
//! Runs many workers against one shared ledger, then pays lottery rewards to
//! every account, and prints the final balances as CSV.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- > balances.csv
//! cargo run -- --accounts 16 --workers 32 --operations 500 > balances.csv
//! RUST_LOG=debug cargo run -- --lottery-rounds 3 --mine-latency-ms 20
//! ```
//!
//! Diagnostics go to stderr through `env_logger`; set `RUST_LOG` to control
//! verbosity (default `info`).
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (runtime could not start, output could not be written)

use concurrent_ledger::cli;
use concurrent_ledger::simulation;
use log::{error, info};
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = cli::parse_args();
    let config = args.to_simulation_config();
    let lottery = args.to_lottery_config();

    let mut output = std::io::stdout();
    match simulation::run_simulation(&config, lottery, &mut output) {
        Ok(summary) => info!("final total {}", summary.expected_total()),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}
