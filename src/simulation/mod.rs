//! End-to-end simulation of a busy ledger
//!
//! Drives a `ConcurrentBank` with many concurrent workers and lottery rounds,
//! used by the `ledger-sim` binary and the benchmarks.
//!
//! - `miner` - Deterministic `Miner` with configurable latency
//! - `workload` - Worker fan-out, lottery rounds and CSV output

pub mod miner;
pub mod workload;

pub use miner::SimulatedMiner;
pub use workload::{account_id, run_simulation, SimulationConfig, SimulationSummary};
