//! Deterministic stand-in for an external reward computation

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;
use std::time::Duration;

use crate::core::Miner;
use crate::types::Balance;

/// Miner that sleeps for a fixed latency and derives its reward from the id
///
/// The same identifier always yields the same reward, in `1..=max_reward`.
#[derive(Debug, Clone)]
pub struct SimulatedMiner {
    latency: Duration,
    max_reward: Balance,
}

impl SimulatedMiner {
    /// Create a miner; a `max_reward` below 1 is treated as 1
    pub fn new(latency: Duration, max_reward: Balance) -> Self {
        Self {
            latency,
            max_reward: max_reward.max(1),
        }
    }

    /// Reward for `id` without the simulated latency
    pub fn reward_for(&self, id: &str) -> Balance {
        let mut hasher = DefaultHasher::new();
        id.hash(&mut hasher);
        (hasher.finish() % self.max_reward as u64) as Balance + 1
    }
}

impl Miner for SimulatedMiner {
    fn mine(&self, id: &str) -> Balance {
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
        self.reward_for(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Instant;

    #[rstest]
    #[case("acct-0", 10)]
    #[case("acct-1", 10)]
    #[case("alice", 1)]
    #[case("bob", 1000)]
    fn test_reward_is_deterministic_and_in_range(#[case] id: &str, #[case] max_reward: Balance) {
        let miner = SimulatedMiner::new(Duration::ZERO, max_reward);

        let first = miner.mine(id);
        let second = miner.mine(id);

        assert_eq!(first, second);
        assert!((1..=max_reward).contains(&first));
    }

    #[test]
    fn test_non_positive_max_reward_is_clamped() {
        let miner = SimulatedMiner::new(Duration::ZERO, -5);

        assert_eq!(miner.mine("anyone"), 1);
    }

    #[test]
    fn test_mine_waits_for_latency() {
        let miner = SimulatedMiner::new(Duration::from_millis(20), 10);

        let start = Instant::now();
        miner.mine("a");

        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
