//! The `Bank` implementation
//!
//! `ConcurrentBank` wires the components together:
//!
//! ```text
//! ConcurrentBank
//!     ├── Arc<AccountStore>        (balances)
//!     ├── AccountOperations        (deposit / withdraw / transfer)
//!     │       └── Arc<ChangeMonitor>
//!     └── LotteryDistributor       (parallel mine + deposit)
//!             └── Arc<KeyedMutex>
//! ```
//!
//! The bank is `Send + Sync` and cheap to clone; clones share all state.

use std::sync::Arc;
use std::time::Duration;

use super::traits::{Bank, Miner};
use super::{
    AccountOperations, AccountStore, ChangeMonitor, KeyedMutex, LotteryConfig, LotteryDistributor,
    Payout,
};
use crate::types::{AccountSnapshot, Balance, BankError};

/// Thread-safe ledger of named accounts
#[derive(Debug, Clone)]
pub struct ConcurrentBank {
    store: Arc<AccountStore>,
    operations: AccountOperations,
    lottery: LotteryDistributor,
}

impl ConcurrentBank {
    /// Create an empty bank with the default lottery configuration
    pub fn new() -> Self {
        Self::with_config(LotteryConfig::default())
    }

    /// Create an empty bank whose lottery uses `config`
    pub fn with_config(config: LotteryConfig) -> Self {
        let store = Arc::new(AccountStore::new());
        let monitor = Arc::new(ChangeMonitor::new());
        let operations = AccountOperations::new(Arc::clone(&store), monitor);
        let lottery = LotteryDistributor::new(operations.clone(), Arc::new(KeyedMutex::new()), config);

        Self {
            store,
            operations,
            lottery,
        }
    }

    /// Balance-mutating operations, including the fallible `try_*` forms
    pub fn operations(&self) -> &AccountOperations {
        &self.operations
    }

    /// The lottery distributor, for callers that want per-account payouts
    pub fn lottery(&self) -> &LotteryDistributor {
        &self.lottery
    }

    /// Fallible form of [`Bank::add_account`]
    pub fn try_add_account(&self, id: &str, initial_balance: Balance) -> Result<(), BankError> {
        self.store.try_add_account(id, initial_balance)
    }

    /// [`Bank::withdraw`] with the timeout given in milliseconds
    pub fn withdraw_millis(&self, id: &str, amount: Balance, timeout_millis: u64) -> bool {
        self.withdraw(id, amount, Duration::from_millis(timeout_millis))
    }

    /// [`Bank::transfer`] with the timeout given in milliseconds
    pub fn transfer_millis(&self, src: &str, dst: &str, amount: Balance, timeout_millis: u64) -> bool {
        self.transfer(src, dst, amount, Duration::from_millis(timeout_millis))
    }

    /// Run the lottery and return each account's payout
    pub fn run_lottery(&self, ids: &[String], miner: Arc<dyn Miner>) -> Result<Vec<Payout>, BankError> {
        self.lottery.run(ids, miner)
    }

    /// Every account, sorted by identifier
    pub fn snapshot(&self) -> Vec<AccountSnapshot> {
        self.store.snapshot()
    }

    /// Sum of all balances at the time each account is read
    pub fn total_balance(&self) -> Balance {
        self.store.snapshot().iter().map(|account| account.balance).sum()
    }
}

impl Default for ConcurrentBank {
    fn default() -> Self {
        Self::new()
    }
}

impl Bank for ConcurrentBank {
    fn add_account(&self, id: &str, initial_balance: Balance) -> bool {
        self.store.add_account(id, initial_balance)
    }

    fn deposit(&self, id: &str, amount: Balance) -> bool {
        self.operations.deposit(id, amount)
    }

    fn withdraw(&self, id: &str, amount: Balance, timeout: Duration) -> bool {
        self.operations.withdraw(id, amount, timeout)
    }

    fn transfer(&self, src: &str, dst: &str, amount: Balance, timeout: Duration) -> bool {
        self.operations.transfer(src, dst, amount, timeout)
    }

    fn get_balance(&self, id: &str) -> Option<Balance> {
        self.store.get_balance(id)
    }

    fn do_lottery(&self, ids: &[String], miner: Arc<dyn Miner>) {
        self.lottery.do_lottery(ids, miner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_bank_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ConcurrentBank>();
    }

    #[test]
    fn test_clones_share_state() {
        let bank = ConcurrentBank::new();
        let clone = bank.clone();

        assert!(bank.add_account("alice", 10));
        assert!(clone.deposit("alice", 5));

        assert_eq!(bank.get_balance("alice"), Some(15));
    }

    #[test]
    fn test_millis_variants() {
        let bank = ConcurrentBank::new();
        bank.add_account("a", 20);
        bank.add_account("b", 0);

        assert!(bank.withdraw_millis("a", 5, 10));
        assert!(bank.transfer_millis("a", "b", 5, 10));
        assert!(!bank.withdraw_millis("a", 100, 10));

        assert_eq!(bank.get_balance("a"), Some(10));
        assert_eq!(bank.get_balance("b"), Some(5));
    }

    #[test]
    fn test_try_add_account_reports_duplicate() {
        let bank = ConcurrentBank::new();
        bank.add_account("a", 1);

        assert_eq!(
            bank.try_add_account("a", 2),
            Err(BankError::duplicate_account("a"))
        );
    }

    #[test]
    fn test_total_balance_is_conserved_by_successful_transfers() {
        let bank = ConcurrentBank::new();
        for i in 0..4 {
            bank.add_account(&format!("acct-{}", i), 100);
        }
        let mut handles = vec![];

        for worker in 0..8usize {
            let bank = bank.clone();
            handles.push(thread::spawn(move || {
                for step in 0..50usize {
                    let src = format!("acct-{}", (worker + step) % 4);
                    let dst = format!("acct-{}", (worker + step + 1) % 4);
                    bank.transfer(&src, &dst, 7, Duration::from_millis(1));
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(bank.total_balance(), 400);
        assert!(bank.snapshot().iter().all(|a| a.balance >= 0));
    }

    #[test]
    fn test_do_lottery_through_trait_object() {
        let bank: Arc<dyn Bank> = Arc::new(ConcurrentBank::with_config(LotteryConfig::new(2)));
        bank.add_account("a", 0);
        bank.add_account("b", 0);

        bank.do_lottery(
            &["a".to_string(), "b".to_string()],
            Arc::new(|id: &str| id.len() as Balance * 10),
        );

        assert_eq!(bank.get_balance("a"), Some(10));
        assert_eq!(bank.get_balance("b"), Some(10));
    }
}
