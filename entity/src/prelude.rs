pub use super::balance_snapshot::Entity as BalanceSnapshot;
pub use super::bank_account::Entity as BankAccount;
pub use super::bank_transaction::Entity as BankTransaction;
pub use super::business_entity::Entity as BusinessEntity;
pub use super::sync_run::Entity as SyncRun;
pub use super::sync_run_outcome::Entity as SyncRunOutcome;
