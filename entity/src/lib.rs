pub mod prelude;

pub mod balance_snapshot;
pub mod bank_account;
pub mod bank_transaction;
pub mod business_entity;
pub mod sync_run;
pub mod sync_run_outcome;
