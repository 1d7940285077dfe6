//! End-to-end sync runs against a mock provider and an in-memory store.

mod cursor;
mod isolation;

use empire::server::{
    data::{account::BankAccountRepository, sync_run::SyncRunRepository},
    model::outcome::{EntityOutcome, RunStatus},
};
use empire_test_utils::prelude::*;
use serde_json::json;

use crate::util::TestContextExt;
