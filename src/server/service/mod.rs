//! Service layer for the sync engine.
//!
//! `sync` drives provider fetches into the reconciliation store, one entity worker per business
//! entity under a single-run coordinator. `cache` serves balance reads with stale-while-revalidate
//! semantics in front of the store.

pub mod cache;
pub mod sync;
