//! Server application core modules.
//!
//! This module contains the sync and cache engine behind the Empire Portal API: the credential
//! registry, the rate-limited banking provider client, per-entity sync workers and the run
//! coordinator, the reconciliation store repositories, the balance cache, the cron scheduler,
//! and the HTTP controllers that expose sync triggers and cached reads.

pub mod client;
pub mod config;
pub mod controller;
pub mod credential;
pub mod data;
pub mod error;
pub mod logging;
pub mod model;
pub mod router;
pub mod scheduler;
pub mod service;
pub mod startup;
pub mod util;
