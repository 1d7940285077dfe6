//! Cron scheduling of sync runs.

pub mod cron;
