//! Test fixture modules for database rows and mock provider endpoints.
//!
//! - `provider` - Provider JSON payload factories and mockito endpoints
//! - `store` - Reconciliation store rows inserted directly

pub mod provider;
pub mod store;
