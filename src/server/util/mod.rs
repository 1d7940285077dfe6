//! Utility functions shared across the sync engine.
//!
//! Secret and account number masking, exact conversion of provider decimal amounts into
//! minor currency units, and time calculations for sync cycles.

pub mod amount;
pub mod mask;
pub mod time;
