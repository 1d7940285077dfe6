//! Wire DTOs returned by the HTTP API.

pub mod api;
pub mod balance;
pub mod sync;
pub mod transaction;
