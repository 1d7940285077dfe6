//! HTTP controller endpoints for the Empire sync API.
//!
//! Handlers validate query parameters by hand so every rejected field is reported in the
//! failure envelope, call into the repositories, cache or coordinator, and map domain models to
//! the wire DTOs in [`crate::model`].

pub mod balance;
pub mod params;
pub mod sync;
pub mod transaction;
