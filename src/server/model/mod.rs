//! Server application models and type definitions.
//!
//! This module contains the domain models for the server application: application state,
//! configured business entity profiles, normalized provider records, and the outcome types
//! produced by sync workers and recorded by the coordinator.

pub mod app;
pub mod entity;
pub mod outcome;
pub mod provider;
