//! Empire Portal bank sync engine.
//!
//! Pulls balances and transactions for each configured business entity from the banking
//! provider, reconciles them into the relational store and serves cached reads over HTTP.

pub mod model;
pub mod server;
