//! Reconciliation store repositories.
//!
//! One repository per table, each generic over [`sea_orm::ConnectionTrait`] so it can run on a
//! pooled connection or inside a transaction. The uniqueness constraints created by the
//! migrations are the authority for idempotent writes; repositories translate constraint hits
//! into no-ops or domain errors.

pub mod account;
pub mod balance;
pub mod entity;
pub mod sync_run;
pub mod transaction;

#[cfg(test)]
mod tests;

/// Page size used when a read does not ask for one.
pub const DEFAULT_PAGE_SIZE: u64 = 100;
/// Largest page size a read may request.
pub const MAX_PAGE_SIZE: u64 = 1000;
/// Largest offset the database drivers can bind.
pub const MAX_OFFSET: u64 = i64::MAX as u64;

/// Bounded window into a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: u64,
    pub offset: u64,
}

impl Pagination {
    /// Creates a window, clamping the limit to `1..=MAX_PAGE_SIZE` and the offset to
    /// [`MAX_OFFSET`].
    pub fn new(limit: Option<u64>, offset: Option<u64>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            offset: offset.unwrap_or(0).min(MAX_OFFSET),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results with the total number of matching rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}
