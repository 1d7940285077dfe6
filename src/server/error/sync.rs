use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// No access token is configured for the entity; only that entity is skipped.
    #[error("No provider credential configured for entity {0}")]
    MissingCredential(String),
    /// The entity sync exceeded its wall-clock budget.
    #[error("Sync for entity {entity} timed out after {}ms", .timeout.as_millis())]
    Timeout { entity: String, timeout: Duration },
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),
}
