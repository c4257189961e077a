//! Error types for the storage layer.

use fieldscope_types::ActivityId;

/// Errors that can occur in the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An operation named an activity id that is not in the store.
    #[error("activity {0} not found")]
    NotFound(ActivityId),

    /// The storage backend failed to read or write.
    #[error("storage backend error: {0}")]
    Backend(#[from] std::io::Error),

    /// The persisted collection could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
