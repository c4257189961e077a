//! Error types for the session core.

use fieldscope_types::CoordinateError;

/// Errors surfaced by [`MapSession`](crate::session::MapSession) operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// The selected coordinate failed validation. No generation advance,
    /// no queries issued.
    #[error("coordinate rejected: {0}")]
    Validation(#[from] CoordinateError),

    /// A place search came back empty.
    #[error("no place found for {query:?}")]
    PlaceNotFound {
        /// The search text.
        query: String,
    },

    /// The geocoding upstream failed outright (distinct from an empty
    /// result set).
    #[error("place search failed: {message}")]
    SearchFailed {
        /// Upstream failure description.
        message: String,
    },
}

/// Errors surfaced by the reminder scheduler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    /// `stop` was called while the scheduler never ran.
    #[error("scheduler is not running")]
    NotRunning,
}

/// Errors surfaced when loading application configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The config file could not be parsed.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yml::Error),
}
