//! Error types for provider calls.
//!
//! Provider failures are terminal for the failing query only. The error is
//! cloneable so stubbed hubs can replay scripted failures in tests.

use fieldscope_types::ProviderKind;

/// Errors produced by provider clients.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request could not be sent or completed.
    #[error("{provider} request failed: {message}")]
    Request {
        /// The provider that failed.
        provider: ProviderKind,
        /// Transport-level failure description.
        message: String,
    },

    /// The upstream answered with a non-success status.
    #[error("{provider} returned status {status}")]
    Status {
        /// The provider that failed.
        provider: ProviderKind,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body did not have the consumed shape.
    #[error("{provider} response decode failed: {message}")]
    Decode {
        /// The provider that failed.
        provider: ProviderKind,
        /// What was missing or malformed.
        message: String,
    },

    /// A lookup that can legitimately come back empty did so.
    #[error("no result for {query:?}")]
    NotFound {
        /// The query that produced no result.
        query: String,
    },

    /// A series endpoint returned no usable samples. Reported as a failure
    /// condition, never as an empty success.
    #[error("{provider} returned an empty or all-null series")]
    EmptySeries {
        /// The provider that failed.
        provider: ProviderKind,
    },

    /// The requested provider does not feed a panel.
    #[error("{provider} is not a panel provider")]
    Unsupported {
        /// The offending provider.
        provider: ProviderKind,
    },
}
