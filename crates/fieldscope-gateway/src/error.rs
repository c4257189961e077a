//! Gateway error types.

/// Errors from the chat proxy upstream.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// No API key configured for the chat upstream.
    #[error("chat upstream API key is not configured")]
    MissingApiKey,

    /// The upstream request failed at the transport level.
    #[error("chat upstream request failed: {0}")]
    Upstream(String),

    /// The upstream answered with a non-success status.
    #[error("chat upstream returned status {0}")]
    UpstreamStatus(u16),

    /// The upstream response had no usable reply text.
    #[error("chat upstream response carried no reply")]
    EmptyReply,
}
