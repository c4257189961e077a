//! Shared state for the gateway handlers.

use fieldscope_core::config::GatewayConfig;

use crate::chat::ChatProxy;

/// State shared across handlers.
#[derive(Debug)]
pub struct AppState {
    /// Chat-completion proxy.
    pub chat: ChatProxy,
}

impl AppState {
    /// Build state from gateway configuration.
    #[must_use]
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            chat: ChatProxy::new(config.chat.clone()),
        }
    }
}
