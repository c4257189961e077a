//! Application configuration loaded from `fieldscope.yaml`.
//!
//! Every section carries a `Default` so a missing file or a partial file
//! still yields a runnable configuration; only API keys genuinely need
//! to be supplied.

use std::path::Path;

use fieldscope_providers::ProvidersConfig;
use serde::Deserialize;

use crate::error::ConfigError;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// External provider endpoints and keys.
    pub providers: ProvidersConfig,
    /// Reminder scheduler timing.
    pub reminders: RemindersConfig,
    /// Gateway server settings.
    pub gateway: GatewayConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_yml::from_str(&raw)?)
    }
}

/// Reminder scheduler timing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RemindersConfig {
    /// Tick interval in milliseconds.
    pub interval_ms: u64,
    /// How far ahead of an entry's date a reminder may fire, in
    /// milliseconds.
    pub lookahead_ms: u64,
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            interval_ms: 60_000,
            lookahead_ms: 900_000,
        }
    }
}

/// Gateway server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Bind address for the HTTP server.
    pub bind_addr: String,
    /// Chat-completion upstream.
    pub chat: ChatConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".to_owned(),
            chat: ChatConfig::default(),
        }
    }
}

/// Chat-completion upstream settings (a generative-language API).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Upstream base URL.
    pub base_url: String,
    /// Model name appended to the request path.
    pub model: String,
    /// API key sent with every request.
    pub api_key: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_owned(),
            model: "gemini-1.5-flash".to_owned(),
            api_key: String::new(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
        }
    }
}
