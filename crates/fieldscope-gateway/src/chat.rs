//! Chat-completion proxy against a generative-language upstream.
//!
//! Wraps the user's question in a farming-assistant framing with the
//! requested reply language, and pulls the first candidate's text out of
//! the upstream response.

use fieldscope_core::config::ChatConfig;
use tracing::warn;

use crate::error::GatewayError;

/// Client for the chat upstream.
#[derive(Debug, Clone)]
pub struct ChatProxy {
    client: reqwest::Client,
    config: ChatConfig,
}

impl ChatProxy {
    /// Create a proxy from configuration.
    #[must_use]
    pub fn new(config: ChatConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Ask the upstream for a reply to `message` in `language`.
    ///
    /// # Errors
    ///
    /// [`GatewayError::MissingApiKey`] when no key is configured, and
    /// upstream transport/status/shape failures otherwise.
    pub async fn reply(&self, message: &str, language: &str) -> Result<String, GatewayError> {
        if self.config.api_key.is_empty() {
            return Err(GatewayError::MissingApiKey);
        }

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url, self.config.model, self.config.api_key
        );
        let body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": frame_prompt(message, language) }]
            }]
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "chat upstream rejected the request");
            return Err(GatewayError::UpstreamStatus(status.as_u16()));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Upstream(e.to_string()))?;
        extract_reply(&json).ok_or(GatewayError::EmptyReply)
    }
}

/// The assistant framing sent ahead of every user question.
fn frame_prompt(message: &str, language: &str) -> String {
    format!("You are a farming assistant. Reply in language: {language}.\n\nQuestion: {message}")
}

/// First candidate's text, `None` when the response carries none.
fn extract_reply(json: &serde_json::Value) -> Option<String> {
    json.get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()
        .map(str::to_owned)
}
