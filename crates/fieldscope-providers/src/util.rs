//! Shared HTTP plumbing for provider clients.

use fieldscope_types::ProviderKind;
use tracing::warn;

use crate::error::ProviderError;

/// Issue a GET for `url` and decode the body as JSON.
///
/// Transport failures, non-success statuses, and undecodable bodies all
/// map to the matching [`ProviderError`] variant stamped with `provider`.
pub(crate) async fn fetch_json(
    client: &reqwest::Client,
    provider: ProviderKind,
    url: &str,
) -> Result<serde_json::Value, ProviderError> {
    fetch_json_query(client, provider, url, &[]).await
}

/// [`fetch_json`] with percent-encoded query parameters.
pub(crate) async fn fetch_json_query(
    client: &reqwest::Client,
    provider: ProviderKind,
    url: &str,
    params: &[(&str, String)],
) -> Result<serde_json::Value, ProviderError> {
    let response = client
        .get(url)
        .query(params)
        .send()
        .await
        .map_err(|e| {
            warn!(%provider, error = %e, "provider request failed");
            ProviderError::Request {
                provider,
                message: e.to_string(),
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        warn!(%provider, status = status.as_u16(), "provider returned non-success status");
        return Err(ProviderError::Status {
            provider,
            status: status.as_u16(),
        });
    }

    response.json().await.map_err(|e| {
        warn!(%provider, error = %e, "provider response decode failed");
        ProviderError::Decode {
            provider,
            message: e.to_string(),
        }
    })
}

/// Shorthand for a [`ProviderError::Decode`] with a static description.
pub(crate) fn decode_err(provider: ProviderKind, message: &str) -> ProviderError {
    ProviderError::Decode {
        provider,
        message: message.to_owned(),
    }
}
