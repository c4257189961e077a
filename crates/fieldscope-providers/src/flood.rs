//! Point flood-risk report client.

use fieldscope_types::{Coordinate, FloodReport, ProviderKind};

use crate::config::FloodConfig;
use crate::error::ProviderError;
use crate::util::{decode_err, fetch_json_query};

/// Client for the flood-report upstream.
#[derive(Debug, Clone)]
pub struct FloodClient {
    client: reqwest::Client,
    config: FloodConfig,
}

impl FloodClient {
    /// Create a client from configuration.
    pub fn new(config: FloodConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Fetch the flood risk report at `coord`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport, status, or decode failure.
    pub async fn report(&self, coord: Coordinate) -> Result<FloodReport, ProviderError> {
        let params = [
            ("lat", coord.lat().to_string()),
            ("lon", coord.lon().to_string()),
        ];
        let json =
            fetch_json_query(&self.client, ProviderKind::Flood, &self.config.base_url, &params)
                .await?;
        extract_report(&json)
    }
}

fn extract_report(json: &serde_json::Value) -> Result<FloodReport, ProviderError> {
    let warning = json
        .get("warning")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| decode_err(ProviderKind::Flood, "missing warning field"))?
        .to_owned();
    Ok(FloodReport { warning })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn report_carries_the_warning_text() {
        let json = serde_json::json!({"warning": "No flood risk detected"});
        let report = extract_report(&json).unwrap();
        assert_eq!(report.warning, "No flood risk detected");
    }

    #[test]
    fn missing_warning_is_a_decode_error() {
        let json = serde_json::json!({"status": "ok"});
        assert!(matches!(
            extract_report(&json),
            Err(ProviderError::Decode { .. })
        ));
    }
}
