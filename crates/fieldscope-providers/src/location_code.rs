//! Client for the location-code gateway (DIGIPIN-style grid codes).
//!
//! The gateway answers `404` for coordinates outside its grid and for
//! codes that decode to nothing; both surface as [`ProviderError::NotFound`]
//! so callers can distinguish "no code here" from a transport failure.

use fieldscope_types::{Coordinate, LocationCode, ProviderKind};

use crate::config::LocationCodeConfig;
use crate::error::ProviderError;
use crate::util::{decode_err, fetch_json_query};

/// Client for the location-code gateway.
#[derive(Debug, Clone)]
pub struct LocationCodeClient {
    client: reqwest::Client,
    config: LocationCodeConfig,
}

impl LocationCodeClient {
    /// Create a client from configuration.
    pub fn new(config: LocationCodeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Encode a coordinate into its grid code.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotFound`] when the coordinate falls
    /// outside the code grid, and the usual transport/status/decode
    /// variants otherwise.
    pub async fn encode(&self, coord: Coordinate) -> Result<LocationCode, ProviderError> {
        let url = format!("{}/encode", self.config.base_url);
        let params = [
            ("latitude", coord.lat().to_string()),
            ("longitude", coord.lon().to_string()),
        ];
        let json = fetch_json_query(&self.client, ProviderKind::LocationCode, &url, &params)
            .await
            .map_err(|e| not_found_for_404(e, coord.to_string()))?;

        let code = json
            .get("digipin")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| decode_err(ProviderKind::LocationCode, "missing digipin field"))?
            .to_owned();

        Ok(LocationCode {
            coordinate: coord,
            code,
        })
    }

    /// Decode a grid code back into the coordinate it names.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotFound`] for an unrecognized code, and
    /// the usual transport/status/decode variants otherwise.
    pub async fn decode(&self, code: &str) -> Result<Coordinate, ProviderError> {
        let url = format!("{}/decode", self.config.base_url);
        let params = [("digipin", code.to_owned())];
        let json = fetch_json_query(&self.client, ProviderKind::LocationCode, &url, &params)
            .await
            .map_err(|e| not_found_for_404(e, code.to_owned()))?;

        let lat = numeric_field(&json, "latitude")?;
        let lon = numeric_field(&json, "longitude")?;
        Coordinate::new(lat, lon)
            .map_err(|e| decode_err(ProviderKind::LocationCode, &e.to_string()))
    }
}

/// The gateway uses 404 as "not in the grid", not as a server fault.
fn not_found_for_404(err: ProviderError, query: String) -> ProviderError {
    match err {
        ProviderError::Status {
            provider: ProviderKind::LocationCode,
            status: 404,
        } => ProviderError::NotFound { query },
        other => other,
    }
}

/// The gateway has shipped latitude both as a JSON number and as a
/// string; accept either.
fn numeric_field(json: &serde_json::Value, field: &str) -> Result<f64, ProviderError> {
    let value = json
        .get(field)
        .ok_or_else(|| decode_err(ProviderKind::LocationCode, "missing coordinate field"))?;
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
        .ok_or_else(|| decode_err(ProviderKind::LocationCode, "non-numeric coordinate field"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn numeric_fields_accept_numbers_and_strings() {
        let json = serde_json::json!({"latitude": 20.5, "longitude": "78.25"});
        assert!((numeric_field(&json, "latitude").unwrap() - 20.5).abs() < f64::EPSILON);
        assert!((numeric_field(&json, "longitude").unwrap() - 78.25).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_field_is_a_decode_error() {
        let json = serde_json::json!({"latitude": 20.5});
        assert!(matches!(
            numeric_field(&json, "longitude"),
            Err(ProviderError::Decode { .. })
        ));
    }

    #[test]
    fn gateway_404_becomes_not_found() {
        let err = ProviderError::Status {
            provider: ProviderKind::LocationCode,
            status: 404,
        };
        assert!(matches!(
            not_found_for_404(err, "39J-49L-L8T4".to_owned()),
            ProviderError::NotFound { .. }
        ));
    }

    #[test]
    fn other_statuses_pass_through() {
        let err = ProviderError::Status {
            provider: ProviderKind::LocationCode,
            status: 500,
        };
        assert!(matches!(
            not_found_for_404(err, "x".to_owned()),
            ProviderError::Status { status: 500, .. }
        ));
    }
}
