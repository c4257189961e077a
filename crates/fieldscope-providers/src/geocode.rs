//! Forward and reverse geocoding against an OpenCage-compatible API.

use fieldscope_types::{Coordinate, GeocodePlace, ProviderKind};

use crate::config::GeocodeConfig;
use crate::error::ProviderError;
use crate::util::{decode_err, fetch_json_query};

/// Name used when reverse geocoding comes back empty.
pub const UNKNOWN_PLACE: &str = "Unknown location";

/// Client for the geocoding upstream.
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    client: reqwest::Client,
    config: GeocodeConfig,
}

impl GeocodeClient {
    /// Create a client from configuration.
    pub fn new(config: GeocodeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Resolve a free-text place query to its best-match coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotFound`] when the upstream has no match,
    /// and the usual transport/status/decode variants otherwise.
    pub async fn forward(&self, query: &str) -> Result<GeocodePlace, ProviderError> {
        let json = self.query(query).await?;
        extract_place(&json)?.ok_or_else(|| ProviderError::NotFound {
            query: query.to_owned(),
        })
    }

    /// Resolve a coordinate to a human-readable place name.
    ///
    /// An empty result set is not an error here; it falls back to
    /// [`UNKNOWN_PLACE`] so activity entries always carry a name.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport, status, or decode failure.
    pub async fn reverse(&self, coord: Coordinate) -> Result<String, ProviderError> {
        let query = format!("{}+{}", coord.lat(), coord.lon());
        let json = self.query(&query).await?;
        Ok(extract_place(&json)?
            .map_or_else(|| UNKNOWN_PLACE.to_owned(), |place| place.formatted))
    }

    async fn query(&self, q: &str) -> Result<serde_json::Value, ProviderError> {
        let url = format!("{}/json", self.config.base_url);
        let params = [
            ("q", q.to_owned()),
            ("key", self.config.api_key.clone()),
            ("limit", "1".to_owned()),
        ];
        fetch_json_query(&self.client, ProviderKind::Geocode, &url, &params).await
    }
}

/// Pull the best match out of a geocoding response, `None` when the
/// result set is empty.
fn extract_place(json: &serde_json::Value) -> Result<Option<GeocodePlace>, ProviderError> {
    let results = json
        .get("results")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| decode_err(ProviderKind::Geocode, "missing results array"))?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let lat = first
        .get("geometry")
        .and_then(|g| g.get("lat"))
        .and_then(serde_json::Value::as_f64)
        .ok_or_else(|| decode_err(ProviderKind::Geocode, "missing geometry.lat"))?;
    let lng = first
        .get("geometry")
        .and_then(|g| g.get("lng"))
        .and_then(serde_json::Value::as_f64)
        .ok_or_else(|| decode_err(ProviderKind::Geocode, "missing geometry.lng"))?;
    let formatted = first
        .get("formatted")
        .and_then(serde_json::Value::as_str)
        .unwrap_or(UNKNOWN_PLACE)
        .to_owned();

    let coordinate = Coordinate::new(lat, lng)
        .map_err(|e| decode_err(ProviderKind::Geocode, &e.to_string()))?;

    Ok(Some(GeocodePlace {
        coordinate,
        formatted,
    }))
}
