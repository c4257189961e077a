//! MODIS vegetation-index subset client.
//!
//! The upstream addresses time as `A{year}{day-of-year}` composite codes.
//! Raw values are scaled by 10000; anything outside the physical 0..=1
//! range after scaling (fill values, cloud flags) is reported as a gap.

use chrono::{Datelike, Months, NaiveDate};
use fieldscope_types::{Coordinate, NdviPoint, NdviSeries, ProviderKind};

use crate::config::NdviConfig;
use crate::error::ProviderError;
use crate::util::{decode_err, fetch_json};

const NDVI_SCALE: f64 = 10_000.0;

/// Client for the MODIS subset upstream.
#[derive(Debug, Clone)]
pub struct NdviClient {
    client: reqwest::Client,
    config: NdviConfig,
}

impl NdviClient {
    /// Create a client from configuration.
    pub fn new(config: NdviConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Fetch the trailing-year vegetation index series at `coord`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport, status, or decode failure,
    /// and [`ProviderError::EmptySeries`] when no usable reading exists.
    pub async fn history(
        &self,
        coord: Coordinate,
        today: NaiveDate,
    ) -> Result<NdviSeries, ProviderError> {
        let (start, end) = window_codes(today);
        let url = format!(
            "{}/MOD13Q1/subset?latitude={}&longitude={}&startDate={start}&endDate={end}&kmAboveBelow=0&kmLeftRight=0&band=250m_16_days_NDVI",
            self.config.base_url,
            coord.lat(),
            coord.lon()
        );
        let json = fetch_json(&self.client, ProviderKind::Ndvi, &url).await?;
        extract_series(&json)
    }
}

/// Composite date codes for the trailing year ending at `today`.
fn window_codes(today: NaiveDate) -> (String, String) {
    let start = today
        .checked_sub_months(Months::new(12))
        .unwrap_or(today);
    (composite_code(start), composite_code(today))
}

/// `A{year}{day-of-year}` composite date code.
fn composite_code(date: NaiveDate) -> String {
    format!("A{}{:03}", date.year(), date.ordinal())
}

/// Decode the `subset` array into a sparse series.
fn extract_series(json: &serde_json::Value) -> Result<NdviSeries, ProviderError> {
    let subset = json
        .get("subset")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| decode_err(ProviderKind::Ndvi, "missing subset array"))?;

    let points: Vec<NdviPoint> = subset
        .iter()
        .filter_map(|entry| {
            let date = entry
                .get("calendar_date")
                .and_then(serde_json::Value::as_str)
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())?;
            let ndvi = entry
                .get("data")
                .and_then(|d| d.get(0))
                .and_then(serde_json::Value::as_f64)
                .map(|raw| raw / NDVI_SCALE)
                .filter(|scaled| (0.0..=1.0).contains(scaled));
            Some(NdviPoint { date, ndvi })
        })
        .collect();

    if points.iter().all(|p| p.ndvi.is_none()) {
        return Err(ProviderError::EmptySeries {
            provider: ProviderKind::Ndvi,
        });
    }

    Ok(NdviSeries { points })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn composite_codes_pad_day_of_year() {
        let jan_5 = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(composite_code(jan_5), "A2026005");
    }

    #[test]
    fn window_spans_a_trailing_year() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 31).unwrap();
        let (start, end) = window_codes(today);
        assert_eq!(start, "A2025243");
        assert_eq!(end, "A2026243");
    }

    #[test]
    fn series_scales_and_masks_fill_values() {
        let json = serde_json::json!({
            "subset": [
                {"calendar_date": "2026-07-12", "data": [6231]},
                {"calendar_date": "2026-07-28", "data": [-3000]},
                {"calendar_date": "2026-08-13", "data": [7150]}
            ]
        });
        let series = extract_series(&json).unwrap();
        assert_eq!(series.points.len(), 3);
        assert_eq!(series.points.first().unwrap().ndvi, Some(0.6231));
        assert_eq!(series.points.get(1).unwrap().ndvi, None);
        assert_eq!(series.points.get(2).unwrap().ndvi, Some(0.715));
    }

    #[test]
    fn all_masked_series_is_empty() {
        let json = serde_json::json!({
            "subset": [
                {"calendar_date": "2026-07-12", "data": [-3000]},
                {"calendar_date": "2026-07-28", "data": [32767]}
            ]
        });
        assert!(matches!(
            extract_series(&json),
            Err(ProviderError::EmptySeries { .. })
        ));
    }

    #[test]
    fn missing_subset_is_a_decode_error() {
        let json = serde_json::json!({"error": "bad request"});
        assert!(matches!(
            extract_series(&json),
            Err(ProviderError::Decode { .. })
        ));
    }
}
