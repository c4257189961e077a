//! Soil upstream clients: chemistry point samples and moisture history.
//!
//! Chemistry comes from a SoilGrids-style point query (topsoil layer only;
//! every property is nullable over water and bare terrain). Moisture comes
//! from an ERA5 archive: seven days of mean 0-7 cm readings, folded into an
//! irrigation recommendation from the latest non-null value.

use chrono::NaiveDate;
use fieldscope_types::{
    Coordinate, IrrigationAdvice, ProviderKind, SoilMoistureSeries, SoilSample,
};

use crate::config::SoilConfig;
use crate::error::ProviderError;
use crate::util::{decode_err, fetch_json};

/// Client for the soil chemistry and soil moisture upstreams.
#[derive(Debug, Clone)]
pub struct SoilClient {
    client: reqwest::Client,
    config: SoilConfig,
}

impl SoilClient {
    /// Create a client from configuration.
    pub fn new(config: SoilConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Fetch the topsoil chemistry sample at `coord`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport, status, or decode failure.
    pub async fn point_sample(&self, coord: Coordinate) -> Result<SoilSample, ProviderError> {
        let url = format!(
            "{}/properties/query?lon={}&lat={}&property=ocd&property=phh2o&property=clay&depth=0-5cm",
            self.config.grid_base_url,
            coord.lon(),
            coord.lat()
        );
        let json = fetch_json(&self.client, ProviderKind::SoilPoint, &url).await?;
        extract_soil_sample(&json)
    }

    /// Fetch the trailing 7-day soil moisture history at `coord`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport, status, or decode failure,
    /// and [`ProviderError::EmptySeries`] when every reading is null.
    pub async fn moisture_history(
        &self,
        coord: Coordinate,
    ) -> Result<SoilMoistureSeries, ProviderError> {
        let url = format!(
            "{}/era5?latitude={}&longitude={}&daily=soil_moisture_0_to_7cm_mean&past_days=7&timezone=auto",
            self.config.moisture_base_url,
            coord.lat(),
            coord.lon()
        );
        let json = fetch_json(&self.client, ProviderKind::SoilMoisture, &url).await?;
        extract_moisture_series(&json)
    }
}

/// Pull the nullable topsoil means out of a point-query response.
fn extract_soil_sample(json: &serde_json::Value) -> Result<SoilSample, ProviderError> {
    let values = json
        .get("properties")
        .and_then(|p| p.get("layers"))
        .and_then(|l| l.get(0))
        .and_then(|layer| layer.get("values"))
        .ok_or_else(|| decode_err(ProviderKind::SoilPoint, "missing properties.layers[0].values"))?;

    let mean_of = |property: &str| {
        values
            .get(property)
            .and_then(|p| p.get("mean"))
            .and_then(serde_json::Value::as_f64)
    };

    Ok(SoilSample {
        ph: mean_of("phh2o"),
        organic_carbon_density: mean_of("ocd"),
        clay_percent: mean_of("clay"),
    })
}

/// Pull the daily series out of an archive response and derive advice.
fn extract_moisture_series(
    json: &serde_json::Value,
) -> Result<SoilMoistureSeries, ProviderError> {
    let daily = json
        .get("daily")
        .ok_or_else(|| decode_err(ProviderKind::SoilMoisture, "missing daily block"))?;

    let dates: Vec<NaiveDate> = daily
        .get("time")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| decode_err(ProviderKind::SoilMoisture, "missing daily.time"))?
        .iter()
        .filter_map(serde_json::Value::as_str)
        .filter_map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .collect();

    let values: Vec<Option<f64>> = daily
        .get("soil_moisture_0_to_7cm_mean")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| decode_err(ProviderKind::SoilMoisture, "missing soil moisture values"))?
        .iter()
        .map(serde_json::Value::as_f64)
        .collect();

    if dates.is_empty() || dates.len() != values.len() {
        return Err(decode_err(
            ProviderKind::SoilMoisture,
            "dates and values disagree",
        ));
    }

    let latest = values.iter().rev().find_map(|v| *v).ok_or(
        ProviderError::EmptySeries {
            provider: ProviderKind::SoilMoisture,
        },
    )?;

    Ok(SoilMoistureSeries {
        dates,
        values,
        advice: advice_for(latest),
    })
}

/// Irrigation advice thresholds over the latest moisture reading.
fn advice_for(latest: f64) -> IrrigationAdvice {
    if latest < 20.0 {
        IrrigationAdvice::Low
    } else if latest < 40.0 {
        IrrigationAdvice::Moderate
    } else {
        IrrigationAdvice::Adequate
    }
}
