//! Provider identities, the generation token, and typed provider payloads.
//!
//! A *generation* is stamped on every coordinate-selection event. Each
//! provider result carries the generation it was issued under, and results
//! whose generation is older than the current one are discarded on arrival.
//! This gives a total order on *intent* rather than on arrival time -- a
//! slow NDVI fetch cannot overwrite a panel after the user has already
//! clicked elsewhere.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Monotonic token identifying one coordinate-selection event.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Generation(pub u64);

impl core::fmt::Display for Generation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// The external lookups the session can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProviderKind {
    /// Opaque location-code encode for the clicked coordinate.
    LocationCode,
    /// Current weather condition keyword (drives the map overlay symbol).
    CurrentConditions,
    /// 4-day weather forecast for the weather panel.
    Forecast,
    /// Soil chemistry point sample.
    SoilPoint,
    /// 7-day soil moisture history.
    SoilMoisture,
    /// Trailing-year NDVI series.
    Ndvi,
    /// Point flood-risk report.
    Flood,
    /// Forward/reverse place geocoding (search bar, activity place names).
    Geocode,
}

impl core::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::LocationCode => "location-code",
            Self::CurrentConditions => "current-conditions",
            Self::Forecast => "forecast",
            Self::SoilPoint => "soil-point",
            Self::SoilMoisture => "soil-moisture",
            Self::Ndvi => "ndvi",
            Self::Flood => "flood",
            Self::Geocode => "geocode",
        };
        write!(f, "{name}")
    }
}

/// Current weather condition at a coordinate.
///
/// The condition keyword (`Rain`, `Clouds`, ...) selects the map overlay
/// symbol, independent of whether the weather panel is open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Upstream condition keyword, e.g. `Rain`.
    pub condition: String,
    /// Short human-readable summary, e.g. `light rain`.
    pub summary: String,
}

/// One day of the forecast panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// Forecast date.
    pub date: NaiveDate,
    /// Minimum temperature in degrees Celsius.
    pub temp_min_c: f64,
    /// Maximum temperature in degrees Celsius.
    pub temp_max_c: f64,
    /// Relative humidity percentage.
    pub humidity_pct: u8,
    /// Mean cloud cover percentage.
    pub cloud_cover_pct: u8,
    /// Upstream condition description, e.g. `scattered clouds`.
    pub description: String,
    /// Agronomy advice derived from the day's conditions.
    pub advice: String,
}

/// Multi-day forecast summary for the weather panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSummary {
    /// Daily summaries, today first.
    pub days: Vec<ForecastDay>,
}

/// Soil chemistry point sample (topsoil, 0-5 cm).
///
/// Each property is nullable: the upstream grid has no data over water
/// bodies and some terrain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilSample {
    /// Soil pH in water.
    pub ph: Option<f64>,
    /// Organic carbon density in g/kg.
    pub organic_carbon_density: Option<f64>,
    /// Clay content percentage.
    pub clay_percent: Option<f64>,
}

/// Irrigation recommendation derived from the latest soil-moisture reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IrrigationAdvice {
    /// Moisture below 20: irrigate soon.
    Low,
    /// Moisture below 40: monitor and plan irrigation.
    Moderate,
    /// Moisture adequate: no irrigation needed.
    Adequate,
}

/// 7-day soil moisture history for the soil-moisture panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilMoistureSeries {
    /// Sample dates, oldest first.
    pub dates: Vec<NaiveDate>,
    /// Mean 0-7 cm soil moisture per date; `None` where the archive has a gap.
    pub values: Vec<Option<f64>>,
    /// Recommendation derived from the latest non-null reading.
    pub advice: IrrigationAdvice,
}

/// One NDVI composite sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NdviPoint {
    /// Composite date.
    pub date: NaiveDate,
    /// NDVI in [0, 1], or `None` where cloud-masked.
    pub ndvi: Option<f64>,
}

/// Ordered NDVI series over the trailing year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NdviSeries {
    /// Composite samples, oldest first. Never empty and never all-null;
    /// those upstream conditions surface as provider failures instead.
    pub points: Vec<NdviPoint>,
}

/// Point flood-risk report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloodReport {
    /// Upstream warning text for the coordinate.
    pub warning: String,
}

/// A forward-geocoded place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodePlace {
    /// The place coordinate.
    pub coordinate: Coordinate,
    /// Formatted display name.
    pub formatted: String,
}

/// Opaque location code for a coordinate, plus the coordinate it encodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCode {
    /// The encoded coordinate.
    pub coordinate: Coordinate,
    /// The opaque code string, e.g. a DIGIPIN-style code.
    pub code: String,
}
