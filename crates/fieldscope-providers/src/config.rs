//! Per-provider configuration structs.
//!
//! Every section deserializes from the application config file and
//! defaults to the real upstream endpoints, so a config file only needs
//! to carry API keys and overrides.

use serde::Deserialize;

/// Configuration for all provider clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProvidersConfig {
    /// Weather (current conditions + forecast) upstream.
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Soil chemistry and soil moisture upstreams.
    #[serde(default)]
    pub soil: SoilConfig,
    /// NDVI subset upstream.
    #[serde(default)]
    pub ndvi: NdviConfig,
    /// Forward/reverse geocoding upstream.
    #[serde(default)]
    pub geocode: GeocodeConfig,
    /// Location-code gateway.
    #[serde(default)]
    pub location_code: LocationCodeConfig,
    /// Flood-report upstream.
    #[serde(default)]
    pub flood: FloodConfig,
}

/// Weather upstream settings (an OpenWeatherMap-compatible API).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// API base URL.
    pub base_url: String,
    /// API key appended to every request.
    pub api_key: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org/data/2.5".to_owned(),
            api_key: String::new(),
        }
    }
}

/// Soil upstream settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SoilConfig {
    /// SoilGrids point-query base URL.
    pub grid_base_url: String,
    /// ERA5 archive base URL for soil-moisture history.
    pub moisture_base_url: String,
}

impl Default for SoilConfig {
    fn default() -> Self {
        Self {
            grid_base_url: "https://rest.isric.org/soilgrids/v2.0".to_owned(),
            moisture_base_url: "https://archive-api.open-meteo.com/v1".to_owned(),
        }
    }
}

/// NDVI subset upstream settings (a MODIS REST API).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NdviConfig {
    /// Subset API base URL.
    pub base_url: String,
}

impl Default for NdviConfig {
    fn default() -> Self {
        Self {
            base_url: "https://modis.ornl.gov/rst/api/v1".to_owned(),
        }
    }
}

/// Geocoding upstream settings (an OpenCage-compatible API).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GeocodeConfig {
    /// Geocoding base URL.
    pub base_url: String,
    /// API key appended to every request.
    pub api_key: String,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.opencagedata.com/geocode/v1".to_owned(),
            api_key: String::new(),
        }
    }
}

/// Location-code gateway settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LocationCodeConfig {
    /// Gateway base URL (the workspace's own gateway by default).
    pub base_url: String,
}

impl Default for LocationCodeConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000/api/digipin".to_owned(),
        }
    }
}

/// Flood-report upstream settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FloodConfig {
    /// Flood point-report base URL.
    pub base_url: String,
}

impl Default for FloodConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.gfms.example.org/flood-data".to_owned(),
        }
    }
}
