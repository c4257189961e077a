//! Weather upstream client: current conditions and the forecast panel.
//!
//! Two lookups share one upstream. The *current conditions* call returns
//! the condition keyword that drives the map overlay symbol and is issued
//! unconditionally on every coordinate selection. The *forecast* call
//! feeds the weather panel: the 3-hourly list is folded into at most four
//! per-day summaries, each with a line of agronomy advice.

use chrono::NaiveDate;
use fieldscope_types::{Coordinate, CurrentConditions, ForecastDay, ForecastSummary, ProviderKind};

use crate::config::WeatherConfig;
use crate::error::ProviderError;
use crate::util::{decode_err, fetch_json};

/// Number of forecast days shown in the weather panel.
const FORECAST_DAYS: usize = 4;

/// Client for an OpenWeatherMap-compatible API.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    config: WeatherConfig,
}

impl WeatherClient {
    /// Create a client from configuration.
    pub fn new(config: WeatherConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Fetch the current condition keyword at `coord`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport, status, or decode failure.
    pub async fn current_conditions(
        &self,
        coord: Coordinate,
    ) -> Result<CurrentConditions, ProviderError> {
        let url = format!(
            "{}/weather?lat={}&lon={}&appid={}",
            self.config.base_url,
            coord.lat(),
            coord.lon(),
            self.config.api_key
        );
        let json = fetch_json(&self.client, ProviderKind::CurrentConditions, &url).await?;
        extract_current_conditions(&json)
    }

    /// Fetch the multi-day forecast summary at `coord`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport, status, or decode failure.
    pub async fn forecast(&self, coord: Coordinate) -> Result<ForecastSummary, ProviderError> {
        let url = format!(
            "{}/forecast?lat={}&lon={}&units=metric&appid={}",
            self.config.base_url,
            coord.lat(),
            coord.lon(),
            self.config.api_key
        );
        let json = fetch_json(&self.client, ProviderKind::Forecast, &url).await?;
        summarize_forecast(&json)
    }
}

/// Extract the overlay condition keyword from a current-weather response.
fn extract_current_conditions(
    json: &serde_json::Value,
) -> Result<CurrentConditions, ProviderError> {
    let first = json
        .get("weather")
        .and_then(|w| w.get(0))
        .ok_or_else(|| decode_err(ProviderKind::CurrentConditions, "missing weather[0]"))?;

    let condition = first
        .get("main")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| decode_err(ProviderKind::CurrentConditions, "missing weather[0].main"))?;
    let summary = first
        .get("description")
        .and_then(serde_json::Value::as_str)
        .unwrap_or(condition);

    Ok(CurrentConditions {
        condition: condition.to_owned(),
        summary: summary.to_owned(),
    })
}

/// Fold the 3-hourly forecast list into per-day summaries, today first.
fn summarize_forecast(json: &serde_json::Value) -> Result<ForecastSummary, ProviderError> {
    let list = json
        .get("list")
        .and_then(serde_json::Value::as_array)
        .filter(|l| !l.is_empty())
        .ok_or_else(|| decode_err(ProviderKind::Forecast, "missing forecast list"))?;

    // Group by date prefix of dt_txt, preserving first-seen order.
    let mut order: Vec<String> = Vec::new();
    let mut by_day: std::collections::BTreeMap<String, Vec<&serde_json::Value>> =
        std::collections::BTreeMap::new();
    for item in list {
        let Some(date) = item
            .get("dt_txt")
            .and_then(serde_json::Value::as_str)
            .and_then(|t| t.split(' ').next())
        else {
            continue;
        };
        if !by_day.contains_key(date) {
            order.push(date.to_owned());
        }
        by_day.entry(date.to_owned()).or_default().push(item);
    }

    let mut days = Vec::new();
    for date_str in order.iter().take(FORECAST_DAYS) {
        let Some(items) = by_day.get(date_str) else {
            continue;
        };
        days.push(summarize_day(date_str, items)?);
    }

    if days.is_empty() {
        return Err(decode_err(ProviderKind::Forecast, "no usable forecast days"));
    }
    Ok(ForecastSummary { days })
}

/// Summarize one day's 3-hourly slots.
fn summarize_day(
    date_str: &str,
    items: &[&serde_json::Value],
) -> Result<ForecastDay, ProviderError> {
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_e| decode_err(ProviderKind::Forecast, "bad dt_txt date"))?;

    let temps: Vec<f64> = items
        .iter()
        .filter_map(|i| i.get("main").and_then(|m| m.get("temp")).and_then(serde_json::Value::as_f64))
        .collect();
    let (Some(temp_min_c), Some(temp_max_c)) = (
        temps.iter().copied().reduce(f64::min),
        temps.iter().copied().reduce(f64::max),
    ) else {
        return Err(decode_err(ProviderKind::Forecast, "day without temperatures"));
    };

    let first = items
        .first()
        .ok_or_else(|| decode_err(ProviderKind::Forecast, "empty day group"))?;
    let humidity_pct = first
        .get("main")
        .and_then(|m| m.get("humidity"))
        .and_then(serde_json::Value::as_u64)
        .and_then(|h| u8::try_from(h).ok())
        .unwrap_or(0);
    let description = first
        .get("weather")
        .and_then(|w| w.get(0))
        .and_then(|w| w.get("description"))
        .and_then(serde_json::Value::as_str)
        .unwrap_or("n/a")
        .to_owned();

    let cloud_sum: u64 = items
        .iter()
        .filter_map(|i| i.get("clouds").and_then(|c| c.get("all")).and_then(serde_json::Value::as_u64))
        .sum();
    let cloud_count = u64::try_from(items.len()).unwrap_or(1).max(1);
    let cloud_cover_pct = cloud_sum
        .checked_div(cloud_count)
        .and_then(|v| u8::try_from(v).ok())
        .unwrap_or(0);

    let advice = advice_for(temp_min_c, temp_max_c, &description);

    Ok(ForecastDay {
        date,
        temp_min_c,
        temp_max_c,
        humidity_pct,
        cloud_cover_pct,
        description,
        advice,
    })
}

/// Agronomy advice for one forecast day.
fn advice_for(temp_min_c: f64, temp_max_c: f64, description: &str) -> String {
    if temp_max_c > 35.0 {
        "High temperature expected. Ensure adequate watering and provide shade for crops."
            .to_owned()
    } else if temp_min_c < 10.0 {
        "Low temperature expected. Protect crops from frost and ensure adequate insulation."
            .to_owned()
    } else if description.contains("rain") {
        "Rain expected. Ensure proper drainage and avoid waterlogging.".to_owned()
    } else {
        "Weather conditions are favorable for crops.".to_owned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn slot(dt_txt: &str, temp: f64, humidity: u64, clouds: u64, desc: &str) -> serde_json::Value {
        serde_json::json!({
            "dt_txt": dt_txt,
            "main": {"temp": temp, "humidity": humidity},
            "clouds": {"all": clouds},
            "weather": [{"description": desc}]
        })
    }

    #[test]
    fn extract_current_conditions_valid() {
        let json = serde_json::json!({
            "weather": [{"main": "Rain", "description": "light rain"}]
        });
        let conditions = extract_current_conditions(&json).unwrap();
        assert_eq!(conditions.condition, "Rain");
        assert_eq!(conditions.summary, "light rain");
    }

    #[test]
    fn extract_current_conditions_missing_weather() {
        let json = serde_json::json!({"cod": 200});
        assert!(extract_current_conditions(&json).is_err());
    }

    #[test]
    fn summarize_groups_by_day_and_caps_at_four() {
        let json = serde_json::json!({
            "list": [
                slot("2026-09-01 03:00:00", 22.0, 60, 10, "clear sky"),
                slot("2026-09-01 15:00:00", 31.0, 55, 30, "few clouds"),
                slot("2026-09-02 03:00:00", 20.0, 70, 80, "moderate rain"),
                slot("2026-09-03 03:00:00", 8.0, 75, 90, "overcast clouds"),
                slot("2026-09-04 03:00:00", 25.0, 50, 0, "clear sky"),
                slot("2026-09-05 03:00:00", 26.0, 50, 0, "clear sky"),
            ]
        });

        let summary = summarize_forecast(&json).unwrap();
        assert_eq!(summary.days.len(), 4, "only the first four days are kept");

        let day1 = summary.days.first().unwrap();
        assert!((day1.temp_min_c - 22.0).abs() < f64::EPSILON);
        assert!((day1.temp_max_c - 31.0).abs() < f64::EPSILON);
        assert_eq!(day1.humidity_pct, 60);
        assert_eq!(day1.cloud_cover_pct, 20);
    }

    #[test]
    fn summarize_rejects_empty_list() {
        let json = serde_json::json!({"list": []});
        assert!(summarize_forecast(&json).is_err());
        assert!(summarize_forecast(&serde_json::json!({})).is_err());
    }

    #[test]
    fn advice_covers_the_four_regimes() {
        assert!(advice_for(20.0, 36.0, "clear sky").contains("High temperature"));
        assert!(advice_for(5.0, 20.0, "clear sky").contains("Low temperature"));
        assert!(advice_for(15.0, 25.0, "light rain").contains("drainage"));
        assert!(advice_for(15.0, 25.0, "clear sky").contains("favorable"));
    }
}
