use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use super::ensure_exists;
use crate::error::{CycleCastError, ImportError, Result};
use crate::models::{HourlySample, Speed, Temperature, UnitSystem};

/// Forecast hours beyond this are dropped
const MAX_FORECAST_HOURS: usize = 48;

#[derive(Debug, Deserialize)]
struct ForecastFile {
    #[serde(default)]
    units: UnitSystem,
    hours: Vec<ForecastHour>,
}

#[derive(Debug, Deserialize)]
struct ForecastHour {
    #[serde(alias = "timestamp")]
    time: DateTime<Utc>,
    #[serde(alias = "temp")]
    temperature: f64,
    #[serde(default)]
    feels_like: Option<f64>,
    #[serde(alias = "wind")]
    wind_speed: f64,
    #[serde(default, alias = "wind_deg")]
    wind_direction: u16,
    #[serde(default, alias = "pop")]
    precipitation_probability: f64,
    #[serde(default, alias = "uv")]
    uv_index: Option<f64>,
    #[serde(default, alias = "air_quality_index")]
    aqi: Option<u16>,
}

impl ForecastHour {
    fn into_sample(self, units: UnitSystem, index: usize) -> Result<HourlySample> {
        // Providers disagree on 0-1 vs 0-100 for probability
        let probability = if self.precipitation_probability > 1.0 {
            self.precipitation_probability / 100.0
        } else {
            self.precipitation_probability
        };
        if !(0.0..=1.0).contains(&probability) {
            return Err(ImportError::InvalidValue {
                field: format!("hours[{}].precipitation_probability", index),
                value: self.precipitation_probability.to_string(),
            }
            .into());
        }

        if let Some(uv) = self.uv_index {
            if uv < 0.0 {
                return Err(ImportError::InvalidValue {
                    field: format!("hours[{}].uv_index", index),
                    value: uv.to_string(),
                }
                .into());
            }
        }

        Ok(HourlySample {
            timestamp: self.time,
            temperature: Temperature::from_units(self.temperature, units),
            feels_like: Temperature::from_units(self.feels_like.unwrap_or(self.temperature), units),
            wind_speed: Speed::from_units(self.wind_speed.max(0.0), units),
            wind_direction: self.wind_direction % 360,
            precipitation_probability: probability,
            uv_index: self.uv_index,
            air_quality_index: self.aqi,
        })
    }
}

/// Parse forecast JSON text into hourly samples
pub fn parse_forecast_json(content: &str) -> Result<Vec<HourlySample>> {
    let file: ForecastFile = serde_json::from_str(content).map_err(|e| {
        CycleCastError::from(ImportError::ParseError {
            format: "json".to_string(),
            location: format!("line {}, column {}", e.line(), e.column()),
            reason: e.to_string(),
        })
    })?;

    let units = file.units;
    let mut samples = file
        .hours
        .into_iter()
        .enumerate()
        .map(|(index, hour)| hour.into_sample(units, index))
        .collect::<Result<Vec<_>>>()?;

    samples.sort_by_key(|sample| sample.timestamp);
    if samples.len() > MAX_FORECAST_HOURS {
        warn!(
            hours = samples.len(),
            kept = MAX_FORECAST_HOURS,
            "Forecast longer than 48h, truncating"
        );
        samples.truncate(MAX_FORECAST_HOURS);
    }

    Ok(samples)
}

/// Load a forecast JSON file
pub fn load_forecast_json(path: &Path) -> Result<Vec<HourlySample>> {
    ensure_exists(path)?;
    let content = fs::read_to_string(path)?;
    let samples = parse_forecast_json(&content)?;

    info!(path = %path.display(), hours = samples.len(), "Loaded forecast");
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const METRIC_FORECAST: &str = r#"{
        "units": "metric",
        "hours": [
            { "time": "2024-06-01T15:00:00Z", "temperature": 22.0, "wind_speed": 12.0,
              "wind_direction": 270, "precipitation_probability": 40, "uv": 7.0 },
            { "time": "2024-06-01T14:00:00Z", "temperature": 21.0, "feels_like": 20.0,
              "wind_speed": 10.0, "wind_direction": 360, "pop": 0.1, "aqi": 55 }
        ]
    }"#;

    #[test]
    fn test_parse_metric_forecast() {
        let samples = parse_forecast_json(METRIC_FORECAST).unwrap();
        assert_eq!(samples.len(), 2);

        // Sorted by time
        let first = &samples[0];
        assert_eq!(first.timestamp, Utc.with_ymd_and_hms(2024, 6, 1, 14, 0, 0).unwrap());
        assert_eq!(first.temperature, Temperature::from_celsius(21.0));
        assert_eq!(first.feels_like, Temperature::from_celsius(20.0));
        assert_eq!(first.wind_speed, Speed::from_kph(10.0));
        assert_eq!(first.wind_direction, 0);
        assert_eq!(first.air_quality_index, Some(55));
        assert_eq!(first.uv_index, None);

        let second = &samples[1];
        assert_eq!(second.feels_like, Temperature::from_celsius(22.0));
        assert!((second.precipitation_probability - 0.4).abs() < 1e-9);
        assert_eq!(second.uv_index, Some(7.0));
    }

    #[test]
    fn test_units_default_to_imperial() {
        let json = r#"{ "hours": [ { "time": "2024-06-01T14:00:00Z", "temperature": 68.0, "wind_speed": 5.0 } ] }"#;
        let samples = parse_forecast_json(json).unwrap();
        assert_eq!(samples[0].temperature, Temperature::from_fahrenheit(68.0));
        assert_eq!(samples[0].precipitation_probability, 0.0);
    }

    #[test]
    fn test_invalid_probability() {
        let json = r#"{ "hours": [ { "time": "2024-06-01T14:00:00Z", "temperature": 68.0, "wind_speed": 5.0, "pop": 140 } ] }"#;
        let err = parse_forecast_json(json).unwrap_err();
        assert!(err.to_string().contains("precipitation_probability"));
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_forecast_json("{ \"hours\": [").unwrap_err();
        assert!(matches!(
            err,
            CycleCastError::Import(ImportError::ParseError { .. })
        ));
    }

    #[test]
    fn test_truncates_to_48_hours() {
        let hours: Vec<String> = (0..60)
            .map(|h| {
                let time = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
                    + chrono::Duration::hours(h);
                format!(
                    r#"{{ "time": "{}", "temperature": 68.0, "wind_speed": 5.0 }}"#,
                    time.to_rfc3339()
                )
            })
            .collect();
        let json = format!(r#"{{ "hours": [{}] }}"#, hours.join(","));

        let samples = parse_forecast_json(&json).unwrap();
        assert_eq!(samples.len(), MAX_FORECAST_HOURS);
    }
}
