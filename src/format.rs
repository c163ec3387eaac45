//! Display helpers for forecast values

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Speed, Temperature, UnitSystem};
use crate::thresholds::UnitThresholds;

/// 16-point compass rose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompassPoint {
    N,
    NNE,
    NE,
    ENE,
    E,
    ESE,
    SE,
    SSE,
    S,
    SSW,
    SW,
    WSW,
    W,
    WNW,
    NW,
    NNW,
}

impl CompassPoint {
    const ALL: [CompassPoint; 16] = [
        CompassPoint::N,
        CompassPoint::NNE,
        CompassPoint::NE,
        CompassPoint::ENE,
        CompassPoint::E,
        CompassPoint::ESE,
        CompassPoint::SE,
        CompassPoint::SSE,
        CompassPoint::S,
        CompassPoint::SSW,
        CompassPoint::SW,
        CompassPoint::WSW,
        CompassPoint::W,
        CompassPoint::WNW,
        CompassPoint::NW,
        CompassPoint::NNW,
    ];

    pub fn abbreviation(&self) -> &'static str {
        match self {
            CompassPoint::N => "N",
            CompassPoint::NNE => "NNE",
            CompassPoint::NE => "NE",
            CompassPoint::ENE => "ENE",
            CompassPoint::E => "E",
            CompassPoint::ESE => "ESE",
            CompassPoint::SE => "SE",
            CompassPoint::SSE => "SSE",
            CompassPoint::S => "S",
            CompassPoint::SSW => "SSW",
            CompassPoint::SW => "SW",
            CompassPoint::WSW => "WSW",
            CompassPoint::W => "W",
            CompassPoint::WNW => "WNW",
            CompassPoint::NW => "NW",
            CompassPoint::NNW => "NNW",
        }
    }
}

impl std::fmt::Display for CompassPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// Map a meteorological wind direction to the nearest compass point.
///
/// Each point owns the 22.5° sector centred on it, so 0° and 11.24° are N
/// while 11.25° is NNE.
pub fn compass_direction(degrees: f64) -> CompassPoint {
    let normalized = degrees.rem_euclid(360.0);
    let index = ((normalized + 11.25) / 22.5).floor() as usize % 16;
    CompassPoint::ALL[index]
}

/// Temperature rounded to whole degrees, e.g. "68°F"
pub fn format_temperature(temperature: Temperature, units: UnitSystem) -> String {
    let symbol = UnitThresholds::for_units(units).temperature_symbol;
    format!("{:.0}{}", temperature.in_units(units), symbol)
}

/// Wind speed and origin, e.g. "8 mph NW"
pub fn format_wind(speed: Speed, direction: u16, units: UnitSystem) -> String {
    let symbol = UnitThresholds::for_units(units).speed_symbol;
    format!(
        "{:.0} {} {}",
        speed.in_units(units),
        symbol,
        compass_direction(f64::from(direction))
    )
}

/// Probability of precipitation as a whole percentage
pub fn format_precipitation(probability: f64) -> String {
    format!("{:.0}%", probability.clamp(0.0, 1.0) * 100.0)
}

/// Hour of day in 12-hour form, e.g. "3 PM"
pub fn format_hour(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%-I %p").to_string()
}

/// WHO UV exposure categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UvCategory {
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl UvCategory {
    pub fn label(&self) -> &'static str {
        match self {
            UvCategory::Low => "Low",
            UvCategory::Moderate => "Moderate",
            UvCategory::High => "High",
            UvCategory::VeryHigh => "Very High",
            UvCategory::Extreme => "Extreme",
        }
    }
}

pub fn uv_category(uv: f64) -> UvCategory {
    if uv < 3.0 {
        UvCategory::Low
    } else if uv < 6.0 {
        UvCategory::Moderate
    } else if uv < 8.0 {
        UvCategory::High
    } else if uv < 11.0 {
        UvCategory::VeryHigh
    } else {
        UvCategory::Extreme
    }
}

/// UV index with its category, or "--" when not reported
pub fn format_uv(uv: Option<f64>) -> String {
    match uv {
        Some(uv) => format!("{:.0} ({})", uv, uv_category(uv).label()),
        None => "--".to_string(),
    }
}

/// US EPA air quality categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }
}

pub fn aqi_category(aqi: u16) -> AqiCategory {
    match aqi {
        0..=50 => AqiCategory::Good,
        51..=100 => AqiCategory::Moderate,
        101..=150 => AqiCategory::UnhealthyForSensitiveGroups,
        151..=200 => AqiCategory::Unhealthy,
        201..=300 => AqiCategory::VeryUnhealthy,
        _ => AqiCategory::Hazardous,
    }
}

/// AQI with its category, or "--" when not reported
pub fn format_aqi(aqi: Option<u16>) -> String {
    match aqi {
        Some(aqi) => format!("{} ({})", aqi, aqi_category(aqi).label()),
        None => "--".to_string(),
    }
}
