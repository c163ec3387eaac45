use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Unit system governing thresholds and display values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// Fahrenheit, mph
    Imperial,
    /// Celsius, km/h
    Metric,
}

impl Default for UnitSystem {
    fn default() -> Self {
        UnitSystem::Imperial
    }
}

impl std::str::FromStr for UnitSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "imperial" | "us" | "f" => Ok(UnitSystem::Imperial),
            "metric" | "si" | "c" => Ok(UnitSystem::Metric),
            _ => Err(format!("Invalid unit system: {}", s)),
        }
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitSystem::Imperial => write!(f, "imperial"),
            UnitSystem::Metric => write!(f, "metric"),
        }
    }
}

/// Air temperature tagged with the unit system it was reported in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    value: f64,
    units: UnitSystem,
}

impl Temperature {
    /// Centre of the default 60-75°F riding band
    pub const DEFAULT_IDEAL_FAHRENHEIT: f64 = 67.5;

    pub fn from_fahrenheit(fahrenheit: f64) -> Self {
        Temperature {
            value: fahrenheit,
            units: UnitSystem::Imperial,
        }
    }

    pub fn from_celsius(celsius: f64) -> Self {
        Temperature {
            value: celsius,
            units: UnitSystem::Metric,
        }
    }

    /// Build a temperature from a value expressed in the given unit system
    pub fn from_units(value: f64, units: UnitSystem) -> Self {
        Temperature { value, units }
    }

    pub fn default_ideal() -> Self {
        Self::from_fahrenheit(Self::DEFAULT_IDEAL_FAHRENHEIT)
    }

    /// Unit system the value was reported in
    pub fn units(&self) -> UnitSystem {
        self.units
    }

    pub fn fahrenheit(&self) -> f64 {
        match self.units {
            UnitSystem::Imperial => self.value,
            UnitSystem::Metric => self.value * 9.0 / 5.0 + 32.0,
        }
    }

    pub fn celsius(&self) -> f64 {
        match self.units {
            UnitSystem::Imperial => (self.value - 32.0) * 5.0 / 9.0,
            UnitSystem::Metric => self.value,
        }
    }

    /// Value in the requested unit system; exact when no conversion is needed
    pub fn in_units(&self, units: UnitSystem) -> f64 {
        match units {
            UnitSystem::Imperial => self.fahrenheit(),
            UnitSystem::Metric => self.celsius(),
        }
    }
}

/// Wind speed tagged with the unit system it was reported in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Speed {
    value: f64,
    units: UnitSystem,
}

impl Speed {
    const KPH_PER_MPH: f64 = 1.609344;

    pub fn from_mph(mph: f64) -> Self {
        Speed {
            value: mph,
            units: UnitSystem::Imperial,
        }
    }

    pub fn from_kph(kph: f64) -> Self {
        Speed {
            value: kph,
            units: UnitSystem::Metric,
        }
    }

    pub fn from_units(value: f64, units: UnitSystem) -> Self {
        Speed { value, units }
    }

    pub fn units(&self) -> UnitSystem {
        self.units
    }

    pub fn mph(&self) -> f64 {
        match self.units {
            UnitSystem::Imperial => self.value,
            UnitSystem::Metric => self.value / Self::KPH_PER_MPH,
        }
    }

    pub fn kph(&self) -> f64 {
        match self.units {
            UnitSystem::Imperial => self.value * Self::KPH_PER_MPH,
            UnitSystem::Metric => self.value,
        }
    }

    pub fn in_units(&self, units: UnitSystem) -> f64 {
        match units {
            UnitSystem::Imperial => self.mph(),
            UnitSystem::Metric => self.kph(),
        }
    }
}

/// One hourly forecast point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySample {
    /// Start of the forecast hour
    pub timestamp: DateTime<Utc>,

    /// Air temperature
    pub temperature: Temperature,

    /// Apparent ("feels like") temperature
    pub feels_like: Temperature,

    /// Sustained wind speed
    pub wind_speed: Speed,

    /// Direction the wind blows from, in degrees (0-359)
    pub wind_direction: u16,

    /// Probability of precipitation (0.0-1.0)
    pub precipitation_probability: f64,

    /// UV index, when the provider reports one
    pub uv_index: Option<f64>,

    /// US EPA air quality index, when available
    pub air_quality_index: Option<u16>,
}

/// Training stress accumulated on a single calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStress {
    /// Calendar day
    pub date: NaiveDate,

    /// Total TSS for the day (sum of all rides)
    pub tss: Decimal,

    /// Number of rides completed on this day
    pub ride_count: u16,

    /// Total moving time in seconds
    pub duration_seconds: u32,

    /// Total distance in meters
    pub distance_meters: Decimal,
}

impl DailyStress {
    /// A day with no recorded rides
    pub fn rest_day(date: NaiveDate) -> Self {
        DailyStress {
            date,
            tss: Decimal::ZERO,
            ride_count: 0,
            duration_seconds: 0,
            distance_meters: Decimal::ZERO,
        }
    }

    /// Fold another record for the same day into this one
    pub fn accumulate(&mut self, other: &DailyStress) {
        self.tss += other.tss;
        self.ride_count = self.ride_count.saturating_add(other.ride_count);
        self.duration_seconds = self.duration_seconds.saturating_add(other.duration_seconds);
        self.distance_meters += other.distance_meters;
    }
}

/// A single completed ride as reported by the activity store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideRecord {
    /// Day the ride was completed
    pub date: NaiveDate,

    /// Training Stress Score, if the source computed one
    pub tss: Option<Decimal>,

    /// Moving time in seconds
    pub duration_seconds: u32,

    /// Distance in meters
    pub distance_meters: Decimal,
}

/// One day of the training-load series with its computed moving averages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTrainingLoad {
    /// Calendar day
    pub date: NaiveDate,

    /// Total TSS for the day
    pub tss: Decimal,

    /// Number of rides
    pub ride_count: u16,

    /// Total duration in seconds
    pub duration_seconds: u32,

    /// Total distance in meters
    pub distance_meters: Decimal,

    /// Chronic Training Load (42-day exponentially weighted average)
    pub ctl: f64,

    /// Acute Training Load (7-day exponentially weighted average)
    pub atl: f64,
}

impl DailyTrainingLoad {
    /// Training Stress Balance (CTL - ATL)
    pub fn tsb(&self) -> f64 {
        self.ctl - self.atl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_temperature_conversion() {
        let freezing = Temperature::from_celsius(0.0);
        assert_eq!(freezing.in_units(UnitSystem::Metric), 0.0);
        assert!((freezing.fahrenheit() - 32.0).abs() < 1e-9);

        let warm = Temperature::from_fahrenheit(77.0);
        assert!((warm.celsius() - 25.0).abs() < 1e-9);
        assert!((warm.in_units(UnitSystem::Metric) - 25.0).abs() < 1e-9);
        assert!((warm.in_units(UnitSystem::Imperial) - 77.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_ideal_temperature() {
        let ideal = Temperature::default_ideal();
        assert_eq!(ideal.fahrenheit(), 67.5);
        assert!((ideal.celsius() - 19.722).abs() < 0.001);
    }

    #[test]
    fn test_speed_conversion() {
        let speed = Speed::from_kph(16.09344);
        assert!((speed.mph() - 10.0).abs() < 1e-9);
        assert!((Speed::from_mph(10.0).kph() - 16.09344).abs() < 1e-9);
        // Same-unit reads are exact
        assert_eq!(Speed::from_kph(16.0).in_units(UnitSystem::Metric), 16.0);
        assert_eq!(Speed::from_units(24.0, UnitSystem::Metric).units(), UnitSystem::Metric);
    }

    #[test]
    fn test_unit_system_parsing() {
        assert_eq!("metric".parse::<UnitSystem>().unwrap(), UnitSystem::Metric);
        assert_eq!("Imperial".parse::<UnitSystem>().unwrap(), UnitSystem::Imperial);
        assert!("kelvin".parse::<UnitSystem>().is_err());
        assert_eq!(UnitSystem::default(), UnitSystem::Imperial);
    }

    #[test]
    fn test_daily_stress_accumulate() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 23).unwrap();
        let mut day = DailyStress::rest_day(date);
        day.accumulate(&DailyStress {
            date,
            tss: dec!(55.5),
            ride_count: 1,
            duration_seconds: 3600,
            distance_meters: dec!(30000),
        });
        day.accumulate(&DailyStress {
            date,
            tss: dec!(20),
            ride_count: 1,
            duration_seconds: 1200,
            distance_meters: dec!(8000),
        });

        assert_eq!(day.tss, dec!(75.5));
        assert_eq!(day.ride_count, 2);
        assert_eq!(day.duration_seconds, 4800);
        assert_eq!(day.distance_meters, dec!(38000));
    }

    #[test]
    fn test_tsb() {
        let load = DailyTrainingLoad {
            date: NaiveDate::from_ymd_opt(2024, 9, 23).unwrap(),
            tss: dec!(80),
            ride_count: 1,
            duration_seconds: 3600,
            distance_meters: dec!(30000),
            ctl: 60.0,
            atl: 75.0,
        };
        assert_eq!(load.tsb(), -15.0);
    }
}
