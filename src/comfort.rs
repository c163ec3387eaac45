//! Hourly cycling comfort scoring
//!
//! Converts one forecast hour into a normalized comfort score in [0, 1] built
//! from per-factor sub-scores:
//!
//! - **Temperature**: 1.0 inside the optimal band around the rider's ideal
//!   temperature, falling linearly outside it with a floor of 0.2
//! - **Wind**: step function over comfortable / moderate / challenging limits
//! - **Precipitation**: linear penalty on probability of precipitation
//! - **UV** and **air quality**: neutral (1.0) when absent or below the
//!   penalty onset
//!
//! The thresholds that turn a score into a [`ComfortLevel`] are defined once in
//! [`ComfortLevel::from_score`]; every consumer goes through it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::models::{HourlySample, Temperature, UnitSystem};
use crate::thresholds::UnitThresholds;

/// Qualitative comfort tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComfortLevel {
    Excellent, // above 0.8
    Good,      // above 0.6
    Fair,      // above 0.4
    Poor,      // 0.4 and below
}

impl ComfortLevel {
    /// Classify a comfort score
    pub fn from_score(score: f64) -> Self {
        if score > 0.8 {
            ComfortLevel::Excellent
        } else if score > 0.6 {
            ComfortLevel::Good
        } else if score > 0.4 {
            ComfortLevel::Fair
        } else {
            ComfortLevel::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ComfortLevel::Excellent => "Excellent",
            ComfortLevel::Good => "Good",
            ComfortLevel::Fair => "Fair",
            ComfortLevel::Poor => "Poor",
        }
    }

    /// Display color name used by gauges and terminal output
    pub fn color(&self) -> &'static str {
        match self {
            ComfortLevel::Excellent => "green",
            ComfortLevel::Good => "blue",
            ComfortLevel::Fair => "orange",
            ComfortLevel::Poor => "red",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ComfortLevel::Excellent => "Perfect riding conditions",
            ComfortLevel::Good => "Good conditions for a ride",
            ComfortLevel::Fair => "Rideable with some discomfort",
            ComfortLevel::Poor => "Challenging conditions",
        }
    }
}

impl std::fmt::Display for ComfortLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Weight of each sub-score in the composite
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComfortWeights {
    pub temperature: f64,
    pub wind: f64,
    pub precipitation: f64,
    pub uv: f64,
    pub air_quality: f64,
}

impl ComfortWeights {
    /// Three-factor blend used when neither UV nor AQI is reported
    pub const BASE: ComfortWeights = ComfortWeights {
        temperature: 0.5,
        wind: 0.3,
        precipitation: 0.2,
        uv: 0.0,
        air_quality: 0.0,
    };

    /// Five-factor blend used when UV or AQI is reported
    pub const ENHANCED: ComfortWeights = ComfortWeights {
        temperature: 0.40,
        wind: 0.25,
        precipitation: 0.15,
        uv: 0.10,
        air_quality: 0.10,
    };

    pub fn total(&self) -> f64 {
        self.temperature + self.wind + self.precipitation + self.uv + self.air_quality
    }
}

/// Comfort score for one forecast hour together with its sub-scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComfortScore {
    /// Composite score in [0, 1]
    pub value: f64,

    pub temperature: f64,
    pub wind: f64,
    pub precipitation: f64,
    pub uv: f64,
    pub air_quality: f64,

    /// Classification of `value`
    pub level: ComfortLevel,
}

impl ComfortScore {
    /// Composite score as a rounded percentage
    pub fn percent(&self) -> u8 {
        (self.value * 100.0).round() as u8
    }
}

/// A forecast hour paired with its score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyComfort {
    pub sample: HourlySample,
    pub score: ComfortScore,
}

impl HourlyComfort {
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.sample.timestamp
    }
}

/// Comfort scoring engine bound to a unit system and ideal temperature
#[derive(Debug, Clone, PartialEq)]
pub struct ComfortScorer {
    units: UnitSystem,
    ideal_temperature: Temperature,
}

impl ComfortScorer {
    const TEMPERATURE_FLOOR: f64 = 0.2;
    const PRECIPITATION_FLOOR: f64 = 0.1;
    const PRECIPITATION_STEEPNESS: f64 = 1.2;
    const UV_PENALTY_ONSET: f64 = 6.0;
    const UV_PENALTY_PER_INDEX: f64 = 0.14;
    const UV_FLOOR: f64 = 0.3;
    const AQI_PENALTY_ONSET: f64 = 100.0;
    const AQI_PENALTY_SPAN: f64 = 250.0;
    const AQI_FLOOR: f64 = 0.2;

    /// Create a scorer using the default 67.5°F ideal temperature
    pub fn new(units: UnitSystem) -> Self {
        ComfortScorer {
            units,
            ideal_temperature: Temperature::default_ideal(),
        }
    }

    /// Create a scorer with a rider-specific ideal temperature
    pub fn with_ideal_temperature(units: UnitSystem, ideal_temperature: Temperature) -> Self {
        ComfortScorer {
            units,
            ideal_temperature,
        }
    }

    pub fn units(&self) -> UnitSystem {
        self.units
    }

    pub fn ideal_temperature(&self) -> Temperature {
        self.ideal_temperature
    }

    /// Score a single hour
    pub fn score(sample: &HourlySample, units: UnitSystem, ideal_temp: Temperature) -> ComfortScore {
        let thresholds = UnitThresholds::for_units(units);

        let temperature = Self::temperature_score(
            sample.temperature.in_units(units),
            ideal_temp.in_units(units),
            thresholds,
        );
        let wind = Self::wind_score(sample.wind_speed.in_units(units), thresholds);
        let precipitation = Self::precipitation_score(sample.precipitation_probability);
        let uv = Self::uv_score(sample.uv_index);
        let air_quality = Self::air_quality_score(sample.air_quality_index);

        let weights = if sample.uv_index.is_some() || sample.air_quality_index.is_some() {
            ComfortWeights::ENHANCED
        } else {
            ComfortWeights::BASE
        };

        let composite = temperature * weights.temperature
            + wind * weights.wind
            + precipitation * weights.precipitation
            + uv * weights.uv
            + air_quality * weights.air_quality;
        let value = composite.clamp(0.0, 1.0);

        trace!(
            timestamp = %sample.timestamp,
            temperature,
            wind,
            precipitation,
            uv,
            air_quality,
            value,
            "Scored forecast hour"
        );

        ComfortScore {
            value,
            temperature,
            wind,
            precipitation,
            uv,
            air_quality,
            level: ComfortLevel::from_score(value),
        }
    }

    /// Score a single hour with this scorer's settings
    pub fn score_sample(&self, sample: &HourlySample) -> ComfortScore {
        Self::score(sample, self.units, self.ideal_temperature)
    }

    /// Score every hour, preserving input order
    pub fn score_all(&self, samples: &[HourlySample]) -> Vec<HourlyComfort> {
        samples
            .iter()
            .map(|sample| HourlyComfort {
                sample: sample.clone(),
                score: self.score_sample(sample),
            })
            .collect()
    }

    /// Temperature sub-score in the active unit
    pub fn temperature_score(temp: f64, ideal: f64, thresholds: &UnitThresholds) -> f64 {
        let lower = ideal - thresholds.optimal_half_width;
        let upper = ideal + thresholds.optimal_half_width;

        if temp < lower {
            (1.0 - (lower - temp) / thresholds.cold_penalty_span).max(Self::TEMPERATURE_FLOOR)
        } else if temp > upper {
            (1.0 - (temp - upper) / thresholds.heat_penalty_span).max(Self::TEMPERATURE_FLOOR)
        } else {
            1.0
        }
    }

    /// Wind sub-score; a step function, not interpolated
    pub fn wind_score(speed: f64, thresholds: &UnitThresholds) -> f64 {
        if speed <= thresholds.wind_comfortable {
            1.0
        } else if speed <= thresholds.wind_moderate {
            0.7
        } else if speed <= thresholds.wind_challenging {
            0.4
        } else {
            0.2
        }
    }

    pub fn precipitation_score(probability: f64) -> f64 {
        (1.0 - probability * Self::PRECIPITATION_STEEPNESS).max(Self::PRECIPITATION_FLOOR)
    }

    pub fn uv_score(uv_index: Option<f64>) -> f64 {
        match uv_index {
            Some(uv) if uv > Self::UV_PENALTY_ONSET => {
                (1.0 - (uv - Self::UV_PENALTY_ONSET) * Self::UV_PENALTY_PER_INDEX)
                    .max(Self::UV_FLOOR)
            }
            _ => 1.0,
        }
    }

    pub fn air_quality_score(aqi: Option<u16>) -> f64 {
        match aqi {
            Some(aqi) if f64::from(aqi) > Self::AQI_PENALTY_ONSET => {
                (1.0 - (f64::from(aqi) - Self::AQI_PENALTY_ONSET) / Self::AQI_PENALTY_SPAN)
                    .max(Self::AQI_FLOOR)
            }
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Speed;
    use chrono::TimeZone;

    const EPSILON: f64 = 1e-9;

    fn sample(temp_f: f64, wind_mph: f64, pop: f64) -> HourlySample {
        HourlySample {
            timestamp: Utc.with_ymd_and_hms(2024, 6, 1, 14, 0, 0).unwrap(),
            temperature: Temperature::from_fahrenheit(temp_f),
            feels_like: Temperature::from_fahrenheit(temp_f),
            wind_speed: Speed::from_mph(wind_mph),
            wind_direction: 270,
            precipitation_probability: pop,
            uv_index: None,
            air_quality_index: None,
        }
    }

    fn imperial() -> &'static UnitThresholds {
        UnitThresholds::for_units(UnitSystem::Imperial)
    }

    #[test]
    fn test_comfort_level_classification() {
        assert_eq!(ComfortLevel::from_score(0.95), ComfortLevel::Excellent);
        assert_eq!(ComfortLevel::from_score(0.8), ComfortLevel::Good);
        assert_eq!(ComfortLevel::from_score(0.61), ComfortLevel::Good);
        assert_eq!(ComfortLevel::from_score(0.6), ComfortLevel::Fair);
        assert_eq!(ComfortLevel::from_score(0.41), ComfortLevel::Fair);
        assert_eq!(ComfortLevel::from_score(0.4), ComfortLevel::Poor);
        assert_eq!(ComfortLevel::from_score(0.0), ComfortLevel::Poor);
    }

    #[test]
    fn test_ideal_conditions_score_one() {
        let score = ComfortScorer::score(
            &sample(67.5, 0.0, 0.0),
            UnitSystem::Imperial,
            Temperature::default_ideal(),
        );
        assert!((score.value - 1.0).abs() < EPSILON);
        assert_eq!(score.level, ComfortLevel::Excellent);
        assert_eq!(score.percent(), 100);
    }

    #[test]
    fn test_ideal_conditions_with_benign_uv_and_aqi() {
        let mut hour = sample(67.5, 0.0, 0.0);
        hour.uv_index = Some(6.0);
        hour.air_quality_index = Some(100);

        let score = ComfortScorer::new(UnitSystem::Imperial).score_sample(&hour);
        assert!((score.value - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_default_band_is_60_to_75_fahrenheit() {
        let ideal = Temperature::DEFAULT_IDEAL_FAHRENHEIT;
        assert_eq!(ComfortScorer::temperature_score(60.0, ideal, imperial()), 1.0);
        assert_eq!(ComfortScorer::temperature_score(75.0, ideal, imperial()), 1.0);
        assert!(ComfortScorer::temperature_score(59.0, ideal, imperial()) < 1.0);
        assert!(ComfortScorer::temperature_score(76.0, ideal, imperial()) < 1.0);
    }

    #[test]
    fn test_temperature_tails() {
        let ideal = Temperature::DEFAULT_IDEAL_FAHRENHEIT;
        // 10°F below the band: 1 - 10/20
        assert!((ComfortScorer::temperature_score(50.0, ideal, imperial()) - 0.5).abs() < EPSILON);
        // 10°F above the band: 1 - 10/25
        assert!((ComfortScorer::temperature_score(85.0, ideal, imperial()) - 0.6).abs() < EPSILON);
        // Floors
        assert_eq!(ComfortScorer::temperature_score(-20.0, ideal, imperial()), 0.2);
        assert_eq!(ComfortScorer::temperature_score(120.0, ideal, imperial()), 0.2);
    }

    #[test]
    fn test_metric_temperature_tails() {
        let metric = UnitThresholds::for_units(UnitSystem::Metric);
        let ideal = Temperature::default_ideal().celsius();
        let lower = ideal - metric.optimal_half_width;

        // 5.55°C below the band is ~10°F below it
        let score = ComfortScorer::temperature_score(lower - 5.55, ideal, metric);
        assert!((score - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_wind_step_function() {
        let units = UnitSystem::Imperial;
        let ideal = Temperature::default_ideal();
        assert_eq!(ComfortScorer::score(&sample(67.5, 10.0, 0.0), units, ideal).wind, 1.0);
        assert_eq!(ComfortScorer::score(&sample(67.5, 10.1, 0.0), units, ideal).wind, 0.7);
        assert_eq!(ComfortScorer::score(&sample(67.5, 15.0, 0.0), units, ideal).wind, 0.7);
        assert_eq!(ComfortScorer::score(&sample(67.5, 20.0, 0.0), units, ideal).wind, 0.4);
        assert_eq!(ComfortScorer::score(&sample(67.5, 20.1, 0.0), units, ideal).wind, 0.2);
    }

    #[test]
    fn test_metric_wind_thresholds() {
        let metric = UnitThresholds::for_units(UnitSystem::Metric);
        assert_eq!(ComfortScorer::wind_score(16.0, metric), 1.0);
        assert_eq!(ComfortScorer::wind_score(16.5, metric), 0.7);
        assert_eq!(ComfortScorer::wind_score(24.0, metric), 0.7);
        assert_eq!(ComfortScorer::wind_score(32.0, metric), 0.4);
        assert_eq!(ComfortScorer::wind_score(32.5, metric), 0.2);
    }

    #[test]
    fn test_precipitation_score() {
        assert_eq!(ComfortScorer::precipitation_score(0.0), 1.0);
        assert!((ComfortScorer::precipitation_score(0.5) - 0.4).abs() < EPSILON);
        assert_eq!(ComfortScorer::precipitation_score(0.9), 0.1);
        assert_eq!(ComfortScorer::precipitation_score(1.0), 0.1);
    }

    #[test]
    fn test_uv_score() {
        assert_eq!(ComfortScorer::uv_score(None), 1.0);
        assert_eq!(ComfortScorer::uv_score(Some(3.0)), 1.0);
        assert_eq!(ComfortScorer::uv_score(Some(6.0)), 1.0);
        assert!(ComfortScorer::uv_score(Some(8.0)) < 1.0);
        assert!(ComfortScorer::uv_score(Some(8.0)) > ComfortScorer::uv_score(Some(10.0)));
        assert!((ComfortScorer::uv_score(Some(11.0)) - 0.3).abs() < EPSILON);
        assert_eq!(ComfortScorer::uv_score(Some(14.0)), 0.3);
    }

    #[test]
    fn test_air_quality_score() {
        assert_eq!(ComfortScorer::air_quality_score(None), 1.0);
        assert_eq!(ComfortScorer::air_quality_score(Some(100)), 1.0);
        assert!((ComfortScorer::air_quality_score(Some(150)) - 0.8).abs() < EPSILON);
        assert!((ComfortScorer::air_quality_score(Some(300)) - 0.2).abs() < EPSILON);
        assert_eq!(ComfortScorer::air_quality_score(Some(450)), 0.2);
    }

    #[test]
    fn test_base_weights_blend() {
        // Temperature 0.5, wind 0.4, rain 0.4
        let score = ComfortScorer::score(
            &sample(50.0, 18.0, 0.5),
            UnitSystem::Imperial,
            Temperature::default_ideal(),
        );
        let expected = 0.5 * 0.5 + 0.4 * 0.3 + 0.4 * 0.2;
        assert!((score.value - expected).abs() < EPSILON);
        assert_eq!(score.uv, 1.0);
        assert_eq!(score.air_quality, 1.0);
    }

    #[test]
    fn test_enhanced_weights_used_when_uv_present() {
        let mut hour = sample(67.5, 0.0, 0.0);
        hour.uv_index = Some(11.0);

        let score = ComfortScorer::new(UnitSystem::Imperial).score_sample(&hour);
        let expected = 0.40 + 0.25 + 0.15 + 0.10 * 0.3 + 0.10;
        assert!((score.value - expected).abs() < EPSILON);
    }

    #[test]
    fn test_weights_are_normalized() {
        for weights in [ComfortWeights::BASE, ComfortWeights::ENHANCED] {
            assert!((weights.total() - 1.0).abs() < EPSILON);
            assert!(weights.temperature > weights.wind);
            assert!(weights.temperature > weights.precipitation);
            assert!(weights.temperature > weights.uv);
            assert!(weights.temperature > weights.air_quality);
        }
    }

    #[test]
    fn test_extreme_inputs_stay_in_range() {
        let mut hour = sample(130.0, 80.0, 1.0);
        hour.uv_index = Some(15.0);
        hour.air_quality_index = Some(500);

        let score = ComfortScorer::new(UnitSystem::Imperial).score_sample(&hour);
        assert!(score.value >= 0.0 && score.value <= 1.0);
        assert_eq!(score.level, ComfortLevel::Poor);
    }

    #[test]
    fn test_custom_ideal_temperature() {
        let scorer =
            ComfortScorer::with_ideal_temperature(UnitSystem::Metric, Temperature::from_celsius(15.0));
        let mut hour = sample(0.0, 0.0, 0.0);
        hour.temperature = Temperature::from_celsius(15.0);

        assert_eq!(scorer.score_sample(&hour).temperature, 1.0);
        assert_eq!(scorer.ideal_temperature(), Temperature::from_celsius(15.0));
    }

    #[test]
    fn test_score_all_preserves_order() {
        let scorer = ComfortScorer::new(UnitSystem::Imperial);
        let hours = vec![sample(67.5, 0.0, 0.0), sample(40.0, 25.0, 0.8)];
        let scored = scorer.score_all(&hours);

        assert_eq!(scored.len(), 2);
        assert!(scored[0].score.value > scored[1].score.value);
        assert_eq!(scored[0].sample, hours[0]);
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_score_always_in_unit_interval(
            temp in -40.0f64..130.0,
            wind in 0.0f64..80.0,
            pop in 0.0f64..=1.0,
            uv in proptest::option::of(0.0f64..16.0),
            aqi in proptest::option::of(0u16..500),
            metric in any::<bool>()
        ) {
            let units = if metric { UnitSystem::Metric } else { UnitSystem::Imperial };
            let mut hour = sample(temp, wind, pop);
            hour.uv_index = uv;
            hour.air_quality_index = aqi;

            let score = ComfortScorer::score(&hour, units, Temperature::default_ideal());

            prop_assert!((0.0..=1.0).contains(&score.value));
            prop_assert_eq!(score.level, ComfortLevel::from_score(score.value));
            for sub in [score.temperature, score.wind, score.precipitation, score.uv, score.air_quality] {
                prop_assert!((0.0..=1.0).contains(&sub));
            }
        }

        #[test]
        fn test_more_rain_never_helps(pop_low in 0.0f64..=1.0, delta in 0.0f64..=1.0) {
            let pop_high = (pop_low + delta).min(1.0);
            prop_assert!(
                ComfortScorer::precipitation_score(pop_high)
                    <= ComfortScorer::precipitation_score(pop_low)
            );
        }
    }
}
