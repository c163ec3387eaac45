//! Forecast aggregation and ride recommendations
//!
//! Summarizes a window of scored forecast hours (up to 48h) into aggregate
//! statistics and an ordered list of recommendations. The recommendation order
//! is fixed: optimal window, wind alert, temperature alert, rain alert.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::debug;

use crate::comfort::{ComfortLevel, ComfortScorer, HourlyComfort};
use crate::format::{format_hour, format_temperature, format_wind};
use crate::models::{HourlySample, Temperature, UnitSystem};
use crate::thresholds::UnitThresholds;

/// Closed range of observed values
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return ValueRange::default();
        }

        ValueRange {
            min: Statistics::min(values.iter()),
            max: Statistics::max(values.iter()),
        }
    }
}

/// Number of hours in each comfort tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComfortDistribution {
    pub excellent: usize,
    pub good: usize,
    pub fair: usize,
    pub poor: usize,
}

impl ComfortDistribution {
    fn record(&mut self, level: ComfortLevel) {
        match level {
            ComfortLevel::Excellent => self.excellent += 1,
            ComfortLevel::Good => self.good += 1,
            ComfortLevel::Fair => self.fair += 1,
            ComfortLevel::Poor => self.poor += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.excellent + self.good + self.fair + self.poor
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationKind {
    OptimalWindow,
    WindAlert,
    TemperatureAlert,
    RainAlert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
}

/// One human-readable recommendation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub title: String,
    pub message: String,
}

/// Consecutive run of rideable hours
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideWindow {
    /// Start of the first hour in the window
    pub start: DateTime<Utc>,

    /// End of the last hour in the window
    pub end: DateTime<Utc>,

    /// Number of forecast hours covered
    pub hours: usize,

    /// Mean comfort score across the window
    pub average_comfort: f64,
}

/// Aggregate view of a forecast window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSummary {
    /// Unit system for all ranges below
    pub units: UnitSystem,

    /// Number of hours summarized
    pub hour_count: usize,

    /// Arithmetic mean of hourly comfort scores
    pub average_comfort: f64,

    /// Highest-scoring hour (earliest on ties)
    pub best_hour: Option<HourlyComfort>,

    /// Hours scoring above 0.7
    pub optimal_hours: Vec<DateTime<Utc>>,

    /// Hours scoring below 0.4
    pub challenging_hours: Vec<DateTime<Utc>>,

    pub temperature_range: ValueRange,
    pub wind_range: ValueRange,
    pub max_precipitation: f64,

    pub distribution: ComfortDistribution,

    /// Runs of at least two consecutive hours scoring above 0.7
    pub ride_windows: Vec<RideWindow>,

    pub recommendations: Vec<Recommendation>,
}

impl ForecastSummary {
    fn empty(units: UnitSystem) -> Self {
        ForecastSummary {
            units,
            hour_count: 0,
            average_comfort: 0.0,
            best_hour: None,
            optimal_hours: Vec::new(),
            challenging_hours: Vec::new(),
            temperature_range: ValueRange::default(),
            wind_range: ValueRange::default(),
            max_precipitation: 0.0,
            distribution: ComfortDistribution::default(),
            ride_windows: Vec::new(),
            recommendations: Vec::new(),
        }
    }
}

/// Aggregates hourly comfort scores into a forecast summary
pub struct ForecastAggregator {
    scorer: ComfortScorer,
}

impl ForecastAggregator {
    const OPTIMAL_SCORE: f64 = 0.7;
    const CHALLENGING_SCORE: f64 = 0.4;
    const RAIN_ALERT_PROBABILITY: f64 = 0.5;
    const WINDOW_MIN_HOURS: usize = 2;

    pub fn new(scorer: ComfortScorer) -> Self {
        ForecastAggregator { scorer }
    }

    /// Score and summarize a forecast window
    pub fn summarize(
        samples: &[HourlySample],
        units: UnitSystem,
        ideal_temp: Temperature,
    ) -> ForecastSummary {
        Self::new(ComfortScorer::with_ideal_temperature(units, ideal_temp)).summarize_samples(samples)
    }

    /// Score and summarize a forecast window with this aggregator's scorer
    pub fn summarize_samples(&self, samples: &[HourlySample]) -> ForecastSummary {
        let scored = self.scorer.score_all(samples);
        self.summarize_scored(&scored)
    }

    /// Summarize hours that have already been scored
    pub fn summarize_scored(&self, scored: &[HourlyComfort]) -> ForecastSummary {
        let units = self.scorer.units();

        if scored.is_empty() {
            debug!("Empty forecast window, returning zeroed summary");
            return ForecastSummary::empty(units);
        }

        let scores: Vec<f64> = scored.iter().map(|h| h.score.value).collect();
        let temperatures: Vec<f64> = scored
            .iter()
            .map(|h| h.sample.temperature.in_units(units))
            .collect();
        let winds: Vec<f64> = scored
            .iter()
            .map(|h| h.sample.wind_speed.in_units(units))
            .collect();
        let max_precipitation = scored
            .iter()
            .map(|h| h.sample.precipitation_probability)
            .fold(0.0_f64, f64::max);

        let mut distribution = ComfortDistribution::default();
        for hour in scored {
            distribution.record(ComfortLevel::from_score(hour.score.value));
        }

        let optimal_hours = scored
            .iter()
            .filter(|h| h.score.value > Self::OPTIMAL_SCORE)
            .map(HourlyComfort::timestamp)
            .collect();
        let challenging_hours = scored
            .iter()
            .filter(|h| h.score.value < Self::CHALLENGING_SCORE)
            .map(HourlyComfort::timestamp)
            .collect();

        let best_hour = Self::best_hour(scored).cloned();
        let temperature_range = ValueRange::from_values(&temperatures);
        let wind_range = ValueRange::from_values(&winds);

        let recommendations = self.recommendations(
            best_hour.as_ref(),
            temperature_range,
            wind_range,
            max_precipitation,
        );

        let summary = ForecastSummary {
            units,
            hour_count: scored.len(),
            average_comfort: scores.iter().mean(),
            best_hour,
            optimal_hours,
            challenging_hours,
            temperature_range,
            wind_range,
            max_precipitation,
            distribution,
            ride_windows: Self::ride_windows(scored, Self::OPTIMAL_SCORE, Self::WINDOW_MIN_HOURS),
            recommendations,
        };

        debug!(
            hours = summary.hour_count,
            average_comfort = summary.average_comfort,
            recommendations = summary.recommendations.len(),
            "Summarized forecast window"
        );

        summary
    }

    /// Highest-scoring hour; ties go to the earliest timestamp
    pub fn best_hour(scored: &[HourlyComfort]) -> Option<&HourlyComfort> {
        scored.iter().fold(None, |best: Option<&HourlyComfort>, hour| match best {
            None => Some(hour),
            Some(current) => {
                let better = hour.score.value > current.score.value;
                let tie_earlier = hour.score.value == current.score.value
                    && hour.timestamp() < current.timestamp();
                if better || tie_earlier {
                    Some(hour)
                } else {
                    Some(current)
                }
            }
        })
    }

    /// Maximal runs of back-to-back hours each scoring above `min_score`
    pub fn ride_windows(
        scored: &[HourlyComfort],
        min_score: f64,
        min_hours: usize,
    ) -> Vec<RideWindow> {
        let mut ordered: Vec<&HourlyComfort> = scored.iter().collect();
        ordered.sort_by_key(|h| h.timestamp());

        let mut windows = Vec::new();
        let mut run: Vec<&HourlyComfort> = Vec::new();

        for hour in ordered {
            let contiguous = run
                .last()
                .map(|prev| hour.timestamp() - prev.timestamp() <= Duration::hours(1))
                .unwrap_or(true);

            if hour.score.value > min_score && contiguous {
                run.push(hour);
                continue;
            }

            Self::close_window(&mut run, min_hours, &mut windows);
            if hour.score.value > min_score {
                run.push(hour);
            }
        }
        Self::close_window(&mut run, min_hours, &mut windows);

        windows
    }

    fn close_window(
        run: &mut Vec<&HourlyComfort>,
        min_hours: usize,
        windows: &mut Vec<RideWindow>,
    ) {
        if run.len() >= min_hours.max(1) {
            if let (Some(first), Some(last)) = (run.first(), run.last()) {
                windows.push(RideWindow {
                    start: first.timestamp(),
                    end: last.timestamp() + Duration::hours(1),
                    hours: run.len(),
                    average_comfort: run.iter().map(|h| h.score.value).mean(),
                });
            }
        }
        run.clear();
    }

    fn recommendations(
        &self,
        best_hour: Option<&HourlyComfort>,
        temperature_range: ValueRange,
        wind_range: ValueRange,
        max_precipitation: f64,
    ) -> Vec<Recommendation> {
        let units = self.scorer.units();
        let thresholds = UnitThresholds::for_units(units);
        let mut recommendations = Vec::new();

        if let Some(best) = best_hour {
            recommendations.push(Recommendation {
                kind: RecommendationKind::OptimalWindow,
                priority: Priority::High,
                title: "Optimal Window".to_string(),
                message: format!(
                    "Best time to ride is {}: {}% comfort, {}, wind {}",
                    format_hour(best.timestamp()),
                    best.score.percent(),
                    format_temperature(best.sample.temperature, units),
                    format_wind(best.sample.wind_speed, best.sample.wind_direction, units),
                ),
            });
        }

        if wind_range.max > thresholds.wind_alert {
            recommendations.push(Recommendation {
                kind: RecommendationKind::WindAlert,
                priority: Priority::Medium,
                title: "Wind Alert".to_string(),
                message: format!(
                    "Winds up to {:.0} {} expected. Plan a sheltered route or ride when it calms down.",
                    wind_range.max, thresholds.speed_symbol
                ),
            });
        }

        if temperature_range.min < thresholds.cold_alert
            || temperature_range.max > thresholds.heat_alert
        {
            let advice = if temperature_range.min < thresholds.cold_alert {
                "Dress in layers and protect your extremities."
            } else {
                "Carry extra water and avoid the hottest hours."
            };
            recommendations.push(Recommendation {
                kind: RecommendationKind::TemperatureAlert,
                priority: Priority::Medium,
                title: "Temperature Alert".to_string(),
                message: format!(
                    "Temperatures range from {:.0}{} to {:.0}{}. {}",
                    temperature_range.min,
                    thresholds.temperature_symbol,
                    temperature_range.max,
                    thresholds.temperature_symbol,
                    advice
                ),
            });
        }

        if max_precipitation > Self::RAIN_ALERT_PROBABILITY {
            recommendations.push(Recommendation {
                kind: RecommendationKind::RainAlert,
                priority: Priority::High,
                title: "Rain Alert".to_string(),
                message: format!(
                    "Up to {:.0}% chance of rain. Pack a rain jacket and fenders.",
                    max_precipitation * 100.0
                ),
            });
        }

        recommendations
    }
}
