//! Training load analytics (CTL / ATL / TSB)
//!
//! # Sports Science Background
//!
//! - **CTL** (Chronic Training Load): 42-day exponentially weighted average of
//!   daily TSS, a proxy for fitness
//! - **ATL** (Acute Training Load): 7-day exponentially weighted average of
//!   daily TSS, a proxy for fatigue
//! - **TSB** (Training Stress Balance): CTL - ATL, a proxy for form
//!
//! Each day updates both averages with
//! `X_today = X_yesterday + (TSS_today - X_yesterday) * (1 - e^(-1/τ))`.
//! The first day of a series seeds CTL and ATL with that day's TSS.

use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, trace};

use crate::models::{DailyStress, DailyTrainingLoad, RideRecord};

/// Training load errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrainingLoadError {
    #[error("Day {date} is earlier than the last recorded day {last}")]
    OutOfOrder { date: NaiveDate, last: NaiveDate },
}

/// Training load configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingLoadConfig {
    /// CTL time constant in days (default: 42)
    pub ctl_time_constant: u16,

    /// ATL time constant in days (default: 7)
    pub atl_time_constant: u16,

    /// Look-back for ramp rate and trend deltas, in days
    pub ramp_rate_days: u16,

    /// Minimum 7-day delta counted as a trend
    pub trend_threshold: f64,

    /// Weekly TSS goal
    pub weekly_target_tss: Decimal,
}

impl Default for TrainingLoadConfig {
    fn default() -> Self {
        TrainingLoadConfig {
            ctl_time_constant: 42,
            atl_time_constant: 7,
            ramp_rate_days: 7,
            trend_threshold: 1.0,
            weekly_target_tss: dec!(350),
        }
    }
}

/// Form classification derived from TSB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormStatus {
    Overreached, // below -20
    Building,    // -20 up to -5
    Neutral,     // -5 through 10
    Fresh,       // above 10 through 25
    VeryFresh,   // above 25
}

impl FormStatus {
    /// Classify form from TSB
    pub fn from_tsb(tsb: f64) -> Self {
        if tsb < -20.0 {
            FormStatus::Overreached
        } else if tsb < -5.0 {
            FormStatus::Building
        } else if tsb <= 10.0 {
            FormStatus::Neutral
        } else if tsb <= 25.0 {
            FormStatus::Fresh
        } else {
            FormStatus::VeryFresh
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormStatus::Overreached => "Overreached",
            FormStatus::Building => "Building",
            FormStatus::Neutral => "Neutral",
            FormStatus::Fresh => "Fresh",
            FormStatus::VeryFresh => "Very Fresh",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            FormStatus::Overreached => "red",
            FormStatus::Building => "orange",
            FormStatus::Neutral => "gray",
            FormStatus::Fresh => "green",
            FormStatus::VeryFresh => "mint",
        }
    }

    /// Get training recommendation
    pub fn recommendation(&self) -> &'static str {
        match self {
            FormStatus::Overreached => "Prioritize rest and recovery before resuming hard training",
            FormStatus::Building => "Productive training load, keep recovery days in the plan",
            FormStatus::Neutral => "Continue normal training progression",
            FormStatus::Fresh => "Good time for high-intensity sessions or racing",
            FormStatus::VeryFresh => {
                "Consider increasing training load, fitness may start to decline"
            }
        }
    }
}

impl std::fmt::Display for FormStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Up,
    Stable,
    Down,
}

impl TrendDirection {
    pub fn arrow(&self) -> &'static str {
        match self {
            TrendDirection::Up => "↑",
            TrendDirection::Stable => "→",
            TrendDirection::Down => "↓",
        }
    }
}

/// Point-in-time training load snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingLoadSummary {
    /// Date of the latest entry, None for an empty series
    pub as_of: Option<NaiveDate>,

    pub current_ctl: f64,
    pub current_atl: f64,
    pub current_tsb: f64,

    /// TSS over the trailing 7 calendar days
    pub weekly_tss: Decimal,

    /// CTL change over the ramp period
    pub ramp_rate: f64,

    pub ctl_trend: TrendDirection,
    pub atl_trend: TrendDirection,

    pub form_status: FormStatus,

    pub weekly_target: Decimal,

    /// Weekly TSS as a percentage of the target
    pub weekly_progress: f64,

    /// Readiness percentage derived from TSB
    pub readiness: u8,
}

impl TrainingLoadSummary {
    fn empty(config: &TrainingLoadConfig) -> Self {
        TrainingLoadSummary {
            as_of: None,
            current_ctl: 0.0,
            current_atl: 0.0,
            current_tsb: 0.0,
            weekly_tss: Decimal::ZERO,
            ramp_rate: 0.0,
            ctl_trend: TrendDirection::Stable,
            atl_trend: TrendDirection::Stable,
            form_status: FormStatus::from_tsb(0.0),
            weekly_target: config.weekly_target_tss,
            weekly_progress: 0.0,
            readiness: readiness_from_tsb(0.0),
        }
    }

    /// Flat payload for watch complications and widgets
    pub fn widget_payload(&self) -> WidgetPayload {
        WidgetPayload {
            tsb: self.current_tsb.round(),
            readiness: self.readiness,
            status: self.form_status.label().to_string(),
            ctl: self.current_ctl.round(),
            atl: self.current_atl.round(),
            weekly_tss: self.weekly_tss.round().to_i64().unwrap_or(0),
        }
    }
}

/// Flat numeric/string fields handed to widget glue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetPayload {
    pub tsb: f64,
    pub readiness: u8,
    pub status: String,
    pub ctl: f64,
    pub atl: f64,
    pub weekly_tss: i64,
}

/// Totals for one calendar week (Monday start)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyLoad {
    pub week_start: NaiveDate,
    pub total_tss: Decimal,
    pub ride_count: u32,
    pub duration_seconds: u64,
    pub distance_meters: Decimal,

    /// CTL at the last recorded day of the week
    pub end_ctl: Option<f64>,
}

/// Readiness percentage: 50% at TSB 0, two points per TSB unit
pub fn readiness_from_tsb(tsb: f64) -> u8 {
    (50.0 + 2.0 * tsb).clamp(0.0, 100.0).round() as u8
}

/// Core training load engine
pub struct TrainingLoadAnalyzer {
    config: TrainingLoadConfig,
}

impl TrainingLoadAnalyzer {
    /// Create analyzer with default configuration
    pub fn new() -> Self {
        TrainingLoadAnalyzer {
            config: TrainingLoadConfig::default(),
        }
    }

    /// Create analyzer with custom configuration
    pub fn with_config(config: TrainingLoadConfig) -> Self {
        TrainingLoadAnalyzer { config }
    }

    pub fn config(&self) -> &TrainingLoadConfig {
        &self.config
    }

    fn decay_factor(time_constant: u16) -> f64 {
        1.0 - (-1.0 / f64::from(time_constant.max(1))).exp()
    }

    /// Aggregate rides into one record per day
    pub fn aggregate_daily(&self, rides: &[RideRecord]) -> BTreeMap<NaiveDate, DailyStress> {
        let mut daily: BTreeMap<NaiveDate, DailyStress> = BTreeMap::new();

        for ride in rides {
            let stress = DailyStress {
                date: ride.date,
                tss: ride.tss.unwrap_or(Decimal::ZERO),
                ride_count: 1,
                duration_seconds: ride.duration_seconds,
                distance_meters: ride.distance_meters,
            };

            daily
                .entry(ride.date)
                .and_modify(|day| day.accumulate(&stress))
                .or_insert(stress);
        }

        daily
    }

    /// Advance CTL/ATL from the previous entry to `day`
    fn next_load(&self, previous: Option<&DailyTrainingLoad>, day: &DailyStress) -> DailyTrainingLoad {
        let tss = day.tss.to_f64().unwrap_or(0.0);

        let (ctl, atl) = match previous {
            None => (tss, tss),
            Some(prev) => {
                let ctl_factor = Self::decay_factor(self.config.ctl_time_constant);
                let atl_factor = Self::decay_factor(self.config.atl_time_constant);

                let mut ctl = prev.ctl;
                let mut atl = prev.atl;

                // Missing calendar days count as zero-TSS rest days
                let gap = (day.date - prev.date).num_days().max(1);
                for _ in 1..gap {
                    ctl -= ctl * ctl_factor;
                    atl -= atl * atl_factor;
                }

                ctl += (tss - ctl) * ctl_factor;
                atl += (tss - atl) * atl_factor;
                (ctl, atl)
            }
        };

        trace!(date = %day.date, tss, ctl, atl, "Advanced training load");

        DailyTrainingLoad {
            date: day.date,
            tss: day.tss,
            ride_count: day.ride_count,
            duration_seconds: day.duration_seconds,
            distance_meters: day.distance_meters,
            ctl,
            atl,
        }
    }

    /// Compute the daily training-load series.
    ///
    /// Input is sorted by date and same-day records are merged before the
    /// moving averages are applied.
    pub fn compute_series(&self, days: &[DailyStress]) -> Vec<DailyTrainingLoad> {
        let mut merged: BTreeMap<NaiveDate, DailyStress> = BTreeMap::new();
        for day in days {
            merged
                .entry(day.date)
                .and_modify(|existing| existing.accumulate(day))
                .or_insert_with(|| day.clone());
        }

        let mut series: Vec<DailyTrainingLoad> = Vec::with_capacity(merged.len());
        for day in merged.values() {
            let load = self.next_load(series.last(), day);
            series.push(load);
        }

        debug!(days = series.len(), "Computed training load series");
        series
    }

    /// Compute the series directly from individual rides
    pub fn compute_series_from_rides(&self, rides: &[RideRecord]) -> Vec<DailyTrainingLoad> {
        let daily: Vec<DailyStress> = self.aggregate_daily(rides).into_values().collect();
        self.compute_series(&daily)
    }

    fn entry_on(series: &[DailyTrainingLoad], date: NaiveDate) -> Option<&DailyTrainingLoad> {
        series
            .binary_search_by_key(&date, |load| load.date)
            .ok()
            .map(|index| &series[index])
    }

    fn determine_trend(&self, delta: f64) -> TrendDirection {
        if delta > self.config.trend_threshold {
            TrendDirection::Up
        } else if delta < -self.config.trend_threshold {
            TrendDirection::Down
        } else {
            TrendDirection::Stable
        }
    }

    /// Sum of TSS over the trailing 7 calendar days ending at `end`
    pub fn weekly_tss(series: &[DailyTrainingLoad], end: NaiveDate) -> Decimal {
        let start = end.checked_sub_days(Days::new(6)).unwrap_or(end);
        series
            .iter()
            .filter(|load| load.date >= start && load.date <= end)
            .map(|load| load.tss)
            .sum()
    }

    /// Summarize the series as of its latest entry
    pub fn summarize(&self, series: &[DailyTrainingLoad]) -> TrainingLoadSummary {
        let Some(current) = series.last() else {
            debug!("Empty training load series, returning zeroed summary");
            return TrainingLoadSummary::empty(&self.config);
        };

        // Exact calendar-day lookup; a missing day reads as "no change"
        let past = current
            .date
            .checked_sub_days(Days::new(u64::from(self.config.ramp_rate_days)))
            .and_then(|date| Self::entry_on(series, date));
        let past_ctl = past.map(|load| load.ctl).unwrap_or(current.ctl);
        let past_atl = past.map(|load| load.atl).unwrap_or(current.atl);

        let ramp_rate = current.ctl - past_ctl;
        let weekly_tss = Self::weekly_tss(series, current.date);
        let tsb = current.tsb();

        let weekly_progress = if self.config.weekly_target_tss > Decimal::ZERO {
            (weekly_tss / self.config.weekly_target_tss * Decimal::from(100))
                .to_f64()
                .unwrap_or(0.0)
        } else {
            0.0
        };

        let summary = TrainingLoadSummary {
            as_of: Some(current.date),
            current_ctl: current.ctl,
            current_atl: current.atl,
            current_tsb: tsb,
            weekly_tss,
            ramp_rate,
            ctl_trend: self.determine_trend(current.ctl - past_ctl),
            atl_trend: self.determine_trend(current.atl - past_atl),
            form_status: FormStatus::from_tsb(tsb),
            weekly_target: self.config.weekly_target_tss,
            weekly_progress,
            readiness: readiness_from_tsb(tsb),
        };

        debug!(
            ctl = summary.current_ctl,
            atl = summary.current_atl,
            tsb = summary.current_tsb,
            form = %summary.form_status,
            "Summarized training load"
        );

        summary
    }

    /// Weekly totals for the trailing `weeks` calendar weeks, oldest first.
    ///
    /// Never reaches back past the week of the first recorded day.
    pub fn weekly_breakdown(&self, series: &[DailyTrainingLoad], weeks: usize) -> Vec<WeeklyLoad> {
        let (Some(first), Some(last)) = (series.first(), series.last()) else {
            return Vec::new();
        };

        let last_week_start = week_start(last.date);
        let span_weeks = (last_week_start - week_start(first.date)).num_weeks() as usize + 1;
        let weeks = weeks.min(span_weeks);
        if weeks == 0 {
            return Vec::new();
        }

        let first_week_start = last_week_start
            .checked_sub_days(Days::new(7 * (weeks as u64 - 1)))
            .unwrap_or(last_week_start);

        let mut breakdown = Vec::with_capacity(weeks);
        let mut week = first_week_start;
        while week <= last_week_start {
            let week_end = week.checked_add_days(Days::new(6)).unwrap_or(week);
            let days: Vec<&DailyTrainingLoad> = series
                .iter()
                .filter(|load| load.date >= week && load.date <= week_end)
                .collect();

            breakdown.push(WeeklyLoad {
                week_start: week,
                total_tss: days.iter().map(|load| load.tss).sum(),
                ride_count: days.iter().map(|load| u32::from(load.ride_count)).sum(),
                duration_seconds: days.iter().map(|load| u64::from(load.duration_seconds)).sum(),
                distance_meters: days.iter().map(|load| load.distance_meters).sum(),
                end_ctl: days.last().map(|load| load.ctl),
            });

            match week.checked_add_days(Days::new(7)) {
                Some(next) => week = next,
                None => break,
            }
        }

        breakdown
    }

    /// Generate training recommendations from a summary
    pub fn recommendations(&self, summary: &TrainingLoadSummary) -> Vec<String> {
        let mut recommendations = vec![summary.form_status.recommendation().to_string()];

        if summary.ramp_rate > 8.0 {
            recommendations
                .push("CTL ramp rate is aggressive - monitor for overreaching".to_string());
        } else if summary.ramp_rate < -5.0 {
            recommendations
                .push("CTL is declining rapidly - consider increasing training load".to_string());
        }

        if summary.weekly_target > Decimal::ZERO && summary.weekly_tss >= summary.weekly_target {
            recommendations.push(format!(
                "Weekly target of {} TSS reached",
                summary.weekly_target.round()
            ));
        }

        recommendations
    }
}

impl Default for TrainingLoadAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
        .unwrap_or(date)
}

/// Append-only day log feeding the analyzer.
///
/// The latest day can be patched until a later day is recorded; earlier days
/// are never rewritten.
pub struct TrainingLoadLog {
    analyzer: TrainingLoadAnalyzer,
    series: Vec<DailyTrainingLoad>,
}

impl TrainingLoadLog {
    pub fn new(analyzer: TrainingLoadAnalyzer) -> Self {
        TrainingLoadLog {
            analyzer,
            series: Vec::new(),
        }
    }

    /// Record stress for a day, patching the latest day or appending a new one
    pub fn record(&mut self, day: DailyStress) -> Result<&DailyTrainingLoad, TrainingLoadError> {
        let load = match self.series.last() {
            Some(last) if day.date < last.date => {
                return Err(TrainingLoadError::OutOfOrder {
                    date: day.date,
                    last: last.date,
                });
            }
            Some(last) if day.date == last.date => {
                let mut merged = DailyStress {
                    date: last.date,
                    tss: last.tss,
                    ride_count: last.ride_count,
                    duration_seconds: last.duration_seconds,
                    distance_meters: last.distance_meters,
                };
                merged.accumulate(&day);
                self.series.pop();

                let load = self.analyzer.next_load(self.series.last(), &merged);
                debug!(date = %load.date, tss = %load.tss, "Patched current day");
                load
            }
            _ => {
                let load = self.analyzer.next_load(self.series.last(), &day);
                debug!(date = %load.date, tss = %load.tss, "Appended new day");
                load
            }
        };

        self.series.push(load);
        Ok(&self.series[self.series.len() - 1])
    }

    pub fn series(&self) -> &[DailyTrainingLoad] {
        &self.series
    }

    pub fn summary(&self) -> TrainingLoadSummary {
        self.analyzer.summarize(&self.series)
    }
}
