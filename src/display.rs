//! Terminal rendering for forecast and training-load reports

use colored::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tabled::{settings::Style, Table, Tabled};

use crate::comfort::HourlyComfort;
use crate::forecast::{ForecastSummary, Priority};
use crate::format::{
    format_aqi, format_hour, format_precipitation, format_temperature, format_uv, format_wind,
};
use crate::models::UnitSystem;
use crate::training_load::{TrainingLoadSummary, WeeklyLoad};

const METERS_PER_MILE: f64 = 1609.344;

#[derive(Tabled)]
struct HourRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Temp")]
    temperature: String,
    #[tabled(rename = "Feels")]
    feels_like: String,
    #[tabled(rename = "Wind")]
    wind: String,
    #[tabled(rename = "Rain")]
    rain: String,
    #[tabled(rename = "UV")]
    uv: String,
    #[tabled(rename = "AQI")]
    aqi: String,
    #[tabled(rename = "Comfort")]
    comfort: String,
}

#[derive(Tabled)]
struct WeekRow {
    #[tabled(rename = "Week of")]
    week: String,
    #[tabled(rename = "TSS")]
    tss: String,
    #[tabled(rename = "Rides")]
    rides: u32,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Distance")]
    distance: String,
    #[tabled(rename = "CTL")]
    ctl: String,
}

/// Apply one of the palette names used by comfort levels and form statuses
pub fn paint(text: &str, color: &str) -> ColoredString {
    match color {
        "green" => text.green(),
        "blue" => text.blue(),
        "orange" => text.yellow(),
        "red" => text.red(),
        "mint" => text.bright_green(),
        "gray" => text.bright_black(),
        _ => text.normal(),
    }
}

/// Hour-by-hour forecast table
pub fn forecast_table(hours: &[HourlyComfort], units: UnitSystem) -> String {
    let rows: Vec<HourRow> = hours
        .iter()
        .map(|hour| {
            let sample = &hour.sample;
            HourRow {
                time: format_hour(sample.timestamp),
                temperature: format_temperature(sample.temperature, units),
                feels_like: format_temperature(sample.feels_like, units),
                wind: format_wind(sample.wind_speed, sample.wind_direction, units),
                rain: format_precipitation(sample.precipitation_probability),
                uv: format_uv(sample.uv_index),
                aqi: format_aqi(sample.air_quality_index),
                comfort: format!("{}% {}", hour.score.percent(), hour.score.level),
            }
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Headline and recommendations for a forecast summary
pub fn forecast_report(summary: &ForecastSummary) -> String {
    let mut lines = Vec::new();

    if summary.hour_count == 0 {
        lines.push("No forecast hours to summarize".dimmed().to_string());
        return lines.join("\n");
    }

    let percent = (summary.average_comfort * 100.0).round();
    lines.push(format!(
        "{} {}% over {} hours",
        "Average comfort:".bold(),
        percent,
        summary.hour_count
    ));

    if let Some(best) = &summary.best_hour {
        let level = best.score.level;
        lines.push(format!(
            "{} {} ({}% {}) {}",
            "Best hour:".bold(),
            format_hour(best.timestamp()),
            best.score.percent(),
            paint(level.label(), level.color()),
            level.description().dimmed()
        ));
    }

    let dist = &summary.distribution;
    lines.push(format!(
        "{} {} excellent, {} good, {} fair, {} poor",
        "Hours:".bold(),
        dist.excellent,
        dist.good,
        dist.fair,
        dist.poor
    ));

    for window in &summary.ride_windows {
        lines.push(format!(
            "{} {} - {} ({} h, {:.0}%)",
            "Ride window:".bold(),
            format_hour(window.start),
            format_hour(window.end),
            window.hours,
            window.average_comfort * 100.0
        ));
    }

    if !summary.recommendations.is_empty() {
        lines.push(String::new());
        for rec in &summary.recommendations {
            let marker = match rec.priority {
                Priority::High => "!".red().bold(),
                Priority::Medium => "•".yellow(),
            };
            lines.push(format!("{} {}: {}", marker, rec.title.bold(), rec.message));
        }
    }

    lines.join("\n")
}

fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 3600, (seconds % 3600) / 60)
}

fn format_distance(meters: Decimal, units: UnitSystem) -> String {
    let meters = meters.to_f64().unwrap_or(0.0);
    match units {
        UnitSystem::Imperial => format!("{:.1} mi", meters / METERS_PER_MILE),
        UnitSystem::Metric => format!("{:.1} km", meters / 1000.0),
    }
}

/// Weekly totals table, oldest week first
pub fn weekly_table(weeks: &[WeeklyLoad], units: UnitSystem) -> String {
    let rows: Vec<WeekRow> = weeks
        .iter()
        .map(|week| WeekRow {
            week: week.week_start.format("%Y-%m-%d").to_string(),
            tss: week.total_tss.round().to_string(),
            rides: week.ride_count,
            time: format_duration(week.duration_seconds),
            distance: format_distance(week.distance_meters, units),
            ctl: week
                .end_ctl
                .map(|ctl| format!("{:.1}", ctl))
                .unwrap_or_else(|| "--".to_string()),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Fitness, fatigue and form headline block
pub fn training_report(summary: &TrainingLoadSummary, recommendations: &[String]) -> String {
    let mut lines = Vec::new();

    match summary.as_of {
        Some(date) => lines.push(format!("{} {}", "As of:".bold(), date)),
        None => lines.push("No rides recorded yet".dimmed().to_string()),
    }

    lines.push(format!(
        "{} {:.1} {}   {} {:.1} {}   {} {:+.1}",
        "CTL".bold(),
        summary.current_ctl,
        summary.ctl_trend.arrow(),
        "ATL".bold(),
        summary.current_atl,
        summary.atl_trend.arrow(),
        "TSB".bold(),
        summary.current_tsb
    ));

    let status = summary.form_status;
    lines.push(format!(
        "{} {} (readiness {}%)",
        "Form:".bold(),
        paint(status.label(), status.color()),
        summary.readiness
    ));
    lines.push(format!(
        "{} {} / {} TSS ({:.0}%)",
        "This week:".bold(),
        summary.weekly_tss.round(),
        summary.weekly_target.round(),
        summary.weekly_progress
    ));
    lines.push(format!("{} {:+.1} CTL", "Ramp rate:".bold(), summary.ramp_rate));

    if !recommendations.is_empty() {
        lines.push(String::new());
        for rec in recommendations {
            lines.push(format!("{} {}", "•".cyan(), rec));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comfort::ComfortScorer;
    use crate::forecast::ForecastAggregator;
    use crate::models::{HourlySample, Speed, Temperature};
    use crate::training_load::TrainingLoadAnalyzer;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn sample(hour: u32) -> HourlySample {
        HourlySample {
            timestamp: Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap(),
            temperature: Temperature::from_fahrenheit(68.0),
            feels_like: Temperature::from_fahrenheit(66.0),
            wind_speed: Speed::from_mph(8.0),
            wind_direction: 315,
            precipitation_probability: 0.3,
            uv_index: None,
            air_quality_index: Some(42),
        }
    }

    #[test]
    fn test_forecast_table_columns() {
        colored::control::set_override(false);
        let scored = ComfortScorer::new(UnitSystem::Imperial).score_all(&[sample(9)]);
        let table = forecast_table(&scored, UnitSystem::Imperial);

        assert!(table.contains("Comfort"));
        assert!(table.contains("68°F"));
        assert!(table.contains("8 mph NW"));
        assert!(table.contains("30%"));
        assert!(table.contains("9 AM"));
    }

    #[test]
    fn test_empty_forecast_report() {
        colored::control::set_override(false);
        let summary = ForecastAggregator::new(ComfortScorer::new(UnitSystem::Metric))
            .summarize_samples(&[]);
        assert_eq!(forecast_report(&summary), "No forecast hours to summarize");
    }

    #[test]
    fn test_forecast_report_lists_best_hour() {
        colored::control::set_override(false);
        let summary = ForecastAggregator::new(ComfortScorer::new(UnitSystem::Imperial))
            .summarize_samples(&[sample(9), sample(10)]);
        let report = forecast_report(&summary);

        assert!(report.contains("Best hour: 9 AM"));
        assert!(report.contains("over 2 hours"));
    }

    #[test]
    fn test_weekly_table_units() {
        let weeks = vec![WeeklyLoad {
            week_start: NaiveDate::from_ymd_opt(2024, 9, 2).unwrap(),
            total_tss: dec!(312.6),
            ride_count: 4,
            duration_seconds: 5 * 3600 + 30 * 60,
            distance_meters: dec!(160934.4),
            end_ctl: Some(48.25),
        }];

        let imperial = weekly_table(&weeks, UnitSystem::Imperial);
        assert!(imperial.contains("100.0 mi"));
        assert!(imperial.contains("5:30"));
        assert!(imperial.contains("313"));

        let metric = weekly_table(&weeks, UnitSystem::Metric);
        assert!(metric.contains("160.9 km"));
    }

    #[test]
    fn test_training_report_empty_series() {
        colored::control::set_override(false);
        let analyzer = TrainingLoadAnalyzer::new();
        let summary = analyzer.summarize(&[]);
        let report = training_report(&summary, &[]);

        assert!(report.contains("No rides recorded yet"));
        assert!(report.contains("Neutral"));
        assert!(report.contains("readiness 50%"));
    }
}
