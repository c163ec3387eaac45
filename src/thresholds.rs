//! Unit-dependent thresholds
//!
//! Every literal that differs between imperial and metric lives in one of the
//! two tables below so the pairs cannot drift apart.

use crate::models::UnitSystem;

/// Threshold table for one unit system
#[derive(Debug, Clone, PartialEq)]
pub struct UnitThresholds {
    /// Half-width of the optimal temperature band around the ideal temperature
    pub optimal_half_width: f64,

    /// Degrees below the band over which the temperature score falls by 1.0
    pub cold_penalty_span: f64,

    /// Degrees above the band over which the temperature score falls by 1.0
    pub heat_penalty_span: f64,

    /// Upper bound of comfortable wind
    pub wind_comfortable: f64,

    /// Upper bound of moderate wind
    pub wind_moderate: f64,

    /// Upper bound of challenging wind
    pub wind_challenging: f64,

    /// Max wind above which a wind alert is raised
    pub wind_alert: f64,

    /// Min temperature below which a temperature alert is raised
    pub cold_alert: f64,

    /// Max temperature above which a temperature alert is raised
    pub heat_alert: f64,

    pub temperature_symbol: &'static str,
    pub speed_symbol: &'static str,
}

const IMPERIAL: UnitThresholds = UnitThresholds {
    optimal_half_width: 7.5,
    cold_penalty_span: 20.0,
    heat_penalty_span: 25.0,
    wind_comfortable: 10.0,
    wind_moderate: 15.0,
    wind_challenging: 20.0,
    wind_alert: 15.0,
    cold_alert: 50.0,
    heat_alert: 85.0,
    temperature_symbol: "°F",
    speed_symbol: "mph",
};

const METRIC: UnitThresholds = UnitThresholds {
    optimal_half_width: 7.5 * 5.0 / 9.0,
    cold_penalty_span: 11.1,
    heat_penalty_span: 13.9,
    wind_comfortable: 16.0,
    wind_moderate: 24.0,
    wind_challenging: 32.0,
    wind_alert: 24.0,
    cold_alert: 10.0,
    heat_alert: 29.4,
    temperature_symbol: "°C",
    speed_symbol: "km/h",
};

impl UnitThresholds {
    pub fn for_units(units: UnitSystem) -> &'static UnitThresholds {
        match units {
            UnitSystem::Imperial => &IMPERIAL,
            UnitSystem::Metric => &METRIC,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wind_thresholds_are_ordered() {
        for units in [UnitSystem::Imperial, UnitSystem::Metric] {
            let t = UnitThresholds::for_units(units);
            assert!(t.wind_comfortable < t.wind_moderate);
            assert!(t.wind_moderate < t.wind_challenging);
            assert!(t.cold_alert < t.heat_alert);
        }
    }

    #[test]
    fn test_metric_table_tracks_imperial() {
        let imperial = UnitThresholds::for_units(UnitSystem::Imperial);
        let metric = UnitThresholds::for_units(UnitSystem::Metric);

        // Spans scale by 5/9 within rounding
        assert!((imperial.cold_penalty_span * 5.0 / 9.0 - metric.cold_penalty_span).abs() < 0.05);
        assert!((imperial.heat_penalty_span * 5.0 / 9.0 - metric.heat_penalty_span).abs() < 0.05);
        assert!((imperial.optimal_half_width * 5.0 / 9.0 - metric.optimal_half_width).abs() < 1e-9);

        // Alert temperatures convert within rounding
        assert!(((imperial.cold_alert - 32.0) * 5.0 / 9.0 - metric.cold_alert).abs() < 0.1);
        assert!(((imperial.heat_alert - 32.0) * 5.0 / 9.0 - metric.heat_alert).abs() < 0.1);

        // Wind limits convert within a km/h
        assert!((imperial.wind_alert * 1.609344 - metric.wind_alert).abs() < 1.0);
    }

    #[test]
    fn test_symbols() {
        assert_eq!(UnitThresholds::for_units(UnitSystem::Imperial).speed_symbol, "mph");
        assert_eq!(UnitThresholds::for_units(UnitSystem::Metric).temperature_symbol, "°C");
    }
}
