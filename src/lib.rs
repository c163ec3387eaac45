// Library interface for CycleCast modules
// The CLI and integration tests both go through these exports

pub mod comfort;
pub mod config;
pub mod display;
pub mod error;
pub mod forecast;
pub mod format;
pub mod import;
pub mod logging;
pub mod models;
pub mod thresholds;
pub mod training_load;

// Re-export commonly used types for convenience
pub use comfort::{ComfortLevel, ComfortScore, ComfortScorer, ComfortWeights, HourlyComfort};
pub use config::AppConfig;
pub use error::{CycleCastError, ImportError, Result};
pub use forecast::{
    ForecastAggregator, ForecastSummary, Recommendation, RecommendationKind, RideWindow,
};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use models::*;
pub use thresholds::UnitThresholds;
pub use training_load::{
    FormStatus, TrainingLoadAnalyzer, TrainingLoadConfig, TrainingLoadLog, TrainingLoadSummary,
    TrendDirection, WeeklyLoad, WidgetPayload,
};
