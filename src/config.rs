use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::CycleCastError;
use crate::logging::LogConfig;
use crate::models::{Temperature, UnitSystem};
use crate::training_load::TrainingLoadConfig;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration metadata
    pub metadata: ConfigMetadata,

    /// Rider display and comfort preferences
    pub preferences: RiderPreferences,

    /// Training load settings
    pub training: TrainingLoadConfig,

    /// Logging settings
    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Rider preferences supplied to the comfort scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiderPreferences {
    /// Display and threshold units
    pub units: UnitSystem,

    /// Ideal riding temperature in `units`; None uses the 67.5°F default
    pub ideal_temperature: Option<f64>,
}

impl Default for RiderPreferences {
    fn default() -> Self {
        RiderPreferences {
            units: UnitSystem::Imperial,
            ideal_temperature: None,
        }
    }
}

impl RiderPreferences {
    /// Resolved ideal temperature
    pub fn ideal_temperature(&self) -> Temperature {
        match self.ideal_temperature {
            Some(value) => Temperature::from_units(value, self.units),
            None => Temperature::default_ideal(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();

        AppConfig {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            preferences: RiderPreferences::default(),
            training: TrainingLoadConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;
        config.validate()?;

        Ok(config)
    }

    /// Reject settings the analytics cannot work with
    pub fn validate(&self) -> std::result::Result<(), CycleCastError> {
        let training = &self.training;
        if training.ctl_time_constant == 0 || training.atl_time_constant == 0 {
            return Err(CycleCastError::Configuration(
                "training time constants must be at least one day".to_string(),
            ));
        }
        if training.atl_time_constant >= training.ctl_time_constant {
            return Err(CycleCastError::Configuration(format!(
                "atl_time_constant ({}) must be shorter than ctl_time_constant ({})",
                training.atl_time_constant, training.ctl_time_constant
            )));
        }
        if training.trend_threshold < 0.0 || training.weekly_target_tss.is_sign_negative() {
            return Err(CycleCastError::Configuration(
                "trend_threshold and weekly_target_tss must not be negative".to_string(),
            ));
        }
        if let Some(ideal) = self.preferences.ideal_temperature {
            if !ideal.is_finite() {
                return Err(CycleCastError::Configuration(format!(
                    "ideal_temperature is not a number: {}",
                    ideal
                )));
            }
        }
        Ok(())
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cyclecast")
            .join("config.toml")
    }

    /// Load configuration from `path` (or the default location), falling back to defaults
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(err) => {
                warn!(
                    path = %config_path.display(),
                    error = %err,
                    "Config not loaded, using defaults"
                );
                Self::default()
            }
        }
    }
}
