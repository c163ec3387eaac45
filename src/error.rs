//! Unified error hierarchy for CycleCast
//!
//! The analytics core is total and never fails; these errors cover the edges
//! around it: reading input files, loading configuration and the append-only
//! training log.

use std::path::PathBuf;
use thiserror::Error;

pub use crate::training_load::TrainingLoadError;

/// Top-level error type for all CycleCast operations
#[derive(Debug, Error)]
pub enum CycleCastError {
    /// Input file import errors
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Training log errors
    #[error("Training load error: {0}")]
    TrainingLoad(#[from] TrainingLoadError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Data validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Errors raised while reading forecast or ride files
#[derive(Debug, Error)]
pub enum ImportError {
    /// File not found at specified path
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Format-specific parsing error
    #[error("Parse error in {format} at {location}: {reason}")]
    ParseError {
        format: String,
        location: String,
        reason: String,
    },

    /// Missing required column or field
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Value outside its documented domain
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

/// Result type alias for CycleCast operations
pub type Result<T> = std::result::Result<T, CycleCastError>;

impl CycleCastError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CycleCastError::Import(ImportError::FileNotFound { .. }) => ErrorSeverity::Warning,
            CycleCastError::Import(ImportError::InvalidValue { .. }) => ErrorSeverity::Warning,
            CycleCastError::Validation(_) => ErrorSeverity::Warning,
            CycleCastError::TrainingLoad(_) => ErrorSeverity::Warning,
            CycleCastError::Configuration(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            CycleCastError::Import(ImportError::FileNotFound { path }) => {
                format!("Could not find input file: {}", path.display())
            }
            CycleCastError::Import(ImportError::MissingField { field }) => {
                format!("Input file is missing the '{}' column", field)
            }
            CycleCastError::TrainingLoad(TrainingLoadError::OutOfOrder { date, last }) => {
                format!(
                    "Rides for {} can no longer be recorded; the log already covers {}",
                    date, last
                )
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical error requiring immediate attention
    Critical,
    /// Error that prevents the operation
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}
