//! File importers for forecast windows and ride history
//!
//! - JSON forecast files: `{ "units": "metric", "hours": [...] }`
//! - CSV ride history with flexible column names

use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;

use crate::error::{ImportError, Result};

pub mod csv;
pub mod json;

pub use self::csv::RideCsvImporter;
pub use self::json::load_forecast_json;

/// Load ride history from a CSV file
pub fn load_rides_csv(path: &Path) -> Result<Vec<crate::models::RideRecord>> {
    RideCsvImporter::new().import_file(path)
}

fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound {
            path: path.to_path_buf(),
        }
        .into());
    }
    Ok(())
}

/// Parse a calendar date, accepting a few common layouts and datetime prefixes
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let formats = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

    for format in &formats {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }

    let datetime_formats = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%SZ"];
    for format in &datetime_formats {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime.date());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 9, 23).unwrap();
        assert_eq!(parse_date("2024-09-23"), Some(expected));
        assert_eq!(parse_date("09/23/2024"), Some(expected));
        assert_eq!(parse_date("23.09.2024"), Some(expected));
        assert_eq!(parse_date("2024-09-23T07:15:00"), Some(expected));
        assert_eq!(parse_date(" 2024-09-23 "), Some(expected));
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_missing_file() {
        let err = ensure_exists(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
