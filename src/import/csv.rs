use csv::ReaderBuilder;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

use super::{ensure_exists, parse_date};
use crate::error::{CycleCastError, ImportError, Result};
use crate::models::RideRecord;

/// Ride history importer with flexible column mapping
///
/// Only `date` is required. Rows with an unreadable date are skipped with a
/// warning; malformed numbers in known columns are errors.
pub struct RideCsvImporter {
    column_mapping: HashMap<String, String>,
}

impl RideCsvImporter {
    pub fn new() -> Self {
        let mut column_mapping = HashMap::new();

        Self::add_mapping(
            &mut column_mapping,
            "date",
            &["date", "day", "start_date", "start_time", "activity_date"],
        );
        Self::add_mapping(
            &mut column_mapping,
            "tss",
            &["tss", "training_stress_score", "stress", "load"],
        );
        Self::add_mapping(
            &mut column_mapping,
            "duration",
            &["duration", "duration_seconds", "moving_time", "elapsed_time", "time"],
        );
        Self::add_mapping(
            &mut column_mapping,
            "distance",
            &["distance", "distance_meters", "distance_m", "dist"],
        );
        Self::add_mapping(&mut column_mapping, "distance_km", &["distance_km", "km"]);

        Self { column_mapping }
    }

    fn add_mapping(mapping: &mut HashMap<String, String>, standard: &str, variations: &[&str]) {
        for variation in variations {
            mapping.insert(variation.to_lowercase(), standard.to_string());
        }
    }

    fn normalize_column_name(&self, name: &str) -> String {
        let normalized = name.trim().to_lowercase().replace([' ', '-'], "_");

        self.column_mapping
            .get(&normalized)
            .cloned()
            .unwrap_or(normalized)
    }

    /// Seconds from either a plain number or `H:MM:SS` / `MM:SS`
    fn parse_duration(value: &str) -> Option<u32> {
        if value.contains(':') {
            let mut seconds: u32 = 0;
            for part in value.split(':') {
                let part: u32 = part.trim().parse().ok()?;
                seconds = seconds.checked_mul(60)?.checked_add(part)?;
            }
            return Some(seconds);
        }

        let seconds = f64::from_str(value).ok()?;
        if seconds.is_finite() && seconds >= 0.0 && seconds <= u32::MAX as f64 {
            Some(seconds.round() as u32)
        } else {
            None
        }
    }

    fn parse_decimal(field: &str, value: &str) -> Result<Decimal> {
        let parsed = Decimal::from_str(value)
            .or_else(|_| Decimal::from_scientific(value))
            .map_err(|_| ImportError::InvalidValue {
                field: field.to_string(),
                value: value.to_string(),
            })?;

        if parsed.is_sign_negative() {
            return Err(ImportError::InvalidValue {
                field: field.to_string(),
                value: value.to_string(),
            }
            .into());
        }
        Ok(parsed)
    }

    /// Parse ride records from any reader producing CSV text
    pub fn import_reader<R: std::io::Read>(&self, reader: R) -> Result<Vec<RideRecord>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| csv_parse_error("header", e))?
            .clone();

        let mut column_indices = HashMap::new();
        for (i, header) in headers.iter().enumerate() {
            let standard = self.normalize_column_name(header);
            column_indices.entry(standard).or_insert(i);
        }
        debug!(columns = ?column_indices.keys().collect::<Vec<_>>(), "Mapped CSV columns");

        let date_index = *column_indices
            .get("date")
            .ok_or_else(|| ImportError::MissingField {
                field: "date".to_string(),
            })?;

        let mut rides = Vec::new();
        let mut skipped = 0usize;

        for (row, record) in reader.records().enumerate() {
            // Header is line 1
            let line = row + 2;
            let record = record.map_err(|e| csv_parse_error(&format!("line {}", line), e))?;
            let field = |name: &str| {
                column_indices
                    .get(name)
                    .and_then(|&i| record.get(i))
                    .filter(|value| !value.is_empty())
            };

            let date = match record.get(date_index).and_then(parse_date) {
                Some(date) => date,
                None => {
                    warn!(line, value = record.get(date_index).unwrap_or(""), "Skipping row with unreadable date");
                    skipped += 1;
                    continue;
                }
            };

            let tss = field("tss")
                .map(|value| Self::parse_decimal("tss", value))
                .transpose()?;

            let duration_seconds = match field("duration") {
                Some(value) => Self::parse_duration(value).ok_or_else(|| {
                    CycleCastError::from(ImportError::InvalidValue {
                        field: "duration".to_string(),
                        value: value.to_string(),
                    })
                })?,
                None => 0,
            };

            let distance_meters = match (field("distance"), field("distance_km")) {
                (Some(value), _) => Self::parse_decimal("distance", value)?,
                (None, Some(value)) => {
                    Self::parse_decimal("distance_km", value)? * Decimal::from(1000)
                }
                (None, None) => Decimal::ZERO,
            };

            rides.push(RideRecord {
                date,
                tss,
                duration_seconds,
                distance_meters,
            });
        }

        if skipped > 0 {
            warn!(skipped, "Some CSV rows were skipped");
        }

        Ok(rides)
    }

    /// Parse ride records from a CSV file
    pub fn import_file(&self, path: &Path) -> Result<Vec<RideRecord>> {
        ensure_exists(path)?;
        let file = std::fs::File::open(path)?;
        let rides = self.import_reader(file)?;

        info!(path = %path.display(), rides = rides.len(), "Imported ride history");
        Ok(rides)
    }
}

impl Default for RideCsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

fn csv_parse_error(location: &str, err: csv::Error) -> CycleCastError {
    ImportError::ParseError {
        format: "csv".to_string(),
        location: location.to_string(),
        reason: err.to_string(),
    }
    .into()
}
