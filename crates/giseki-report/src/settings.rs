//! Runtime settings for the report binary.
//!
//! All settings come from environment variables. Only the records path is
//! required.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::ReportError;

/// Path to the JSON array of outcome records.
const RECORDS_ENV: &str = "GISEKI_RECORDS";
/// Optional path to the engine YAML configuration.
const CONFIG_ENV: &str = "GISEKI_CONFIG";
/// Optional `YYYY-MM-DD` date used as "today" for the timeline cutoff.
const NOW_ENV: &str = "GISEKI_NOW";

/// Settings loaded from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSettings {
    /// Outcome records file.
    pub records_path: PathBuf,
    /// Engine configuration file, if any.
    pub config_path: Option<PathBuf>,
    /// Timeline cutoff date.
    pub now: NaiveDate,
}

impl ReportSettings {
    /// Load settings from environment variables.
    ///
    /// Required variables:
    /// - `GISEKI_RECORDS` -- path to a JSON array of outcome records
    ///
    /// Optional variables:
    /// - `GISEKI_CONFIG` -- path to the engine YAML configuration
    /// - `GISEKI_NOW` -- timeline cutoff as `YYYY-MM-DD` (default today, UTC)
    pub fn from_env() -> Result<Self, ReportError> {
        let records_path = std::env::var(RECORDS_ENV)
            .map(PathBuf::from)
            .map_err(|_| ReportError::MissingVar(RECORDS_ENV))?;
        let config_path = std::env::var(CONFIG_ENV).ok().map(PathBuf::from);
        let now = match std::env::var(NOW_ENV) {
            Ok(raw) => parse_date(&raw)?,
            Err(_) => chrono::Utc::now().date_naive(),
        };
        Ok(Self {
            records_path,
            config_path,
            now,
        })
    }
}

/// Parse a `YYYY-MM-DD` date.
fn parse_date(raw: &str) -> Result<NaiveDate, ReportError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|source| ReportError::InvalidDate {
        var: NOW_ENV,
        value: raw.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates() {
        assert_eq!(
            parse_date(" 2024-03-31 ").ok(),
            NaiveDate::from_ymd_opt(2024, 3, 31)
        );
    }

    #[test]
    fn rejects_other_formats() {
        assert!(matches!(
            parse_date("31/03/2024"),
            Err(ReportError::InvalidDate { var: NOW_ENV, .. })
        ));
    }
}
