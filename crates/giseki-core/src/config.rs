//! Configuration loading and typed config structures for the engine.
//!
//! Configuration is a single YAML document. Every section is optional and
//! every field has a default, so an empty document is a valid configuration.
//!
//! ```yaml
//! terms:
//!   nominal_years: 4
//! snapshot:
//!   scopes: [combined, prefectural, municipal]
//!   year_order: descending
//! timeline:
//!   top_n: 8
//!   scope: combined
//! normalize:
//!   start: 2003-01-01
//! gazetteer:
//!   - code: "13"
//!     name: 東京都
//!     aliases: [Tokyo]
//! logging:
//!   level: info
//!   format: text
//! ```

use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use giseki_types::{Scope, YearOrder};

use crate::normalize::NormalizeOptions;
use crate::resolver::{GazetteerEntry, GazetteerResolver};
use crate::snapshot::{DEFAULT_TERM_YEARS, SnapshotOptions};
use crate::timeline::{DEFAULT_TOP_N, TimelineOptions};

/// Environment variable that overrides `terms.nominal_years`.
pub const TERM_YEARS_ENV: &str = "GISEKI_TERM_YEARS";

/// Accepted range for `snapshot.through_year`.
pub const THROUGH_YEAR_RANGE: RangeInclusive<i32> = 1868..=2200;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but holds an unusable value.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Term length settings.
    #[serde(default)]
    pub terms: TermsConfig,

    /// Snapshot engine settings.
    #[serde(default)]
    pub snapshot: SnapshotConfig,

    /// Timeline settings.
    #[serde(default)]
    pub timeline: TimelineConfig,

    /// Record filtering settings.
    #[serde(default)]
    pub normalize: NormalizeConfig,

    /// Region table for the gazetteer resolver.
    #[serde(default)]
    pub gazetteer: Vec<GazetteerEntry>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `GISEKI_TERM_YEARS` overrides `terms.nominal_years` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value fails validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, apply environment overrides,
    /// and validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value fails validation.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Self::parse_with_env(yaml, |name| std::env::var(name).ok())
    }

    /// Like [`EngineConfig::parse`], reading overrides through `lookup`
    /// instead of the process environment.
    ///
    /// # Errors
    ///
    /// Same as [`EngineConfig::parse`].
    pub fn parse_with_env<F>(yaml: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.terms.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.terms.nominal_years == 0 {
            return Err(ConfigError::Invalid(
                "terms.nominal_years must be at least 1".to_owned(),
            ));
        }
        if self.timeline.top_n == 0 {
            return Err(ConfigError::Invalid(
                "timeline.top_n must be at least 1".to_owned(),
            ));
        }
        if self.snapshot.scopes.is_empty() {
            return Err(ConfigError::Invalid(
                "snapshot.scopes must name at least one scope".to_owned(),
            ));
        }
        if let Some(year) = self
            .snapshot
            .through_year
            .filter(|year| !THROUGH_YEAR_RANGE.contains(year))
        {
            return Err(ConfigError::Invalid(format!(
                "snapshot.through_year ({year}) must be within {}..={}",
                THROUGH_YEAR_RANGE.start(),
                THROUGH_YEAR_RANGE.end()
            )));
        }
        if let Some((start, end)) = self
            .normalize
            .start
            .zip(self.normalize.end)
            .filter(|(start, end)| start > end)
        {
            return Err(ConfigError::Invalid(format!(
                "normalize.start ({start}) is after normalize.end ({end})"
            )));
        }
        Ok(())
    }

    /// Normaliser options from the `normalize` section.
    pub const fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            start: self.normalize.start,
            end: self.normalize.end,
        }
    }

    /// Snapshot engine options from the `terms` and `snapshot` sections.
    pub fn snapshot_options(&self) -> SnapshotOptions {
        SnapshotOptions {
            nominal_years: self.terms.nominal_years,
            scopes: self.snapshot.scopes.clone(),
            year_order: self.snapshot.year_order,
            through_year: self.snapshot.through_year,
        }
    }

    /// Timeline options from the `terms` and `timeline` sections.
    pub const fn timeline_options(&self, now: NaiveDate) -> TimelineOptions {
        TimelineOptions {
            nominal_years: self.terms.nominal_years,
            scope: self.timeline.scope,
            top_n: self.timeline.top_n,
            now,
        }
    }

    /// Region resolver built from the `gazetteer` section.
    pub fn resolver(&self) -> GazetteerResolver {
        GazetteerResolver::new(&self.gazetteer)
    }
}

/// Term length configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TermsConfig {
    /// Nominal term length in years.
    #[serde(default = "default_nominal_years")]
    pub nominal_years: u32,
}

impl Default for TermsConfig {
    fn default() -> Self {
        Self {
            nominal_years: default_nominal_years(),
        }
    }
}

impl TermsConfig {
    /// Override `nominal_years` from `GISEKI_TERM_YEARS` if set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the variable is set but is not a
    /// whole number.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup(TERM_YEARS_ENV) {
            self.nominal_years = val
                .trim()
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("invalid {TERM_YEARS_ENV}: {e}")))?;
        }
        Ok(())
    }
}

/// Snapshot engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SnapshotConfig {
    /// Scopes that get their own ledger.
    #[serde(default = "default_scopes")]
    pub scopes: BTreeSet<Scope>,

    /// Order of the reported years.
    #[serde(default)]
    pub year_order: YearOrder,

    /// Last year to snapshot, if it should differ from the last live year.
    #[serde(default)]
    pub through_year: Option<i32>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            scopes: default_scopes(),
            year_order: YearOrder::default(),
            through_year: None,
        }
    }
}

/// Timeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimelineConfig {
    /// Number of chart series.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Events to include.
    #[serde(default = "default_timeline_scope")]
    pub scope: Scope,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            scope: default_timeline_scope(),
        }
    }
}

/// Record filtering configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NormalizeConfig {
    /// Earliest election date kept (inclusive).
    #[serde(default)]
    pub start: Option<NaiveDate>,

    /// Latest election date kept (inclusive).
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_nominal_years() -> u32 {
    DEFAULT_TERM_YEARS
}

fn default_scopes() -> BTreeSet<Scope> {
    Scope::ALL.into_iter().collect()
}

const fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

const fn default_timeline_scope() -> Scope {
    Scope::Combined
}

fn default_log_level() -> String {
    "info".to_owned()
}
