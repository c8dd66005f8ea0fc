//! Error types for the aggregation drivers.

use giseki_ledger::LedgerError;

use crate::config::ConfigError;

/// Errors surfaced by the snapshot and timeline drivers.
///
/// Both drivers sort their input before replay, so an ordering violation
/// never reaches the caller; what remains is ledger arithmetic and bad
/// configuration.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The underlying term ledger rejected an update.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Configuration could not be loaded or is invalid.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A driver was asked to track no scopes at all.
    #[error("at least one scope must be tracked")]
    NoScopes,

    /// `through_year` reaches too far past the data.
    #[error("through_year {through_year} is too far past the last live year {last_live_year}")]
    ThroughYearOutOfRange {
        /// The requested last year.
        through_year: i32,
        /// The last year in which any term is live.
        last_live_year: i32,
    },

    /// The timeline was asked to keep zero series.
    #[error("timeline top_n must be at least 1")]
    ZeroTopN,
}
