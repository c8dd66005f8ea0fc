//! Error types for the report binary.

/// Errors raised while gathering the report inputs.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// A required environment variable is not set.
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),

    /// An environment variable holds an unparsable date.
    #[error("{var}={value:?} is not a YYYY-MM-DD date: {source}")]
    InvalidDate {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
        /// Parse failure.
        source: chrono::ParseError,
    },
}
