//! CLI error types.

use holdwise_analytics::AnalyticsError;
use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// No investor with this slug in the dataset.
    #[error("Unknown investor: {0}. Run `holdwise scoreboard` to list investors.")]
    UnknownInvestor(String),

    /// The investor exists but has never filed.
    #[error("Investor {0} has no filings.")]
    NoSnapshots(String),

    /// Period label could not be parsed.
    #[error("Invalid period: {0}. Use \"Q4 2024\" or \"2024-Q4\".")]
    InvalidPeriod(String),

    /// Dataset could not be read or parsed.
    #[error("Dataset error in {path}: {message}")]
    Dataset {
        /// Dataset path.
        path: String,
        /// What went wrong.
        message: String,
    },

    /// Engine setup failed.
    #[error("Configuration error: {0}")]
    Analytics(#[from] AnalyticsError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
