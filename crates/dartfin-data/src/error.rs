//! Error types for filing retrieval.

use crate::provider::Market;
use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while talking to the filing provider.
#[derive(Debug, Error)]
pub enum DataError {
    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(String),

    /// DART answered with a non-success status code
    #[error("DART API error {status}: {message}")]
    DartApi {
        /// Status code returned by DART (e.g. "020" for rate limiting)
        status: String,
        /// Human-readable message returned alongside the status
        message: String,
    },

    /// No company matched the requested name and market
    #[error("Company not found: '{name}' (market {market})")]
    CompanyNotFound {
        /// Queried company name
        name: String,
        /// Queried market segment
        market: Market,
    },

    /// No API key was configured
    #[error("Missing DART API key: set DART_API_KEY or pass the key explicitly")]
    MissingApiKey,

    /// Invalid date range
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date of the range
        start: String,
        /// End date of the range
        end: String,
    },

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// XML parsing error
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// Zip archive error
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
