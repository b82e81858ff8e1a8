//! Error types for selection and reconciliation.

use dartfin_data::DataError;
use thiserror::Error;

/// Result type for reconciliation operations.
pub type Result<T> = std::result::Result<T, ReconcileError>;

/// Errors that can occur while building line-item tables.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Provider error while loading a report
    #[error("Provider error: {0}")]
    Provider(#[from] DataError),

    /// Malformed period or value column key
    #[error("Invalid column key: {0}")]
    InvalidColumn(String),

    /// Report statement without a recognised label column
    #[error("Report {receipt_no} has no recognised label column")]
    MissingLabelColumn {
        /// Receipt number of the offending report
        receipt_no: String,
    },

    /// Cells of the wrong kind for their header
    #[error("Unexpected cells in column {0}")]
    UnexpectedCells(String),
}
