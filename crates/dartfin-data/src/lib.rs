#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dartfin/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod dart;
pub mod error;
pub mod provider;
pub mod statement;

pub use error::{DataError, Result};
pub use provider::{Company, DetailType, FilingProvider, Market, Report};
pub use statement::{RawCells, RawColumn, RawHeader, RawStatement};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
