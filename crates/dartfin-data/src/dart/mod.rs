//! DART OpenAPI data fetching.
//!
//! This module provides access to the Korean electronic disclosure system:
//! - Corp-code lookup by company name and market segment
//! - Periodic report search (annual, half-year, quarterly)
//! - Income statement extraction from the single-company full statements endpoint
//!
//! # Example
//!
//! ```no_run
//! use dartfin_data::dart::{DartConfig, DartProvider};
//! use dartfin_data::{FilingProvider, Market};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = DartProvider::new(DartConfig::new("your-api-key"))?;
//!     let company = provider.find_company("삼성전자", Market::Kospi).await?;
//!     println!("Found {}", company.corp_code());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod corp_code;
pub mod filings;
pub mod statements;

pub use client::DartClient;
pub use config::DartConfig;
pub use corp_code::{CorpCode, CorpCodeList};
pub use filings::{DartCompany, DartProvider, DartReport, FilingEntry, ReportCode};
pub use statements::{AccountRow, FsDivision};
