//! Filing provider seam.
//!
//! The reconciliation pipeline only talks to these traits. [`crate::dart`] is the
//! production implementation; tests plug in in-memory fakes.

use crate::error::{DataError, Result};
use crate::statement::RawStatement;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Market segment a company is listed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Market {
    /// KOSPI (`Y`)
    Kospi,
    /// KOSDAQ (`K`)
    Kosdaq,
    /// KONEX (`N`)
    Konex,
    /// Everything else, including unlisted companies (`E`)
    Other,
}

impl Market {
    /// Single-letter code used by DART (`corp_cls`).
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Kospi => "Y",
            Self::Kosdaq => "K",
            Self::Konex => "N",
            Self::Other => "E",
        }
    }

    /// Parse a DART market code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "Y" => Some(Self::Kospi),
            "K" => Some(Self::Kosdaq),
            "N" => Some(Self::Konex),
            "E" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Market {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_code(s).ok_or_else(|| {
            DataError::Parse(format!(
                "Unknown market code '{}': expected one of Y, K, N, E",
                s
            ))
        })
    }
}

/// Disclosure detail type of a periodic report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailType {
    /// Annual business report (`A001`, 사업보고서)
    Annual,
    /// Half-year report (`A002`, 반기보고서)
    HalfYear,
    /// Quarterly report, Q1 and 9-month cumulative (`A003`, 분기보고서)
    Quarterly,
}

impl DetailType {
    /// All detail types in the order the pipeline consumes them.
    pub const ALL: [Self; 3] = [Self::Annual, Self::HalfYear, Self::Quarterly];

    /// DART `pblntf_detail_ty` code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Annual => "A001",
            Self::HalfYear => "A002",
            Self::Quarterly => "A003",
        }
    }

    /// Korean report title.
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Annual => "사업보고서",
            Self::HalfYear => "반기보고서",
            Self::Quarterly => "분기보고서",
        }
    }
}

impl fmt::Display for DetailType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Source of companies.
#[async_trait]
pub trait FilingProvider: Send + Sync {
    /// Company handle produced by this provider.
    type Company: Company;

    /// Find the company whose name matches `name` exactly on `market`.
    ///
    /// # Errors
    /// Returns [`DataError::CompanyNotFound`] when nothing matches.
    async fn find_company(&self, name: &str, market: Market) -> Result<Self::Company>;
}

/// A company whose filings can be searched.
#[async_trait]
pub trait Company: Send + Sync {
    /// Report handle produced by this company.
    type Report: Report;

    /// Display name of the company.
    fn name(&self) -> &str;

    /// List filings of one detail type received in `[start, end]`.
    ///
    /// The order is the provider's order and is significant: amendment
    /// supersession keeps the first report of each adjacent run.
    async fn search_filings(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        detail_type: DetailType,
    ) -> Result<Vec<Self::Report>>;
}

/// A single filed report. Financial data is fetched lazily.
#[async_trait]
pub trait Report: Send + Sync {
    /// Receipt number identifying the filing.
    fn receipt_no(&self) -> &str;

    /// Date the filing was received.
    fn receipt_date(&self) -> NaiveDate;

    /// Report name, e.g. `[기재정정]분기보고서 (2023.09)`.
    fn name(&self) -> &str;

    /// Detail type the report was searched under.
    fn detail_type(&self) -> DetailType;

    /// Whether the report carries consolidated financial statements.
    async fn has_consolidated_statement(&self) -> Result<bool>;

    /// Extract the income statement, `None` when the report has none.
    async fn extract_income_statement(&self) -> Result<Option<RawStatement>>;
}
