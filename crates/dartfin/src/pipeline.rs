//! Year-by-year orchestration: search, select, reconcile, write.

use chrono::{Datelike, NaiveDate};
use dartfin_data::{Company, DataError, DetailType, FilingProvider, Market, Report};
use dartfin_output::{Granularity, OutputError, WorkbookWriter, sheet_name};
use dartfin_reconcile::{
    Quarter, QuarterlyBundle, ReconcileError, StatementKind, reconcile, select,
    select_received_in,
};
use log::info;
use polars::prelude::DataFrame;
use thiserror::Error;

/// Result type for pipeline runs.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Filing provider error
    #[error(transparent)]
    Data(#[from] DataError),

    /// Selection or reconciliation error
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    /// Workbook error
    #[error(transparent)]
    Output(#[from] OutputError),

    /// Malformed request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Parse an 8-digit `YYYYMMDD` date.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PipelineError::InvalidRequest(format!(
            "'{}' is not a YYYYMMDD date",
            raw
        )));
    }
    NaiveDate::parse_from_str(raw, "%Y%m%d")
        .map_err(|e| PipelineError::InvalidRequest(format!("'{}': {}", raw, e)))
}

/// What to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomeStatementRequest {
    /// Company name, matched exactly
    pub corp_name: String,
    /// Market segment the company is listed on
    pub market: Market,
    /// First receipt date searched, inclusive
    pub start: NaiveDate,
    /// Last receipt date searched, inclusive
    pub end: NaiveDate,
    /// Take each year's annual report from the following year's filings
    pub lagged_annual: bool,
}

impl IncomeStatementRequest {
    /// Create a request with annual reports matched by receipt year.
    pub fn new(corp_name: impl Into<String>, market: Market, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            corp_name: corp_name.into(),
            market,
            start,
            end,
            lagged_annual: false,
        }
    }

    /// Set whether annual reports are taken from the following year's filings.
    pub fn with_lagged_annual(mut self, lagged_annual: bool) -> Self {
        self.lagged_annual = lagged_annual;
        self
    }

    /// Check the company name and date range.
    pub fn validate(&self) -> Result<()> {
        if self.corp_name.trim().is_empty() {
            return Err(PipelineError::InvalidRequest(
                "company name is empty".to_string(),
            ));
        }
        if self.start > self.end {
            return Err(PipelineError::InvalidRequest(format!(
                "start {} is after end {}",
                self.start, self.end
            )));
        }
        Ok(())
    }

    /// Calendar years covered, newest first.
    pub fn years(&self) -> Vec<i32> {
        (self.start.year()..=self.end.year()).rev().collect()
    }

    /// Receipt year of the annual report used for `year`.
    pub const fn annual_receipt_year(&self, year: i32) -> i32 {
        if self.lagged_annual { year + 1 } else { year }
    }

    /// Last receipt date searched for annual reports.
    fn annual_search_end(&self) -> NaiveDate {
        if !self.lagged_annual {
            return self.end;
        }
        NaiveDate::from_ymd_opt(self.end.year() + 1, 12, 31).unwrap_or(self.end)
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Name of the company as reported by the provider
    pub company: String,
    /// Years processed, newest first
    pub years: Vec<i32>,
    /// Sheets written, in workbook order
    pub sheets: Vec<String>,
}

/// A table worth a sheet: at least one row and one quarter column.
fn has_quarter_data(table: &DataFrame) -> bool {
    table.height() > 0 && table.width() > 1
}

/// Sheets of one year in workbook order.
fn year_layout<'a>(
    separate: &'a QuarterlyBundle,
    consolidated: &'a QuarterlyBundle,
) -> Vec<(StatementKind, Granularity, &'a DataFrame)> {
    let mut layout = vec![
        (StatementKind::Separate, Granularity::Total, &separate.total),
        (StatementKind::Consolidated, Granularity::Total, &consolidated.total),
    ];
    for (kind, bundle) in [
        (StatementKind::Separate, separate),
        (StatementKind::Consolidated, consolidated),
    ] {
        layout.extend(
            Quarter::ALL
                .iter()
                .map(|q| (kind, Granularity::Quarter(*q), bundle.quarter(*q))),
        );
    }
    layout
}

/// Reports of the three detail types searched once for the whole range.
struct Filings<R> {
    annual: Vec<R>,
    half_year: Vec<R>,
    quarterly: Vec<R>,
}

async fn write_year<R: Report>(
    writer: &mut WorkbookWriter,
    filings: &Filings<R>,
    year: i32,
    annual_receipt_year: i32,
) -> Result<Vec<String>> {
    let annual = select_received_in(&filings.annual, year, annual_receipt_year).await?;
    let half_year = select(&filings.half_year, year).await?;
    let quarterly = select(&filings.quarterly, year).await?;

    let separate = reconcile(
        &annual.separate,
        &half_year.separate,
        &quarterly.separate,
        year,
    )?;
    let consolidated = reconcile(
        &annual.consolidated,
        &half_year.consolidated,
        &quarterly.consolidated,
        year,
    )?;

    let mut written = Vec::new();
    for (kind, granularity, table) in year_layout(&separate, &consolidated) {
        if has_quarter_data(table) {
            written.push(writer.write_table(&sheet_name(kind, granularity, year), table)?);
        }
    }
    Ok(written)
}

/// Build every sheet of `request` into `writer`.
///
/// `on_year` is called before each year is processed. The writer is only added to;
/// saving it is left to the caller so that a failed run produces no file.
///
/// # Errors
/// Returns [`DataError::CompanyNotFound`] (wrapped) if the company does not exist on
/// the requested market, and any provider, table or workbook error that is not
/// confined to a single report.
pub async fn build_workbook<P, F>(
    provider: &P,
    request: &IncomeStatementRequest,
    writer: &mut WorkbookWriter,
    mut on_year: F,
) -> Result<RunSummary>
where
    P: FilingProvider,
    F: FnMut(i32),
{
    request.validate()?;

    let company = provider
        .find_company(&request.corp_name, request.market)
        .await?;
    info!("Found {} on market {}", company.name(), request.market);

    let filings = Filings {
        annual: company
            .search_filings(request.start, request.annual_search_end(), DetailType::Annual)
            .await?,
        half_year: company
            .search_filings(request.start, request.end, DetailType::HalfYear)
            .await?,
        quarterly: company
            .search_filings(request.start, request.end, DetailType::Quarterly)
            .await?,
    };
    info!(
        "{} annual, {} half-year and {} quarterly filings between {} and {}",
        filings.annual.len(),
        filings.half_year.len(),
        filings.quarterly.len(),
        request.start,
        request.end
    );

    let years = request.years();
    let mut sheets = Vec::new();
    for &year in &years {
        on_year(year);
        let written = write_year(writer, &filings, year, request.annual_receipt_year(year)).await?;
        if written.is_empty() {
            info!("No income statement data for {}", year);
        } else {
            info!("{}: {} sheets", year, written.len());
        }
        sheets.extend(written);
    }

    Ok(RunSummary {
        company: company.name().to_string(),
        years,
        sheets,
    })
}
