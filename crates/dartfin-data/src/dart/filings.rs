//! Periodic report search and the DART implementation of the provider traits.

use super::client::{DartClient, DartResponse};
use super::config::DartConfig;
use super::statements::{AccountRow, FsDivision, build_income_statement};
use crate::error::{DataError, Result};
use crate::provider::{Company, DetailType, FilingProvider, Market, Report};
use crate::statement::RawStatement;
use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// One row of `list.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct FilingEntry {
    /// Market segment code
    #[serde(default)]
    pub corp_cls: String,
    /// Company name
    #[serde(default)]
    pub corp_name: String,
    /// Corp code
    pub corp_code: String,
    /// Report name, e.g. `[기재정정]사업보고서 (2023.12)`
    pub report_nm: String,
    /// Receipt number
    pub rcept_no: String,
    /// Filer name
    #[serde(default)]
    pub flr_nm: String,
    /// Receipt date (`YYYYMMDD`)
    pub rcept_dt: String,
    /// Remarks
    #[serde(default)]
    pub rm: String,
}

/// `list.json` response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FilingListResponse {
    pub(crate) status: String,
    #[serde(default)]
    pub(crate) message: String,
    #[serde(default)]
    pub(crate) total_page: u32,
    #[serde(default)]
    pub(crate) list: Vec<FilingEntry>,
}

impl DartResponse for FilingListResponse {
    fn status(&self) -> &str {
        &self.status
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// `company.json` response (subset).
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyOverview {
    status: String,
    #[serde(default)]
    message: String,
    /// Corp code
    #[serde(default)]
    pub corp_code: String,
    /// Company name
    #[serde(default)]
    pub corp_name: String,
    /// Market segment code (`Y`, `K`, `N`, `E`)
    #[serde(default)]
    pub corp_cls: String,
    /// Stock code
    #[serde(default)]
    pub stock_code: String,
}

impl DartResponse for CompanyOverview {
    fn status(&self) -> &str {
        &self.status
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Report code (`reprt_code`) of the statements endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportCode {
    /// 사업보고서
    Annual,
    /// 반기보고서
    HalfYear,
    /// 1분기보고서
    FirstQuarter,
    /// 3분기보고서
    ThirdQuarter,
}

impl ReportCode {
    /// DART code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Annual => "11011",
            Self::HalfYear => "11012",
            Self::FirstQuarter => "11013",
            Self::ThirdQuarter => "11014",
        }
    }

    /// Resolve from detail type and the closing month in the report name.
    ///
    /// Quarterly reports closing in the first half of the year are first-quarter
    /// reports, the rest third-quarter reports.
    pub const fn resolve(detail_type: DetailType, closing_month: u32) -> Self {
        match detail_type {
            DetailType::Annual => Self::Annual,
            DetailType::HalfYear => Self::HalfYear,
            DetailType::Quarterly if closing_month <= 6 => Self::FirstQuarter,
            DetailType::Quarterly => Self::ThirdQuarter,
        }
    }
}

/// Parse the `(YYYY.MM)` period at the end of a report name.
pub fn report_period(report_name: &str) -> Option<(i32, u32)> {
    let name = report_name.trim_end();
    let open = name.rfind('(')?;
    let inner = name[open + 1..].strip_suffix(')')?;
    let (year, month) = inner.split_once('.')?;
    let year: i32 = year.trim().parse().ok()?;
    let month: u32 = month.trim().parse().ok()?;
    (1..=12).contains(&month).then_some((year, month))
}

/// DART-backed [`FilingProvider`].
#[derive(Debug, Clone)]
pub struct DartProvider {
    client: Arc<DartClient>,
}

impl DartProvider {
    /// Build a provider from configuration.
    pub fn new(config: DartConfig) -> Result<Self> {
        Ok(Self::with_client(Arc::new(DartClient::new(config)?)))
    }

    /// Build a provider around an existing client.
    pub const fn with_client(client: Arc<DartClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FilingProvider for DartProvider {
    type Company = DartCompany;

    async fn find_company(&self, name: &str, market: Market) -> Result<DartCompany> {
        let registry = self.client.corp_codes().await?;
        debug!("Corp-code registry holds {} entries", registry.len());

        for candidate in registry.find_exact(name) {
            let overview = self.client.company_overview(&candidate.corp_code).await?;
            if overview.corp_cls == market.code() {
                info!(
                    "Resolved '{}' ({}) to corp code {}",
                    name, market, candidate.corp_code
                );
                return Ok(DartCompany {
                    client: Arc::clone(&self.client),
                    corp_code: candidate.corp_code.clone(),
                    name: candidate.corp_name.clone(),
                });
            }
        }

        Err(DataError::CompanyNotFound {
            name: name.to_string(),
            market,
        })
    }
}

/// A company resolved against the corp-code registry.
#[derive(Debug, Clone)]
pub struct DartCompany {
    client: Arc<DartClient>,
    corp_code: String,
    name: String,
}

impl DartCompany {
    /// 8-digit corp code.
    pub fn corp_code(&self) -> &str {
        &self.corp_code
    }
}

#[async_trait]
impl Company for DartCompany {
    type Report = DartReport;

    fn name(&self) -> &str {
        &self.name
    }

    async fn search_filings(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        detail_type: DetailType,
    ) -> Result<Vec<DartReport>> {
        let entries = self
            .client
            .list_filings(&self.corp_code, start, end, detail_type)
            .await?;

        entries
            .into_iter()
            .map(|entry| DartReport::from_entry(Arc::clone(&self.client), entry, detail_type))
            .collect()
    }
}

/// A periodic report found through `list.json`.
#[derive(Debug, Clone)]
pub struct DartReport {
    client: Arc<DartClient>,
    corp_code: String,
    receipt_no: String,
    receipt_date: NaiveDate,
    name: String,
    detail_type: DetailType,
    consolidated: Arc<OnceCell<Vec<AccountRow>>>,
}

impl DartReport {
    fn from_entry(
        client: Arc<DartClient>,
        entry: FilingEntry,
        detail_type: DetailType,
    ) -> Result<Self> {
        let receipt_date = NaiveDate::parse_from_str(&entry.rcept_dt, "%Y%m%d").map_err(|e| {
            DataError::Parse(format!(
                "Invalid receipt date '{}' for {}: {}",
                entry.rcept_dt, entry.rcept_no, e
            ))
        })?;

        Ok(Self {
            client,
            corp_code: entry.corp_code,
            receipt_no: entry.rcept_no,
            receipt_date,
            name: entry.report_nm.trim().to_string(),
            detail_type,
            consolidated: Arc::new(OnceCell::new()),
        })
    }

    /// Business year and report code of the statements endpoint.
    fn statement_key(&self) -> Result<(i32, ReportCode)> {
        let (year, month) = report_period(&self.name).ok_or_else(|| {
            DataError::Parse(format!(
                "Report name '{}' ({}) has no (YYYY.MM) period",
                self.name, self.receipt_no
            ))
        })?;
        Ok((year, ReportCode::resolve(self.detail_type, month)))
    }

    /// Consolidated statement rows, fetched once per report.
    async fn consolidated_rows(&self, year: i32, code: ReportCode) -> Result<&[AccountRow]> {
        let rows = self
            .consolidated
            .get_or_try_init(|| {
                self.client.single_company_accounts(
                    &self.corp_code,
                    year,
                    code.code(),
                    FsDivision::Consolidated,
                )
            })
            .await?;
        Ok(rows.as_slice())
    }
}

#[async_trait]
impl Report for DartReport {
    fn receipt_no(&self) -> &str {
        &self.receipt_no
    }

    fn receipt_date(&self) -> NaiveDate {
        self.receipt_date
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn detail_type(&self) -> DetailType {
        self.detail_type
    }

    async fn has_consolidated_statement(&self) -> Result<bool> {
        let (year, code) = self.statement_key()?;
        Ok(!self.consolidated_rows(year, code).await?.is_empty())
    }

    async fn extract_income_statement(&self) -> Result<Option<RawStatement>> {
        let (year, code) = self.statement_key()?;
        let consolidated = self.consolidated_rows(year, code).await?;
        let separate = self
            .client
            .single_company_accounts(&self.corp_code, year, code.code(), FsDivision::Separate)
            .await?;

        let statement = build_income_statement(consolidated, &separate, code, year)?;
        Ok((!statement.is_empty()).then_some(statement))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("사업보고서 (2023.12)", Some((2023, 12)))]
    #[case("[기재정정]분기보고서 (2023.09)", Some((2023, 9)))]
    #[case("반기보고서 (2022.06)  ", Some((2022, 6)))]
    #[case("분기보고서", None)]
    #[case("분기보고서 (2023.13)", None)]
    fn test_report_period(#[case] name: &str, #[case] expected: Option<(i32, u32)>) {
        assert_eq!(report_period(name), expected);
    }

    #[rstest]
    #[case(DetailType::Annual, 12, "11011")]
    #[case(DetailType::HalfYear, 6, "11012")]
    #[case(DetailType::Quarterly, 3, "11013")]
    #[case(DetailType::Quarterly, 9, "11014")]
    fn test_report_code_resolve(
        #[case] detail_type: DetailType,
        #[case] month: u32,
        #[case] expected: &str,
    ) {
        assert_eq!(ReportCode::resolve(detail_type, month).code(), expected);
    }

    #[test]
    fn test_filing_list_response() {
        let json = r#"{
            "status": "000",
            "message": "정상",
            "page_no": 1,
            "page_count": 100,
            "total_count": 2,
            "total_page": 1,
            "list": [
                {"corp_code": "00126380", "corp_name": "삼성전자", "stock_code": "005930",
                 "corp_cls": "Y", "report_nm": "[기재정정]분기보고서 (2023.09)",
                 "rcept_no": "20231214000123", "flr_nm": "삼성전자", "rcept_dt": "20231214", "rm": ""},
                {"corp_code": "00126380", "corp_name": "삼성전자", "stock_code": "005930",
                 "corp_cls": "Y", "report_nm": "분기보고서 (2023.09)",
                 "rcept_no": "20231114002109", "flr_nm": "삼성전자", "rcept_dt": "20231114", "rm": ""}
            ]
        }"#;

        let response: FilingListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, "000");
        assert_eq!(response.total_page, 1);
        assert_eq!(response.list.len(), 2);
        assert_eq!(response.list[0].report_nm, "[기재정정]분기보고서 (2023.09)");
    }

    #[test]
    fn test_filing_list_no_data() {
        let json = r#"{"status": "013", "message": "조회된 데이타가 없습니다."}"#;
        let response: FilingListResponse = serde_json::from_str(json).unwrap();
        assert!(response.list.is_empty());
    }

    #[test]
    fn test_report_from_entry() {
        let client = Arc::new(DartClient::new(DartConfig::new("key")).unwrap());
        let entry = FilingEntry {
            corp_cls: "Y".into(),
            corp_name: "삼성전자".into(),
            corp_code: "00126380".into(),
            report_nm: "분기보고서 (2023.09) ".into(),
            rcept_no: "20231114002109".into(),
            flr_nm: "삼성전자".into(),
            rcept_dt: "20231114".into(),
            rm: String::new(),
        };

        let report = DartReport::from_entry(client, entry, DetailType::Quarterly).unwrap();
        assert_eq!(report.name(), "분기보고서 (2023.09)");
        assert_eq!(report.receipt_date(), NaiveDate::from_ymd_opt(2023, 11, 14).unwrap());
        assert_eq!(report.statement_key().unwrap(), (2023, ReportCode::ThirdQuarter));
    }

    #[test]
    fn test_report_from_entry_bad_date() {
        let client = Arc::new(DartClient::new(DartConfig::new("key")).unwrap());
        let entry = FilingEntry {
            corp_cls: String::new(),
            corp_name: String::new(),
            corp_code: "00126380".into(),
            report_nm: "사업보고서 (2023.12)".into(),
            rcept_no: "1".into(),
            flr_nm: String::new(),
            rcept_dt: "2023-03-01".into(),
            rm: String::new(),
        };

        assert!(matches!(
            DartReport::from_entry(client, entry, DetailType::Annual),
            Err(DataError::Parse(_))
        ));
    }
}
