//! End-to-end runs against an in-memory filing provider.

use async_trait::async_trait;
use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
use chrono::{Datelike, NaiveDate};
use dartfin::data::statement::{tags, titles};
use dartfin::data::{
    Company, DataError, DetailType, FilingProvider, Market, RawCells, RawHeader, RawStatement,
    Report,
};
use dartfin::output::WorkbookWriter;
use dartfin::{IncomeStatementRequest, PipelineError, build_workbook};
use std::io::Cursor;

#[derive(Debug, Clone)]
struct MemoryReport {
    name: String,
    received: NaiveDate,
    detail_type: DetailType,
    statement: RawStatement,
}

#[async_trait]
impl Report for MemoryReport {
    fn receipt_no(&self) -> &str {
        &self.name
    }

    fn receipt_date(&self) -> NaiveDate {
        self.received
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn detail_type(&self) -> DetailType {
        self.detail_type
    }

    async fn has_consolidated_statement(&self) -> dartfin::data::Result<bool> {
        Ok(true)
    }

    async fn extract_income_statement(&self) -> dartfin::data::Result<Option<RawStatement>> {
        Ok(Some(self.statement.clone()))
    }
}

#[derive(Debug, Clone)]
struct MemoryCompany {
    name: String,
    reports: Vec<MemoryReport>,
}

#[async_trait]
impl Company for MemoryCompany {
    type Report = MemoryReport;

    fn name(&self) -> &str {
        &self.name
    }

    async fn search_filings(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        detail_type: DetailType,
    ) -> dartfin::data::Result<Vec<MemoryReport>> {
        let mut found: Vec<MemoryReport> = self
            .reports
            .iter()
            .filter(|r| r.detail_type == detail_type && r.received >= start && r.received <= end)
            .cloned()
            .collect();
        found.sort_by_key(|r| std::cmp::Reverse(r.received));
        Ok(found)
    }
}

struct MemoryProvider {
    company: MemoryCompany,
    market: Market,
}

#[async_trait]
impl FilingProvider for MemoryProvider {
    type Company = MemoryCompany;

    async fn find_company(&self, name: &str, market: Market) -> dartfin::data::Result<MemoryCompany> {
        if name == self.company.name && market == self.market {
            Ok(self.company.clone())
        } else {
            Err(DataError::CompanyNotFound {
                name: name.to_string(),
                market,
            })
        }
    }
}

fn report(
    detail_type: DetailType,
    month: u32,
    received: (i32, u32, u32),
    periods: &[(String, f64)],
) -> MemoryReport {
    let labels = ["매출액", "영업이익"];
    let mut statement = RawStatement::new(labels.len());
    statement
        .push_column(
            RawHeader::label(titles::INCOME_KO),
            RawCells::Text(labels.iter().map(|l| Some(l.to_string())).collect()),
        )
        .unwrap();
    for (period, revenue) in periods {
        for tag in [tags::CONSOLIDATED, tags::SEPARATE] {
            statement
                .push_column(
                    RawHeader::value(period.clone(), tag),
                    RawCells::Amounts(vec![Some(*revenue), Some(revenue / 10.0)]),
                )
                .unwrap();
        }
    }

    let received = NaiveDate::from_ymd_opt(received.0, received.1, received.2).unwrap();
    let year = if detail_type == DetailType::Annual { received.year() - 1 } else { received.year() };
    MemoryReport {
        name: format!("{} ({}.{:02})", detail_type.title(), year, month),
        received,
        detail_type,
        statement,
    }
}

/// One year of filings with quarterly revenue of 100, 110, 120 and 130.
fn year_of_filings(year: i32) -> Vec<MemoryReport> {
    let p = |from: &str, to: &str| format!("{}{}-{}{}", year, from, year, to);
    vec![
        report(DetailType::Quarterly, 3, (year, 5, 15), &[(p("0101", "0331"), 100.0)]),
        report(
            DetailType::HalfYear,
            6,
            (year, 8, 14),
            &[(p("0401", "0630"), 110.0), (p("0101", "0630"), 210.0)],
        ),
        report(
            DetailType::Quarterly,
            9,
            (year, 11, 14),
            &[(p("0701", "0930"), 120.0), (p("0101", "0930"), 330.0)],
        ),
        // Filed the following March
        report(DetailType::Annual, 12, (year + 1, 3, 14), &[(p("0101", "1231"), 460.0)]),
    ]
}

fn provider() -> MemoryProvider {
    let mut reports = year_of_filings(2022);
    reports.extend(year_of_filings(2023));
    MemoryProvider {
        company: MemoryCompany {
            name: "삼성전자".to_string(),
            reports,
        },
        market: Market::Kospi,
    }
}

fn request() -> IncomeStatementRequest {
    IncomeStatementRequest::new(
        "삼성전자",
        Market::Kospi,
        NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
    )
    .with_lagged_annual(true)
}

#[tokio::test]
async fn test_full_run_writes_every_sheet() {
    let provider = provider();
    let mut writer = WorkbookWriter::new();
    let mut seen_years = Vec::new();

    let summary = build_workbook(&provider, &request(), &mut writer, |year| seen_years.push(year))
        .await
        .unwrap();

    assert_eq!(summary.company, "삼성전자");
    assert_eq!(summary.years, [2023, 2022]);
    assert_eq!(seen_years, [2023, 2022]);

    let mut expected = Vec::new();
    for year in [2023, 2022] {
        expected.push(format!("별도_전체_{}", year));
        expected.push(format!("연결_전체_{}", year));
        for kind in ["별도", "연결"] {
            for q in 1..=4 {
                expected.push(format!("{}_Q{}_{}", kind, q, year));
            }
        }
    }
    assert_eq!(summary.sheets, expected);
    assert_eq!(writer.sheet_names(), expected.as_slice());

    let bytes = writer.into_buffer().unwrap();
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
    for sheet in &expected {
        let range = workbook.worksheet_range(sheet).unwrap();
        assert_eq!(
            range.get_value((0, 0)),
            Some(&Data::String("label_ko".to_string())),
            "sheet {}",
            sheet
        );
    }

    // Q4 = 460 - 330
    let q4 = workbook.worksheet_range("연결_Q4_2023").unwrap();
    assert_eq!(q4.get_value((0, 1)), Some(&Data::String("2023_Q4".to_string())));
    assert_eq!(q4.get_value((1, 0)), Some(&Data::String("매출액".to_string())));
    assert_eq!(q4.get_value((1, 1)), Some(&Data::Float(130.0)));
}

#[tokio::test]
async fn test_unlagged_run_skips_q4() {
    let provider = provider();
    let mut writer = WorkbookWriter::new();
    let request = request().with_lagged_annual(false);

    let summary = build_workbook(&provider, &request, &mut writer, |_| {})
        .await
        .unwrap();

    // Annual reports received in 2023 cover 2022, whose columns are not of 2023.
    assert!(!summary.sheets.contains(&"연결_Q4_2023".to_string()));
    assert!(summary.sheets.contains(&"연결_Q3_2023".to_string()));
    assert!(summary.sheets.contains(&"별도_전체_2022".to_string()));
}

#[tokio::test]
async fn test_unknown_company() {
    let provider = provider();
    let mut writer = WorkbookWriter::new();
    let mut request = request();
    request.market = Market::Kosdaq;

    let result = build_workbook(&provider, &request, &mut writer, |_| {}).await;
    assert!(matches!(
        result,
        Err(PipelineError::Data(DataError::CompanyNotFound { .. }))
    ));
    assert!(writer.is_empty());
}
