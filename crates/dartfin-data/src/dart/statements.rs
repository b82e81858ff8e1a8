//! Income statement extraction from `fnlttSinglAcntAll.json`.
//!
//! The endpoint returns every account of every statement of one report, one row per
//! account, with the current and comparative amounts in separate fields. Rows of the
//! income statement are turned into a [`RawStatement`] with one value column per
//! (period, statement view).

use super::client::DartResponse;
use super::filings::ReportCode;
use crate::error::Result;
use crate::statement::{RawCells, RawHeader, RawStatement, tags, titles};
use serde::Deserialize;

/// Statement division code for the income statement
const SJ_INCOME: &str = "IS";

/// Statement division code for the statement of comprehensive income
const SJ_COMPREHENSIVE_INCOME: &str = "CIS";

/// Financial statement view (`fs_div`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FsDivision {
    /// Consolidated statements (`CFS`)
    Consolidated,
    /// Separate statements (`OFS`)
    Separate,
}

impl FsDivision {
    /// DART code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Consolidated => "CFS",
            Self::Separate => "OFS",
        }
    }

    /// Tag attached to value columns of this view.
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Consolidated => tags::CONSOLIDATED,
            Self::Separate => tags::SEPARATE,
        }
    }
}

/// One account row.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccountRow {
    /// Receipt number of the filing the figures come from
    pub rcept_no: String,
    /// Report code
    pub reprt_code: String,
    /// Business year
    pub bsns_year: String,
    /// Statement division (`BS`, `IS`, `CIS`, `CF`, `SCE`)
    pub sj_div: String,
    /// Statement name
    pub sj_nm: String,
    /// Taxonomy account id
    pub account_id: String,
    /// Korean account name
    pub account_nm: String,
    /// Current term, period amount
    pub thstrm_amount: String,
    /// Current term, cumulative amount
    pub thstrm_add_amount: String,
    /// Prior term amount
    pub frmtrm_amount: String,
    /// Prior term, same quarter amount
    pub frmtrm_q_amount: String,
    /// Prior term, cumulative amount
    pub frmtrm_add_amount: String,
    /// Term before the prior term
    pub bfefrmtrm_amount: String,
    /// Display order
    pub ord: String,
    /// Currency
    pub currency: String,
}

/// `fnlttSinglAcntAll.json` response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AccountListResponse {
    pub(crate) status: String,
    #[serde(default)]
    pub(crate) message: String,
    #[serde(default)]
    pub(crate) list: Vec<AccountRow>,
}

impl DartResponse for AccountListResponse {
    fn status(&self) -> &str {
        &self.status
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Amount field of an [`AccountRow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AmountField {
    Current,
    CurrentCumulative,
    Prior,
    PriorQuarter,
    PriorCumulative,
    BeforePrior,
}

impl AmountField {
    fn read(self, row: &AccountRow) -> Option<f64> {
        let raw = match self {
            Self::Current => &row.thstrm_amount,
            Self::CurrentCumulative => &row.thstrm_add_amount,
            Self::Prior => &row.frmtrm_amount,
            Self::PriorQuarter => &row.frmtrm_q_amount,
            Self::PriorCumulative => &row.frmtrm_add_amount,
            Self::BeforePrior => &row.bfefrmtrm_amount,
        };
        parse_amount(raw)
    }
}

/// Parse a DART amount: comma-grouped digits, blanks and `-` meaning no value.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return None;
    }
    trimmed.replace(',', "").parse().ok()
}

fn span(from_year: i32, from: &str, to_year: i32, to: &str) -> String {
    format!("{}{}-{}{}", from_year, from, to_year, to)
}

/// Period string carried by each amount field of a report.
///
/// Half-year and quarterly reports state the three-month amount in `thstrm_amount`
/// and the year-to-date amount in `thstrm_add_amount`.
fn period_slots(code: ReportCode, year: i32) -> Vec<(AmountField, String)> {
    let prior = year - 1;
    match code {
        ReportCode::Annual => vec![
            (AmountField::Current, span(year, "0101", year, "1231")),
            (AmountField::Prior, span(prior, "0101", prior, "1231")),
            (AmountField::BeforePrior, span(year - 2, "0101", year - 2, "1231")),
        ],
        ReportCode::HalfYear => vec![
            (AmountField::Current, span(year, "0401", year, "0630")),
            (AmountField::CurrentCumulative, span(year, "0101", year, "0630")),
            (AmountField::PriorQuarter, span(prior, "0401", prior, "0630")),
            (AmountField::PriorCumulative, span(prior, "0101", prior, "0630")),
        ],
        ReportCode::FirstQuarter => vec![
            (AmountField::Current, span(year, "0101", year, "0331")),
            (AmountField::PriorQuarter, span(prior, "0101", prior, "0331")),
        ],
        ReportCode::ThirdQuarter => vec![
            (AmountField::Current, span(year, "0701", year, "0930")),
            (AmountField::CurrentCumulative, span(year, "0101", year, "0930")),
            (AmountField::PriorQuarter, span(prior, "0701", prior, "0930")),
            (AmountField::PriorCumulative, span(prior, "0101", prior, "0930")),
        ],
    }
}

/// Income statement rows of one view and the title of the statement they form.
///
/// Filers presenting a single statement of comprehensive income have no `IS` rows.
fn income_rows(rows: &[AccountRow]) -> (&'static str, Vec<&AccountRow>) {
    let income: Vec<&AccountRow> = rows.iter().filter(|r| r.sj_div == SJ_INCOME).collect();
    if !income.is_empty() {
        return (titles::INCOME_KO, income);
    }
    let comprehensive = rows
        .iter()
        .filter(|r| r.sj_div == SJ_COMPREHENSIVE_INCOME)
        .collect();
    (titles::COMPREHENSIVE_INCOME_KO, comprehensive)
}

/// Build the raw income statement of one report.
///
/// Consolidated rows come first, then separate rows; each row only has amounts in
/// the value columns of its own view.
pub(crate) fn build_income_statement(
    consolidated: &[AccountRow],
    separate: &[AccountRow],
    code: ReportCode,
    year: i32,
) -> Result<RawStatement> {
    let (title, consolidated) = income_rows(consolidated);
    let (_, separate) = income_rows(separate);

    let views = [
        (FsDivision::Consolidated, consolidated),
        (FsDivision::Separate, separate),
    ];
    let rows: Vec<(FsDivision, &AccountRow)> = views
        .iter()
        .flat_map(|(view, rows)| rows.iter().map(move |row| (*view, *row)))
        .collect();

    let mut statement = RawStatement::new(rows.len());
    statement.push_column(
        RawHeader::label(title),
        RawCells::Text(
            rows.iter()
                .map(|(_, row)| Some(row.account_nm.trim().to_string()))
                .collect(),
        ),
    )?;
    statement.push_column(
        RawHeader::Other("concept_id".to_string()),
        RawCells::Text(
            rows.iter()
                .map(|(_, row)| Some(row.account_id.clone()))
                .collect(),
        ),
    )?;

    for (field, period) in period_slots(code, year) {
        for view in [FsDivision::Consolidated, FsDivision::Separate] {
            let cells: Vec<Option<f64>> = rows
                .iter()
                .map(|(row_view, row)| {
                    if *row_view == view {
                        field.read(row)
                    } else {
                        None
                    }
                })
                .collect();
            statement.push_column(
                RawHeader::value(period.clone(), view.tag()),
                RawCells::Amounts(cells),
            )?;
        }
    }

    Ok(statement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::RawColumn;
    use rstest::rstest;

    fn row(sj_div: &str, name: &str, current: &str, cumulative: &str) -> AccountRow {
        AccountRow {
            sj_div: sj_div.to_string(),
            account_nm: name.to_string(),
            account_id: format!("ifrs-full_{}", name),
            thstrm_amount: current.to_string(),
            thstrm_add_amount: cumulative.to_string(),
            ..AccountRow::default()
        }
    }

    fn find<'a>(statement: &'a RawStatement, period: &str, tag: &str) -> &'a RawColumn {
        statement
            .columns()
            .iter()
            .find(|c| c.header == RawHeader::value(period, tag))
            .unwrap()
    }

    #[rstest]
    #[case("1,234", Some(1234.0))]
    #[case("-5", Some(-5.0))]
    #[case("", None)]
    #[case("-", None)]
    #[case(" 300000 ", Some(300000.0))]
    #[case("n/a", None)]
    fn test_parse_amount(#[case] raw: &str, #[case] expected: Option<f64>) {
        assert_eq!(parse_amount(raw), expected);
    }

    #[test]
    fn test_build_third_quarter_statement() {
        let consolidated = vec![
            row("BS", "자산총계", "1,000", ""),
            row("IS", "매출액", "300", "900"),
            row("IS", "영업이익", "30", "90"),
        ];
        let separate = vec![row("IS", "매출액", "200", "600")];

        let statement =
            build_income_statement(&consolidated, &separate, ReportCode::ThirdQuarter, 2023)
                .unwrap();

        assert_eq!(statement.height(), 3);
        assert_eq!(
            statement.columns()[0].header,
            RawHeader::label(titles::INCOME_KO)
        );

        let q3 = find(&statement, "20230701-20230930", tags::CONSOLIDATED);
        assert_eq!(
            q3.cells,
            RawCells::Amounts(vec![Some(300.0), Some(30.0), None])
        );

        let cumulative = find(&statement, "20230101-20230930", tags::SEPARATE);
        assert_eq!(
            cumulative.cells,
            RawCells::Amounts(vec![None, None, Some(600.0)])
        );
    }

    #[test]
    fn test_comprehensive_income_fallback() {
        let consolidated = vec![row("CIS", "매출액", "1,000", "")];

        let statement =
            build_income_statement(&consolidated, &[], ReportCode::Annual, 2023).unwrap();

        assert_eq!(
            statement.columns()[0].header,
            RawHeader::label(titles::COMPREHENSIVE_INCOME_KO)
        );
        let annual = find(&statement, "20230101-20231231", tags::CONSOLIDATED);
        assert_eq!(annual.cells, RawCells::Amounts(vec![Some(1000.0)]));
    }

    #[test]
    fn test_no_income_rows_is_empty() {
        let consolidated = vec![row("BS", "자산총계", "1,000", "")];
        let statement =
            build_income_statement(&consolidated, &[], ReportCode::HalfYear, 2023).unwrap();
        assert!(statement.is_empty());
    }

    #[test]
    fn test_account_list_response() {
        let json = r#"{
            "status": "000",
            "message": "정상",
            "list": [{
                "rcept_no": "20231114002109", "reprt_code": "11014", "bsns_year": "2023",
                "corp_code": "00126380", "sj_div": "IS", "sj_nm": "손익계산서",
                "account_id": "ifrs-full_Revenue", "account_nm": "매출액", "account_detail": "-",
                "thstrm_nm": "제 55 기 3분기", "thstrm_amount": "67,404,652,000,000",
                "thstrm_add_amount": "193,012,344,000,000", "frmtrm_q_nm": "제 54 기 3분기",
                "frmtrm_q_amount": "76,781,680,000,000", "frmtrm_add_amount": "231,766,730,000,000",
                "ord": "1", "currency": "KRW"
            }]
        }"#;

        let response: AccountListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.list.len(), 1);
        let row = &response.list[0];
        assert_eq!(
            AmountField::CurrentCumulative.read(row),
            Some(193_012_344_000_000.0)
        );
        assert_eq!(AmountField::BeforePrior.read(row), None);
    }
}
