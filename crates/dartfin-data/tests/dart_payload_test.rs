//! Recorded DART payloads through the public parsing helpers.

use dartfin_data::DetailType;
use dartfin_data::dart::statements::parse_amount;
use dartfin_data::dart::{CorpCodeList, DartConfig, FilingEntry, ReportCode, filings::report_period};
use rstest::rstest;
use std::time::Duration;

#[rstest]
#[case("사업보고서 (2023.12)", DetailType::Annual, "11011")]
#[case("반기보고서 (2023.06)", DetailType::HalfYear, "11012")]
#[case("분기보고서 (2023.03)", DetailType::Quarterly, "11013")]
#[case("분기보고서 (2023.09)", DetailType::Quarterly, "11014")]
#[case("[기재정정]분기보고서 (2023.09)", DetailType::Quarterly, "11014")]
fn test_report_code_from_name(
    #[case] name: &str,
    #[case] detail_type: DetailType,
    #[case] code: &str,
) {
    let (year, month) = report_period(name).unwrap();
    assert_eq!(year, 2023);
    assert_eq!(ReportCode::resolve(detail_type, month).code(), code);
}

#[test]
fn test_filing_entries() {
    let json = r#"[
        {"corp_code": "00126380", "corp_name": "삼성전자", "stock_code": "005930",
         "corp_cls": "Y", "report_nm": "[기재정정]분기보고서 (2023.09)",
         "rcept_no": "20231201000123", "flr_nm": "삼성전자", "rcept_dt": "20231201", "rm": ""},
        {"corp_code": "00126380", "corp_name": "삼성전자", "stock_code": "005930",
         "corp_cls": "Y", "report_nm": "분기보고서 (2023.09)",
         "rcept_no": "20231114002109", "flr_nm": "삼성전자", "rcept_dt": "20231114", "rm": ""}
    ]"#;

    let entries: Vec<FilingEntry> = serde_json::from_str(json).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].rcept_dt, "20231201");
    assert_eq!(
        report_period(&entries[0].report_nm),
        report_period(&entries[1].report_nm)
    );
}

#[test]
fn test_registry_lookup() {
    let xml = r#"<result>
        <list><corp_code>00126380</corp_code><corp_name>삼성전자</corp_name>
              <stock_code>005930</stock_code><modify_date>20230110</modify_date></list>
        <list><corp_code>00258801</corp_code><corp_name>카카오</corp_name>
              <stock_code>035720</stock_code><modify_date>20230302</modify_date></list>
    </result>"#;

    let registry = CorpCodeList::parse_xml(xml).unwrap();
    let found = registry.find_exact(" 카카오 ");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].corp_code, "00258801");
    assert!(found[0].is_listed());
}

#[rstest]
#[case("1,234", Some(1234.0))]
#[case("-5", Some(-5.0))]
#[case("", None)]
#[case("-", None)]
fn test_amounts(#[case] raw: &str, #[case] expected: Option<f64>) {
    assert_eq!(parse_amount(raw), expected);
}

#[test]
fn test_config_overrides() {
    let config = DartConfig::new("key")
        .with_base_url("http://localhost:8080/api")
        .with_min_interval(Duration::ZERO)
        .with_timeout(Duration::from_secs(5));

    assert_eq!(config.base_url, "http://localhost:8080/api");
    assert_eq!(config.min_interval, Duration::ZERO);
    assert!(!format!("{:?}", config).contains("\"key\""));
}
