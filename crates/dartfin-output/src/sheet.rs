//! Sheet and file naming.

use dartfin_reconcile::{Quarter, StatementKind};
use std::fmt;

/// Longest sheet name Excel accepts.
pub const MAX_SHEET_NAME_CHARS: usize = 31;

/// MIME type to serve the workbook with when offering it as a download.
pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Which slice of a year a sheet shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    /// Every available quarter side by side
    Total,
    /// A single quarter
    Quarter(Quarter),
}

impl Granularity {
    /// Sheet name segment: `전체` or `Q1`..`Q4`.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Total => "전체",
            Self::Quarter(quarter) => quarter.label(),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Truncate a sheet name to [`MAX_SHEET_NAME_CHARS`] characters.
pub fn truncate_sheet_name(name: &str) -> String {
    name.chars().take(MAX_SHEET_NAME_CHARS).collect()
}

/// Sheet name for one table, e.g. `연결_Q4_2023`.
pub fn sheet_name(kind: StatementKind, granularity: Granularity, year: i32) -> String {
    truncate_sheet_name(&format!("{}_{}_{}", kind.short_name(), granularity, year))
}

/// File name offered for download.
pub fn download_file_name(company: &str) -> String {
    format!("{}_재무제표.xlsx", company.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StatementKind::Separate, Granularity::Total, "별도_전체_2023")]
    #[case(StatementKind::Consolidated, Granularity::Total, "연결_전체_2023")]
    #[case(StatementKind::Separate, Granularity::Quarter(Quarter::Q1), "별도_Q1_2023")]
    #[case(StatementKind::Consolidated, Granularity::Quarter(Quarter::Q4), "연결_Q4_2023")]
    fn test_sheet_name(
        #[case] kind: StatementKind,
        #[case] granularity: Granularity,
        #[case] expected: &str,
    ) {
        assert_eq!(sheet_name(kind, granularity, 2023), expected);
    }

    #[test]
    fn test_truncate_long_name() {
        let long = "연결".repeat(20);
        let truncated = truncate_sheet_name(&long);
        assert_eq!(truncated.chars().count(), MAX_SHEET_NAME_CHARS);
        assert!(long.starts_with(&truncated));
        assert_eq!(truncate_sheet_name("별도_Q1_2023"), "별도_Q1_2023");
    }

    #[test]
    fn test_download_file_name() {
        assert_eq!(download_file_name("삼성전자"), "삼성전자_재무제표.xlsx");
    }
}
