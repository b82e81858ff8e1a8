//! Typed column keys of line-item tables.
//!
//! Tables carry string column names so they can be handed to polars and written to
//! spreadsheets unchanged. The types here parse and produce those names:
//!
//! - [`LABEL`]: the coalesced line-item label
//! - [`ValueColumn`]: `YYYYMMDD-YYYYMMDD|<statement tag>`
//! - [`Quarter::column_name`]: `{year}_Q{n}`

use crate::error::{ReconcileError, Result};
use chrono::{Datelike, NaiveDate};
use dartfin_data::statement::tags;
use std::fmt;
use std::str::FromStr;

/// Line-item label column of every table.
pub const LABEL: &str = "label_ko";

/// Label column taken from Korean-titled statements.
pub const LABEL_KO_0: &str = "label_ko_0";

/// Label column taken from English-titled statements.
pub const LABEL_KO_1: &str = "label_ko_1";

const PERIOD_DATE_FORMAT: &str = "%Y%m%d";

/// Separator between the period and the statement tag of a value column name.
const TAG_SEPARATOR: char = '|';

/// Which financial statements a figure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatementKind {
    /// Consolidated statements (연결재무제표)
    Consolidated,
    /// Separate, parent-only statements (별도재무제표)
    Separate,
}

impl StatementKind {
    /// Both kinds, consolidated first.
    pub const ALL: [Self; 2] = [Self::Consolidated, Self::Separate];

    /// Classification tag carried by value columns.
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Consolidated => tags::CONSOLIDATED,
            Self::Separate => tags::SEPARATE,
        }
    }

    /// Parse a classification tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            tags::CONSOLIDATED => Some(Self::Consolidated),
            tags::SEPARATE => Some(Self::Separate),
            _ => None,
        }
    }

    /// Short Korean name used in sheet names.
    pub const fn short_name(&self) -> &'static str {
        match self {
            Self::Consolidated => "연결",
            Self::Separate => "별도",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Reporting period, inclusive on both ends.
///
/// Ordering is by start then end date, which matches the lexicographic order of the
/// `YYYYMMDD-YYYYMMDD` string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    start: NaiveDate,
    end: NaiveDate,
}

impl Period {
    /// Create a period.
    ///
    /// # Errors
    /// Returns [`ReconcileError::InvalidColumn`] if `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ReconcileError::InvalidColumn(format!(
                "period starts {} after it ends {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Period between two month/day pairs of the same calendar year.
    pub fn within_year(year: i32, start: (u32, u32), end: (u32, u32)) -> Result<Self> {
        let date = |(month, day): (u32, u32)| {
            NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
                ReconcileError::InvalidColumn(format!("{}-{:02}-{:02} is not a date", year, month, day))
            })
        };
        Self::new(date(start)?, date(end)?)
    }

    /// Whether the period starts in `year`.
    pub fn starts_in(&self, year: i32) -> bool {
        self.start.year() == year
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format(PERIOD_DATE_FORMAT),
            self.end.format(PERIOD_DATE_FORMAT)
        )
    }
}

fn parse_compact_date(raw: &str, whole: &str) -> Result<NaiveDate> {
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ReconcileError::InvalidColumn(format!(
            "'{}' is not a YYYYMMDD-YYYYMMDD period",
            whole
        )));
    }
    NaiveDate::parse_from_str(raw, PERIOD_DATE_FORMAT)
        .map_err(|e| ReconcileError::InvalidColumn(format!("'{}': {}", whole, e)))
}

impl FromStr for Period {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self> {
        let (start, end) = s.split_once('-').ok_or_else(|| {
            ReconcileError::InvalidColumn(format!("'{}' is not a YYYYMMDD-YYYYMMDD period", s))
        })?;
        Self::new(parse_compact_date(start, s)?, parse_compact_date(end, s)?)
    }
}

/// Value column key: one period of one statement kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueColumn {
    /// Reporting period
    pub period: Period,
    /// Statement kind
    pub kind: StatementKind,
}

impl ValueColumn {
    /// Create a key.
    pub const fn new(period: Period, kind: StatementKind) -> Self {
        Self { period, kind }
    }

    /// Column name used in tables.
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ValueColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.period, TAG_SEPARATOR, self.kind.tag())
    }
}

impl FromStr for ValueColumn {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self> {
        let (period, tag) = s.rsplit_once(TAG_SEPARATOR).ok_or_else(|| {
            ReconcileError::InvalidColumn(format!("'{}' has no statement tag", s))
        })?;
        let kind = StatementKind::from_tag(tag).ok_or_else(|| {
            ReconcileError::InvalidColumn(format!("'{}' has unknown statement tag '{}'", s, tag))
        })?;
        Ok(Self::new(period.parse()?, kind))
    }
}

/// Fiscal quarter of a calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Quarter {
    /// January to March
    Q1,
    /// April to June
    Q2,
    /// July to September
    Q3,
    /// October to December
    Q4,
}

impl Quarter {
    /// All quarters in calendar order.
    pub const ALL: [Self; 4] = [Self::Q1, Self::Q2, Self::Q3, Self::Q4];

    /// Quarter number, 1 to 4.
    pub const fn number(&self) -> u32 {
        match self {
            Self::Q1 => 1,
            Self::Q2 => 2,
            Self::Q3 => 3,
            Self::Q4 => 4,
        }
    }

    /// Short label (`Q1`..`Q4`).
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Q1 => "Q1",
            Self::Q2 => "Q2",
            Self::Q3 => "Q3",
            Self::Q4 => "Q4",
        }
    }

    /// The quarter's period in `year`.
    pub fn period(&self, year: i32) -> Result<Period> {
        match self {
            Self::Q1 => Period::within_year(year, (1, 1), (3, 31)),
            Self::Q2 => Period::within_year(year, (4, 1), (6, 30)),
            Self::Q3 => Period::within_year(year, (7, 1), (9, 30)),
            Self::Q4 => Period::within_year(year, (10, 1), (12, 31)),
        }
    }

    /// Column name of this quarter in reconciled tables, e.g. `2023_Q4`.
    pub fn column_name(&self, year: i32) -> String {
        format!("{}_{}", year, self.label())
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_value_column_name() {
        let column = ValueColumn::new(
            Period::within_year(2023, (1, 1), (3, 31)).unwrap(),
            StatementKind::Consolidated,
        );
        assert_eq!(column.name(), "20230101-20230331|연결재무제표");
        assert_eq!(column.name().parse::<ValueColumn>().unwrap(), column);
    }

    #[rstest]
    #[case("20230101-20231231|별도재무제표", true)]
    #[case("20230101-20231231", false)]
    #[case("20230101-20231231|재무제표", false)]
    #[case("2023010-20231231|연결재무제표", false)]
    #[case("20231301-20231231|연결재무제표", false)]
    #[case("20231231-20230101|연결재무제표", false)]
    #[case("label_ko", false)]
    fn test_value_column_parse(#[case] name: &str, #[case] valid: bool) {
        assert_eq!(name.parse::<ValueColumn>().is_ok(), valid);
    }

    #[test]
    fn test_period_order_matches_string_order() {
        let mut periods: Vec<Period> = ["20230101-20230930", "20230701-20230930", "20230101-20230331"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        periods.sort();

        let mut names: Vec<String> = periods.iter().map(Period::to_string).collect();
        let sorted = names.clone();
        names.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_period_starts_in() {
        let period: Period = "20220101-20221231".parse().unwrap();
        assert!(period.starts_in(2022));
        assert!(!period.starts_in(2023));
    }

    #[rstest]
    #[case(Quarter::Q1, "2023_Q1", "20230101-20230331")]
    #[case(Quarter::Q2, "2023_Q2", "20230401-20230630")]
    #[case(Quarter::Q3, "2023_Q3", "20230701-20230930")]
    #[case(Quarter::Q4, "2023_Q4", "20231001-20231231")]
    fn test_quarter_names(#[case] quarter: Quarter, #[case] column: &str, #[case] period: &str) {
        assert_eq!(quarter.column_name(2023), column);
        assert_eq!(quarter.period(2023).unwrap().to_string(), period);
    }

    #[test]
    fn test_statement_kind_tags() {
        for kind in StatementKind::ALL {
            assert_eq!(StatementKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(StatementKind::Separate.short_name(), "별도");
    }
}
