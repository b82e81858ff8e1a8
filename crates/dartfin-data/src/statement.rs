//! Raw statement tables as extracted from a single report.
//!
//! Headers mirror what XBRL viewers print: a label column is identified by the
//! statement title plus a field name, a value column by its reporting period plus a
//! tuple of classification tags. Downstream code normalises these into typed keys.

use crate::error::{DataError, Result};

/// Field name of the Korean line-item label column.
pub const LABEL_FIELD: &str = "label_ko";

/// Classification tags attached to value columns.
pub mod tags {
    /// Consolidated financial statements.
    pub const CONSOLIDATED: &str = "연결재무제표";
    /// Separate (parent-only) financial statements.
    pub const SEPARATE: &str = "별도재무제표";
}

/// Statement titles that head the label column of an income statement.
pub mod titles {
    /// Single statement of comprehensive income, Korean taxonomy labels.
    pub const COMPREHENSIVE_INCOME_KO: &str = "[D431410] 단일 포괄손익계산서, 기능별 분류, 세후 - 연결 | Statement of comprehensive income, by function of expense - Consolidated financial statements (Unit: KRW)";
    /// Income statement, Korean taxonomy labels.
    pub const INCOME_KO: &str = "[D310000] 손익계산서, 기능별 분류 - 연결 | Income statement, by function of expense - Consolidated financial statements (Unit: KRW)";
    /// Single statement of comprehensive income, English taxonomy labels.
    pub const COMPREHENSIVE_INCOME_EN: &str = "[D431410] Statement of comprehensive income, by function of expense - Consolidated financial statements (Unit: KRW)";
    /// Income statement, English taxonomy labels.
    pub const INCOME_EN: &str = "[D310000] Income statement, by function of expense - Consolidated financial statements (Unit: KRW)";
}

/// Header of a raw statement column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RawHeader {
    /// Line-item label column.
    Label {
        /// Statement title
        statement: String,
        /// Field name, usually [`LABEL_FIELD`]
        field: String,
    },
    /// Amount column for one reporting period.
    Value {
        /// Period string, `YYYYMMDD-YYYYMMDD`
        period: String,
        /// Classification tags; the first one names the statement view
        tags: Vec<String>,
    },
    /// Any other column (concept ids, class levels).
    Other(String),
}

impl RawHeader {
    /// Label column header.
    pub fn label(statement: impl Into<String>) -> Self {
        Self::Label {
            statement: statement.into(),
            field: LABEL_FIELD.to_string(),
        }
    }

    /// Value column header with a single tag.
    pub fn value(period: impl Into<String>, tag: impl Into<String>) -> Self {
        Self::Value {
            period: period.into(),
            tags: vec![tag.into()],
        }
    }
}

/// Cells of a raw column.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCells {
    /// Text cells (labels, identifiers)
    Text(Vec<Option<String>>),
    /// Amount cells
    Amounts(Vec<Option<f64>>),
}

impl RawCells {
    /// Number of cells.
    pub fn len(&self) -> usize {
        match self {
            Self::Text(cells) => cells.len(),
            Self::Amounts(cells) => cells.len(),
        }
    }

    /// Whether there are no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single raw column.
#[derive(Debug, Clone, PartialEq)]
pub struct RawColumn {
    /// Column header
    pub header: RawHeader,
    /// Column cells
    pub cells: RawCells,
}

/// Income statement extracted from one report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawStatement {
    height: usize,
    columns: Vec<RawColumn>,
}

impl RawStatement {
    /// Create an empty statement with `height` rows.
    pub const fn new(height: usize) -> Self {
        Self {
            height,
            columns: Vec::new(),
        }
    }

    /// Append a column.
    ///
    /// # Errors
    /// Returns [`DataError::Parse`] if the column length differs from the row count.
    pub fn push_column(&mut self, header: RawHeader, cells: RawCells) -> Result<()> {
        if cells.len() != self.height {
            return Err(DataError::Parse(format!(
                "Column {:?} has {} cells, statement has {} rows",
                header,
                cells.len(),
                self.height
            )));
        }
        self.columns.push(RawColumn { header, cells });
        Ok(())
    }

    /// Number of rows.
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Whether the statement has no rows.
    pub const fn is_empty(&self) -> bool {
        self.height == 0
    }

    /// Columns in insertion order.
    pub fn columns(&self) -> &[RawColumn] {
        &self.columns
    }

    /// Consume the statement, yielding its columns.
    pub fn into_columns(self) -> Vec<RawColumn> {
        self.columns
    }
}
