//! Report selection.
//!
//! Given every report of one detail type, [`select`] keeps those received in the
//! target year, drops superseded amendments, extracts each remaining income
//! statement and merges them into one label-keyed table per statement kind.
//!
//! Reports that fail to load are skipped with a warning; a year without any usable
//! report yields two empty tables rather than an error.

use crate::columns::{LABEL, LABEL_KO_0, LABEL_KO_1, StatementKind, ValueColumn};
use crate::error::{ReconcileError, Result};
use chrono::Datelike;
use dartfin_data::statement::{LABEL_FIELD, titles};
use dartfin_data::{RawCells, RawHeader, RawStatement, Report};
use log::{debug, warn};
use polars::prelude::*;
use std::cmp::Reverse;
use std::collections::HashSet;

/// Number of trailing characters of a report name that identify what it reports on.
///
/// Names end in the reporting month, e.g. `분기보고서 (2023.09)`, and amendments only
/// add a prefix such as `[기재정정]`.
pub const AMENDMENT_KEY_CHARS: usize = 9;

/// Consolidated and separate line-item tables of one detail type and year.
#[derive(Debug, Clone)]
pub struct StatementViews {
    /// Separate statements: `label_ko` plus separate value columns, newest period first
    pub separate: DataFrame,
    /// Consolidated statements: `label_ko` plus consolidated value columns, newest period first
    pub consolidated: DataFrame,
}

impl StatementViews {
    /// Two tables with no columns and no rows.
    pub fn empty() -> Self {
        Self {
            separate: DataFrame::empty(),
            consolidated: DataFrame::empty(),
        }
    }

    /// Table of one statement kind.
    pub const fn get(&self, kind: StatementKind) -> &DataFrame {
        match kind {
            StatementKind::Consolidated => &self.consolidated,
            StatementKind::Separate => &self.separate,
        }
    }

    /// Whether both tables are empty.
    pub fn is_empty(&self) -> bool {
        self.separate.height() == 0 && self.consolidated.height() == 0
    }
}

/// The trailing [`AMENDMENT_KEY_CHARS`] characters of a report name.
pub fn amendment_key(name: &str) -> &str {
    match name.char_indices().rev().nth(AMENDMENT_KEY_CHARS - 1) {
        Some((index, _)) => &name[index..],
        None => name,
    }
}

/// Drop reports superseded by an amendment.
///
/// Providers list the newest filing first, so the first report of each run of
/// adjacent reports sharing an amendment key is the latest version. Non-adjacent
/// repeats are kept.
pub fn supersede_amendments<'a, R, I>(reports: I) -> Vec<&'a R>
where
    R: Report + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut kept = Vec::new();
    let mut previous: Option<&str> = None;
    for report in reports {
        let key = amendment_key(report.name());
        if previous == Some(key) {
            debug!("Report {} superseded by a later amendment", report.receipt_no());
            continue;
        }
        previous = Some(key);
        kept.push(report);
    }
    kept
}

/// Select the reports received in `year` and merge their income statements.
///
/// Only value columns whose period starts in `year` are kept.
pub async fn select<R: Report>(reports: &[R], year: i32) -> Result<StatementViews> {
    select_received_in(reports, year, year).await
}

/// Like [`select`], but filters reports by `receipt_year` instead of `year`.
///
/// Annual reports covering a fiscal year are usually filed the following spring.
pub async fn select_received_in<R: Report>(
    reports: &[R],
    year: i32,
    receipt_year: i32,
) -> Result<StatementViews> {
    let received = reports
        .iter()
        .filter(|report| report.receipt_date().year() == receipt_year);

    let mut frames = Vec::new();
    for report in supersede_amendments(received) {
        match load_report(report, year).await {
            Ok(Some(frame)) => frames.push(frame),
            Ok(None) => {}
            Err(e) => warn!(
                "Skipping report {} ({}) for {}: {}",
                report.receipt_no(),
                report.name(),
                year,
                e
            ),
        }
    }

    if frames.is_empty() {
        debug!("No usable reports received in {} for {}", receipt_year, year);
        return Ok(StatementViews::empty());
    }

    let merged = merge_frames(frames)?;
    split_views(&merged)
}

async fn load_report<R: Report>(report: &R, year: i32) -> Result<Option<DataFrame>> {
    if !report.has_consolidated_statement().await? {
        debug!(
            "Report {} has no consolidated statements, skipping",
            report.receipt_no()
        );
        return Ok(None);
    }

    let Some(statement) = report.extract_income_statement().await? else {
        debug!("Report {} has no income statement", report.receipt_no());
        return Ok(None);
    };
    if statement.is_empty() {
        return Ok(None);
    }

    normalize_statement(statement, year)
        .map(Some)
        .map_err(|e| match e {
            ReconcileError::MissingLabelColumn { .. } => ReconcileError::MissingLabelColumn {
                receipt_no: report.receipt_no().to_string(),
            },
            other => other,
        })
}

/// Canonical label column for a label header, if it is one the selector reads.
fn label_column(statement: &str, field: &str) -> Option<&'static str> {
    if field != LABEL_FIELD {
        return None;
    }
    match statement {
        titles::COMPREHENSIVE_INCOME_KO | titles::INCOME_KO => Some(LABEL_KO_0),
        titles::COMPREHENSIVE_INCOME_EN | titles::INCOME_EN => Some(LABEL_KO_1),
        _ => None,
    }
}

/// Value column key for a value header whose period starts in `year`.
fn value_column(period: &str, tags: &[String], year: i32) -> Option<ValueColumn> {
    let kind = StatementKind::from_tag(tags.first()?)?;
    match period.parse() {
        Ok(period) => {
            let column = ValueColumn::new(period, kind);
            column.period.starts_in(year).then_some(column)
        }
        Err(e) => {
            debug!("Ignoring value column: {}", e);
            None
        }
    }
}

/// Turn a raw statement into a frame of canonical label columns plus the value
/// columns of `year`.
fn normalize_statement(statement: RawStatement, year: i32) -> Result<DataFrame> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    let mut has_label = false;

    for raw in statement.into_columns() {
        let name = match &raw.header {
            RawHeader::Label { statement, field } => label_column(statement, field).map(String::from),
            RawHeader::Value { period, tags } => value_column(period, tags, year).map(|c| c.name()),
            RawHeader::Other(_) => None,
        };
        let Some(name) = name else { continue };
        if !seen.insert(name.clone()) {
            continue;
        }

        let column = match (&raw.header, raw.cells) {
            (RawHeader::Label { .. }, RawCells::Text(cells)) => {
                has_label = true;
                Column::new(name.into(), cells)
            }
            (RawHeader::Value { .. }, RawCells::Amounts(cells)) => Column::new(name.into(), cells),
            _ => return Err(ReconcileError::UnexpectedCells(name)),
        };
        columns.push(column);
    }

    if !has_label {
        return Err(ReconcileError::MissingLabelColumn {
            receipt_no: String::new(),
        });
    }
    Ok(DataFrame::new(columns)?)
}

fn column_names(frame: &DataFrame) -> Vec<String> {
    frame
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

/// Stack frames by column name, coalesce the label columns and keep the first
/// non-null value per label.
fn merge_frames(frames: Vec<DataFrame>) -> Result<DataFrame> {
    let lazy: Vec<LazyFrame> = frames.into_iter().map(IntoLazy::lazy).collect();
    let stacked = concat_lf_diagonal(lazy, UnionArgs::default())?.collect()?;

    let names = column_names(&stacked);
    let has = |label: &str| names.iter().any(|name| name == label);
    let label = match (has(LABEL_KO_0), has(LABEL_KO_1)) {
        (true, true) => when(col(LABEL_KO_0).is_not_null())
            .then(col(LABEL_KO_0))
            .otherwise(col(LABEL_KO_1)),
        (true, false) => col(LABEL_KO_0),
        (false, true) => col(LABEL_KO_1),
        (false, false) => {
            return Err(ReconcileError::MissingLabelColumn {
                receipt_no: "merged reports".to_string(),
            });
        }
    };

    let values: Vec<Expr> = names
        .iter()
        .filter(|name| name.as_str() != LABEL_KO_0 && name.as_str() != LABEL_KO_1)
        .map(|name| col(name.as_str()).drop_nulls().first())
        .collect();

    let merged = stacked
        .lazy()
        .with_column(label.alias(LABEL))
        .filter(col(LABEL).is_not_null())
        .group_by([col(LABEL)])
        .agg(values)
        .sort([LABEL], SortMultipleOptions::default())
        .collect()?;
    Ok(merged)
}

/// Split a merged table into per-kind views, value columns newest period first.
fn split_views(merged: &DataFrame) -> Result<StatementViews> {
    let keys: Vec<ValueColumn> = column_names(merged)
        .iter()
        .filter(|name| name.as_str() != LABEL)
        .filter_map(|name| name.parse().ok())
        .collect();

    let view = |kind: StatementKind| -> Result<DataFrame> {
        let mut columns: Vec<&ValueColumn> = keys.iter().filter(|c| c.kind == kind).collect();
        columns.sort_by_key(|c| Reverse(c.period));

        let mut selection = vec![LABEL.to_string()];
        selection.extend(columns.iter().map(|c| c.name()));
        Ok(merged.select(selection)?)
    };

    Ok(StatementViews {
        separate: view(StatementKind::Separate)?,
        consolidated: view(StatementKind::Consolidated)?,
    })
}
