//! Quarterly reconciliation.
//!
//! DART never files a standalone fourth quarter. For a year `y` and one statement
//! kind the quarters come from:
//!
//! | Quarter | Source | Column |
//! |---------|--------|--------|
//! | Q1 | quarterly report | `{y}0101-{y}0331` |
//! | Q2 | half-year report | `{y}0401-{y}0630` |
//! | Q3 | quarterly report | `{y}0701-{y}0930` |
//! | Q4 | annual minus quarterly | `{y}0101-{y}1231` − `{y}0101-{y}0930` |
//!
//! Q4 is only produced when both operands exist. Rows are keyed by label, so a
//! line item missing from one source gets a null rather than a shifted value.

use crate::columns::{LABEL, Period, Quarter, StatementKind, ValueColumn};
use crate::error::Result;
use log::debug;
use polars::prelude::*;
use std::collections::BTreeSet;

const FULL_YEAR_OPERAND: &str = "__full_year";
const NINE_MONTH_OPERAND: &str = "__nine_months";

/// Reconciled quarters of one statement kind and year.
#[derive(Debug, Clone)]
pub struct QuarterlyBundle {
    /// `label_ko` plus every available quarter column, latest quarter first
    pub total: DataFrame,
    quarters: [DataFrame; 4],
}

impl QuarterlyBundle {
    /// A bundle of five tables with no columns and no rows.
    pub fn empty() -> Self {
        Self {
            total: DataFrame::empty(),
            quarters: std::array::from_fn(|_| DataFrame::empty()),
        }
    }

    /// Table of a single quarter: `label_ko` plus that quarter's column, or a
    /// label-only table without rows when the quarter is unavailable.
    pub const fn quarter(&self, quarter: Quarter) -> &DataFrame {
        &self.quarters[quarter.number() as usize - 1]
    }

    /// Quarter columns present in the total table.
    pub fn quarter_columns(&self) -> usize {
        self.total.width().saturating_sub(1)
    }

    /// Whether no quarter could be reconciled.
    pub fn is_empty(&self) -> bool {
        self.quarter_columns() == 0
    }
}

fn has_column(table: &DataFrame, name: &str) -> bool {
    table.height() > 0
        && table.column(LABEL).is_ok()
        && table.column(name).is_ok()
}

/// Statement kind of the first non-empty table carrying a value column.
fn detect_statement_kind(tables: &[&DataFrame]) -> Option<StatementKind> {
    tables
        .iter()
        .filter(|table| table.height() > 0)
        .find_map(|table| {
            table
                .get_column_names()
                .iter()
                .find_map(|name| name.parse::<ValueColumn>().ok())
                .map(|column| column.kind)
        })
}

/// Sorted union of the labels of all tables, as a single-column frame.
fn label_union(tables: &[&DataFrame]) -> Result<DataFrame> {
    let mut labels = BTreeSet::new();
    for table in tables.iter().filter(|table| table.height() > 0) {
        if let Ok(column) = table.column(LABEL) {
            let values = column.as_materialized_series().str()?;
            labels.extend(values.into_iter().flatten().map(str::to_string));
        }
    }
    let labels: Vec<String> = labels.into_iter().collect();
    Ok(DataFrame::new(vec![Column::new(LABEL.into(), labels)])?)
}

fn project(table: &DataFrame, column: &str, alias: &str) -> LazyFrame {
    table
        .clone()
        .lazy()
        .select([col(LABEL), col(column).alias(alias)])
}

fn join_on_label(base: LazyFrame, other: LazyFrame) -> LazyFrame {
    base.join(
        other,
        [col(LABEL)],
        [col(LABEL)],
        JoinArgs::new(JoinType::Left),
    )
}

fn label_only() -> Result<DataFrame> {
    let labels = Series::new_empty(LABEL.into(), &DataType::String);
    Ok(DataFrame::new(vec![Column::from(labels)])?)
}

/// Reconcile one year's quarters of a single statement kind.
///
/// `annual`, `half_year` and `nine_month` are views of the same kind as produced by
/// the selector for the annual, half-year and quarterly reports. The kind is taken
/// from the first non-empty table; if none carries a value column the result is
/// [`QuarterlyBundle::empty`].
pub fn reconcile(
    annual: &DataFrame,
    half_year: &DataFrame,
    nine_month: &DataFrame,
    year: i32,
) -> Result<QuarterlyBundle> {
    let tables = [annual, half_year, nine_month];
    let Some(kind) = detect_statement_kind(&tables) else {
        debug!("No statement data to reconcile for {}", year);
        return Ok(QuarterlyBundle::empty());
    };

    let key = |period: Period| ValueColumn::new(period, kind).name();
    let full_year = key(Period::within_year(year, (1, 1), (12, 31))?);
    let nine_months = key(Period::within_year(year, (1, 1), (9, 30))?);

    let mut frame = label_union(&tables)?.lazy();
    let mut present = Vec::new();

    let direct = [
        (Quarter::Q1, nine_month),
        (Quarter::Q2, half_year),
        (Quarter::Q3, nine_month),
    ];
    for (quarter, source) in direct {
        let column = key(quarter.period(year)?);
        if has_column(source, &column) {
            frame = join_on_label(frame, project(source, &column, &quarter.column_name(year)));
            present.push(quarter);
        }
    }

    if has_column(annual, &full_year) && has_column(nine_month, &nine_months) {
        frame = join_on_label(frame, project(annual, &full_year, FULL_YEAR_OPERAND));
        frame = join_on_label(frame, project(nine_month, &nine_months, NINE_MONTH_OPERAND));
        frame = frame.with_column(
            (col(FULL_YEAR_OPERAND) - col(NINE_MONTH_OPERAND))
                .alias(Quarter::Q4.column_name(year)),
        );
        present.push(Quarter::Q4);
    } else {
        debug!("Q4 {} ({}) needs both annual and nine-month figures", year, kind);
    }

    if present.is_empty() {
        debug!("No quarter columns for {} ({})", year, kind);
        return Ok(QuarterlyBundle::empty());
    }

    present.sort_by(|a, b| b.cmp(a));
    let mut selection = vec![col(LABEL)];
    selection.extend(present.iter().map(|q| col(q.column_name(year))));
    let total = frame
        .select(selection)
        .sort([LABEL], SortMultipleOptions::default())
        .collect()?;

    let mut quarters = [label_only()?, label_only()?, label_only()?, label_only()?];
    for quarter in &present {
        quarters[quarter.number() as usize - 1] =
            total.select([LABEL.to_string(), quarter.column_name(year)])?;
    }

    Ok(QuarterlyBundle { total, quarters })
}
