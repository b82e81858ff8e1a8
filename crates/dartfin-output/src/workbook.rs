//! Workbook assembly.
//!
//! [`WorkbookWriter`] accumulates sheets in memory; nothing touches the filesystem
//! until [`WorkbookWriter::save`], so a failed run never leaves a partial file.

use crate::sheet::truncate_sheet_name;
use log::debug;
use polars::prelude::*;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use std::path::Path;
use thiserror::Error;

/// Width of the label column.
const LABEL_COLUMN_WIDTH: f64 = 40.0;

/// Narrowest value column.
const MIN_VALUE_COLUMN_WIDTH: usize = 10;

/// Number format of value cells.
const AMOUNT_FORMAT: &str = "#,##0";

const HEADER_FILL: u32 = 0xD9E1F2;

/// Result type for output operations.
pub type Result<T> = std::result::Result<T, OutputError>;

/// Errors that can occur while building the workbook.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Spreadsheet writer error
    #[error("Xlsx error: {0}")]
    Xlsx(#[from] XlsxError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Table does not fit on a worksheet
    #[error("Table for sheet {sheet} is too large: {reason}")]
    TableTooLarge {
        /// Sheet the table was written to
        sheet: String,
        /// Which limit was exceeded
        reason: String,
    },
}

/// Cell formats shared by every sheet.
struct TableFormats {
    header: Format,
    text: Format,
    amount: Format,
}

impl TableFormats {
    fn new() -> Self {
        Self {
            header: Format::new()
                .set_bold()
                .set_background_color(Color::RGB(HEADER_FILL))
                .set_border(FormatBorder::Thin)
                .set_align(FormatAlign::Center),
            text: Format::new().set_border(FormatBorder::Thin),
            amount: Format::new()
                .set_num_format(AMOUNT_FORMAT)
                .set_border(FormatBorder::Thin),
        }
    }
}

/// Format an amount the way `#,##0` displays it, e.g. `-1234567.6` → `-1,234,568`.
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    let len = digits.len();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Width of a value column holding `values`.
fn value_column_width<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    values
        .into_iter()
        .map(|v| format_thousands(v).chars().count() + 2)
        .fold(MIN_VALUE_COLUMN_WIDTH, usize::max) as f64
}

/// In-memory xlsx workbook built one table at a time.
pub struct WorkbookWriter {
    workbook: Workbook,
    formats: TableFormats,
    sheet_names: Vec<String>,
}

impl WorkbookWriter {
    /// Create an empty workbook.
    pub fn new() -> Self {
        Self {
            workbook: Workbook::new(),
            formats: TableFormats::new(),
            sheet_names: Vec::new(),
        }
    }

    /// Names of the sheets written so far, in order.
    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    /// Whether no sheet has been written.
    pub fn is_empty(&self) -> bool {
        self.sheet_names.is_empty()
    }

    /// Write `table` as a new sheet and return the final sheet name.
    ///
    /// The name is truncated to 31 characters. The first column is treated as the
    /// label column; string columns are written as text and every other column is
    /// cast to floating point.
    pub fn write_table(&mut self, name: &str, table: &DataFrame) -> Result<String> {
        let name = truncate_sheet_name(name);
        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(&name)?;

        for (index, column) in table.get_columns().iter().enumerate() {
            let col = u16::try_from(index).map_err(|_| OutputError::TableTooLarge {
                sheet: name.clone(),
                reason: format!("{} columns", table.width()),
            })?;
            worksheet.write_string_with_format(0, col, column.name().as_str(), &self.formats.header)?;

            let series = column.as_materialized_series();
            let width = if series.dtype() == &DataType::String {
                write_text_column(worksheet, &name, col, series.str()?, &self.formats.text)?;
                MIN_VALUE_COLUMN_WIDTH as f64
            } else {
                let values = series.cast(&DataType::Float64)?;
                let values = values.f64()?;
                write_amount_column(worksheet, &name, col, values, &self.formats.amount)?;
                value_column_width(values.into_iter().flatten())
            };
            let width = if index == 0 { LABEL_COLUMN_WIDTH } else { width };
            worksheet.set_column_width(col, width)?;
        }

        debug!(
            "Wrote sheet {} ({} rows, {} columns)",
            name,
            table.height(),
            table.width()
        );
        self.sheet_names.push(name.clone());
        Ok(name)
    }

    /// Serialize the workbook to bytes.
    pub fn into_buffer(mut self) -> Result<Vec<u8>> {
        Ok(self.workbook.save_to_buffer()?)
    }

    /// Save the workbook to `path`.
    pub fn save<P: AsRef<Path>>(mut self, path: P) -> Result<()> {
        self.workbook.save(path.as_ref())?;
        debug!(
            "Saved {} sheets to {}",
            self.sheet_names.len(),
            path.as_ref().display()
        );
        Ok(())
    }
}

impl Default for WorkbookWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WorkbookWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkbookWriter")
            .field("sheet_names", &self.sheet_names)
            .finish_non_exhaustive()
    }
}

/// Worksheet row of the `offset`-th data cell, below the header.
fn data_row(sheet: &str, offset: usize) -> Result<u32> {
    u32::try_from(offset)
        .ok()
        .and_then(|row| row.checked_add(1))
        .ok_or_else(|| OutputError::TableTooLarge {
            sheet: sheet.to_string(),
            reason: format!("more than {} rows", u32::MAX),
        })
}

fn write_text_column(
    worksheet: &mut Worksheet,
    sheet: &str,
    col: u16,
    cells: &StringChunked,
    format: &Format,
) -> Result<()> {
    for (offset, cell) in cells.into_iter().enumerate() {
        let row = data_row(sheet, offset)?;
        match cell {
            Some(text) => worksheet.write_string_with_format(row, col, text, format)?,
            None => worksheet.write_blank(row, col, format)?,
        };
    }
    Ok(())
}

/// Blank amounts keep the bordered amount format.
fn write_amount_column(
    worksheet: &mut Worksheet,
    sheet: &str,
    col: u16,
    cells: &Float64Chunked,
    format: &Format,
) -> Result<()> {
    for (offset, cell) in cells.into_iter().enumerate() {
        let row = data_row(sheet, offset)?;
        match cell {
            Some(value) => worksheet.write_number_with_format(row, col, value, format)?,
            None => worksheet.write_blank(row, col, format)?,
        };
    }
    Ok(())
}
