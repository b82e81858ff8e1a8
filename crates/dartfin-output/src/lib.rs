#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dartfin/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod sheet;
pub mod workbook;

pub use sheet::{
    Granularity, MAX_SHEET_NAME_CHARS, XLSX_MIME_TYPE, download_file_name, sheet_name,
    truncate_sheet_name,
};
pub use workbook::{OutputError, Result, WorkbookWriter, format_thousands};
