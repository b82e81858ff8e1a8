#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dartfin/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod pipeline;

// Re-export main types from sub-crates
pub use dartfin_data as data;
pub use dartfin_output as output;
pub use dartfin_reconcile as reconcile;

pub use pipeline::{
    IncomeStatementRequest, PipelineError, Result, RunSummary, build_workbook, parse_date,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
