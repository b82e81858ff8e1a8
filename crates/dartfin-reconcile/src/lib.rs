#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/dartfin/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod columns;
pub mod error;
pub mod reconcile;
pub mod selector;

pub use columns::{LABEL, Period, Quarter, StatementKind, ValueColumn};
pub use error::{ReconcileError, Result};
pub use reconcile::{QuarterlyBundle, reconcile};
pub use selector::{StatementViews, amendment_key, select, select_received_in, supersede_amendments};
