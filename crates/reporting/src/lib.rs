//! Read side of the order desk.
//!
//! - [`Aggregator`] groups raw order lines into per-checkout [`Submission`]s
//! - [`ReportService`] applies the access rules before grouping
//! - [`export`] renders submissions as an xlsx workbook
//!
//! The JSON listing and the export both go through [`ReportService`], so
//! they always report the same groups and totals.

pub mod aggregator;
pub mod error;
pub mod export;
pub mod report;

pub use aggregator::{Aggregator, Submission, format_line, grand_total};
pub use error::{ReportError, Result};
pub use export::{EXPORT_FILENAME, ExportRow, XLSX_CONTENT_TYPE};
pub use report::ReportService;
