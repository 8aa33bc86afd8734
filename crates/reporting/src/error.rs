//! Reporting error types.

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur while building a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Access check or store read failed.
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// A submission total does not fit the money type.
    #[error("Submission total overflows for {user}")]
    TotalOverflow { user: String },

    /// The sum of all submission totals does not fit the money type.
    #[error("Grand total overflows")]
    GrandTotalOverflow,

    /// An amount is too large for an exact spreadsheet number cell.
    #[error("Amount {0} cannot be written exactly")]
    InexactAmount(common::Money),

    /// The workbook could not be written.
    #[error("Export error: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),
}

/// Result type for reporting operations.
pub type Result<T> = std::result::Result<T, ReportError>;
