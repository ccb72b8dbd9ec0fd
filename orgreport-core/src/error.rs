//! Report construction errors

use thiserror::Error;

/// Errors raised while shaping records into a report
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// A row did not carry a value for one of the report's columns
    #[error("row is missing column '{0}'")]
    MissingColumn(String),

    /// The requested sort column is not part of the report
    #[error("unknown sort column '{column}' (expected one of: {available})")]
    UnknownSortColumn {
        column: String,
        available: String,
    },
}
