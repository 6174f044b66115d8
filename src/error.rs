//! Error taxonomy shared by the loader, the pipelines and the report writer.

use thiserror::Error;

/// Errors that abort a report run.
///
/// Coercion problems inside individual rows are never reported here; they are
/// resolved by the cleaner (drop or fill) and only logged.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("column '{column}' not found in the CSV (accepted headers: {accepted}); check the exact header name")]
    MissingColumn { column: String, accepted: String },
    #[error("table '{table}' has no column named '{column}'")]
    UnknownColumn { table: String, column: String },
    #[error("sheet '{sheet}' has no table #{index}")]
    UnknownTable { sheet: String, index: usize },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

impl ReportError {
    /// Name of the column behind a [`ReportError::MissingColumn`], if that is what this is.
    pub fn missing_column(&self) -> Option<&str> {
        match self {
            ReportError::MissingColumn { column, .. } => Some(column),
            _ => None,
        }
    }
}
