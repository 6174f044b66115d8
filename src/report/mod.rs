//! Report model and the writers that render it.
//!
//! The analysis side only ever builds a [`Report`]; fonts, number formats,
//! column widths and charts are entirely the writer's business.

pub mod table;
pub mod xlsx;

use std::path::Path;

use crate::error::ReportError;

pub use table::{
    Anchor, Cell, ChartKind, ChartSpec, Column, ColumnKind, Formula, FormulaCell, PlacedTable,
    Report, Sheet, Table, Totals,
};
pub use xlsx::XlsxWriter;

/// Renders a [`Report`] to a file.
pub trait ReportWriter {
    fn write(&self, report: &Report, path: &Path) -> Result<(), ReportError>;
}
