//! End-to-end report runs: load, clean, analyze, lay out, write.
//!
//! Each run builds its whole workbook in memory and hands it to the writer
//! only at the end, so a failed run leaves no output file behind.

pub mod sales;
pub mod stock;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ReportError;
use crate::report::{Report, ReportWriter};

/// What a finished run did, for logging.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub pipeline: &'static str,
    pub finished_at: DateTime<Utc>,
    pub input: PathBuf,
    pub output: PathBuf,
    pub rows_loaded: usize,
    pub rows_clean: usize,
    pub rows_dropped: usize,
    pub sheets: Vec<String>,
}

/// Creates the output's parent directory if needed, then writes the report.
pub(crate) fn save(
    writer: &impl ReportWriter,
    report: &Report,
    output: &Path,
) -> Result<(), ReportError> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    writer.write(report, output)
}
