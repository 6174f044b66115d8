//! Reporting of finished runs.
//!
//! Supports a tracing summary line, debug pretty-printing and JSON.

use anyhow::Result;
use tracing::{debug, info};

use crate::pipelines::RunSummary;

/// Logs run details using Rust's debug pretty-print format.
pub fn print_pretty(summary: &RunSummary) {
    debug!("{:#?}", summary);
}

/// Logs run details as pretty-printed JSON.
pub fn print_json(summary: &RunSummary) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

/// Logs a one-line summary of the run.
pub fn log_summary(summary: &RunSummary) {
    info!(
        pipeline = summary.pipeline,
        input = %summary.input.display(),
        output = %summary.output.display(),
        rows_loaded = summary.rows_loaded,
        rows_clean = summary.rows_clean,
        rows_dropped = summary.rows_dropped,
        sheets = summary.sheets.len(),
        "Report written"
    );
}
