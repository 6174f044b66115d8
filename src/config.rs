//! Environment-backed settings.
//!
//! Values come from the process environment (a `.env` file is loaded by the
//! binary before this is read). Command line flags override them.

use std::path::PathBuf;

/// Default number of sizes kept per month or per brand.
pub const SALES_TOP_N: usize = 5;

/// Default number of products kept in the stock top list.
pub const STOCK_TOP_N: usize = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Base directory for generated workbooks (`REPORT_OUTPUT_DIR`).
    pub output_dir: PathBuf,
    /// Tag embedded in stock report file names (`REPORT_BRAND_TAG`).
    pub brand_tag: String,
    /// Rolling JSON log file (`LOG_FILE_PATH`).
    pub log_file_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            brand_tag: "URB_LAB".to_string(),
            log_file_path: PathBuf::from("logs/retail_reports.log"),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable lookup; unset or blank values keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            output_dir: get("REPORT_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            brand_tag: get("REPORT_BRAND_TAG").unwrap_or(defaults.brand_tag),
            log_file_path: get("LOG_FILE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file_path),
        }
    }
}
