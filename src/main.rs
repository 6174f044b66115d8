//! CLI entry point for the retail reports tool.
//!
//! Provides subcommands for the best-selling sizes workbook and the stock
//! value/markup workbook.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use retail_reports::config::{SALES_TOP_N, STOCK_TOP_N, Settings};
use retail_reports::naming::{
    PT_BR_MONTHS, SALES_REPORT_FILE, STOCK_REPORT_DIR, stock_report_file_name,
};
use retail_reports::output::{log_summary, print_json, print_pretty};
use retail_reports::pipelines::RunSummary;
use retail_reports::pipelines::sales::run_sales;
use retail_reports::pipelines::stock::run_stock;
use retail_reports::report::XlsxWriter;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "retail_reports")]
#[command(about = "Sales and stock spreadsheet reports from store exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Best-selling sizes by month, brand and gender from a sales export
    Sizes {
        /// Sales CSV export
        #[arg(value_name = "CSV")]
        input: PathBuf,

        /// Workbook to write (default: Relatorio_Vendas_Numeracoes.xlsx in the output dir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Sizes kept per month and per brand
        #[arg(long, default_value_t = SALES_TOP_N)]
        top: usize,

        /// Also log the run summary as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Stock value, markup and profit from an inventory export
    Stock {
        /// Inventory CSV export
        #[arg(value_name = "CSV")]
        input: PathBuf,

        /// Directory to write into (default: "PLANILHAS DE ESTOQUE" in the output dir)
        #[arg(short = 'd', long)]
        output_dir: Option<PathBuf>,

        /// Tag embedded in the file name (overrides REPORT_BRAND_TAG)
        #[arg(long)]
        brand_tag: Option<String>,

        /// Report date used in the file name, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Products kept in the top list by total cost
        #[arg(long, default_value_t = STOCK_TOP_N)]
        top: usize,

        /// Also log the run summary as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file
    let settings = Settings::from_env();

    // Logging setup: colored stderr + JSON rolling log file
    let log_dir = settings
        .log_file_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = settings
        .log_file_path
        .file_name()
        .unwrap_or(OsStr::new("retail_reports.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let writer = XlsxWriter::new();

    let (summary, json) = match cli.command {
        Commands::Sizes {
            input,
            output,
            top,
            json,
        } => {
            let output = output.unwrap_or_else(|| settings.output_dir.join(SALES_REPORT_FILE));
            (run_sales(&input, &output, top, &writer)?, json)
        }
        Commands::Stock {
            input,
            output_dir,
            brand_tag,
            date,
            top,
            json,
        } => {
            let dir = output_dir.unwrap_or_else(|| settings.output_dir.join(STOCK_REPORT_DIR));
            let brand_tag = brand_tag.unwrap_or_else(|| settings.brand_tag.clone());
            let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            let output = dir.join(stock_report_file_name(&brand_tag, date, &PT_BR_MONTHS));
            (run_stock(&input, &output, top, &writer)?, json)
        }
    };

    report(&summary, json)
}

fn report(summary: &RunSummary, json: bool) -> Result<()> {
    log_summary(summary);
    print_pretty(summary);
    if json {
        print_json(summary)?;
    }
    Ok(())
}
