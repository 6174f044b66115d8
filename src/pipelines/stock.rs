//! Stock value, markup and profit report.
//!
//! Everything lands on one sheet: the product table with live formulas and a
//! subtotal row at A1, the mean markup per brand two columns to its right,
//! and the top products by total cost three rows under the subtotals.

use std::path::Path;

use chrono::Utc;
use tracing::info;

use crate::analyzers::analyzer::analyze_stock;
use crate::analyzers::types::{ProductLine, StockReport};
use crate::cleaner::clean_inventory;
use crate::error::ReportError;
use crate::parser::{InventoryRecord, load_records_file};
use crate::pipelines::{RunSummary, save};
use crate::report::{Anchor, Cell, Column, ColumnKind, Formula, Report, ReportWriter, Sheet, Table};

pub const PRODUCT: &str = "Produto";
pub const BRAND: &str = "Marca";
pub const QUANTITY: &str = "Quantidade";
pub const COST: &str = "Custo";
pub const PRICE: &str = "PVD";
pub const TOTAL_PRICE: &str = "Total PVD";
pub const TOTAL_COST: &str = "Total Custo";
pub const MARKUP: &str = "MKUP";
pub const PROFIT: &str = "LUCRO";
pub const MEAN_MARKUP: &str = "Média MKUP";

pub const STOCK_SHEET: &str = "Estoque";
pub const TOTALS_LABEL: &str = "TOTAIS (SUBTOTAL)";

/// Empty columns left between tables placed side by side.
const COLUMN_GAP: usize = 2;
/// Empty rows left between tables placed one above the other.
const ROW_GAP: usize = 2;
const QUANTITY_WIDTH: f64 = 10.0;

fn product_table(name: &str, lines: &[ProductLine]) -> Table {
    let mut table = Table::new(
        name,
        vec![
            Column::new(PRODUCT, ColumnKind::Text),
            Column::new(BRAND, ColumnKind::Text),
            Column::new(QUANTITY, ColumnKind::Count).with_width(QUANTITY_WIDTH),
            Column::new(COST, ColumnKind::Currency),
            Column::new(PRICE, ColumnKind::Currency),
            Column::new(TOTAL_PRICE, ColumnKind::Currency),
            Column::new(TOTAL_COST, ColumnKind::Currency),
            Column::new(MARKUP, ColumnKind::Ratio),
            Column::new(PROFIT, ColumnKind::Currency),
        ],
    );
    for l in lines {
        table.push_row(vec![
            l.title.as_str().into(),
            l.brand.as_str().into(),
            Cell::Number(l.quantity),
            Cell::Number(l.unit_cost),
            Cell::Number(l.unit_price),
            Cell::Number(l.total_price),
            Cell::Number(l.total_cost),
            Cell::Number(l.markup),
            Cell::Number(l.profit),
        ]);
    }
    table
}

/// Lays the stock analysis out on a single sheet.
pub fn stock_workbook(report: &StockReport) -> Report {
    let main = product_table(STOCK_SHEET, &report.lines)
        .with_column_formula(TOTAL_PRICE, Formula::product(QUANTITY, PRICE))
        .with_column_formula(TOTAL_COST, Formula::product(QUANTITY, COST))
        .with_column_formula(MARKUP, Formula::ratio_or_zero(PRICE, COST))
        .with_column_formula(PROFIT, Formula::difference(TOTAL_PRICE, TOTAL_COST))
        .with_totals(TOTALS_LABEL, &[QUANTITY, TOTAL_PRICE, TOTAL_COST, PROFIT])
        .with_autofilter();

    let mut markups = Table::new(
        "Media_MKUP",
        vec![
            Column::new(BRAND, ColumnKind::Text),
            Column::new(MEAN_MARKUP, ColumnKind::Ratio),
        ],
    );
    for m in &report.markups {
        markups.push_row(vec![m.brand.as_str().into(), Cell::Number(m.mean_markup)]);
    }

    let top = product_table(&format!("Top{}_Custo", report.top_n), &report.top_cost);

    let markup_anchor = Anchor::new(0, (main.width() + COLUMN_GAP) as u16);
    let top_anchor = Anchor::new((main.height() + ROW_GAP) as u32, 0);

    let mut sheet = Sheet::new(STOCK_SHEET);
    sheet.freeze_header = true;
    sheet.place(Anchor::ORIGIN, main);
    sheet.place(markup_anchor, markups);
    sheet.place(top_anchor, top);

    Report { sheets: vec![sheet] }
}

/// Runs the stock report from `input` to `output`.
#[tracing::instrument(skip_all, fields(input = %input.display(), output = %output.display(), top_n = top_n))]
pub fn run_stock(
    input: &Path,
    output: &Path,
    top_n: usize,
    writer: &impl ReportWriter,
) -> Result<RunSummary, ReportError> {
    let records: Vec<InventoryRecord> = load_records_file(input)?;
    let rows_loaded = records.len();

    let rows = clean_inventory(records);
    let analysis = analyze_stock(&rows, top_n);
    let report = stock_workbook(&analysis);

    save(writer, &report, output)?;
    info!(products = analysis.lines.len(), "Stock report generated");

    Ok(RunSummary {
        pipeline: "stock",
        finished_at: Utc::now(),
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        rows_loaded,
        rows_clean: rows.len(),
        rows_dropped: rows_loaded - rows.len(),
        sheets: report.sheet_names(),
    })
}
