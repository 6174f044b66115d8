//! Best-selling sizes report.

use std::path::Path;

use chrono::Utc;
use tracing::info;

use crate::analyzers::analyzer::analyze_sales;
use crate::analyzers::types::{SalesReport, SizeShare};
use crate::cleaner::clean_sales;
use crate::error::ReportError;
use crate::parser::{SalesRecord, load_records_file};
use crate::pipelines::{RunSummary, save};
use crate::report::{
    Anchor, Cell, ChartKind, ChartSpec, Column, ColumnKind, Report, ReportWriter, Sheet, Table,
};

pub const MONTH: &str = "Mes";
pub const BRAND: &str = "Marca";
pub const SIZE: &str = "Numeracao";
pub const UNITS: &str = "QtdVendida";
pub const PERCENT: &str = "Percentual";
pub const GENDER: &str = "Genero";

pub const SIZES_SHEET: &str = "Relatorio_Final";
pub const GENDER_SHEET: &str = "Resumo_Genero";
pub const FEMININE_SHEET: &str = "Comparacao_Feminino";
pub const MASCULINE_SHEET: &str = "Comparacao_Masculino";

const SIZE_AXIS: &str = "Numeração";
const UNITS_AXIS: &str = "Quantidade Vendida";
const CHART_OFFSET: (u32, u32) = (25, 10);

/// Name of the per-brand ranking sheet, e.g. `Top5_Marca`.
pub fn top_by_brand_sheet(n: usize) -> String {
    format!("Top{n}_Marca")
}

/// Name of the per-month ranking sheet, e.g. `Top5_Mes`.
pub fn top_by_month_sheet(n: usize) -> String {
    format!("Top{n}_Mes")
}

fn size_table(name: &str, sizes: &[SizeShare]) -> Table {
    let mut table = Table::new(
        name,
        vec![
            Column::new(SIZE, ColumnKind::Number),
            Column::new(UNITS, ColumnKind::Count),
            Column::new(PERCENT, ColumnKind::Percent),
            Column::new(GENDER, ColumnKind::Text),
        ],
    );
    for s in sizes {
        table.push_row(vec![
            Cell::Number(s.size.value()),
            Cell::Number(s.units),
            Cell::Number(s.percent),
            s.gender.label().into(),
        ]);
    }
    table
}

fn column_chart(table: usize, rows: usize, categories: &str, series: &str, title: &str, anchor: Anchor) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Column,
        table,
        categories: categories.to_string(),
        values: UNITS.to_string(),
        rows: 0..rows,
        series_name: series.to_string(),
        title: title.to_string(),
        x_axis: Some(SIZE_AXIS.to_string()),
        y_axis: Some(UNITS_AXIS.to_string()),
        anchor,
        offset: CHART_OFFSET,
    }
}

/// Lays the sales analysis out as six sheets with their charts.
pub fn sales_workbook(report: &SalesReport) -> Report {
    let mut sheets = Vec::new();

    let mut sizes = Sheet::new(SIZES_SHEET);
    let idx = sizes.place(Anchor::ORIGIN, size_table(SIZES_SHEET, &report.sizes));
    if !report.sizes.is_empty() {
        sizes.add_chart(column_chart(
            idx,
            report.sizes.len(),
            SIZE,
            UNITS,
            "Vendas por Numeração",
            Anchor::new(1, 5),
        ));
    }
    sheets.push(sizes);

    let mut genders = Sheet::new(GENDER_SHEET);
    let mut table = Table::new(
        GENDER_SHEET,
        vec![
            Column::new(GENDER, ColumnKind::Text),
            Column::new(UNITS, ColumnKind::Count),
            Column::new(PERCENT, ColumnKind::Percent),
        ],
    );
    for g in &report.genders {
        table.push_row(vec![g.gender.label().into(), Cell::Number(g.units), Cell::Number(g.percent)]);
    }
    let idx = genders.place(Anchor::ORIGIN, table);
    if !report.genders.is_empty() {
        genders.add_chart(ChartSpec {
            kind: ChartKind::Pie,
            table: idx,
            categories: GENDER.to_string(),
            values: UNITS.to_string(),
            rows: 0..report.genders.len(),
            series_name: "Resumo por Gênero".to_string(),
            title: "Percentual por Gênero".to_string(),
            x_axis: None,
            y_axis: None,
            anchor: Anchor::new(1, 4),
            offset: CHART_OFFSET,
        });
    }
    sheets.push(genders);

    let name = top_by_brand_sheet(report.top_n);
    let mut by_brand = Sheet::new(&name);
    let mut table = Table::new(
        &name,
        vec![
            Column::new(MONTH, ColumnKind::Text),
            Column::new(BRAND, ColumnKind::Text),
            Column::new(SIZE, ColumnKind::Number),
            Column::new(UNITS, ColumnKind::Count),
        ],
    );
    for g in &report.top_by_brand {
        let (month, brand, size) = &g.key;
        table.push_row(vec![
            month.as_str().into(),
            brand.as_str().into(),
            Cell::label(size),
            Cell::Number(g.total),
        ]);
    }
    let idx = by_brand.place(Anchor::ORIGIN, table);
    // only the first month is charted
    if let Some(first) = report.top_by_brand.first() {
        let month = &first.key.0;
        let rows = report
            .top_by_brand
            .iter()
            .take_while(|g| &g.key.0 == month)
            .count();
        by_brand.add_chart(column_chart(
            idx,
            rows,
            SIZE,
            &format!("Top{} por Marca - {month}", report.top_n),
            &format!("Top{} Numerações por Marca - {month}", report.top_n),
            Anchor::new(1, 7),
        ));
    }
    sheets.push(by_brand);

    let name = top_by_month_sheet(report.top_n);
    let mut by_month = Sheet::new(&name);
    let mut table = Table::new(
        &name,
        vec![
            Column::new(MONTH, ColumnKind::Text),
            Column::new(SIZE, ColumnKind::Number),
            Column::new(UNITS, ColumnKind::Count),
        ],
    );
    for g in &report.top_by_month {
        let (month, size) = &g.key;
        table.push_row(vec![month.as_str().into(), Cell::label(size), Cell::Number(g.total)]);
    }
    let idx = by_month.place(Anchor::ORIGIN, table);
    if !report.top_by_month.is_empty() {
        by_month.add_chart(column_chart(
            idx,
            report.top_by_month.len(),
            SIZE,
            &format!("Top{} por Mês", report.top_n),
            &format!("Top{} Numerações por Mês", report.top_n),
            Anchor::new(1, 4),
        ));
    }
    sheets.push(by_month);

    let mut feminine = Sheet::new(FEMININE_SHEET);
    feminine.place(Anchor::ORIGIN, size_table(FEMININE_SHEET, &report.feminine));
    sheets.push(feminine);

    let mut masculine = Sheet::new(MASCULINE_SHEET);
    masculine.place(Anchor::ORIGIN, size_table(MASCULINE_SHEET, &report.masculine));
    sheets.push(masculine);

    Report { sheets }
}

/// Runs the sales report from `input` to `output`.
#[tracing::instrument(skip_all, fields(input = %input.display(), output = %output.display(), top_n = top_n))]
pub fn run_sales(
    input: &Path,
    output: &Path,
    top_n: usize,
    writer: &impl ReportWriter,
) -> Result<RunSummary, ReportError> {
    let records: Vec<SalesRecord> = load_records_file(input)?;
    let rows_loaded = records.len();

    let rows = clean_sales(records);
    let analysis = analyze_sales(&rows, top_n);
    let report = sales_workbook(&analysis);

    save(writer, &report, output)?;
    info!("Sales report generated");

    Ok(RunSummary {
        pipeline: "sizes",
        finished_at: Utc::now(),
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        rows_loaded,
        rows_clean: rows.len(),
        rows_dropped: rows_loaded - rows.len(),
        sheets: report.sheet_names(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::Size;
    use crate::cleaner::SaleRow;

    fn sale(month: &str, brand: &str, size: &str, units: f64) -> SaleRow {
        SaleRow {
            month: month.into(),
            brand: brand.into(),
            size: size.into(),
            size_value: size.parse::<f64>().ok().and_then(Size::new),
            units,
        }
    }

    #[test]
    fn test_sheet_order() {
        let report = sales_workbook(&analyze_sales(&[sale("Jan", "A", "38", 1.0)], 5));
        assert_eq!(
            report.sheet_names(),
            vec![
                "Relatorio_Final",
                "Resumo_Genero",
                "Top5_Marca",
                "Top5_Mes",
                "Comparacao_Feminino",
                "Comparacao_Masculino",
            ]
        );
    }

    #[test]
    fn test_brand_chart_covers_first_month_only() {
        let rows = vec![
            sale("2025-03", "A", "38", 3.0),
            sale("2025-03", "B", "40", 2.0),
            sale("2025-04", "A", "39", 9.0),
        ];
        let report = sales_workbook(&analyze_sales(&rows, 5));
        let sheet = report.sheet("Top5_Marca").unwrap();

        assert_eq!(sheet.tables[0].table.rows.len(), 3);
        assert_eq!(sheet.charts.len(), 1);
        assert_eq!(sheet.charts[0].rows, 0..2);
        assert_eq!(sheet.charts[0].series_name, "Top5 por Marca - 2025-03");
    }

    #[test]
    fn test_no_charts_for_empty_tables() {
        let report = sales_workbook(&analyze_sales(&[], 5));
        assert!(report.sheets.iter().all(|s| s.charts.is_empty()));
        assert!(report.sheets.iter().all(|s| s.tables[0].table.is_empty()));
    }

    #[test]
    fn test_labels_written_as_numbers_when_numeric() {
        let report = sales_workbook(&analyze_sales(&[sale("Jan", "A", "38", 1.0)], 5));
        let table = &report.sheet("Top5_Mes").unwrap().tables[0].table;
        assert_eq!(table.rows[0][1], Cell::Number(38.0));
    }
}
