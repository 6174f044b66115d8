//! XLSX rendering of a [`Report`] with rust_xlsxwriter.

use std::collections::BTreeMap;
use std::path::Path;

use rust_xlsxwriter::utility::{column_number_to_name, row_col_to_cell};
use rust_xlsxwriter::{
    Chart, ChartType, Format, FormatAlign, FormatBorder, Formula as XlsxFormula, Workbook,
    Worksheet,
};
use tracing::{debug, info};

use crate::error::ReportError;
use crate::report::ReportWriter;
use crate::report::table::{
    Cell, ChartKind, ChartSpec, ColumnKind, FormulaCell, PlacedTable, Report, Sheet, Table,
};

/// `SUBTOTAL` function number for a sum that ignores filtered-out rows.
const SUBTOTAL_SUM_VISIBLE: u32 = 109;

/// Writes reports as `.xlsx` workbooks.
#[derive(Clone, Debug)]
pub struct XlsxWriter {
    /// Number format for currency columns
    pub currency_format: String,
    /// Header fill, as `0xRRGGBB`
    pub header_color: u32,
}

impl Default for XlsxWriter {
    fn default() -> Self {
        Self {
            currency_format: "R$ #,##0.00".into(),
            header_color: 0xD7E4BC,
        }
    }
}

struct Formats {
    header: Format,
    currency: Format,
    ratio: Format,
    percent: Format,
}

impl Formats {
    fn for_kind(&self, kind: ColumnKind) -> Option<&Format> {
        match kind {
            ColumnKind::Currency => Some(&self.currency),
            ColumnKind::Ratio => Some(&self.ratio),
            ColumnKind::Percent => Some(&self.percent),
            ColumnKind::Text | ColumnKind::Count | ColumnKind::Number => None,
        }
    }
}

impl XlsxWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn create_formats(&self) -> Formats {
        Formats {
            header: Format::new()
                .set_bold()
                .set_text_wrap()
                .set_align(FormatAlign::Top)
                .set_background_color(self.header_color)
                .set_border(FormatBorder::Thin),
            currency: Format::new().set_num_format(&self.currency_format),
            ratio: Format::new().set_num_format("0.000"),
            percent: Format::new().set_num_format("0.00"),
        }
    }

    /// Builds the in-memory workbook for `report`.
    pub fn render(&self, report: &Report) -> Result<Workbook, ReportError> {
        let mut workbook = Workbook::new();
        let formats = self.create_formats();

        for sheet in &report.sheets {
            self.add_sheet(&mut workbook, sheet, &formats)?;
        }

        Ok(workbook)
    }

    /// Renders `report` to xlsx bytes.
    pub fn render_to_bytes(&self, report: &Report) -> Result<Vec<u8>, ReportError> {
        let mut workbook = self.render(report)?;
        Ok(workbook.save_to_buffer()?)
    }

    fn add_sheet(
        &self,
        workbook: &mut Workbook,
        sheet: &Sheet,
        formats: &Formats,
    ) -> Result<(), ReportError> {
        let ws = workbook.add_worksheet();
        ws.set_name(&sheet.name)?;

        let mut widths: BTreeMap<u16, f64> = BTreeMap::new();
        for placed in &sheet.tables {
            write_table(ws, placed, formats, &mut widths)?;
        }
        for (col, width) in widths {
            ws.set_column_width(col, width)?;
        }

        if sheet.freeze_header {
            ws.set_freeze_panes(1, 0)?;
        }

        for chart in &sheet.charts {
            insert_chart(ws, sheet, chart)?;
        }

        debug!(sheet = %sheet.name, tables = sheet.tables.len(), charts = sheet.charts.len(), "Sheet written");
        Ok(())
    }
}

impl ReportWriter for XlsxWriter {
    fn write(&self, report: &Report, path: &Path) -> Result<(), ReportError> {
        let mut workbook = self.render(report)?;
        workbook.save(path)?;
        info!(path = %path.display(), sheets = report.sheets.len(), "Workbook saved");
        Ok(())
    }
}

fn resolve(table: &Table, column: &str) -> Result<usize, ReportError> {
    table
        .column_index(column)
        .ok_or_else(|| ReportError::UnknownColumn {
            table: table.name.clone(),
            column: column.to_string(),
        })
}

/// A1 text of `fc` on its row of the sheet, e.g. `=C2*E2`.
fn formula_text(placed: &PlacedTable, fc: &FormulaCell) -> Result<String, ReportError> {
    let PlacedTable { anchor, table } = placed;
    resolve(table, &fc.column)?;
    for operand in fc.formula.operands() {
        resolve(table, operand)?;
    }

    let row = anchor.row + 1 + fc.row as u32;
    fc.formula
        .to_excel(|name| {
            table
                .column_index(name)
                .map(|i| row_col_to_cell(row, anchor.col + i as u16))
        })
        .ok_or_else(|| ReportError::UnknownColumn {
            table: table.name.clone(),
            column: fc.column.clone(),
        })
}

/// `SUBTOTAL` over the data rows of column `idx`, or `None` for a table without rows.
fn subtotal_text(placed: &PlacedTable, idx: usize) -> Option<String> {
    let PlacedTable { anchor, table } = placed;
    if table.is_empty() {
        return None;
    }
    let letter = column_number_to_name(anchor.col + idx as u16);
    // A1 rows are one-based
    let first = anchor.row + 2;
    let last = anchor.row + 1 + table.rows.len() as u32;
    Some(format!(
        "=SUBTOTAL({SUBTOTAL_SUM_VISIBLE},{letter}{first}:{letter}{last})"
    ))
}

/// Fixed width if the column has one, else longest value or header + 2.
fn column_width(table: &Table, i: usize) -> f64 {
    let column = &table.columns[i];
    if let Some(width) = column.width {
        return width;
    }
    let longest = table
        .rows
        .iter()
        .filter_map(|r| r.get(i))
        .map(Cell::width)
        .chain(std::iter::once(column.name.chars().count()))
        .max()
        .unwrap_or(0);
    let width = (longest + 2) as f64;
    if column.kind == ColumnKind::Currency {
        width.max(12.0)
    } else {
        width
    }
}

fn write_table(
    ws: &mut Worksheet,
    placed: &PlacedTable,
    formats: &Formats,
    widths: &mut BTreeMap<u16, f64>,
) -> Result<(), ReportError> {
    let PlacedTable { anchor, table } = placed;
    let data_row = |r: usize| anchor.row + 1 + r as u32;

    for (i, column) in table.columns.iter().enumerate() {
        ws.write_string_with_format(anchor.row, anchor.col + i as u16, &column.name, &formats.header)?;
    }

    for (r, row) in table.rows.iter().enumerate() {
        for (i, (cell, column)) in row.iter().zip(&table.columns).enumerate() {
            let col = anchor.col + i as u16;
            let format = formats.for_kind(column.kind);
            match (cell, format) {
                (Cell::Number(v), Some(f)) => ws.write_number_with_format(data_row(r), col, *v, f)?,
                (Cell::Number(v), None) => ws.write_number(data_row(r), col, *v)?,
                (Cell::Text(s), Some(f)) => ws.write_string_with_format(data_row(r), col, s, f)?,
                (Cell::Text(s), None) => ws.write_string(data_row(r), col, s)?,
            };
        }
    }

    for fc in &table.formulas {
        let target = resolve(table, &fc.column)?;
        let formula = XlsxFormula::new(formula_text(placed, fc)?);
        let formula = match table.rows.get(fc.row).and_then(|r| r.get(target)) {
            Some(Cell::Number(v)) => formula.set_result(v.to_string()),
            _ => formula,
        };

        let col = anchor.col + target as u16;
        match formats.for_kind(table.columns[target].kind) {
            Some(f) => ws.write_formula_with_format(data_row(fc.row), col, formula, f)?,
            None => ws.write_formula(data_row(fc.row), col, formula)?,
        };
    }

    if let Some(totals) = &table.totals {
        let row = data_row(table.rows.len());
        ws.write_string_with_format(row, anchor.col, &totals.label, &formats.header)?;

        for name in &totals.columns {
            let idx = resolve(table, name)?;
            let Some(text) = subtotal_text(placed, idx) else {
                continue;
            };
            let sum: f64 = table
                .rows
                .iter()
                .filter_map(|r| match r.get(idx) {
                    Some(Cell::Number(v)) => Some(*v),
                    _ => None,
                })
                .sum();
            let formula = XlsxFormula::new(text).set_result(sum.to_string());

            let col = anchor.col + idx as u16;
            match formats.for_kind(table.columns[idx].kind) {
                Some(f) => ws.write_formula_with_format(row, col, formula, f)?,
                None => ws.write_formula(row, col, formula)?,
            };
        }
    }

    if table.autofilter && table.width() > 0 {
        let last_col = anchor.col + table.width() as u16 - 1;
        ws.autofilter(anchor.row, anchor.col, anchor.row + table.rows.len() as u32, last_col)?;
    }

    for i in 0..table.width() {
        let entry = widths.entry(anchor.col + i as u16).or_insert(0.0);
        *entry = entry.max(column_width(table, i));
    }

    Ok(())
}

fn insert_chart(ws: &mut Worksheet, sheet: &Sheet, spec: &ChartSpec) -> Result<(), ReportError> {
    let placed = sheet
        .tables
        .get(spec.table)
        .ok_or_else(|| ReportError::UnknownTable {
            sheet: sheet.name.clone(),
            index: spec.table,
        })?;
    let table = &placed.table;

    let end = spec.rows.end.min(table.rows.len());
    if spec.rows.start >= end {
        debug!(sheet = %sheet.name, chart = %spec.title, "No rows to plot, chart skipped");
        return Ok(());
    }

    let category_col = placed.anchor.col + resolve(table, &spec.categories)? as u16;
    let value_col = placed.anchor.col + resolve(table, &spec.values)? as u16;
    let first_row = placed.anchor.row + 1 + spec.rows.start as u32;
    let last_row = placed.anchor.row + end as u32;

    let mut chart = Chart::new(match spec.kind {
        ChartKind::Column => ChartType::Column,
        ChartKind::Pie => ChartType::Pie,
    });
    chart
        .add_series()
        .set_name(spec.series_name.as_str())
        .set_categories((sheet.name.as_str(), first_row, category_col, last_row, category_col))
        .set_values((sheet.name.as_str(), first_row, value_col, last_row, value_col));
    chart.title().set_name(spec.title.as_str());
    if let Some(name) = &spec.x_axis {
        chart.x_axis().set_name(name.as_str());
    }
    if let Some(name) = &spec.y_axis {
        chart.y_axis().set_name(name.as_str());
    }

    ws.insert_chart_with_offset(spec.anchor.row, spec.anchor.col, &chart, spec.offset.0, spec.offset.1)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::table::{Anchor, Column, Formula};

    fn stock_table() -> Table {
        let mut table = Table::new(
            "Estoque",
            vec![
                Column::new("Produto", ColumnKind::Text),
                Column::new("Quantidade", ColumnKind::Count),
                Column::new("PVD", ColumnKind::Currency),
                Column::new("Total PVD", ColumnKind::Currency),
            ],
        );
        table.push_row(vec!["Boot".into(), Cell::Number(2.0), Cell::Number(10.0), Cell::Number(20.0)]);
        table.push_row(vec!["Sock".into(), Cell::Number(1.0), Cell::Number(5.0), Cell::Number(5.0)]);
        table
            .with_column_formula("Total PVD", Formula::product("Quantidade", "PVD"))
            .with_totals("TOTAIS", &["Quantidade", "Total PVD"])
            .with_autofilter()
    }

    fn report_with(table: Table, chart_rows: std::ops::Range<usize>) -> Report {
        let mut sheet = Sheet::new("Estoque");
        sheet.freeze_header = true;
        let idx = sheet.place(Anchor::ORIGIN, table);
        sheet.add_chart(ChartSpec {
            kind: ChartKind::Column,
            table: idx,
            categories: "Produto".into(),
            values: "Total PVD".into(),
            rows: chart_rows,
            series_name: "Total PVD".into(),
            title: "Total".into(),
            x_axis: Some("Produto".into()),
            y_axis: None,
            anchor: Anchor::new(1, 6),
            offset: (25, 10),
        });
        Report { sheets: vec![sheet] }
    }

    fn priced_table() -> Table {
        let mut table = Table::new(
            "Estoque",
            vec![
                Column::new("Produto", ColumnKind::Text),
                Column::new("Marca", ColumnKind::Text),
                Column::new("Quantidade", ColumnKind::Count).with_width(10.0),
                Column::new("Custo", ColumnKind::Currency),
                Column::new("PVD", ColumnKind::Currency),
                Column::new("Total PVD", ColumnKind::Currency),
                Column::new("MKUP", ColumnKind::Ratio),
            ],
        );
        for (qty, cost, price) in [(2.0, 50.0, 120.0), (4.0, 0.0, 10.0)] {
            table.push_row(vec![
                "Boot".into(),
                "ACME".into(),
                Cell::Number(qty),
                Cell::Number(cost),
                Cell::Number(price),
                Cell::Number(qty * price),
                Cell::Number(0.0),
            ]);
        }
        table
            .with_column_formula("Total PVD", Formula::product("Quantidade", "PVD"))
            .with_column_formula("MKUP", Formula::ratio_or_zero("PVD", "Custo"))
            .with_totals("TOTAIS", &["Quantidade", "Total PVD"])
    }

    fn formula_texts(placed: &PlacedTable) -> Vec<String> {
        placed
            .table
            .formulas
            .iter()
            .map(|fc| formula_text(placed, fc).unwrap())
            .collect()
    }

    #[test]
    fn test_formula_text_at_origin() {
        let placed = PlacedTable { anchor: Anchor::ORIGIN, table: priced_table() };

        assert_eq!(
            formula_texts(&placed),
            vec!["=C2*E2", "=C3*E3", "=IF(D2<>0,E2/D2,0)", "=IF(D3<>0,E3/D3,0)"]
        );
        assert_eq!(subtotal_text(&placed, 2).as_deref(), Some("=SUBTOTAL(109,C2:C3)"));
        assert_eq!(subtotal_text(&placed, 5).as_deref(), Some("=SUBTOTAL(109,F2:F3)"));
    }

    #[test]
    fn test_formula_text_with_shifted_anchor() {
        // L7: header on sheet row 7, data from row 8
        let placed = PlacedTable { anchor: Anchor::new(6, 11), table: priced_table() };

        let texts = formula_texts(&placed);
        assert_eq!(texts[0], "=N8*P8");
        assert_eq!(texts[3], "=IF(O9<>0,P9/O9,0)");
        assert_eq!(subtotal_text(&placed, 2).as_deref(), Some("=SUBTOTAL(109,N8:N9)"));
    }

    #[test]
    fn test_no_subtotal_without_rows() {
        let table = Table::new("Estoque", priced_table().columns).with_totals("TOTAIS", &["Quantidade"]);
        let placed = PlacedTable { anchor: Anchor::ORIGIN, table };
        assert_eq!(subtotal_text(&placed, 2), None);
    }

    #[test]
    fn test_column_widths() {
        let table = priced_table();
        // pinned
        assert_eq!(column_width(&table, 2), 10.0);
        // "Produto" header is the longest value
        assert_eq!(column_width(&table, 0), 9.0);
        // currency never narrower than 12
        assert_eq!(column_width(&table, 3), 12.0);
    }

    #[test]
    fn test_render_xlsx_signature() {
        let bytes = XlsxWriter::new().render_to_bytes(&report_with(stock_table(), 0..2)).unwrap();
        assert!(bytes.len() > 4, "XLSX too small");
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_empty_chart_range_is_skipped() {
        let table = Table::new("Estoque", stock_table().columns);
        let result = XlsxWriter::new().render_to_bytes(&report_with(table, 0..0));
        assert!(result.is_ok(), "render failed: {:?}", result.err());
    }

    #[test]
    fn test_unknown_formula_column_is_reported() {
        let table = stock_table().with_column_formula("Total PVD", Formula::product("Quantidade", "Preço"));
        let err = XlsxWriter::new().render_to_bytes(&report_with(table, 0..2)).unwrap_err();

        match err {
            ReportError::UnknownColumn { table, column } => {
                assert_eq!(table, "Estoque");
                assert_eq!(column, "Preço");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_chart_table_is_reported() {
        let mut report = report_with(stock_table(), 0..2);
        report.sheets[0].charts[0].table = 7;
        let err = XlsxWriter::new().render_to_bytes(&report).unwrap_err();
        assert!(matches!(err, ReportError::UnknownTable { index: 7, .. }));
    }

    #[test]
    fn test_write_to_file() {
        let path = std::env::temp_dir().join("retail_reports_test_write.xlsx");
        let _ = std::fs::remove_file(&path);

        XlsxWriter::new().write(&report_with(stock_table(), 0..2), &path).unwrap();
        assert!(path.exists());

        std::fs::remove_file(&path).unwrap();
    }
}
