//! Render-ready report model.
//!
//! A [`Report`] is a list of sheets; each sheet holds tables placed at fixed
//! anchors plus chart specs that point back into those tables. Everything is
//! addressed by column *name*: formulas, totals and charts never carry cell
//! coordinates, the writer resolves names to positions when it renders.

use std::ops::Range;

use serde::Serialize;

/// Numeric semantics of a column, used by writers to pick a number format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnKind {
    Text,
    Count,
    Number,
    Currency,
    /// Ratio shown with three decimals.
    Ratio,
    Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    /// Fixed display width; fitted to the content when `None`.
    pub width: Option<f64>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
            width: None,
        }
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    /// A number when `label` parses as one, text otherwise.
    pub fn label(label: &str) -> Self {
        match label.parse::<f64>() {
            Ok(v) if v.is_finite() => Cell::Number(v),
            _ => Cell::Text(label.to_string()),
        }
    }

    /// Display width in characters, as used for column sizing.
    pub fn width(&self) -> usize {
        match self {
            Cell::Text(s) => s.chars().count(),
            Cell::Number(v) => v.to_string().len(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

/// A live formula over sibling cells of the same row, by column name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Formula {
    /// `left * right`
    Product(String, String),
    /// `left - right`
    Difference(String, String),
    /// `numerator / denominator`, or 0 when the denominator is 0.
    RatioOrZero {
        numerator: String,
        denominator: String,
    },
}

impl Formula {
    pub fn product(left: &str, right: &str) -> Self {
        Formula::Product(left.to_string(), right.to_string())
    }

    pub fn difference(left: &str, right: &str) -> Self {
        Formula::Difference(left.to_string(), right.to_string())
    }

    pub fn ratio_or_zero(numerator: &str, denominator: &str) -> Self {
        Formula::RatioOrZero {
            numerator: numerator.to_string(),
            denominator: denominator.to_string(),
        }
    }

    /// Column names this formula reads.
    pub fn operands(&self) -> [&str; 2] {
        match self {
            Formula::Product(a, b) | Formula::Difference(a, b) => [a.as_str(), b.as_str()],
            Formula::RatioOrZero {
                numerator,
                denominator,
            } => [numerator.as_str(), denominator.as_str()],
        }
    }

    /// Spreadsheet text for this formula, given a resolver from column name
    /// to cell reference on the current row. `None` if a name does not resolve.
    pub fn to_excel(&self, cell: impl Fn(&str) -> Option<String>) -> Option<String> {
        let text = match self {
            Formula::Product(a, b) => format!("={}*{}", cell(a)?, cell(b)?),
            Formula::Difference(a, b) => format!("={}-{}", cell(a)?, cell(b)?),
            Formula::RatioOrZero {
                numerator,
                denominator,
            } => {
                let (n, d) = (cell(numerator)?, cell(denominator)?);
                format!("=IF({d}<>0,{n}/{d},0)")
            }
        };
        Some(text)
    }
}

/// A formula replacing the static value at one data cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormulaCell {
    /// Zero-based data row (the header is not counted).
    pub row: usize,
    pub column: String,
    pub formula: Formula,
}

/// A totals row under the data, summing visible rows of each listed column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totals {
    pub label: String,
    pub columns: Vec<String>,
}

/// An ordered table with a header row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Cell>>,
    pub formulas: Vec<FormulaCell>,
    pub totals: Option<Totals>,
    pub autofilter: bool,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
            formulas: Vec::new(),
            totals: None,
            autofilter: false,
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    /// Adds the same formula to `column` on every data row.
    pub fn with_column_formula(mut self, column: &str, formula: Formula) -> Self {
        for row in 0..self.rows.len() {
            self.formulas.push(FormulaCell {
                row,
                column: column.to_string(),
                formula: formula.clone(),
            });
        }
        self
    }

    pub fn with_totals(mut self, label: impl Into<String>, columns: &[&str]) -> Self {
        self.totals = Some(Totals {
            label: label.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        });
        self
    }

    pub fn with_autofilter(mut self) -> Self {
        self.autofilter = true;
        self
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Rows occupied on the sheet: header, data and the totals row if any.
    pub fn height(&self) -> usize {
        1 + self.rows.len() + usize::from(self.totals.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Zero-based sheet position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Anchor {
    pub row: u32,
    pub col: u16,
}

impl Anchor {
    pub const ORIGIN: Anchor = Anchor { row: 0, col: 0 };

    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartKind {
    Column,
    Pie,
}

/// A single-series chart over two columns of a table on the same sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    /// Index into the sheet's tables.
    pub table: usize,
    pub categories: String,
    pub values: String,
    /// Data rows to plot.
    pub rows: Range<usize>,
    pub series_name: String,
    pub title: String,
    pub x_axis: Option<String>,
    pub y_axis: Option<String>,
    pub anchor: Anchor,
    /// Pixel offset from the anchor cell.
    pub offset: (u32, u32),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedTable {
    pub anchor: Anchor,
    pub table: Table,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    pub name: String,
    pub tables: Vec<PlacedTable>,
    pub charts: Vec<ChartSpec>,
    pub freeze_header: bool,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
            charts: Vec::new(),
            freeze_header: false,
        }
    }

    /// Places `table` at `anchor` and returns its index for chart references.
    pub fn place(&mut self, anchor: Anchor, table: Table) -> usize {
        self.tables.push(PlacedTable { anchor, table });
        self.tables.len() - 1
    }

    pub fn add_chart(&mut self, chart: ChartSpec) {
        self.charts.push(chart);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub sheets: Vec<Sheet>,
}

impl Report {
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}
