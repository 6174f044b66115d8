//! CSV loader for the sales and inventory exports.
//!
//! Headers are trimmed before anything else happens, then every required
//! column is resolved to exactly one header up front so a bad export fails
//! before a single row is transformed. The resolved header is renamed to the
//! column's canonical name and any later header with an accepted spelling of
//! the same column is set aside, so serde only ever sees one of them.
//!
//! Rows deserialize into one typed record per export, with every field
//! optional: deciding what a missing value means is the cleaner's job. Short
//! rows are accepted and their trailing fields load as missing.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ReportError;

/// A required input column and the header spellings it is accepted under.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
}

impl Column {
    fn matches(&self, header: &str) -> bool {
        header == self.name || self.aliases.contains(&header)
    }

    fn accepted(&self) -> String {
        std::iter::once(self.name)
            .chain(self.aliases.iter().copied())
            .map(|h| format!("'{h}'"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A row shape the loader can produce.
pub trait Record: DeserializeOwned {
    /// Columns that must be present, checked in this order.
    const COLUMNS: &'static [Column];
}

/// One line of the "sales by product" export.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SalesRecord {
    #[serde(rename = "Mês")]
    pub month: Option<String>,
    #[serde(rename = "Fornecedor do produto")]
    pub brand: Option<String>,
    #[serde(rename = "Título da variante do produto")]
    pub size: Option<String>,
    #[serde(rename = "Itens líquidos vendidos")]
    pub units: Option<String>,
}

impl Record for SalesRecord {
    const COLUMNS: &'static [Column] = &[
        Column { name: "Mês", aliases: &["Month"] },
        Column { name: "Fornecedor do produto", aliases: &["Brand", "Supplier"] },
        Column { name: "Título da variante do produto", aliases: &["Variant Title"] },
        Column { name: "Itens líquidos vendidos", aliases: &["Net Units Sold"] },
    ];
}

/// One line of the product export; several lines may share a handle (one per variant).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InventoryRecord {
    #[serde(rename = "Handle")]
    pub handle: Option<String>,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Vendor")]
    pub vendor: Option<String>,
    #[serde(rename = "Variant Inventory Qty")]
    pub quantity: Option<String>,
    #[serde(rename = "Cost per item")]
    pub cost: Option<String>,
    #[serde(rename = "Variant Price")]
    pub price: Option<String>,
}

impl Record for InventoryRecord {
    const COLUMNS: &'static [Column] = &[
        Column { name: "Handle", aliases: &[] },
        Column { name: "Title", aliases: &[] },
        Column { name: "Vendor", aliases: &[] },
        Column { name: "Variant Inventory Qty", aliases: &["Inventory Qty"] },
        Column { name: "Cost per item", aliases: &[] },
        Column { name: "Variant Price", aliases: &["Price"] },
    ];
}

/// Maps every required column onto the first (already trimmed) header that
/// matches it, and returns the headers records should be read under.
///
/// The chosen header takes the column's canonical name. Other headers that
/// spell the same column are renamed out of the way. Fails with
/// [`ReportError::MissingColumn`] for the first column nothing matches.
pub fn resolve_headers(headers: &StringRecord, columns: &[Column]) -> Result<StringRecord, ReportError> {
    let mut resolved: Vec<String> = headers.iter().map(str::to_string).collect();

    for column in columns {
        let mut matching = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| column.matches(h))
            .map(|(i, _)| i);

        let Some(first) = matching.next() else {
            return Err(ReportError::MissingColumn {
                column: column.name.to_string(),
                accepted: column.accepted(),
            });
        };
        resolved[first] = column.name.to_string();

        for other in matching {
            debug!(column = column.name, header = %resolved[other], "Ignoring second spelling of column");
            resolved[other] = format!("{} #{}", resolved[other], other + 1);
        }
    }

    Ok(StringRecord::from(resolved))
}

/// Reads every row of a CSV export into `T`, in file order.
pub fn load_records<T: Record, R: Read>(reader: R) -> Result<Vec<T>, ReportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = resolve_headers(csv_reader.headers()?, T::COLUMNS)?;
    debug!(columns = headers.len(), "CSV headers resolved");
    csv_reader.set_headers(headers);

    let mut records = Vec::new();
    for result in csv_reader.deserialize() {
        let record: T = result?;
        records.push(record);
    }

    Ok(records)
}

/// Opens `path` and loads it with [`load_records`].
pub fn load_records_file<T: Record>(path: &Path) -> Result<Vec<T>, ReportError> {
    let file = File::open(path)?;
    load_records(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_sales_with_padded_headers() {
        let csv = " Mês ,Fornecedor do produto,  Título da variante do produto,Itens líquidos vendidos ,Extra\n\
                   2025-03,Nike,38,4,x\n\
                   2025-03,Nike,,2,y\n";
        let records: Vec<SalesRecord> = load_records(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].month.as_deref(), Some("2025-03"));
        assert_eq!(records[0].size.as_deref(), Some("38"));
        assert_eq!(records[0].units.as_deref(), Some("4"));
        assert_eq!(records[1].size, None);
    }

    #[test]
    fn test_load_sales_with_english_headers() {
        let csv = "Month,Supplier,Variant Title,Net Units Sold\n2025-04,Adidas,41,3\n";
        let records: Vec<SalesRecord> = load_records(csv.as_bytes()).unwrap();

        assert_eq!(records[0].brand.as_deref(), Some("Adidas"));
    }

    #[test]
    fn test_missing_column_is_named() {
        let csv = "Mês,Fornecedor do produto,Itens líquidos vendidos\n2025-03,Nike,4\n";
        let err = load_records::<SalesRecord, _>(csv.as_bytes()).unwrap_err();

        assert_eq!(err.missing_column(), Some("Título da variante do produto"));
        assert!(err.to_string().contains("Título da variante do produto"));
    }

    #[test]
    fn test_first_missing_column_wins() {
        let csv = "Handle,Vendor\nboot,Acme\n";
        let err = load_records::<InventoryRecord, _>(csv.as_bytes()).unwrap_err();

        assert_eq!(err.missing_column(), Some("Title"));
    }

    #[test]
    fn test_load_inventory_variants() {
        let csv = "Handle,Title,Vendor,Variant Inventory Qty,Cost per item,Variant Price\n\
                   boot,Boot,acme,3,50,120\n\
                   boot,,,2,,\n";
        let records: Vec<InventoryRecord> = load_records(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].handle.as_deref(), Some("boot"));
        assert_eq!(records[1].title, None);
        assert_eq!(records[1].cost, None);
    }

    #[test]
    fn test_short_row_loads_missing_fields() {
        let csv = "Mês,Fornecedor do produto,Título da variante do produto,Itens líquidos vendidos,Extra\n\
                   2025-03,Nike,38,4,x\n\
                   2025-03,Nike,39,2\n\
                   2025-03,Nike\n";
        let records: Vec<SalesRecord> = load_records(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[1].units.as_deref(), Some("2"));
        assert_eq!(records[2].size, None);
        assert_eq!(records[2].units, None);
    }

    #[test]
    fn test_both_spellings_first_header_wins() {
        let csv = "Handle,Title,Vendor,Variant Inventory Qty,Cost per item,Variant Price,Price\n\
                   boot,Boot,acme,3,50,120,99\n";
        let records: Vec<InventoryRecord> = load_records(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].price.as_deref(), Some("120"));

        let csv = "Price,Handle,Title,Vendor,Inventory Qty,Cost per item,Variant Price\n\
                   99,boot,Boot,acme,3,50,120\n";
        let records: Vec<InventoryRecord> = load_records(csv.as_bytes()).unwrap();
        assert_eq!(records[0].price.as_deref(), Some("99"));
        assert_eq!(records[0].quantity.as_deref(), Some("3"));
    }

    #[test]
    fn test_resolved_headers_use_canonical_names() {
        let headers = StringRecord::from(vec!["Month", "Brand", "Supplier", "Variant Title", "Net Units Sold"]);
        let resolved = resolve_headers(&headers, SalesRecord::COLUMNS).unwrap();

        assert_eq!(&resolved[0], "Mês");
        assert_eq!(&resolved[1], "Fornecedor do produto");
        assert_eq!(&resolved[2], "Supplier #3");
        assert_eq!(&resolved[3], "Título da variante do produto");
        assert_eq!(&resolved[4], "Itens líquidos vendidos");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_records_file::<InventoryRecord>(Path::new("/nonexistent/products.csv"));
        assert!(matches!(result, Err(ReportError::Io(_))));
    }
}
