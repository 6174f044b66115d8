//! Turns loaded records into clean, typed rows.
//!
//! The two exports are cleaned under different rules and those rules are kept
//! separate on purpose: a sales row without a size is dropped, while an
//! inventory row with a bad number is kept with that number set to zero.

use tracing::{debug, info};

use crate::analyzers::types::Size;
use crate::parser::{InventoryRecord, SalesRecord};

/// Title of the placeholder products that never belong in a stock report.
const TEST_PRODUCT_TITLE: &str = "teste";

/// A sales line with a size present and units coerced to a number.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleRow {
    pub month: String,
    pub brand: String,
    /// Size exactly as exported, used as the ranking key.
    pub size: String,
    /// Numeric reading of `size`, absent when the label is not a number.
    pub size_value: Option<Size>,
    pub units: f64,
}

/// A product variant line with every numeric field finite.
#[derive(Debug, Clone, PartialEq)]
pub struct StockRow {
    pub handle: String,
    pub title: String,
    pub brand: String,
    pub quantity: f64,
    pub unit_cost: f64,
    pub unit_price: f64,
}

/// Parses a numeric cell. Missing, malformed and non-finite values all yield `None`.
pub fn coerce_number(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Drops rows without a size, coercing units (missing or malformed count as 0).
pub fn clean_sales(records: Vec<SalesRecord>) -> Vec<SaleRow> {
    let total = records.len();
    let mut rows = Vec::with_capacity(total);

    for (line, record) in records.into_iter().enumerate() {
        let Some(size) = record.size.filter(|s| !s.is_empty()) else {
            debug!(line = line + 2, "Dropping sales row without size");
            continue;
        };

        let units = coerce_number(record.units.as_deref()).unwrap_or_else(|| {
            debug!(line = line + 2, units = ?record.units, "Units not numeric, counting as 0");
            0.0
        });

        rows.push(SaleRow {
            month: record.month.unwrap_or_default(),
            brand: record.brand.unwrap_or_default(),
            size_value: coerce_number(Some(&size)).and_then(Size::new),
            size,
            units,
        });
    }

    info!(loaded = total, kept = rows.len(), dropped = total - rows.len(), "Sales rows cleaned");
    rows
}

/// Removes test products, fills bad numbers with 0 and upper-cases the brand.
pub fn clean_inventory(records: Vec<InventoryRecord>) -> Vec<StockRow> {
    let total = records.len();

    let rows: Vec<StockRow> = records
        .into_iter()
        .filter(|r| {
            r.title
                .as_deref()
                .is_none_or(|t| t.to_lowercase() != TEST_PRODUCT_TITLE)
        })
        .map(|r| StockRow {
            quantity: coerce_number(r.quantity.as_deref()).unwrap_or(0.0),
            unit_cost: coerce_number(r.cost.as_deref()).unwrap_or(0.0),
            unit_price: coerce_number(r.price.as_deref()).unwrap_or(0.0),
            handle: r.handle.unwrap_or_default(),
            title: r.title.unwrap_or_default(),
            brand: r.vendor.map(|v| v.to_uppercase()).unwrap_or_default(),
        })
        .collect();

    info!(loaded = total, kept = rows.len(), removed = total - rows.len(), "Inventory rows cleaned");
    rows
}
