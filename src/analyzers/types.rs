//! Data types produced by the aggregation pipeline.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::analyzers::classify::GenderBucket;

/// A finite numeric shoe size, usable as a grouping key.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(transparent)]
pub struct Size(f64);

impl Size {
    /// Returns `None` for non-finite values.
    pub fn new(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        // -0.0 and 0.0 must hash alike
        Some(Size(if value == 0.0 { 0.0 } else { value }))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for Size {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Size {}

impl Hash for Size {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for Size {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Size {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{}", self.0 as i64)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// One group of a group-by-sum: the key values and the summed metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow<K> {
    pub key: K,
    pub total: f64,
}

/// A row of the size report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeShare {
    pub size: Size,
    pub units: f64,
    /// Share of the relevant total, in percent.
    pub percent: f64,
    pub gender: GenderBucket,
}

/// Units sold per gender bucket, as a share of all units sold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenderTotal {
    pub gender: GenderBucket,
    pub units: f64,
    pub percent: f64,
}

/// Everything the sales workbook is built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesReport {
    pub top_n: usize,
    /// Keyed by (month, brand, size label); top N per (month, brand).
    pub top_by_brand: Vec<AggregateRow<(String, String, String)>>,
    /// Keyed by (month, size label); top N per month.
    pub top_by_month: Vec<AggregateRow<(String, String)>>,
    /// Every numeric size, most sold first, with its share of all units.
    pub sizes: Vec<SizeShare>,
    pub genders: Vec<GenderTotal>,
    /// Feminine sizes with shares relative to feminine units only.
    pub feminine: Vec<SizeShare>,
    /// Masculine sizes with shares relative to masculine units only.
    pub masculine: Vec<SizeShare>,
}

/// Variant rows consolidated under a single handle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub handle: String,
    pub title: String,
    pub brand: String,
    pub quantity: f64,
    pub unit_cost: f64,
    pub unit_price: f64,
}

/// A product with its stock value, markup and profit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductLine {
    pub title: String,
    pub brand: String,
    pub quantity: f64,
    pub unit_cost: f64,
    pub unit_price: f64,
    pub total_price: f64,
    pub total_cost: f64,
    pub markup: f64,
    pub profit: f64,
}

/// Average markup across a brand's products.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandMarkup {
    pub brand: String,
    pub mean_markup: f64,
}

/// Everything the stock workbook is built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockReport {
    pub top_n: usize,
    /// Products in stock, ordered by handle.
    pub lines: Vec<ProductLine>,
    pub markups: Vec<BrandMarkup>,
    /// Highest total cost first.
    pub top_cost: Vec<ProductLine>,
}
