use tracing::info;

use crate::analyzers::aggregate::{
    consolidate_products, grand_total, group_mean, group_sum, percent_of_total,
};
use crate::analyzers::classify::GenderBucket;
use crate::analyzers::rank::{sort_desc, top_n, top_n_per_partition};
use crate::analyzers::types::{
    BrandMarkup, GenderTotal, Product, ProductLine, SalesReport, SizeShare, StockReport,
};
use crate::analyzers::utility::{pct, round_to};
use crate::cleaner::{SaleRow, StockRow};

/// Decimal places kept for markups.
const MARKUP_DECIMALS: i32 = 3;

/// Builds every table of the sales report from clean rows.
pub fn analyze_sales(rows: &[SaleRow], n: usize) -> SalesReport {
    let by_brand = group_sum(
        rows,
        |r| (r.month.clone(), r.brand.clone(), r.size.clone()),
        |r| r.units,
    );
    let top_by_brand = top_n_per_partition(
        by_brand,
        n,
        |g| (g.key.0.clone(), g.key.1.clone()),
        |g| g.total,
    );

    let by_month = group_sum(rows, |r| (r.month.clone(), r.size.clone()), |r| r.units);
    let top_by_month = top_n_per_partition(by_month, n, |g| g.key.0.clone(), |g| g.total);

    let by_size = group_sum(
        rows.iter().filter_map(|r| r.size_value.map(|s| (s, r.units))),
        |r| r.0,
        |r| r.1,
    );
    let by_size = sort_desc(by_size, |g| g.total);
    let total_units = grand_total(&by_size);

    let sizes: Vec<SizeShare> = by_size
        .iter()
        .zip(percent_of_total(&by_size))
        .map(|(g, percent)| SizeShare {
            size: g.key,
            units: g.total,
            percent,
            gender: GenderBucket::from_size(g.key.value()),
        })
        .collect();

    let genders = gender_totals(&sizes, total_units);
    let feminine = within_bucket(&sizes, GenderBucket::Feminine);
    let masculine = within_bucket(&sizes, GenderBucket::Masculine);

    info!(
        rows = rows.len(),
        sizes = sizes.len(),
        total_units,
        top_by_brand = top_by_brand.len(),
        top_by_month = top_by_month.len(),
        "Sales analyzed"
    );

    SalesReport {
        top_n: n,
        top_by_brand,
        top_by_month,
        sizes,
        genders,
        feminine,
        masculine,
    }
}

/// Rows of one bucket, with percentages recomputed against that bucket's total.
pub fn within_bucket(sizes: &[SizeShare], bucket: GenderBucket) -> Vec<SizeShare> {
    let rows: Vec<&SizeShare> = sizes.iter().filter(|s| s.gender == bucket).collect();
    let bucket_total: f64 = rows.iter().map(|s| s.units).sum();

    rows.into_iter()
        .map(|s| SizeShare {
            percent: pct(s.units, bucket_total),
            ..s.clone()
        })
        .collect()
}

/// Feminine and masculine totals as shares of `total_units`; other sizes are left out.
pub fn gender_totals(sizes: &[SizeShare], total_units: f64) -> Vec<GenderTotal> {
    [GenderBucket::Feminine, GenderBucket::Masculine]
        .into_iter()
        .filter_map(|gender| {
            let mut present = false;
            let mut units = 0.0;
            for s in sizes.iter().filter(|s| s.gender == gender) {
                present = true;
                units += s.units;
            }
            present.then(|| GenderTotal {
                gender,
                units,
                percent: pct(units, total_units),
            })
        })
        .collect()
}

/// Sale price over unit cost, or 0 when the product has no cost.
pub fn markup(unit_price: f64, unit_cost: f64) -> f64 {
    if unit_cost == 0.0 {
        0.0
    } else {
        round_to(unit_price / unit_cost, MARKUP_DECIMALS)
    }
}

impl From<Product> for ProductLine {
    fn from(p: Product) -> Self {
        let total_price = p.quantity * p.unit_price;
        let total_cost = p.quantity * p.unit_cost;
        ProductLine {
            markup: markup(p.unit_price, p.unit_cost),
            profit: total_price - total_cost,
            title: p.title,
            brand: p.brand,
            quantity: p.quantity,
            unit_cost: p.unit_cost,
            unit_price: p.unit_price,
            total_price,
            total_cost,
        }
    }
}

/// Builds every table of the stock report from clean rows.
pub fn analyze_stock(rows: &[StockRow], n: usize) -> StockReport {
    let mut products = consolidate_products(rows);
    products.sort_by(|a, b| a.handle.cmp(&b.handle));
    let consolidated = products.len();

    let lines: Vec<ProductLine> = products
        .into_iter()
        .map(ProductLine::from)
        .filter(|l| l.quantity > 0.0)
        .collect();

    let mut markups: Vec<BrandMarkup> = group_mean(
        lines.iter().filter(|l| !l.brand.is_empty()),
        |l| l.brand.clone(),
        |l| l.markup,
    )
    .into_iter()
    .map(|g| BrandMarkup {
        brand: g.key,
        mean_markup: round_to(g.total, MARKUP_DECIMALS),
    })
    .collect();
    markups.sort_by(|a, b| a.brand.cmp(&b.brand));

    let top_cost = top_n(lines.clone(), n, |l| l.total_cost);

    info!(
        rows = rows.len(),
        consolidated,
        in_stock = lines.len(),
        brands = markups.len(),
        "Stock analyzed"
    );

    StockReport {
        top_n: n,
        lines,
        markups,
        top_cost,
    }
}
