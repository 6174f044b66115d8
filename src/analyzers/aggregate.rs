use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::hash::Hash;

use tracing::debug;

use crate::analyzers::types::{AggregateRow, Product};
use crate::analyzers::utility::{mean, pct};
use crate::cleaner::StockRow;

/// Group-by-sum over an exact-match key.
///
/// Produces one row per distinct key actually present in `rows`, in the order
/// each key is first seen. The output is not sorted; callers that need an
/// order impose it themselves.
pub fn group_sum<I, T, K>(
    rows: I,
    key: impl Fn(&T) -> K,
    metric: impl Fn(&T) -> f64,
) -> Vec<AggregateRow<K>>
where
    I: IntoIterator<Item = T>,
    K: Eq + Hash + Clone,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<AggregateRow<K>> = Vec::new();

    for row in rows {
        let value = metric(&row);
        match index.entry(key(&row)) {
            Entry::Occupied(e) => groups[*e.get()].total += value,
            Entry::Vacant(v) => {
                groups.push(AggregateRow {
                    key: v.key().clone(),
                    total: value,
                });
                v.insert(groups.len() - 1);
            }
        }
    }

    groups
}

/// Group-by-mean, in first-seen key order.
pub fn group_mean<I, T, K>(
    rows: I,
    key: impl Fn(&T) -> K,
    metric: impl Fn(&T) -> f64,
) -> Vec<AggregateRow<K>>
where
    I: IntoIterator<Item = T>,
    K: Eq + Hash + Clone,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<f64>)> = Vec::new();

    for row in rows {
        let value = metric(&row);
        match index.entry(key(&row)) {
            Entry::Occupied(e) => groups[*e.get()].1.push(value),
            Entry::Vacant(v) => {
                groups.push((v.key().clone(), vec![value]));
                v.insert(groups.len() - 1);
            }
        }
    }

    groups
        .into_iter()
        .map(|(key, values)| AggregateRow {
            key,
            total: mean(&values),
        })
        .collect()
}

/// Sum of the metric over every row.
pub fn grand_total<K>(rows: &[AggregateRow<K>]) -> f64 {
    rows.iter().map(|r| r.total).sum()
}

/// Each row's share of the grand total, in percent, aligned with `rows`.
///
/// A zero grand total yields 0% for every row.
pub fn percent_of_total<K>(rows: &[AggregateRow<K>]) -> Vec<f64> {
    let total = grand_total(rows);
    rows.iter().map(|r| pct(r.total, total)).collect()
}

/// Consolidates variant rows into one [`Product`] per handle.
///
/// Quantity is summed. Title and brand take the first non-empty value seen,
/// unit cost and unit price take the first row's value. Rows without a handle
/// are skipped. Products come out in first-seen handle order.
pub fn consolidate_products(rows: &[StockRow]) -> Vec<Product> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut products: Vec<Product> = Vec::new();
    let mut skipped = 0usize;

    for row in rows {
        if row.handle.is_empty() {
            skipped += 1;
            continue;
        }

        match index.entry(row.handle.as_str()) {
            Entry::Occupied(e) => {
                let product = &mut products[*e.get()];
                product.quantity += row.quantity;
                if product.title.is_empty() {
                    product.title.clone_from(&row.title);
                }
                if product.brand.is_empty() {
                    product.brand.clone_from(&row.brand);
                }
            }
            Entry::Vacant(v) => {
                v.insert(products.len());
                products.push(Product {
                    handle: row.handle.clone(),
                    title: row.title.clone(),
                    brand: row.brand.clone(),
                    quantity: row.quantity,
                    unit_cost: row.unit_cost,
                    unit_price: row.unit_price,
                });
            }
        }
    }

    debug!(variants = rows.len(), products = products.len(), skipped, "Products consolidated");
    products
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn stock(handle: &str, title: &str, brand: &str, qty: f64, cost: f64, price: f64) -> StockRow {
        StockRow {
            handle: handle.to_string(),
            title: title.to_string(),
            brand: brand.to_string(),
            quantity: qty,
            unit_cost: cost,
            unit_price: price,
        }
    }

    #[test]
    fn test_group_sum_multi_key() {
        let rows = [("jan", "a", 10.0), ("jan", "b", 5.0), ("jan", "a", 2.5), ("feb", "a", 1.0)];
        let groups = group_sum(rows.iter(), |r| (r.0, r.1), |r| r.2);

        assert_eq!(
            groups,
            vec![
                AggregateRow { key: ("jan", "a"), total: 12.5 },
                AggregateRow { key: ("jan", "b"), total: 5.0 },
                AggregateRow { key: ("feb", "a"), total: 1.0 },
            ]
        );
    }

    #[test]
    fn test_group_sum_conserves_total() {
        let rows: Vec<(u32, f64)> = (0..200).map(|i| (i % 7, (i as f64) * 0.25 - 3.0)).collect();
        let groups = group_sum(rows.iter(), |r| r.0, |r| r.1);

        let input: f64 = rows.iter().map(|r| r.1).sum();
        assert!((grand_total(&groups) - input).abs() < EPS);
        assert_eq!(groups.len(), 7);
    }

    #[test]
    fn test_group_sum_independent_of_row_order() {
        let rows = [(1, 4.0), (2, 1.0), (1, 6.0), (3, 0.0)];
        let mut reversed = rows;
        reversed.reverse();

        let mut a = group_sum(rows.iter(), |r| r.0, |r| r.1);
        let mut b = group_sum(reversed.iter(), |r| r.0, |r| r.1);
        a.sort_by_key(|r| r.key);
        b.sort_by_key(|r| r.key);
        assert_eq!(a, b);
    }

    #[test]
    fn test_group_sum_keeps_zero_groups_that_occur() {
        let rows = [("x", 0.0), ("y", 3.0)];
        let groups = group_sum(rows.iter(), |r| r.0, |r| r.1);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].total, 0.0);
    }

    #[test]
    fn test_percent_of_total() {
        let rows = vec![
            AggregateRow { key: 38, total: 15.0 },
            AggregateRow { key: 40, total: 30.0 },
        ];
        let shares = percent_of_total(&rows);
        assert!((shares[0] - 100.0 / 3.0).abs() < EPS);
        assert!((shares[1] - 200.0 / 3.0).abs() < EPS);
    }

    #[test]
    fn test_percent_of_zero_total() {
        let rows = vec![AggregateRow { key: 1, total: 0.0 }];
        assert_eq!(percent_of_total(&rows), vec![0.0]);
        assert!(percent_of_total::<u8>(&[]).is_empty());
    }

    #[test]
    fn test_group_mean() {
        let rows = [("A", 2.0), ("B", 1.0), ("A", 3.0)];
        let means = group_mean(rows.iter(), |r| r.0, |r| r.1);
        assert_eq!(means[0], AggregateRow { key: "A", total: 2.5 });
        assert_eq!(means[1], AggregateRow { key: "B", total: 1.0 });
    }

    #[test]
    fn test_consolidate_picks_first_representatives() {
        let rows = vec![
            stock("boot", "Boot", "ACME", 2.0, 50.0, 120.0),
            stock("sock", "Sock", "FOO", 1.0, 2.0, 5.0),
            stock("boot", "", "", 3.0, 55.0, 130.0),
        ];
        let products = consolidate_products(&rows);

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].handle, "boot");
        assert_eq!(products[0].quantity, 5.0);
        assert_eq!(products[0].title, "Boot");
        assert_eq!(products[0].unit_cost, 50.0);
        assert_eq!(products[0].unit_price, 120.0);
        assert_eq!(products[1].handle, "sock");
    }

    #[test]
    fn test_consolidate_fills_title_from_later_variant() {
        let rows = vec![
            stock("boot", "", "", 1.0, 0.0, 0.0),
            stock("boot", "Boot", "ACME", 1.0, 9.0, 9.0),
        ];
        let products = consolidate_products(&rows);

        assert_eq!(products[0].title, "Boot");
        assert_eq!(products[0].brand, "ACME");
        assert_eq!(products[0].unit_cost, 0.0);
    }

    #[test]
    fn test_consolidate_skips_rows_without_handle() {
        let rows = vec![stock("", "Orphan", "X", 4.0, 1.0, 1.0)];
        assert!(consolidate_products(&rows).is_empty());
    }
}
