//! Ranking of aggregated rows: descending by metric, truncated to N.
//!
//! All sorts here are stable, so rows with equal metrics keep the order they
//! arrived in. Only the set of rows at a tie on the cutoff depends on that
//! order; the metrics returned never do.

use std::collections::BTreeMap;

/// Sorts descending by `metric`, keeping input order between equal metrics.
pub fn sort_desc<T>(mut rows: Vec<T>, metric: impl Fn(&T) -> f64) -> Vec<T> {
    rows.sort_by(|a, b| metric(b).total_cmp(&metric(a)));
    rows
}

/// The `n` highest-metric rows, or all of them when there are fewer than `n`.
pub fn top_n<T>(rows: Vec<T>, n: usize, metric: impl Fn(&T) -> f64) -> Vec<T> {
    let mut ranked = sort_desc(rows, metric);
    ranked.truncate(n);
    ranked
}

/// Ranks every partition independently and concatenates the results.
///
/// Partitions are visited in ascending order of their key; within a
/// partition rows keep their relative input order until ranked.
pub fn top_n_per_partition<T, P>(
    rows: Vec<T>,
    n: usize,
    partition: impl Fn(&T) -> P,
    metric: impl Fn(&T) -> f64,
) -> Vec<T>
where
    P: Ord,
{
    let mut partitions: BTreeMap<P, Vec<T>> = BTreeMap::new();
    for row in rows {
        partitions.entry(partition(&row)).or_default().push(row);
    }

    partitions
        .into_values()
        .flat_map(|rows| top_n(rows, n, &metric))
        .collect()
}
