//! Group-by sums and the fixed monthly reindex

use serde::Serialize;
use std::collections::BTreeMap;
use tablero_common::months::MONTHS;

/// One group of a categorical rollup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub key: String,
    pub total: f64,
}

/// One row of a monthly rollup; always emitted for all twelve months
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotal {
    pub month: &'static str,
    pub total: f64,
}

/// Group rows by a categorical key and sum a measure. One output row per
/// distinct key; output is in key order, which callers must not rely on
/// for display (sort explicitly, e.g. via [`sorted_desc`]).
pub fn sum_by<T>(
    rows: &[T],
    key: impl Fn(&T) -> &str,
    measure: impl Fn(&T) -> f64,
) -> Vec<GroupTotal> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for row in rows {
        *totals.entry(key(row).to_string()).or_insert(0.0) += measure(row);
    }
    totals
        .into_iter()
        .map(|(key, total)| GroupTotal { key, total })
        .collect()
}

/// Sort groups descending by total (ties broken by key) to surface top
/// contributors
pub fn sorted_desc(mut groups: Vec<GroupTotal>) -> Vec<GroupTotal> {
    groups.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.key.cmp(&b.key))
    });
    groups
}

/// Sum a measure per canonical month, reindexed over the fixed
/// twelve-month list: exactly twelve rows in calendar order, zero-filled
/// for months with no activity. Never a sort of observed values.
pub fn monthly_rollup<T>(
    rows: &[T],
    month: impl Fn(&T) -> Option<&str>,
    measure: impl Fn(&T) -> f64,
) -> Vec<MonthTotal> {
    MONTHS
        .iter()
        .map(|&m| MonthTotal {
            month: m,
            total: rows
                .iter()
                .filter(|r| month(r) == Some(m))
                .map(|r| measure(r))
                .sum(),
        })
        .collect()
}
