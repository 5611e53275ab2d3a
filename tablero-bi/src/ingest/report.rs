//! Ingestion anomaly tracking
//!
//! Every ingestion run carries a structured report beside the data:
//! unparsed cells, unresolved columns, empty tabs, and cost-join misses
//! are counted and surfaced to the presentation layer instead of being
//! silently zeroed. Zero-coercion still happens (a bad cell never fails
//! a render), but the dashboard can show how much of the data it is
//! quietly ignoring.

use serde::Serialize;
use std::collections::BTreeMap;

/// Anomalies observed while ingesting one tab
#[derive(Debug, Clone, Default, Serialize)]
pub struct SheetAnomalies {
    /// Populated cells that failed currency/number parsing (coerced to 0)
    pub currency_parse_failures: usize,
    /// Populated cells that failed day-first date parsing (coerced to null)
    pub date_parse_failures: usize,
    /// Month labels that matched no canonical month
    pub month_label_failures: usize,
    /// Declared fields that resolved to no column
    pub unresolved_columns: Vec<String>,
}

impl SheetAnomalies {
    pub fn is_clean(&self) -> bool {
        self.currency_parse_failures == 0
            && self.date_parse_failures == 0
            && self.month_label_failures == 0
            && self.unresolved_columns.is_empty()
    }
}

/// Structured anomaly report for one ingestion run.
/// BTreeMap keys keep serialized output deterministic.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    /// Per-tab anomalies, keyed by tab name
    pub sheets: BTreeMap<String, SheetAnomalies>,
    /// Cost-join misses: canonical consultant name -> backlog rows that
    /// found no rate in the cost dictionary
    pub join_misses: BTreeMap<String, usize>,
    /// Tabs that fetched but held no data rows below the header
    pub empty_tabs: Vec<String>,
}

impl IngestReport {
    fn sheet_mut(&mut self, tab: &str) -> &mut SheetAnomalies {
        self.sheets.entry(tab.to_string()).or_default()
    }

    pub fn record_currency_failure(&mut self, tab: &str) {
        self.sheet_mut(tab).currency_parse_failures += 1;
    }

    pub fn record_date_failure(&mut self, tab: &str) {
        self.sheet_mut(tab).date_parse_failures += 1;
    }

    pub fn record_month_label_failure(&mut self, tab: &str) {
        self.sheet_mut(tab).month_label_failures += 1;
    }

    pub fn record_unresolved_columns(&mut self, tab: &str, fields: &[String]) {
        if !fields.is_empty() {
            self.sheet_mut(tab)
                .unresolved_columns
                .extend(fields.iter().cloned());
        }
    }

    pub fn record_join_miss(&mut self, canonical_name: &str) {
        *self
            .join_misses
            .entry(canonical_name.to_string())
            .or_insert(0) += 1;
    }

    pub fn record_empty_tab(&mut self, tab: &str) {
        self.empty_tabs.push(tab.to_string());
    }

    /// Fields that failed to resolve for a given tab (widget degradation)
    pub fn unresolved_for(&self, tab: &str) -> &[String] {
        self.sheets
            .get(tab)
            .map(|s| s.unresolved_columns.as_slice())
            .unwrap_or(&[])
    }

    pub fn total_parse_failures(&self) -> usize {
        self.sheets
            .values()
            .map(|s| {
                s.currency_parse_failures + s.date_parse_failures + s.month_label_failures
            })
            .sum()
    }

    pub fn total_join_misses(&self) -> usize {
        self.join_misses.values().sum()
    }

    pub fn is_clean(&self) -> bool {
        self.sheets.values().all(SheetAnomalies::is_clean)
            && self.join_misses.is_empty()
            && self.empty_tabs.is_empty()
    }

    /// Human-readable schema-drift warnings, one per unresolved field.
    /// Shown beside the widget that depends on the field.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        for (tab, anomalies) in &self.sheets {
            for field in &anomalies.unresolved_columns {
                warnings.push(format!("tab '{}': no column found for '{}'", tab, field));
            }
        }
        for tab in &self.empty_tabs {
            warnings.push(format!("tab '{}': no data rows", tab));
        }
        warnings
    }

    /// One-line summary for logs and the UI anomaly strip
    pub fn display_string(&self) -> String {
        if self.is_clean() {
            "no anomalies".to_string()
        } else {
            format!(
                "{} cells failed to parse, {} backlog rows without a cost rate, {} empty tabs",
                self.total_parse_failures(),
                self.total_join_misses(),
                self.empty_tabs.len()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_report() {
        let report = IngestReport::default();
        assert!(report.is_clean());
        assert_eq!(report.display_string(), "no anomalies");
    }

    #[test]
    fn counters_accumulate_per_sheet() {
        let mut report = IngestReport::default();
        report.record_currency_failure("Movimientos");
        report.record_currency_failure("Movimientos");
        report.record_date_failure("Movimientos");
        report.record_join_miss("X");
        report.record_join_miss("X");

        assert_eq!(report.total_parse_failures(), 3);
        assert_eq!(report.total_join_misses(), 2);
        assert_eq!(report.join_misses.get("X"), Some(&2));
        assert!(!report.is_clean());
    }

    #[test]
    fn unresolved_columns_tracked_per_tab() {
        let mut report = IngestReport::default();
        report.record_unresolved_columns("Movimientos", &["cost_center".to_string()]);
        report.record_unresolved_columns("Facturacion", &[]);

        assert_eq!(report.unresolved_for("Movimientos"), ["cost_center"]);
        assert!(report.unresolved_for("Facturacion").is_empty());
        // Empty list records nothing
        assert!(!report.sheets.contains_key("Facturacion"));
    }
}
