//! Cost cross-reference: backlog tasks joined to the rate dictionary
//!
//! The join key is the canonicalized consultant name: uppercase, trimmed,
//! mapped through the configured alias table. The join is left-outer: a
//! backlog row whose consultant has no rate keeps all its fields with a
//! null rate and contributes zero accrued cost. Misses are counted in the
//! ingest report; the rollup understates rather than crashes, and the
//! dashboard says by how much.

use crate::ingest::report::IngestReport;
use serde::Serialize;
use std::collections::HashMap;
use tablero_common::model::{BacklogTask, ResourceCost};

/// A backlog task with its matched rate and accrued labor cost
#[derive(Debug, Clone, Serialize)]
pub struct TaskCost {
    #[serde(flatten)]
    pub task: BacklogTask,
    /// Hourly rate from the cost dictionary; `None` on a join miss
    pub hourly_rate: Option<f64>,
    /// actual hours x hourly rate; 0 when the rate is missing
    pub accrued_cost: f64,
}

/// Canonicalize a consultant display name for joining: trim, uppercase,
/// then map through the alias reconciliation table
pub fn canonical_name(display: &str, aliases: &HashMap<String, String>) -> String {
    let upper = display.trim().to_uppercase();
    aliases.get(&upper).cloned().unwrap_or(upper)
}

/// Left-outer join of backlog tasks against the rate dictionary.
///
/// Pure over its inputs: running it twice over the same snapshot yields
/// identical accrued-cost totals.
pub fn accrue_costs(
    tasks: &[BacklogTask],
    rates: &[ResourceCost],
    report: &mut IngestReport,
) -> Vec<TaskCost> {
    let rate_by_name: HashMap<String, f64> = rates
        .iter()
        .map(|r| (r.name.trim().to_uppercase(), r.hourly_rate))
        .collect();

    tasks
        .iter()
        .map(|task| {
            let rate = rate_by_name.get(&task.consultant_canonical).copied();
            if rate.is_none() {
                report.record_join_miss(&task.consultant_canonical);
            }
            TaskCost {
                task: task.clone(),
                hourly_rate: rate,
                accrued_cost: rate.map(|r| task.actual_hours * r).unwrap_or(0.0),
            }
        })
        .collect()
}

/// Total accrued cost over a joined set
pub fn total_accrued(costs: &[TaskCost]) -> f64 {
    costs.iter().map(|c| c.accrued_cost).sum()
}
