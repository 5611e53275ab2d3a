//! Domain model types
//!
//! All entities are immutable snapshots of external spreadsheet rows;
//! there is no write path back to the sources. Parsing and normalization
//! happen at ingest time, so these structs hold clean values only.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One row of the financial ledger (movements sheet).
///
/// Amount sign is the authoritative income/expense convention:
/// positive = income, negative = expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Movement date; `None` when the source cell did not parse day-first
    pub date: Option<NaiveDate>,
    /// Canonical month name derived from `date` ("enero".."diciembre")
    pub month: Option<String>,
    /// Signed amount in COP
    pub amount: f64,
    /// Cost center / category label attributing the movement
    pub cost_center: String,
    /// Free-text description
    pub description: String,
}

/// One backlog task row from a per-consultant tab.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacklogTask {
    /// Consultant display name (the tab name)
    pub consultant: String,
    /// Canonicalized consultant identity (uppercase, alias-mapped),
    /// used to join against the resource-cost dictionary
    pub consultant_canonical: String,
    /// Client the task is billed to
    pub client: String,
    /// Task-type label
    pub task_type: String,
    /// Estimated hours for the task
    pub estimated_hours: f64,
    /// Actually reported hours
    pub actual_hours: f64,
    /// Delivery date, when it parsed
    pub delivery_date: Option<NaiveDate>,
}

/// One line of the invoicing plan (billing sheet).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// Canonical month name the invoice falls in
    pub month: String,
    /// Client billed
    pub client: String,
    /// Billed total in COP
    pub billed_total: f64,
}

/// One entry of the resource-cost dictionary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceCost {
    /// Collaborator name, canonical uppercase form
    pub name: String,
    /// Hourly rate in COP
    pub hourly_rate: f64,
}

/// Immutable bundle of all source data produced by one ingestion run.
///
/// Shared read-only across concurrent viewers; a new snapshot replaces
/// the old one wholesale on cache expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// When this snapshot was fetched
    pub fetched_at: DateTime<Utc>,
    pub ledger: Vec<LedgerEntry>,
    pub backlog: Vec<BacklogTask>,
    pub invoices: Vec<InvoiceLine>,
    /// Monthly recurring-expense baseline (sum of the fixed-costs sheet)
    pub fixed_costs_total: f64,
    pub resource_costs: Vec<ResourceCost>,
}
