//! Dashboard view endpoints
//!
//! Each view endpoint reads the cached snapshot ("current or refresh")
//! and aggregates it into a chart-ready frame. A failed refresh maps to
//! one 502 error body, rendered as a single banner; schema drift only
//! degrades the dependent widget via the `warnings` list.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::analytics::{monthly_rollup, sorted_desc, sum_by, total_accrued, GroupTotal};
use crate::ingest::report::IngestReport;
use crate::ingest::IngestOutcome;
use crate::AppState;

/// View endpoint errors
#[derive(Debug)]
pub enum ViewError {
    /// Authenticating or fetching from the data source failed; the whole
    /// render aborts with no partial results
    SourceUnreachable(String),
}

impl IntoResponse for ViewError {
    fn into_response(self) -> Response {
        let ViewError::SourceUnreachable(message) = self;
        let body = Json(json!({ "error": message }));
        (StatusCode::BAD_GATEWAY, body).into_response()
    }
}

/// Fetch the current outcome or fail the render as source-unreachable
async fn outcome(state: &AppState) -> Result<Arc<IngestOutcome>, ViewError> {
    state
        .cache
        .current_or_refresh()
        .await
        .map_err(|e| ViewError::SourceUnreachable(e.to_string()))
}

fn income_total(outcome: &IngestOutcome) -> f64 {
    outcome
        .snapshot
        .ledger
        .iter()
        .filter(|e| e.amount > 0.0)
        .map(|e| e.amount)
        .sum()
}

/// Expense magnitude: negative-signed ledger amounts, reported positive
fn expense_total(outcome: &IngestOutcome) -> f64 {
    -outcome
        .snapshot
        .ledger
        .iter()
        .filter(|e| e.amount < 0.0)
        .map(|e| e.amount)
        .sum::<f64>()
}

/// GET /api/views/home
///
/// Headline rollups plus the anomaly summary for the landing page.
pub async fn home(State(state): State<AppState>) -> Result<Json<HomeView>, ViewError> {
    let outcome = outcome(&state).await?;

    let income = income_total(&outcome);
    let expense = expense_total(&outcome);
    Ok(Json(HomeView {
        fetched_at: outcome.snapshot.fetched_at.to_rfc3339(),
        income_total: income,
        expense_total: expense,
        net: income - expense,
        fixed_costs_total: outcome.snapshot.fixed_costs_total,
        accrued_cost_total: total_accrued(&outcome.task_costs),
        anomalies: outcome.report.display_string(),
        report: outcome.report.clone(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HomeView {
    pub fetched_at: String,
    pub income_total: f64,
    pub expense_total: f64,
    pub net: f64,
    pub fixed_costs_total: f64,
    pub accrued_cost_total: f64,
    pub anomalies: String,
    pub report: IngestReport,
}

/// One month of the P&L evolution chart
#[derive(Debug, Serialize)]
pub struct MonthFlow {
    pub month: &'static str,
    pub income: f64,
    pub expense: f64,
}

#[derive(Debug, Serialize)]
pub struct FinancialView {
    pub income_total: f64,
    pub expense_total: f64,
    pub net: f64,
    /// Exactly twelve rows, calendar order, zero-filled
    pub monthly: Vec<MonthFlow>,
    /// Net amount per cost center, top contributors first
    pub by_cost_center: Vec<GroupTotal>,
    pub warnings: Vec<String>,
}

/// GET /api/views/financial
pub async fn financial(
    State(state): State<AppState>,
) -> Result<Json<FinancialView>, ViewError> {
    let outcome = outcome(&state).await?;
    let ledger = &outcome.snapshot.ledger;

    let income_by_month = monthly_rollup(
        ledger,
        |e| e.month.as_deref(),
        |e| if e.amount > 0.0 { e.amount } else { 0.0 },
    );
    let expense_by_month = monthly_rollup(
        ledger,
        |e| e.month.as_deref(),
        |e| if e.amount < 0.0 { -e.amount } else { 0.0 },
    );
    let monthly = income_by_month
        .into_iter()
        .zip(expense_by_month)
        .map(|(i, e)| MonthFlow {
            month: i.month,
            income: i.total,
            expense: e.total,
        })
        .collect();

    let income = income_total(&outcome);
    let expense = expense_total(&outcome);
    Ok(Json(FinancialView {
        income_total: income,
        expense_total: expense,
        net: income - expense,
        monthly,
        by_cost_center: sorted_desc(sum_by(ledger, |e| &e.cost_center, |e| e.amount)),
        warnings: outcome.report.warnings(),
    }))
}

#[derive(Debug, Serialize)]
pub struct ClientProfit {
    pub client: String,
    pub billed: f64,
    pub accrued_cost: f64,
    pub margin: f64,
}

#[derive(Debug, Serialize)]
pub struct ProfitabilityView {
    /// Billed vs accrued cost per client, highest billing first
    pub clients: Vec<ClientProfit>,
    pub warnings: Vec<String>,
}

/// GET /api/views/profitability
pub async fn profitability(
    State(state): State<AppState>,
) -> Result<Json<ProfitabilityView>, ViewError> {
    let outcome = outcome(&state).await?;

    // Union of clients seen in the invoicing plan and in the backlog
    let mut billed: BTreeMap<String, f64> = BTreeMap::new();
    for line in &outcome.snapshot.invoices {
        *billed.entry(line.client.clone()).or_insert(0.0) += line.billed_total;
    }
    let mut accrued: BTreeMap<String, f64> = BTreeMap::new();
    for cost in &outcome.task_costs {
        *accrued.entry(cost.task.client.clone()).or_insert(0.0) += cost.accrued_cost;
    }

    let mut clients: Vec<ClientProfit> = billed
        .keys()
        .chain(accrued.keys())
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .map(|client| {
            let b = billed.get(client).copied().unwrap_or(0.0);
            let c = accrued.get(client).copied().unwrap_or(0.0);
            ClientProfit {
                client: client.clone(),
                billed: b,
                accrued_cost: c,
                margin: b - c,
            }
        })
        .collect();
    clients.sort_by(|a, b| {
        b.billed
            .partial_cmp(&a.billed)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.client.cmp(&b.client))
    });

    Ok(Json(ProfitabilityView {
        clients,
        warnings: outcome.report.warnings(),
    }))
}

#[derive(Debug, Serialize)]
pub struct ConsultantLoad {
    pub consultant: String,
    pub canonical: String,
    pub estimated_hours: f64,
    pub actual_hours: f64,
    pub accrued_cost: f64,
    /// True when the consultant has no entry in the cost dictionary;
    /// the accrued cost above understates by that consultant's hours
    pub rate_missing: bool,
}

#[derive(Debug, Serialize)]
pub struct OperationalView {
    pub consultants: Vec<ConsultantLoad>,
    pub warnings: Vec<String>,
}

/// GET /api/views/operational
pub async fn operational(
    State(state): State<AppState>,
) -> Result<Json<OperationalView>, ViewError> {
    let outcome = outcome(&state).await?;

    let mut by_consultant: BTreeMap<String, ConsultantLoad> = BTreeMap::new();
    for cost in &outcome.task_costs {
        let entry = by_consultant
            .entry(cost.task.consultant.clone())
            .or_insert_with(|| ConsultantLoad {
                consultant: cost.task.consultant.clone(),
                canonical: cost.task.consultant_canonical.clone(),
                estimated_hours: 0.0,
                actual_hours: 0.0,
                accrued_cost: 0.0,
                rate_missing: false,
            });
        entry.estimated_hours += cost.task.estimated_hours;
        entry.actual_hours += cost.task.actual_hours;
        entry.accrued_cost += cost.accrued_cost;
        entry.rate_missing |= cost.hourly_rate.is_none();
    }

    Ok(Json(OperationalView {
        consultants: by_consultant.into_values().collect(),
        warnings: outcome.report.warnings(),
    }))
}

#[derive(Debug, Serialize)]
pub struct CommercialView {
    /// Billed total per canonical month: exactly twelve rows
    pub monthly: Vec<crate::analytics::MonthTotal>,
    /// Billed total per client, top billing first
    pub by_client: Vec<GroupTotal>,
    pub warnings: Vec<String>,
}

/// GET /api/views/commercial
pub async fn commercial(
    State(state): State<AppState>,
) -> Result<Json<CommercialView>, ViewError> {
    let outcome = outcome(&state).await?;
    let invoices = &outcome.snapshot.invoices;

    Ok(Json(CommercialView {
        monthly: monthly_rollup(invoices, |l| Some(l.month.as_str()), |l| l.billed_total),
        by_client: sorted_desc(sum_by(invoices, |l| &l.client, |l| l.billed_total)),
        warnings: outcome.report.warnings(),
    }))
}

/// POST /api/refresh
///
/// Explicit cache refresh (the manual "update now" control).
pub async fn refresh(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ViewError> {
    let outcome = state
        .cache
        .refresh()
        .await
        .map_err(|e| ViewError::SourceUnreachable(e.to_string()))?;

    Ok(Json(json!({
        "fetched_at": outcome.snapshot.fetched_at.to_rfc3339(),
        "anomalies": outcome.report.display_string(),
    })))
}
