//! Ingestion pipeline: fetch, resolve, normalize, join
//!
//! One linear pass per refresh: every configured tab is fetched, its
//! header row resolved against the declared schema, cells normalized
//! into typed entities, and backlog rows joined to the rate dictionary.
//! A single fetch failure aborts the whole run with no partial results;
//! everything below a successful fetch degrades instead of failing and
//! is accounted for in the [`IngestReport`].

pub mod columns;
pub mod dates;
pub mod report;
pub mod values;

use crate::analytics::{accrue_costs, canonical_name, TaskCost};
use crate::sheets::SheetSource;
use chrono::Utc;
use columns::{resolve_schema, FieldSpec, ResolvedSchema};
use report::IngestReport;
use serde::Serialize;
use tablero_common::config::Config;
use tablero_common::model::{BacklogTask, InvoiceLine, LedgerEntry, ResourceCost, Snapshot};
use tablero_common::{Error, Result};

/// Headers live in row 1 for all non-backlog tabs
const DEFAULT_HEADER_ROW: usize = 1;

/// Head rows kept per tab for the diagnostic view
const DIAGNOSTIC_HEAD_ROWS: usize = 5;

/// Raw column names and head rows per tab, for troubleshooting column
/// detection without re-fetching
#[derive(Debug, Clone, Serialize)]
pub struct SheetDiagnostic {
    pub tab: String,
    pub columns: Vec<String>,
    pub head: Vec<Vec<String>>,
    /// field -> resolved column name (null when unresolved)
    pub resolved: Vec<(String, Option<String>)>,
}

/// Everything one ingestion run produces
#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
    pub snapshot: Snapshot,
    /// Backlog rows joined to the rate dictionary
    pub task_costs: Vec<TaskCost>,
    pub report: IngestReport,
    pub diagnostics: Vec<SheetDiagnostic>,
}

/// Run the full pipeline against a source
pub async fn run(source: &dyn SheetSource, config: &Config) -> Result<IngestOutcome> {
    let mut report = IngestReport::default();
    let mut diagnostics = Vec::new();

    let ledger = ingest_ledger(source, config, &mut report, &mut diagnostics).await?;
    let invoices = ingest_billing(source, config, &mut report, &mut diagnostics).await?;
    let fixed_costs_total = ingest_fixed_costs(source, config, &mut report, &mut diagnostics).await?;
    let resource_costs = ingest_resource_costs(source, config, &mut report, &mut diagnostics).await?;
    let backlog = ingest_backlog(source, config, &mut report, &mut diagnostics).await?;

    let snapshot = Snapshot {
        fetched_at: Utc::now(),
        ledger,
        backlog,
        invoices,
        fixed_costs_total,
        resource_costs,
    };
    let task_costs = accrue_costs(&snapshot.backlog, &snapshot.resource_costs, &mut report);

    tracing::info!(
        "Ingested {} ledger rows, {} backlog tasks, {} invoice lines ({})",
        snapshot.ledger.len(),
        snapshot.backlog.len(),
        snapshot.invoices.len(),
        report.display_string()
    );

    Ok(IngestOutcome {
        snapshot,
        task_costs,
        report,
        diagnostics,
    })
}

/// Fetch one tab and split it at the header row. Records an empty-tab
/// anomaly (and returns no rows) when the grid is shorter than the
/// header row or has no data below it.
async fn fetch_tab(
    source: &dyn SheetSource,
    tab: &str,
    header_row: usize,
    report: &mut IngestReport,
) -> Result<Option<(Vec<String>, Vec<Vec<String>>)>> {
    let grid = source
        .fetch_grid(tab)
        .await
        .map_err(|e| Error::Source(e.to_string()))?;

    match grid.split_at_header(header_row) {
        Some((headers, data)) if !data.is_empty() => Ok(Some((headers, data.to_vec()))),
        _ => {
            report.record_empty_tab(tab);
            Ok(None)
        }
    }
}

fn diagnose(
    tab: &str,
    headers: &[String],
    data: &[Vec<String>],
    schema: &ResolvedSchema,
    fields: &[&str],
) -> SheetDiagnostic {
    SheetDiagnostic {
        tab: tab.to_string(),
        columns: headers.to_vec(),
        head: data.iter().take(DIAGNOSTIC_HEAD_ROWS).cloned().collect(),
        resolved: fields
            .iter()
            .map(|f| (f.to_string(), schema.column(f).map(String::from)))
            .collect(),
    }
}

/// Currency cell -> f64 with zero coercion; populated unparseable cells
/// are counted, blank cells are not
fn currency_cell(raw: &str, tab: &str, report: &mut IngestReport) -> f64 {
    if values::is_blank(raw) {
        return 0.0;
    }
    match values::parse_currency(raw) {
        Some(v) => v,
        None => {
            report.record_currency_failure(tab);
            0.0
        }
    }
}

/// Date cell -> Option<NaiveDate>; populated unparseable cells counted
fn date_cell(raw: &str, tab: &str, report: &mut IngestReport) -> Option<chrono::NaiveDate> {
    if values::is_blank(raw) {
        return None;
    }
    let parsed = dates::parse_day_first(raw);
    if parsed.is_none() {
        report.record_date_failure(tab);
    }
    parsed
}

async fn ingest_ledger(
    source: &dyn SheetSource,
    config: &Config,
    report: &mut IngestReport,
    diagnostics: &mut Vec<SheetDiagnostic>,
) -> Result<Vec<LedgerEntry>> {
    let tab = config.tabs.ledger.as_str();
    let Some((headers, data)) = fetch_tab(source, tab, DEFAULT_HEADER_ROW, report).await?
    else {
        return Ok(Vec::new());
    };

    let fields = &config.schema.ledger;
    let schema = resolve_schema(
        &headers,
        &[
            FieldSpec { field: "date", aliases: &fields.date },
            FieldSpec { field: "amount", aliases: &fields.amount },
            FieldSpec { field: "cost_center", aliases: &fields.cost_center },
            FieldSpec { field: "description", aliases: &fields.description },
        ],
    );
    report.record_unresolved_columns(tab, &schema.missing);
    diagnostics.push(diagnose(
        tab,
        &headers,
        &data,
        &schema,
        &["date", "amount", "cost_center", "description"],
    ));

    let entries = data
        .iter()
        .filter(|row| row.iter().any(|cell| !values::is_blank(cell)))
        .map(|row| {
            let date = schema
                .cell(row, "date")
                .and_then(|raw| date_cell(raw, tab, report));
            LedgerEntry {
                date,
                month: date.map(|d| dates::canonical_month(d).to_string()),
                amount: schema
                    .cell(row, "amount")
                    .map(|raw| currency_cell(raw, tab, report))
                    .unwrap_or(0.0),
                cost_center: schema
                    .cell(row, "cost_center")
                    .unwrap_or("")
                    .trim()
                    .to_string(),
                description: schema
                    .cell(row, "description")
                    .unwrap_or("")
                    .trim()
                    .to_string(),
            }
        })
        .collect();

    Ok(entries)
}

async fn ingest_billing(
    source: &dyn SheetSource,
    config: &Config,
    report: &mut IngestReport,
    diagnostics: &mut Vec<SheetDiagnostic>,
) -> Result<Vec<InvoiceLine>> {
    let tab = config.tabs.billing.as_str();
    let Some((headers, data)) = fetch_tab(source, tab, DEFAULT_HEADER_ROW, report).await?
    else {
        return Ok(Vec::new());
    };

    let fields = &config.schema.billing;
    let schema = resolve_schema(
        &headers,
        &[
            FieldSpec { field: "month", aliases: &fields.month },
            FieldSpec { field: "client", aliases: &fields.client },
            FieldSpec { field: "billed_total", aliases: &fields.billed_total },
        ],
    );
    report.record_unresolved_columns(tab, &schema.missing);
    diagnostics.push(diagnose(
        tab,
        &headers,
        &data,
        &schema,
        &["month", "client", "billed_total"],
    ));

    let mut lines = Vec::new();
    for row in data
        .iter()
        .filter(|row| row.iter().any(|cell| !values::is_blank(cell)))
    {
        let raw_month = schema.cell(row, "month").unwrap_or("");
        let month = match dates::normalize_month_label(raw_month) {
            Some(m) => m.to_string(),
            None => {
                if !values::is_blank(raw_month) {
                    report.record_month_label_failure(tab);
                }
                continue; // no month key: cannot take part in the plan
            }
        };
        lines.push(InvoiceLine {
            month,
            client: schema.cell(row, "client").unwrap_or("").trim().to_string(),
            billed_total: schema
                .cell(row, "billed_total")
                .map(|raw| currency_cell(raw, tab, report))
                .unwrap_or(0.0),
        });
    }

    Ok(lines)
}

async fn ingest_fixed_costs(
    source: &dyn SheetSource,
    config: &Config,
    report: &mut IngestReport,
    diagnostics: &mut Vec<SheetDiagnostic>,
) -> Result<f64> {
    let tab = config.tabs.fixed_costs.as_str();
    let Some((headers, data)) = fetch_tab(source, tab, DEFAULT_HEADER_ROW, report).await?
    else {
        return Ok(0.0);
    };

    let fields = &config.schema.fixed_costs;
    let schema = resolve_schema(
        &headers,
        &[FieldSpec { field: "amount", aliases: &fields.amount }],
    );
    report.record_unresolved_columns(tab, &schema.missing);
    diagnostics.push(diagnose(tab, &headers, &data, &schema, &["amount"]));

    let total = data
        .iter()
        .filter_map(|row| schema.cell(row, "amount"))
        .map(|raw| currency_cell(raw, tab, report))
        .sum();

    Ok(total)
}

async fn ingest_resource_costs(
    source: &dyn SheetSource,
    config: &Config,
    report: &mut IngestReport,
    diagnostics: &mut Vec<SheetDiagnostic>,
) -> Result<Vec<ResourceCost>> {
    let tab = config.tabs.resource_costs.as_str();
    let Some((headers, data)) = fetch_tab(source, tab, DEFAULT_HEADER_ROW, report).await?
    else {
        return Ok(Vec::new());
    };

    let fields = &config.schema.resource_costs;
    let schema = resolve_schema(
        &headers,
        &[
            FieldSpec { field: "name", aliases: &fields.name },
            FieldSpec { field: "hourly_rate", aliases: &fields.hourly_rate },
        ],
    );
    report.record_unresolved_columns(tab, &schema.missing);
    diagnostics.push(diagnose(tab, &headers, &data, &schema, &["name", "hourly_rate"]));

    let rates = data
        .iter()
        .filter(|row| {
            schema
                .cell(row, "name")
                .map(|n| !values::is_blank(n))
                .unwrap_or(false)
        })
        .map(|row| ResourceCost {
            // Dictionary names are stored canonical uppercase
            name: schema
                .cell(row, "name")
                .unwrap_or("")
                .trim()
                .to_uppercase(),
            hourly_rate: schema
                .cell(row, "hourly_rate")
                .map(|raw| currency_cell(raw, tab, report))
                .unwrap_or(0.0),
        })
        .collect();

    Ok(rates)
}

async fn ingest_backlog(
    source: &dyn SheetSource,
    config: &Config,
    report: &mut IngestReport,
    diagnostics: &mut Vec<SheetDiagnostic>,
) -> Result<Vec<BacklogTask>> {
    let mut tasks = Vec::new();
    let fields = &config.schema.backlog;
    let header_row = config.tabs.backlog_header_row;

    for tab_name in &config.tabs.backlog {
        let tab = tab_name.as_str();
        let Some((headers, data)) = fetch_tab(source, tab, header_row, report).await?
        else {
            continue;
        };

        let schema = resolve_schema(
            &headers,
            &[
                FieldSpec { field: "client", aliases: &fields.client },
                FieldSpec { field: "task_type", aliases: &fields.task_type },
                FieldSpec { field: "estimated_hours", aliases: &fields.estimated_hours },
                FieldSpec { field: "actual_hours", aliases: &fields.actual_hours },
                FieldSpec { field: "delivery_date", aliases: &fields.delivery_date },
            ],
        );
        report.record_unresolved_columns(tab, &schema.missing);
        diagnostics.push(diagnose(
            tab,
            &headers,
            &data,
            &schema,
            &[
                "client",
                "task_type",
                "estimated_hours",
                "actual_hours",
                "delivery_date",
            ],
        ));

        let canonical = canonical_name(tab, &config.consultant_aliases);
        for row in data
            .iter()
            .filter(|row| row.iter().any(|cell| !values::is_blank(cell)))
        {
            tasks.push(BacklogTask {
                consultant: tab.to_string(),
                consultant_canonical: canonical.clone(),
                client: schema.cell(row, "client").unwrap_or("").trim().to_string(),
                task_type: schema
                    .cell(row, "task_type")
                    .unwrap_or("")
                    .trim()
                    .to_string(),
                estimated_hours: schema
                    .cell(row, "estimated_hours")
                    .map(|raw| currency_cell(raw, tab, report))
                    .unwrap_or(0.0),
                actual_hours: schema
                    .cell(row, "actual_hours")
                    .map(|raw| currency_cell(raw, tab, report))
                    .unwrap_or(0.0),
                delivery_date: schema
                    .cell(row, "delivery_date")
                    .and_then(|raw| date_cell(raw, tab, report)),
            });
        }
    }

    Ok(tasks)
}
