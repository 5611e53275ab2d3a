//! Integration tests for tablero-bi API endpoints
//!
//! Tests cover:
//! - Health endpoint
//! - View endpoints (home, financial, profitability, operational, commercial)
//! - Diagnostic endpoint
//! - Manual refresh
//! - Source-unreachable error banner path
//!
//! All tests drive the router directly with an in-memory sheet source.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tablero_bi::cache::SnapshotCache;
use tablero_bi::sheets::FixedSource;
use tablero_bi::{build_router, AppState};
use tablero_common::config::{Config, SchemaConfig, TabsConfig};
use tower::util::ServiceExt; // for `oneshot` method

fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
    data.iter()
        .map(|r| r.iter().map(|s| s.to_string()).collect())
        .collect()
}

fn test_config() -> Config {
    Config {
        listen: "127.0.0.1:0".to_string(),
        cache_ttl_minutes: 30,
        spreadsheet_id: "test".to_string(),
        credentials_path: PathBuf::from("/dev/null"),
        tabs: TabsConfig {
            backlog: vec!["Sebastian".to_string(), "X".to_string()],
            ..TabsConfig::default()
        },
        schema: SchemaConfig::default(),
        consultant_aliases: HashMap::new(),
    }
}

fn test_source() -> FixedSource {
    FixedSource::new()
        .with_tab(
            "Movimientos",
            rows(&[
                &["Fecha", "Monto del movimiento (negativo o positivo)", "Centro de costo", "Descripcion"],
                &["15/01/2026", "$1.000.000,00", "A", "Anticipo"],
                &["20/03/2026", "-$400.000,00", "B", "Licencias"],
            ]),
        )
        .with_tab(
            "Facturacion",
            rows(&[
                &["Mes", "Cliente", "Facturacion"],
                &["Enero", "Bogoapts", "$2.000.000,00"],
                &["Marzo", "H. 93", "$1.500.000,00"],
            ]),
        )
        .with_tab(
            "Costos Fijos",
            rows(&[&["Concepto", "Monto"], &["Arriendo", "$800.000,00"]]),
        )
        .with_tab(
            "Costos Recurso",
            rows(&[&["Colaborador", "Tarifa Hora"], &["Sebastian", "$85.000,00"]]),
        )
        .with_tab(
            "Sebastian",
            rows(&[
                &["Backlog Sebastian"],
                &[],
                &["Cliente", "Tipo Tarea", "Horas Estimadas", "Horas Reales", "Fecha Entrega"],
                &["Bogoapts", "BI", "10", "12", "28/02/2026"],
            ]),
        )
        .with_tab(
            "X",
            rows(&[
                &["Backlog X"],
                &[],
                &["Cliente", "Tipo Tarea", "Horas Estimadas", "Horas Reales", "Fecha Entrega"],
                &["Prospeccion", "Mkt 360", "40", "40", "30/04/2026"],
            ]),
        )
}

/// Test helper: create app over an in-memory source
fn setup_app(source: FixedSource) -> axum::Router {
    let cache = Arc::new(SnapshotCache::new(
        Arc::new(source),
        Arc::new(test_config()),
    ));
    build_router(AppState::new(cache))
}

fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

#[tokio::test]
async fn health_endpoint_answers_without_touching_the_source() {
    // Empty source: every fetch would fail, health must not care
    let app = setup_app(FixedSource::new());

    let response = app.oneshot(test_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "tablero-bi");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn home_view_reports_headline_rollups() {
    let app = setup_app(test_source());

    let response = app
        .oneshot(test_request("GET", "/api/views/home"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["income_total"], 1_000_000.0);
    assert_eq!(body["expense_total"], 400_000.0);
    assert_eq!(body["net"], 600_000.0);
    assert_eq!(body["fixed_costs_total"], 800_000.0);
    // X has no rate: accrued cost only counts Sebastian's 12h
    assert_eq!(body["accrued_cost_total"], 1_020_000.0);
    assert!(body["report"]["join_misses"]["X"].is_number());
}

#[tokio::test]
async fn financial_view_has_twelve_month_rows() {
    let app = setup_app(test_source());

    let response = app
        .oneshot(test_request("GET", "/api/views/financial"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let monthly = body["monthly"].as_array().unwrap();
    assert_eq!(monthly.len(), 12);
    assert_eq!(monthly[0]["month"], "enero");
    assert_eq!(monthly[0]["income"], 1_000_000.0);
    assert_eq!(monthly[2]["month"], "marzo");
    assert_eq!(monthly[2]["expense"], 400_000.0);
    // Months without activity are zero-filled, never missing
    assert_eq!(monthly[7]["income"], 0.0);

    let centers = body["by_cost_center"].as_array().unwrap();
    assert_eq!(centers.len(), 2);
}

#[tokio::test]
async fn profitability_view_unions_billing_and_backlog_clients() {
    let app = setup_app(test_source());

    let response = app
        .oneshot(test_request("GET", "/api/views/profitability"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;

    let clients: Vec<&str> = body["clients"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["client"].as_str().unwrap())
        .collect();
    // Billed-only, backlog-only, and joined clients all present
    assert!(clients.contains(&"Bogoapts"));
    assert!(clients.contains(&"H. 93"));
    assert!(clients.contains(&"Prospeccion"));

    let bogoapts = body["clients"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["client"] == "Bogoapts")
        .unwrap();
    assert_eq!(bogoapts["billed"], 2_000_000.0);
    assert_eq!(bogoapts["accrued_cost"], 1_020_000.0);
    assert_eq!(bogoapts["margin"], 980_000.0);
}

#[tokio::test]
async fn operational_view_flags_missing_rates() {
    let app = setup_app(test_source());

    let response = app
        .oneshot(test_request("GET", "/api/views/operational"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;

    let consultants = body["consultants"].as_array().unwrap();
    assert_eq!(consultants.len(), 2);

    let x = consultants.iter().find(|c| c["consultant"] == "X").unwrap();
    assert_eq!(x["rate_missing"], true);
    assert_eq!(x["accrued_cost"], 0.0);
    assert_eq!(x["actual_hours"], 40.0);

    let sebastian = consultants
        .iter()
        .find(|c| c["consultant"] == "Sebastian")
        .unwrap();
    assert_eq!(sebastian["rate_missing"], false);
    assert_eq!(sebastian["accrued_cost"], 1_020_000.0);
}

#[tokio::test]
async fn commercial_view_reindexes_over_twelve_months() {
    let app = setup_app(test_source());

    let response = app
        .oneshot(test_request("GET", "/api/views/commercial"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;

    let monthly = body["monthly"].as_array().unwrap();
    assert_eq!(monthly.len(), 12);
    assert_eq!(monthly[0]["total"], 2_000_000.0);
    assert_eq!(monthly[2]["total"], 1_500_000.0);
    assert_eq!(monthly[6]["total"], 0.0);

    let by_client = body["by_client"].as_array().unwrap();
    assert_eq!(by_client[0]["key"], "Bogoapts");
}

#[tokio::test]
async fn diagnostic_exposes_raw_columns_and_resolution() {
    let app = setup_app(test_source());

    let response = app
        .oneshot(test_request("GET", "/api/diagnostic"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let sheets = body["sheets"].as_array().unwrap();
    let ledger = sheets.iter().find(|s| s["tab"] == "Movimientos").unwrap();

    assert!(ledger["columns"]
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c == "Fecha"));
    assert!(!ledger["head"].as_array().unwrap().is_empty());
    // Resolved map pairs field names with the matched column
    let resolved = ledger["resolved"].as_array().unwrap();
    let amount = resolved.iter().find(|r| r[0] == "amount").unwrap();
    assert_eq!(amount[1], "Monto del movimiento (negativo o positivo)");
}

#[tokio::test]
async fn refresh_endpoint_recomputes_and_reports() {
    let app = setup_app(test_source());

    let response = app
        .oneshot(test_request("POST", "/api/refresh"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert!(body["fetched_at"].is_string());
    assert!(body["anomalies"].is_string());
}

#[tokio::test]
async fn unreachable_source_yields_one_error_banner() {
    // No tabs registered: first fetch fails, whole render aborts
    let app = setup_app(FixedSource::new());

    let response = app
        .oneshot(test_request("GET", "/api/views/home"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("Movimientos"));
}

#[tokio::test]
async fn index_and_app_js_are_served() {
    let app = setup_app(test_source());

    let index = app
        .clone()
        .oneshot(test_request("GET", "/"))
        .await
        .unwrap();
    assert_eq!(index.status(), StatusCode::OK);

    let js = app
        .oneshot(test_request("GET", "/static/app.js"))
        .await
        .unwrap();
    assert_eq!(js.status(), StatusCode::OK);
    assert_eq!(
        js.headers().get("content-type").unwrap(),
        "application/javascript"
    );
}
