//! tablero-bi library - business-intelligence dashboard module
//!
//! Ingests a small set of spreadsheet tabs (financial ledger, project
//! backlog, invoicing plan, fixed costs, resource-cost dictionary),
//! normalizes and aggregates them, and serves a single-page web UI.

use axum::Router;
use std::sync::Arc;

pub mod analytics;
pub mod api;
pub mod cache;
pub mod ingest;
pub mod sheets;

use cache::SnapshotCache;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// TTL-bound snapshot cache over the configured sheet source
    pub cache: Arc<SnapshotCache>,
}

impl AppState {
    pub fn new(cache: Arc<SnapshotCache>) -> Self {
        Self { cache }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/api/views/home", get(api::views::home))
        .route("/api/views/financial", get(api::views::financial))
        .route("/api/views/profitability", get(api::views::profitability))
        .route("/api/views/operational", get(api::views::operational))
        .route("/api/views/commercial", get(api::views::commercial))
        .route("/api/diagnostic", get(api::diagnostic::get_diagnostic))
        .route("/api/refresh", post(api::views::refresh))
        .route("/", get(api::ui::serve_index))
        .route("/static/app.js", get(api::ui::serve_app_js))
        .merge(api::health::health_routes())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
