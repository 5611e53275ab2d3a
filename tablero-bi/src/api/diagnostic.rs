//! Diagnostic endpoint
//!
//! Exposes the raw column names and head rows captured at ingest time,
//! plus the resolved/unresolved schema map per tab. This is the manual
//! troubleshooting surface for column-detection failures; it reads the
//! cached outcome and never re-fetches.

use axum::{extract::State, Json};

use super::views::ViewError;
use crate::AppState;

/// GET /api/diagnostic
pub async fn get_diagnostic(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ViewError> {
    let outcome = state
        .cache
        .current_or_refresh()
        .await
        .map_err(|e| ViewError::SourceUnreachable(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "fetched_at": outcome.snapshot.fetched_at.to_rfc3339(),
        "sheets": outcome.diagnostics,
        "report": outcome.report,
    })))
}
