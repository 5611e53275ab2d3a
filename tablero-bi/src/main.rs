//! tablero-bi - Business-intelligence dashboard service
//!
//! Ingests spreadsheet tabs, aggregates them, and serves the dashboard
//! web UI. Single optional CLI argument: path to the config file
//! (otherwise resolved via TABLERO_CONFIG / platform config dir).

use anyhow::Result;
use std::sync::Arc;
use tablero_bi::cache::SnapshotCache;
use tablero_bi::sheets::GoogleSheetsClient;
use tablero_bi::{build_router, AppState};
use tablero_common::config::Config;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Tablero BI (tablero-bi) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let cli_config = std::env::args().nth(1);
    let config = match Config::resolve(cli_config.as_deref()) {
        Ok(config) => {
            info!("✓ Loaded configuration ({} backlog tabs)", config.tabs.backlog.len());
            Arc::new(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let client = GoogleSheetsClient::new(&config.spreadsheet_id, &config.credentials_path)
        .map_err(|e| anyhow::anyhow!("cannot initialize sheets client: {}", e))?;
    let cache = Arc::new(SnapshotCache::new(Arc::new(client), Arc::clone(&config)));

    // Warm the cache; a cold source is not fatal at startup, the first
    // page view will surface the error banner and retry
    match cache.current_or_refresh().await {
        Ok(outcome) => info!("✓ Initial snapshot loaded ({})", outcome.report.display_string()),
        Err(e) => warn!("Initial snapshot failed, serving anyway: {}", e),
    }

    let state = AppState::new(cache);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    info!("tablero-bi listening on http://{}", config.listen);
    info!("Health check: http://{}/health", config.listen);

    axum::serve(listener, app).await?;

    Ok(())
}
