//! Time-boxed snapshot cache
//!
//! One ingestion outcome is shared read-only across all viewers and
//! recomputed at most once per TTL window. Callers ask for "current or
//! refresh" explicitly; there is no ambient memoized state. Concurrent
//! refreshes are not mutually excluded: the worst case is a redundant
//! recompute, never corrupted data, since outcomes are immutable once
//! produced.

use crate::ingest::{self, IngestOutcome};
use crate::sheets::SheetSource;
use chrono::Utc;
use std::sync::Arc;
use tablero_common::config::Config;
use tablero_common::Result;
use tokio::sync::RwLock;

pub struct SnapshotCache {
    source: Arc<dyn SheetSource>,
    config: Arc<Config>,
    inner: RwLock<Option<Arc<IngestOutcome>>>,
}

impl SnapshotCache {
    pub fn new(source: Arc<dyn SheetSource>, config: Arc<Config>) -> Self {
        Self {
            source,
            config,
            inner: RwLock::new(None),
        }
    }

    /// Return the cached outcome when it is younger than the TTL,
    /// otherwise run a fresh ingestion and cache it
    pub async fn current_or_refresh(&self) -> Result<Arc<IngestOutcome>> {
        {
            let cached = self.inner.read().await;
            if let Some(outcome) = cached.as_ref() {
                if self.is_fresh(outcome) {
                    return Ok(Arc::clone(outcome));
                }
            }
        }
        self.refresh().await
    }

    /// Unconditionally re-run ingestion and replace the cached outcome.
    /// A failed run leaves the cache untouched and surfaces the error;
    /// the next request retries from scratch.
    pub async fn refresh(&self) -> Result<Arc<IngestOutcome>> {
        // The lock is not held across the fetch; a concurrent refresh
        // just produces a second, equally valid snapshot
        let outcome = Arc::new(ingest::run(self.source.as_ref(), &self.config).await?);
        let mut cached = self.inner.write().await;
        *cached = Some(Arc::clone(&outcome));
        Ok(outcome)
    }

    fn is_fresh(&self, outcome: &IngestOutcome) -> bool {
        let age = Utc::now() - outcome.snapshot.fetched_at;
        age < chrono::Duration::minutes(self.config.cache_ttl_minutes as i64)
    }
}
