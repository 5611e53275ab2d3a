//! Tabular data source access
//!
//! The dashboard reads everything from named tabs of one external
//! spreadsheet. `SheetSource` is the seam between the ingestion pipeline
//! and the transport: production uses [`GoogleSheetsClient`], tests use
//! [`FixedSource`] with in-memory grids.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

pub mod auth;
pub mod client;

pub use client::GoogleSheetsClient;

/// Sheet access errors. All of these are "source unreachable" from the
/// pipeline's point of view: fatal for the current refresh, retried from
/// scratch on the next one.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Tab not found: {0}")]
    TabNotFound(String),
}

/// Raw row-major cell grid for one tab. Cells are untyped strings; all
/// typing happens in the ingestion pipeline.
#[derive(Debug, Clone)]
pub struct SheetGrid {
    /// Tab title as requested
    pub tab: String,
    /// Rows as fetched, including any title/header rows
    pub rows: Vec<Vec<String>>,
}

impl SheetGrid {
    /// Split the grid at a 1-indexed header row: returns the trimmed
    /// header names and the data rows below. `None` when the grid is too
    /// short to contain the header row.
    pub fn split_at_header(&self, header_row: usize) -> Option<(Vec<String>, &[Vec<String>])> {
        if header_row == 0 || self.rows.len() < header_row {
            return None;
        }
        let headers = self.rows[header_row - 1]
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        Some((headers, &self.rows[header_row..]))
    }

    /// Cell accessor tolerant of ragged rows (short rows read as empty)
    pub fn cell<'r>(row: &'r [String], index: usize) -> &'r str {
        row.get(index).map(String::as_str).unwrap_or("")
    }
}

/// Transport seam for fetching one tab as a raw grid
#[async_trait]
pub trait SheetSource: Send + Sync {
    /// Fetch all populated cells of the named tab
    async fn fetch_grid(&self, tab: &str) -> Result<SheetGrid, SheetError>;
}

/// In-memory source for tests and offline demos
#[derive(Debug, Clone, Default)]
pub struct FixedSource {
    tabs: HashMap<String, Vec<Vec<String>>>,
}

impl FixedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tab with its raw rows
    pub fn with_tab<S: Into<String>>(mut self, tab: S, rows: Vec<Vec<String>>) -> Self {
        self.tabs.insert(tab.into(), rows);
        self
    }
}

#[async_trait]
impl SheetSource for FixedSource {
    async fn fetch_grid(&self, tab: &str) -> Result<SheetGrid, SheetError> {
        match self.tabs.get(tab) {
            Some(rows) => Ok(SheetGrid {
                tab: tab.to_string(),
                rows: rows.clone(),
            }),
            None => Err(SheetError::TabNotFound(tab.to_string())),
        }
    }
}
