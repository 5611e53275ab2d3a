//! # Tablero Common Library
//!
//! Shared code for the tablero dashboard service including:
//! - Error types
//! - Configuration loading and validation
//! - Domain model types (ledger, backlog, invoicing, resource costs)
//! - Canonical month table

pub mod config;
pub mod error;
pub mod model;
pub mod months;

pub use error::{Error, Result};
pub use months::{month_name, MONTHS};
