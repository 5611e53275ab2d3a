//! HTTP API handlers for tablero-bi

pub mod diagnostic;
pub mod health;
pub mod ui;
pub mod views;

pub use health::health_routes;
