//! Configuration loading and validation
//!
//! Config file resolution follows a tiered priority order:
//! 1. Command-line argument (highest priority)
//! 2. `TABLERO_CONFIG` environment variable
//! 3. Platform config dir (`~/.config/tablero/config.toml` on Linux)
//! 4. `./tablero.toml` in the working directory (fallback)
//!
//! All schema aliases and tab names carry compiled defaults so a minimal
//! config file only needs the spreadsheet id and the credential path.

use crate::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable naming the config file path
pub const CONFIG_ENV_VAR: &str = "TABLERO_CONFIG";

/// Top-level service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Listen address for the HTTP server
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Snapshot time-to-live in minutes; must fall within 10-60
    #[serde(default = "default_ttl")]
    pub cache_ttl_minutes: u64,

    /// Spreadsheet identifier at the tabular data source
    pub spreadsheet_id: String,

    /// Path to the opaque credential blob (OAuth JSON).
    /// Contents are read into process memory only and never logged.
    pub credentials_path: PathBuf,

    /// Tab (sheet) names within the spreadsheet
    #[serde(default)]
    pub tabs: TabsConfig,

    /// Declared column aliases per logical field, per sheet kind
    #[serde(default)]
    pub schema: SchemaConfig,

    /// Consultant name reconciliation table: known display-name variants
    /// mapped to the canonical uppercase identity used for cost joins.
    /// Keys and values are uppercased at load; duplicate keys that only
    /// differ by case are rejected.
    #[serde(default)]
    pub consultant_aliases: HashMap<String, String>,
}

/// Fixed tab names; the source does not expose tab discovery we trust
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TabsConfig {
    /// Financial ledger ("movements") tab, headers in row 1
    pub ledger: String,
    /// Invoicing plan ("billing") tab, headers in row 1
    pub billing: String,
    /// Fixed-costs tab, headers in row 1
    pub fixed_costs: String,
    /// Resource-cost dictionary tab, headers in row 1
    pub resource_costs: String,
    /// Per-consultant backlog tabs; the tab name is the consultant's
    /// display identity
    pub backlog: Vec<String>,
    /// 1-indexed row carrying the backlog headers. Backlog tabs keep
    /// title rows above the header; the offset is fixed, not detected.
    pub backlog_header_row: usize,
}

impl Default for TabsConfig {
    fn default() -> Self {
        Self {
            ledger: "Movimientos".to_string(),
            billing: "Facturacion".to_string(),
            fixed_costs: "Costos Fijos".to_string(),
            resource_costs: "Costos Recurso".to_string(),
            backlog: Vec::new(),
            backlog_header_row: 3,
        }
    }
}

/// Ordered candidate substrings per logical field. The first column whose
/// trimmed name contains any candidate wins; candidates are checked in
/// declaration order.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    pub ledger: LedgerFields,
    pub backlog: BacklogFields,
    pub billing: BillingFields,
    pub fixed_costs: FixedCostFields,
    pub resource_costs: ResourceCostFields,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            ledger: LedgerFields::default(),
            backlog: BacklogFields::default(),
            billing: BillingFields::default(),
            fixed_costs: FixedCostFields::default(),
            resource_costs: ResourceCostFields::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerFields {
    pub date: Vec<String>,
    pub amount: Vec<String>,
    pub cost_center: Vec<String>,
    pub description: Vec<String>,
}

impl Default for LedgerFields {
    fn default() -> Self {
        Self {
            date: vec!["Fecha".into()],
            amount: vec!["Monto".into(), "Valor".into()],
            cost_center: vec!["Centro".into(), "Cliente".into()],
            description: vec!["Descripci".into(), "Detalle".into()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BacklogFields {
    pub client: Vec<String>,
    pub task_type: Vec<String>,
    pub estimated_hours: Vec<String>,
    pub actual_hours: Vec<String>,
    pub delivery_date: Vec<String>,
}

impl Default for BacklogFields {
    fn default() -> Self {
        Self {
            client: vec!["Cliente".into()],
            task_type: vec!["Tipo".into(), "Tarea".into()],
            estimated_hours: vec!["Estimad".into()],
            actual_hours: vec!["Real".into()],
            delivery_date: vec!["Entrega".into(), "Fecha".into()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BillingFields {
    pub month: Vec<String>,
    pub client: Vec<String>,
    pub billed_total: Vec<String>,
}

impl Default for BillingFields {
    fn default() -> Self {
        Self {
            month: vec!["Mes".into()],
            client: vec!["Cliente".into()],
            billed_total: vec!["Factur".into(), "Total".into(), "Valor".into()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FixedCostFields {
    pub amount: Vec<String>,
}

impl Default for FixedCostFields {
    fn default() -> Self {
        Self {
            amount: vec!["Monto".into(), "Valor".into()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResourceCostFields {
    pub name: Vec<String>,
    pub hourly_rate: Vec<String>,
}

impl Default for ResourceCostFields {
    fn default() -> Self {
        Self {
            name: vec!["Nombre".into(), "Colaborador".into()],
            hourly_rate: vec!["Tarifa".into(), "Hora".into(), "Valor".into()],
        }
    }
}

impl Config {
    /// Resolve the config file path and load it.
    ///
    /// Priority: CLI argument, then `TABLERO_CONFIG`, then the platform
    /// config dir, then `./tablero.toml`.
    pub fn resolve(cli_arg: Option<&str>) -> Result<Config> {
        let path = resolve_config_path(cli_arg)?;
        Self::load(&path)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read config file {}: {}", path.display(), e))
        })?;
        let mut config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("invalid config file {}: {}", path.display(), e)))?;
        config.normalize_aliases()?;
        config.validate()?;
        Ok(config)
    }

    /// Uppercase the reconciliation table; reject case-only duplicate keys
    fn normalize_aliases(&mut self) -> Result<()> {
        let mut normalized: HashMap<String, String> = HashMap::new();
        for (alias, canonical) in &self.consultant_aliases {
            let key = alias.trim().to_uppercase();
            let value = canonical.trim().to_uppercase();
            if let Some(existing) = normalized.get(&key) {
                if existing != &value {
                    return Err(Error::Config(format!(
                        "consultant alias '{}' maps to both '{}' and '{}'",
                        key, existing, value
                    )));
                }
            }
            normalized.insert(key, value);
        }
        self.consultant_aliases = normalized;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.spreadsheet_id.trim().is_empty() {
            return Err(Error::Config("spreadsheet_id must not be empty".to_string()));
        }
        if !(10..=60).contains(&self.cache_ttl_minutes) {
            return Err(Error::Config(format!(
                "cache_ttl_minutes must be within 10-60, got {}",
                self.cache_ttl_minutes
            )));
        }
        if self.tabs.backlog_header_row == 0 {
            return Err(Error::Config(
                "tabs.backlog_header_row is 1-indexed and must be >= 1".to_string(),
            ));
        }
        for (label, name) in [
            ("tabs.ledger", &self.tabs.ledger),
            ("tabs.billing", &self.tabs.billing),
            ("tabs.fixed_costs", &self.tabs.fixed_costs),
            ("tabs.resource_costs", &self.tabs.resource_costs),
        ] {
            if name.trim().is_empty() {
                return Err(Error::Config(format!("{} must not be empty", label)));
            }
        }
        for tab in &self.tabs.backlog {
            if tab.trim().is_empty() {
                return Err(Error::Config(
                    "tabs.backlog entries must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "127.0.0.1:5780".to_string()
}

fn default_ttl() -> u64 {
    30
}

/// Apply the tiered path resolution
fn resolve_config_path(cli_arg: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return Ok(PathBuf::from(path));
    }

    if let Some(dir) = dirs::config_dir() {
        let path = dir.join("tablero").join("config.toml");
        if path.exists() {
            return Ok(path);
        }
    }

    let fallback = PathBuf::from("tablero.toml");
    if fallback.exists() {
        Ok(fallback)
    } else {
        Err(Error::Config(
            "no config file found (checked CLI arg, TABLERO_CONFIG, platform config dir, ./tablero.toml)"
                .to_string(),
        ))
    }
}
