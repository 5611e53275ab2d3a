//! Unit tests for configuration loading and validation
//!
//! Tests cover:
//! - Minimal config file with compiled defaults
//! - TTL range validation (10-60 minutes)
//! - Consultant alias normalization and duplicate rejection
//! - Tab name validation
//!
//! Note: Uses serial_test to prevent ENV variable race conditions.
//! Tests that manipulate TABLERO_CONFIG are marked with #[serial].

use serial_test::serial;
use std::env;
use std::io::Write;
use tablero_common::config::{Config, CONFIG_ENV_VAR};
use tempfile::NamedTempFile;

/// Test helper: write a config file and load it
fn load_from_str(content: &str) -> tablero_common::Result<Config> {
    let mut file = NamedTempFile::new().expect("Should create temp file");
    file.write_all(content.as_bytes()).expect("Should write config");
    Config::load(file.path())
}

const MINIMAL: &str = r#"
spreadsheet_id = "1AbC"
credentials_path = "/etc/tablero/credentials.json"
"#;

#[test]
fn minimal_config_uses_defaults() {
    let config = load_from_str(MINIMAL).expect("Minimal config should load");

    assert_eq!(config.listen, "127.0.0.1:5780");
    assert_eq!(config.cache_ttl_minutes, 30);
    assert_eq!(config.tabs.ledger, "Movimientos");
    assert_eq!(config.tabs.backlog_header_row, 3);
    assert!(config.tabs.backlog.is_empty());
    // Default schema aliases present
    assert_eq!(config.schema.ledger.amount, vec!["Monto", "Valor"]);
    assert_eq!(config.schema.ledger.date, vec!["Fecha"]);
}

#[test]
fn ttl_below_range_is_rejected() {
    let result = load_from_str(
        r#"
spreadsheet_id = "1AbC"
credentials_path = "/tmp/c.json"
cache_ttl_minutes = 5
"#,
    );
    assert!(result.is_err());
}

#[test]
fn ttl_above_range_is_rejected() {
    let result = load_from_str(
        r#"
spreadsheet_id = "1AbC"
credentials_path = "/tmp/c.json"
cache_ttl_minutes = 120
"#,
    );
    assert!(result.is_err());
}

#[test]
fn ttl_boundaries_are_accepted() {
    for ttl in [10, 60] {
        let config = load_from_str(&format!(
            "spreadsheet_id = \"1AbC\"\ncredentials_path = \"/tmp/c.json\"\ncache_ttl_minutes = {}\n",
            ttl
        ))
        .expect("Boundary TTL should load");
        assert_eq!(config.cache_ttl_minutes, ttl);
    }
}

#[test]
fn empty_spreadsheet_id_is_rejected() {
    let result = load_from_str(
        r#"
spreadsheet_id = "  "
credentials_path = "/tmp/c.json"
"#,
    );
    assert!(result.is_err());
}

#[test]
fn aliases_are_uppercased_at_load() {
    let config = load_from_str(
        r#"
spreadsheet_id = "1AbC"
credentials_path = "/tmp/c.json"

[consultant_aliases]
"Alejandra B" = "Alejandra Borrero"
"#,
    )
    .expect("Config with aliases should load");

    assert_eq!(
        config.consultant_aliases.get("ALEJANDRA B"),
        Some(&"ALEJANDRA BORRERO".to_string())
    );
}

#[test]
fn case_duplicate_alias_with_conflicting_target_is_rejected() {
    // "jimmy" and "Jimmy" normalize to the same key but point at
    // different canonical identities; alias drift must fail at load.
    let result = load_from_str(
        r#"
spreadsheet_id = "1AbC"
credentials_path = "/tmp/c.json"

[consultant_aliases]
"jimmy" = "Jimmy Gomez"
"Jimmy" = "Jimmy Gonzalez"
"#,
    );
    assert!(result.is_err());
}

#[test]
fn empty_backlog_tab_name_is_rejected() {
    let result = load_from_str(
        r#"
spreadsheet_id = "1AbC"
credentials_path = "/tmp/c.json"

[tabs]
backlog = ["Sebastian", ""]
"#,
    );
    assert!(result.is_err());
}

#[test]
fn zero_header_row_is_rejected() {
    let result = load_from_str(
        r#"
spreadsheet_id = "1AbC"
credentials_path = "/tmp/c.json"

[tabs]
backlog_header_row = 0
"#,
    );
    assert!(result.is_err());
}

#[test]
#[serial]
fn env_var_points_resolution_at_file() {
    let mut file = NamedTempFile::new().expect("Should create temp file");
    file.write_all(MINIMAL.as_bytes()).expect("Should write config");

    env::set_var(CONFIG_ENV_VAR, file.path());
    let config = Config::resolve(None).expect("Should resolve via env var");
    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(config.spreadsheet_id, "1AbC");
}

#[test]
#[serial]
fn cli_argument_beats_env_var() {
    let mut cli_file = NamedTempFile::new().expect("Should create temp file");
    cli_file
        .write_all(
            b"spreadsheet_id = \"from-cli\"\ncredentials_path = \"/tmp/c.json\"\n",
        )
        .expect("Should write config");

    let mut env_file = NamedTempFile::new().expect("Should create temp file");
    env_file
        .write_all(
            b"spreadsheet_id = \"from-env\"\ncredentials_path = \"/tmp/c.json\"\n",
        )
        .expect("Should write config");

    env::set_var(CONFIG_ENV_VAR, env_file.path());
    let config = Config::resolve(cli_file.path().to_str())
        .expect("Should resolve via CLI argument");
    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(config.spreadsheet_id, "from-cli");
}
