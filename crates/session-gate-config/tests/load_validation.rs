// crates/session-gate-config/tests/load_validation.rs
// ============================================================================
// Module: Config Load Validation Tests
// Description: Validate on-disk configuration loading rules.
// Purpose: Ensure file loading enforces size, encoding, and parse limits.
// ============================================================================

//! ## Overview
//! Validates the load pipeline against real files: a valid file loads and
//! validates, oversized and non-UTF-8 files are rejected before parsing,
//! and malformed TOML surfaces as a parse error rather than a panic.

#![allow(clippy::unwrap_used, reason = "Tests unwrap on tempdir fixtures.")]
#![allow(clippy::expect_used, reason = "Tests use expect for explicit failure messages.")]

use std::fs;

use session_gate_config::ConfigError;
use session_gate_config::SessionGateConfig;
use session_gate_config::config_toml_example;

#[test]
fn example_file_loads_and_validates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session-gate.toml");
    fs::write(&path, config_toml_example()).unwrap();

    let config = SessionGateConfig::load(Some(&path)).expect("example config loads");
    assert_eq!(config.gate.protected_prefixes, vec!["/protected".to_string()]);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let result = SessionGateConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn oversized_file_is_rejected_before_parsing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session-gate.toml");
    fs::write(&path, vec![b'#'; 1024 * 1024 + 1]).unwrap();

    let result = SessionGateConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::Invalid(message)) if message.contains("size limit")));
}

#[test]
fn non_utf8_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session-gate.toml");
    fs::write(&path, [0xFF, 0xFE, 0x00]).unwrap();

    let result = SessionGateConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::Invalid(message)) if message.contains("utf-8")));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session-gate.toml");
    fs::write(&path, "[gate\nprotected_prefixes = ").unwrap();

    let result = SessionGateConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn invalid_sections_fail_load_after_parse() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session-gate.toml");
    fs::write(
        &path,
        r#"
[gate]
protected_prefixes = ["/"]

[resolver]
endpoint = "https://auth.example.com/session"

[upstream]
origin = "https://app.example.com"
"#,
    )
    .unwrap();

    let result = SessionGateConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}
