// crates/session-gate-config/tests/config_defaults.rs
// ============================================================================
// Module: Config Defaults Tests
// Description: Validate default behavior and core config invariants.
// Purpose: Ensure minimal config is valid and defaults are fail-safe.
// ============================================================================

//! ## Overview
//! Validates that a minimal configuration is accepted and that every
//! defaulted field lands on its documented, fail-safe value.

mod common;

use session_gate_config::ConfigError;

/// Test result alias carrying a readable failure message.
type TestResult = Result<(), String>;

/// Asserts that a validation result fails and mentions the given needle.
fn assert_invalid(result: Result<(), ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(()) => Err("expected invalid config".to_string()),
    }
}

#[test]
fn minimal_config_validates() -> TestResult {
    let config = common::minimal_config().map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn server_defaults_to_loopback_bind() -> TestResult {
    let config = common::minimal_config().map_err(|err| err.to_string())?;
    if config.server.bind != "127.0.0.1:8488" {
        return Err(format!("unexpected default bind {}", config.server.bind));
    }
    Ok(())
}

#[test]
fn gate_defaults_to_login_and_redirected_from() -> TestResult {
    let config = common::minimal_config().map_err(|err| err.to_string())?;
    if config.gate.login_path != "/login" {
        return Err(format!("unexpected default login path {}", config.gate.login_path));
    }
    if config.gate.redirect_param != "redirectedFrom" {
        return Err(format!("unexpected default redirect param {}", config.gate.redirect_param));
    }
    Ok(())
}

#[test]
fn collaborators_default_to_https_only() -> TestResult {
    let config = common::minimal_config().map_err(|err| err.to_string())?;
    if config.resolver.allow_http || config.upstream.allow_http {
        return Err("allow_http should default to false".to_string());
    }
    Ok(())
}

#[test]
fn audit_defaults_to_enabled() -> TestResult {
    let config = common::minimal_config().map_err(|err| err.to_string())?;
    if !config.audit.enabled {
        return Err("audit.enabled should default to true".to_string());
    }
    Ok(())
}

#[test]
fn invalid_bind_is_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.server.bind = "not-an-address".to_string();
    assert_invalid(config.validate(), "server.bind")
}

#[test]
fn zero_body_limit_is_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.server.max_body_bytes = 0;
    assert_invalid(config.validate(), "server.max_body_bytes")
}
