// crates/session-gate-config/tests/gate_validation.rs
// ============================================================================
// Module: Gate Config Validation Tests
// Description: Validate protected prefix and redirect wiring rules.
// Purpose: Ensure the gate section fails closed on malformed input.
// ============================================================================

//! ## Overview
//! Validates the gate section: prefix shape rules go through the real
//! matcher, the login path must stay outside the protected set, and the
//! redirect parameter must be a usable query key.

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
fn empty_prefix_list_is_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.gate.protected_prefixes.clear();
    assert_invalid(config.validate(), "gate.protected_prefixes")
}

#[test]
fn root_prefix_is_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.gate.protected_prefixes = vec!["/".to_string()];
    assert_invalid(config.validate(), "gate.protected_prefixes")
}

#[test]
fn relative_prefix_is_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.gate.protected_prefixes = vec!["protected".to_string()];
    assert_invalid(config.validate(), "gate.protected_prefixes")
}

#[test]
fn login_path_under_protected_prefix_is_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.gate.login_path = "/protected/login".to_string();
    assert_invalid(config.validate(), "gate.login_path")
}

#[test]
fn relative_login_path_is_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.gate.login_path = "login".to_string();
    assert_invalid(config.validate(), "gate.login_path")
}

#[test]
fn redirect_param_with_reserved_characters_is_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    for param in ["", "a=b", "a&b", "a?b", "a#b"] {
        config.gate.redirect_param = param.to_string();
        assert_invalid(config.validate(), "gate.redirect_param")?;
    }
    Ok(())
}

#[test]
fn matcher_agrees_with_validated_prefixes() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.gate.protected_prefixes = vec!["/protected".to_string(), "/admin".to_string()];
    let matcher = config.gate.matcher().map_err(|err| err.to_string())?;
    if !matcher.matches("/admin/reports") || matcher.matches("/adminx") {
        return Err("matcher disagrees with configured prefixes".to_string());
    }
    Ok(())
}
