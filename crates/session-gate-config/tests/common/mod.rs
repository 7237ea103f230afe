// crates/session-gate-config/tests/common/mod.rs
// ============================================================================
// Module: Config Test Helpers
// Description: Shared fixtures for configuration tests.
// Purpose: Provide a minimal valid configuration for mutation-based tests.
// ============================================================================

//! Shared helpers for config test suites.

use session_gate_config::ConfigError;
use session_gate_config::SessionGateConfig;

/// Returns a minimal valid configuration.
///
/// # Errors
///
/// Returns [`ConfigError`] when the fixture fails to parse.
pub fn minimal_config() -> Result<SessionGateConfig, ConfigError> {
    let content = r#"
[gate]
protected_prefixes = ["/protected"]

[resolver]
endpoint = "https://auth.example.com/session"

[upstream]
origin = "https://app.example.com"
"#;
    toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
}
