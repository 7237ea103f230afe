// crates/session-gate-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payloads.
// Purpose: Deterministic examples for docs and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical examples for Session Gate configuration. Outputs are
//! deterministic and kept in sync with the validation rules in
//! [`crate::config`].

/// Returns a canonical example `session-gate.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[server]
bind = "127.0.0.1:8488"
max_body_bytes = 1048576

[gate]
protected_prefixes = ["/protected"]
login_path = "/login"
redirect_param = "redirectedFrom"

[resolver]
endpoint = "https://auth.example.com/session"
timeout_ms = 5000
max_response_bytes = 65536
# allow_http = false

[upstream]
origin = "https://app.example.com"
timeout_ms = 10000
# allow_http = false

[audit]
enabled = true
"#,
    )
}

// ============================================================================
// SECTION: Tests
// ============================================================================
