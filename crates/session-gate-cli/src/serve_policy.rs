// crates/session-gate-cli/src/serve_policy.rs
// ============================================================================
// Module: Serve Policy
// Description: Network exposure policy checks for the CLI server launcher.
// Purpose: Enforce safe-by-default bind behavior with explicit opt-in.
// Dependencies: session-gate-config, std
// ============================================================================

//! ## Overview
//! Provides safety checks for binding the gateway to non-loopback addresses.
//! The policy is fail-closed: explicit opt-in is required, and exposed binds
//! must not talk to cleartext collaborators.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::net::SocketAddr;

use session_gate_config::SessionGateConfig;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable enabling non-loopback gateway binds.
pub const ALLOW_NON_LOOPBACK_ENV: &str = "SESSION_GATE_ALLOW_NON_LOOPBACK";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Bind outcome metadata for launch warnings.
#[derive(Debug, Clone)]
pub struct BindOutcome {
    /// Bound socket address.
    pub bind_addr: SocketAddr,
    /// True when the gateway is bound to a non-loopback address.
    pub network_exposed: bool,
    /// Whether audit logging is enabled.
    pub audit_enabled: bool,
}

/// Serve policy failures for bind safety.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServePolicyError {
    /// Environment variable was set to an invalid value.
    #[error("{ALLOW_NON_LOOPBACK_ENV} must be one of 1/0/true/false, got {value:?}")]
    InvalidEnv {
        /// Raw environment value.
        value: String,
    },
    /// Bind string failed to parse.
    #[error("server.bind {bind:?} is not a socket address")]
    InvalidBind {
        /// Raw bind value.
        bind: String,
    },
    /// Non-loopback binding requires explicit opt-in.
    #[error(
        "binding {bind} exposes the gateway to the network; pass --allow-non-loopback or set \
         {ALLOW_NON_LOOPBACK_ENV}=1"
    )]
    NonLoopbackOptInRequired {
        /// Bind address.
        bind: String,
    },
    /// Non-loopback binding forbids cleartext collaborators.
    #[error("binding {bind} requires https collaborators; {field} allows cleartext http")]
    NonLoopbackCleartextCollaborator {
        /// Bind address.
        bind: String,
        /// Offending config field.
        field: String,
    },
}

// ============================================================================
// SECTION: Policy Checks
// ============================================================================

/// Resolves the non-loopback opt-in flag from CLI and environment.
///
/// # Errors
/// Returns [`ServePolicyError::InvalidEnv`] when the environment value is invalid.
pub fn resolve_allow_non_loopback(flag: bool) -> Result<bool, ServePolicyError> {
    if flag {
        return Ok(true);
    }
    let Some(value) = env::var_os(ALLOW_NON_LOOPBACK_ENV) else {
        return Ok(false);
    };
    let value = value.to_string_lossy().to_string();
    parse_allow_non_loopback_value(&value)
}

/// Parses an opt-in environment value.
///
/// # Errors
/// Returns [`ServePolicyError::InvalidEnv`] when the value is not a boolean.
pub fn parse_allow_non_loopback_value(value: &str) -> Result<bool, ServePolicyError> {
    match value.trim() {
        "1" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "false" | "FALSE" | "False" => Ok(false),
        other => Err(ServePolicyError::InvalidEnv {
            value: other.to_string(),
        }),
    }
}

/// Enforces loopback-by-default bind restrictions for the gateway.
///
/// # Errors
/// Returns [`ServePolicyError`] when configuration violates exposure rules.
pub fn enforce_bind_policy(
    config: &SessionGateConfig,
    allow_non_loopback: bool,
) -> Result<BindOutcome, ServePolicyError> {
    let bind_addr: SocketAddr =
        config.server.bind.parse().map_err(|_| ServePolicyError::InvalidBind {
            bind: config.server.bind.clone(),
        })?;
    let network_exposed = !bind_addr.ip().is_loopback();
    if network_exposed {
        if !allow_non_loopback {
            return Err(ServePolicyError::NonLoopbackOptInRequired {
                bind: bind_addr.to_string(),
            });
        }
        if config.resolver.allow_http {
            return Err(ServePolicyError::NonLoopbackCleartextCollaborator {
                bind: bind_addr.to_string(),
                field: "resolver.allow_http".to_string(),
            });
        }
        if config.upstream.allow_http {
            return Err(ServePolicyError::NonLoopbackCleartextCollaborator {
                bind: bind_addr.to_string(),
                field: "upstream.allow_http".to_string(),
            });
        }
    }
    Ok(BindOutcome {
        bind_addr,
        network_exposed,
        audit_enabled: config.audit.enabled,
    })
}
