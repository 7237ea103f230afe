// crates/session-gate-config/src/config.rs
// ============================================================================
// Module: Session Gate Configuration
// Description: Configuration loading and validation for the gateway.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, session-gate-core, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path
//! limits. Every section is validated before the gateway starts; violations
//! fail closed. Protected prefixes are validated through the same matcher
//! the transport wires, so configuration and routing can never disagree.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use session_gate_core::PathMatcher;
use session_gate_core::gate::DEFAULT_LOGIN_PATH;
use session_gate_core::gate::DEFAULT_REDIRECT_PARAM;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "session-gate.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "SESSION_GATE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default server bind address.
const DEFAULT_BIND: &str = "127.0.0.1:8488";
/// Default maximum inbound request body size in bytes.
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
/// Maximum allowed inbound request body size in bytes.
pub(crate) const MAX_BODY_BYTES_LIMIT: usize = 64 * 1024 * 1024;
/// Minimum allowed collaborator timeout in milliseconds.
pub(crate) const MIN_TIMEOUT_MS: u64 = 100;
/// Maximum allowed collaborator timeout in milliseconds.
pub(crate) const MAX_TIMEOUT_MS: u64 = 30_000;
/// Default session resolver timeout in milliseconds.
const DEFAULT_RESOLVER_TIMEOUT_MS: u64 = 5_000;
/// Default upstream forwarding timeout in milliseconds.
const DEFAULT_UPSTREAM_TIMEOUT_MS: u64 = 10_000;
/// Default maximum resolver response size in bytes.
const DEFAULT_RESOLVER_MAX_RESPONSE_BYTES: usize = 64 * 1024;
/// Maximum allowed resolver response size in bytes.
pub(crate) const MAX_RESOLVER_RESPONSE_BYTES: usize = 1024 * 1024;
/// Maximum length of the login path and redirect parameter.
pub(crate) const MAX_GATE_STRING_LENGTH: usize = 512;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Session Gate gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionGateConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Gate configuration.
    pub gate: GateConfig,
    /// Session resolver configuration.
    pub resolver: ResolverConfig,
    /// Upstream origin configuration.
    pub upstream: UpstreamConfig,
    /// Audit logging configuration.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl SessionGateConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.gate.validate()?;
        self.resolver.validate()?;
        self.upstream.validate()?;
        Ok(())
    }
}

/// Server bind configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address the gateway binds to.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum inbound request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl ServerConfig {
    /// Validates the server section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the bind address or limits are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::Invalid(format!("server.bind is not a socket address: {}", self.bind)))?;
        if self.max_body_bytes == 0 || self.max_body_bytes > MAX_BODY_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "server.max_body_bytes must be between 1 and {MAX_BODY_BYTES_LIMIT}"
            )));
        }
        Ok(())
    }

    /// Returns the parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the bind string does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::Invalid(format!("server.bind is not a socket address: {}", self.bind)))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Gate section: protected prefixes and redirect wiring.
#[derive(Debug, Clone, Deserialize)]
pub struct GateConfig {
    /// Protected path prefixes subject to the gate.
    pub protected_prefixes: Vec<String>,
    /// Login path anonymous requests are redirected to.
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Query parameter key carrying the original path.
    #[serde(default = "default_redirect_param")]
    pub redirect_param: String,
}

impl GateConfig {
    /// Validates the gate section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when prefixes or redirect wiring are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let matcher = PathMatcher::new(self.protected_prefixes.iter().cloned())
            .map_err(|err| ConfigError::Invalid(format!("gate.protected_prefixes: {err}")))?;
        if !self.login_path.starts_with('/')
            || !self.login_path.is_ascii()
            || self.login_path.contains(char::is_whitespace)
            || self.login_path.len() > MAX_GATE_STRING_LENGTH
        {
            return Err(ConfigError::Invalid(
                "gate.login_path must be an ascii absolute path within length limits".to_string(),
            ));
        }
        if matcher.matches(&self.login_path) {
            return Err(ConfigError::Invalid(
                "gate.login_path must not fall under a protected prefix".to_string(),
            ));
        }
        if self.redirect_param.is_empty()
            || !self.redirect_param.is_ascii()
            || self.redirect_param.len() > MAX_GATE_STRING_LENGTH
            || self.redirect_param.contains(['=', '&', '?', '#'])
            || self.redirect_param.contains(char::is_whitespace)
        {
            return Err(ConfigError::Invalid(
                "gate.redirect_param must be a non-empty query key".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the validated path matcher for this section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the prefix set is invalid.
    pub fn matcher(&self) -> Result<PathMatcher, ConfigError> {
        PathMatcher::new(self.protected_prefixes.iter().cloned())
            .map_err(|err| ConfigError::Invalid(format!("gate.protected_prefixes: {err}")))
    }
}

/// Session resolver endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolverConfig {
    /// Session endpoint URL of the auth backend.
    pub endpoint: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_resolver_timeout_ms")]
    pub timeout_ms: u64,
    /// Allow cleartext HTTP endpoints (disabled by default).
    #[serde(default)]
    pub allow_http: bool,
    /// Maximum resolver response size in bytes.
    #[serde(default = "default_resolver_max_response_bytes")]
    pub max_response_bytes: usize,
}

impl ResolverConfig {
    /// Validates the resolver section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the endpoint or limits are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_endpoint("resolver.endpoint", &self.endpoint, self.allow_http)?;
        validate_timeout("resolver.timeout_ms", self.timeout_ms)?;
        if self.max_response_bytes == 0 || self.max_response_bytes > MAX_RESOLVER_RESPONSE_BYTES {
            return Err(ConfigError::Invalid(format!(
                "resolver.max_response_bytes must be between 1 and {MAX_RESOLVER_RESPONSE_BYTES}"
            )));
        }
        Ok(())
    }
}

/// Upstream origin configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Origin URL gated and unmatched traffic is forwarded to.
    pub origin: String,
    /// Forwarding timeout in milliseconds.
    #[serde(default = "default_upstream_timeout_ms")]
    pub timeout_ms: u64,
    /// Allow cleartext HTTP origins (disabled by default).
    #[serde(default)]
    pub allow_http: bool,
}

impl UpstreamConfig {
    /// Validates the upstream section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the origin or limits are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_endpoint("upstream.origin", &self.origin, self.allow_http)?;
        validate_timeout("upstream.timeout_ms", self.timeout_ms)?;
        Ok(())
    }
}

/// Audit logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Whether gate decisions are audited.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates a config file path against length constraints.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a collaborator endpoint URL and its scheme policy.
fn validate_endpoint(field: &str, value: &str, allow_http: bool) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|err| ConfigError::Invalid(format!("{field} is not a valid url: {err}")))?;
    match url.scheme() {
        "https" => {}
        "http" if allow_http => {}
        "http" => {
            return Err(ConfigError::Invalid(format!(
                "{field} uses cleartext http without allow_http"
            )));
        }
        other => {
            return Err(ConfigError::Invalid(format!("{field} has unsupported scheme {other:?}")));
        }
    }
    if url.host_str().is_none() {
        return Err(ConfigError::Invalid(format!("{field} must name a host")));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(ConfigError::Invalid(format!("{field} must not embed credentials")));
    }
    Ok(())
}

/// Validates a collaborator timeout against the allowed range.
fn validate_timeout(field: &str, timeout_ms: u64) -> Result<(), ConfigError> {
    if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&timeout_ms) {
        return Err(ConfigError::Invalid(format!(
            "{field} must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"
        )));
    }
    Ok(())
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default server bind address.
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Default maximum inbound body size.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Default login path.
fn default_login_path() -> String {
    DEFAULT_LOGIN_PATH.to_string()
}

/// Default redirect parameter key.
fn default_redirect_param() -> String {
    DEFAULT_REDIRECT_PARAM.to_string()
}

/// Default resolver timeout.
const fn default_resolver_timeout_ms() -> u64 {
    DEFAULT_RESOLVER_TIMEOUT_MS
}

/// Default resolver response size cap.
const fn default_resolver_max_response_bytes() -> usize {
    DEFAULT_RESOLVER_MAX_RESPONSE_BYTES
}

/// Default upstream timeout.
const fn default_upstream_timeout_ms() -> u64 {
    DEFAULT_UPSTREAM_TIMEOUT_MS
}

/// Default audit toggle.
const fn default_audit_enabled() -> bool {
    true
}
