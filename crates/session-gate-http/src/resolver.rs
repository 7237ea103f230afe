// crates/session-gate-http/src/resolver.rs
// ============================================================================
// Module: HTTP Session Resolver
// Description: Session resolution against an HTTP auth backend.
// Purpose: Map backend session lookups onto the resolver interface.
// Dependencies: reqwest, serde_json, session-gate-core, session-gate-config
// ============================================================================

//! ## Overview
//! The HTTP resolver issues one bounded GET per gated request, forwarding
//! the request's cookie and authorization material to the auth backend's
//! session endpoint. A `2xx` answer is a valid session (refreshed cookies
//! become forward-path mutations); `401`/`403` are the expected anonymous
//! outcome; anything else (timeouts, transport errors, surprising status
//! codes) is a structural failure the gate fails closed on. Redirects are
//! never followed, HTTPS is required unless explicitly opted out, and
//! response bodies are size-capped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::Response;
use reqwest::StatusCode;
use reqwest::Url;
use reqwest::header::AUTHORIZATION;
use reqwest::header::COOKIE;
use reqwest::header::SET_COOKIE;
use reqwest::redirect::Policy;
use serde_json::Value;
use session_gate_config::ResolverConfig;
use session_gate_core::CredentialMaterial;
use session_gate_core::Resolution;
use session_gate_core::ResolverError;
use session_gate_core::ResponseMutation;
use session_gate_core::Session;
use session_gate_core::SessionResolver;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// User agent presented to the auth backend.
const USER_AGENT: &str = "session-gate/0.1";

// ============================================================================
// SECTION: Resolver Implementation
// ============================================================================

/// Session resolver backed by an HTTP auth backend.
///
/// # Invariants
/// - One bounded GET per resolution; no retries inside the request.
/// - Redirects from the backend are treated as contract violations.
/// - Bodies above the configured cap fail resolution rather than truncate.
pub struct HttpSessionResolver {
    /// Session endpoint URL.
    endpoint: Url,
    /// HTTP client used for backend requests.
    client: Client,
    /// Maximum accepted response body size in bytes.
    max_response_bytes: usize,
}

impl HttpSessionResolver {
    /// Builds a resolver from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError`] when the endpoint or client cannot be built.
    pub fn from_config(config: &ResolverConfig) -> Result<Self, ResolverError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|err| ResolverError::Backend(format!("invalid endpoint: {err}")))?;
        if endpoint.scheme() == "http" && !config.allow_http {
            return Err(ResolverError::Backend(
                "cleartext endpoint requires allow_http".to_string(),
            ));
        }
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| ResolverError::Backend(format!("client build failed: {err}")))?;
        Ok(Self {
            endpoint,
            client,
            max_response_bytes: config.max_response_bytes,
        })
    }

    /// Reads the session payload body within the configured cap.
    async fn bounded_body(&self, response: Response) -> Result<Vec<u8>, ResolverError> {
        if let Some(length) = response.content_length() {
            let within_cap = usize::try_from(length).is_ok_and(|len| len <= self.max_response_bytes);
            if !within_cap {
                return Err(ResolverError::Backend("session payload too large".to_string()));
            }
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ResolverError::Transport(format!("body read failed: {err}")))?;
        if bytes.len() > self.max_response_bytes {
            return Err(ResolverError::Backend("session payload too large".to_string()));
        }
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl SessionResolver for HttpSessionResolver {
    async fn resolve(&self, credentials: &CredentialMaterial) -> Result<Resolution, ResolverError> {
        let mut request = self.client.get(self.endpoint.clone());
        if let Some(cookie) = &credentials.cookie {
            request = request.header(COOKIE, cookie.as_str());
        }
        if let Some(authorization) = &credentials.authorization {
            request = request.header(AUTHORIZATION, authorization.as_str());
        }

        let response = request.send().await.map_err(classify_send_error)?;
        let status = response.status();

        if status.is_success() {
            let mutations = refreshed_cookies(&response);
            let body = self.bounded_body(response).await?;
            return Ok(Resolution::Authenticated {
                session: Session {
                    subject: subject_of(&body),
                },
                mutations,
            });
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Ok(Resolution::Anonymous);
        }
        Err(ResolverError::Backend(format!("unexpected session status {status}")))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Classifies a reqwest send failure into a resolver error.
fn classify_send_error(err: reqwest::Error) -> ResolverError {
    if err.is_timeout() {
        ResolverError::Transport("session endpoint timed out".to_string())
    } else if err.is_connect() {
        ResolverError::Transport("session endpoint unreachable".to_string())
    } else {
        ResolverError::Transport(format!("session request failed: {err}"))
    }
}

/// Collects refreshed `Set-Cookie` headers as forward-path mutations.
fn refreshed_cookies(response: &Response) -> Vec<ResponseMutation> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(|value| ResponseMutation {
            name: SET_COOKIE.as_str().to_string(),
            value: value.to_string(),
        })
        .collect()
}

/// Extracts an optional subject label from the session payload.
fn subject_of(body: &[u8]) -> Option<String> {
    let payload: Value = serde_json::from_slice(body).ok()?;
    payload.get("id").and_then(Value::as_str).map(str::to_string)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions on deterministic fixtures."
    )]

    use session_gate_config::ResolverConfig;
    use session_gate_core::ResolverError;

    use super::HttpSessionResolver;
    use super::subject_of;

    /// Returns a resolver config pointing at the given endpoint.
    fn config(endpoint: &str, allow_http: bool) -> ResolverConfig {
        ResolverConfig {
            endpoint: endpoint.to_string(),
            timeout_ms: 1_000,
            allow_http,
            max_response_bytes: 64 * 1024,
        }
    }

    #[test]
    fn cleartext_endpoint_requires_opt_in() {
        let result = HttpSessionResolver::from_config(&config("http://127.0.0.1:9/session", false));
        assert!(matches!(result, Err(ResolverError::Backend(_))));
        assert!(HttpSessionResolver::from_config(&config("http://127.0.0.1:9/session", true)).is_ok());
    }

    #[test]
    fn subject_is_read_from_json_id() {
        assert_eq!(subject_of(br#"{"id":"user-1"}"#), Some("user-1".to_string()));
        assert_eq!(subject_of(br#"{"user":"x"}"#), None);
        assert_eq!(subject_of(b"not json"), None);
    }
}
