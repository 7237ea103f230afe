// crates/session-gate-http/src/guard.rs
// ============================================================================
// Module: Gate Middleware
// Description: Request interception applying the session gate.
// Purpose: Turn gate decisions into forwarded or redirected responses.
// Dependencies: axum, session-gate-core
// ============================================================================

//! ## Overview
//! The guard is mounted only on routers nested under protected prefixes, so
//! it sees exactly the requests the matcher selected. It extracts credential
//! material, suspends on session resolution, converts the gate decision into
//! the HTTP response, and emits one audit event per decision. Forwarded
//! responses carry the resolver's refreshed-cookie mutations; redirects are
//! `307 Temporary Redirect` with the login `Location`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::IpAddr;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::extract::OriginalUri;
use axum::extract::Request;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::HeaderName;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::http::header::COOKIE;
use axum::http::header::LOCATION;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use session_gate_core::CredentialMaterial;
use session_gate_core::GateDecision;
use session_gate_core::Resolution;
use session_gate_core::ResolverError;
use session_gate_core::ResponseMutation;

use crate::audit::Disposition;
use crate::audit::GateAuditEvent;
use crate::server::GatewayState;

// ============================================================================
// SECTION: Middleware
// ============================================================================

/// Applies the session gate to one protected request.
pub(crate) async fn session_guard(
    State(state): State<Arc<GatewayState>>,
    OriginalUri(original): OriginalUri,
    request: Request,
    next: Next,
) -> Response {
    let credentials = extract_credentials(request.headers());
    let peer_ip = peer_ip_of(&request);

    let outcome = state.resolver.resolve(&credentials).await;
    let (disposition, subject) = classify_outcome(&outcome);
    let decision = state.gate.decide(original.path(), outcome);

    state.audit.record(&GateAuditEvent::from_decision(
        original.path(),
        peer_ip,
        &credentials,
        disposition,
        subject,
        &decision,
    ));

    match decision {
        GateDecision::Forward {
            mutations,
        } => {
            let mut response = next.run(request).await;
            apply_mutations(response.headers_mut(), &mutations);
            response
        }
        GateDecision::Redirect {
            target,
        } => redirect_response(&target.location()),
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Extracts opaque credential material from request headers.
fn extract_credentials(headers: &HeaderMap) -> CredentialMaterial {
    let header_value = |name| headers.get(name).and_then(|value| value.to_str().ok());
    CredentialMaterial::new(
        header_value(COOKIE).map(str::to_string),
        header_value(AUTHORIZATION).map(str::to_string),
    )
}

/// Reads the peer address recorded by the connect-info service, if any.
fn peer_ip_of(request: &Request) -> Option<IpAddr> {
    request.extensions().get::<ConnectInfo<SocketAddr>>().map(|ConnectInfo(addr)| addr.ip())
}

/// Classifies a resolution outcome for audit labeling.
fn classify_outcome(
    outcome: &Result<Resolution, ResolverError>,
) -> (Disposition, Option<String>) {
    match outcome {
        Ok(Resolution::Authenticated {
            session, ..
        }) => (Disposition::SessionPresent, session.subject.clone()),
        Ok(Resolution::Anonymous) => (Disposition::NoSession, None),
        Err(err) => (
            Disposition::ResolverFailure {
                reason: err.to_string(),
            },
            None,
        ),
    }
}

/// Appends resolver response mutations to a forwarded response.
fn apply_mutations(headers: &mut HeaderMap, mutations: &[ResponseMutation]) {
    for mutation in mutations {
        let name = HeaderName::try_from(mutation.name.as_str());
        let value = HeaderValue::try_from(mutation.value.as_str());
        if let (Ok(name), Ok(value)) = (name, value) {
            headers.append(name, value);
        }
    }
}

/// Builds the temporary-redirect response for a rendered location.
fn redirect_response(location: &str) -> Response {
    HeaderValue::try_from(location).map_or_else(
        |_| StatusCode::BAD_GATEWAY.into_response(),
        |value| (StatusCode::TEMPORARY_REDIRECT, [(LOCATION, value)]).into_response(),
    )
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

    use axum::http::HeaderMap;
    use axum::http::HeaderValue;
    use axum::http::StatusCode;
    use session_gate_core::ResponseMutation;

    use super::apply_mutations;
    use super::extract_credentials;
    use super::redirect_response;

    #[test]
    fn credentials_are_read_from_cookie_and_authorization() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_static("sb-token=a"));
        headers.insert("authorization", HeaderValue::from_static("Bearer b"));

        let credentials = extract_credentials(&headers);
        assert_eq!(credentials.cookie.as_deref(), Some("sb-token=a"));
        assert_eq!(credentials.authorization.as_deref(), Some("Bearer b"));
    }

    #[test]
    fn missing_headers_yield_empty_material() {
        let credentials = extract_credentials(&HeaderMap::new());
        assert!(credentials.is_empty());
    }

    #[test]
    fn mutations_append_rather_than_replace() {
        let mut headers = HeaderMap::new();
        headers.insert("set-cookie", HeaderValue::from_static("existing=1"));
        apply_mutations(
            &mut headers,
            &[ResponseMutation {
                name: "set-cookie".to_string(),
                value: "sb-token=refreshed".to_string(),
            }],
        );
        assert_eq!(headers.get_all("set-cookie").iter().count(), 2);
    }

    #[test]
    fn invalid_mutations_are_dropped() {
        let mut headers = HeaderMap::new();
        apply_mutations(
            &mut headers,
            &[ResponseMutation {
                name: "bad header".to_string(),
                value: "x".to_string(),
            }],
        );
        assert!(headers.is_empty());
    }

    #[test]
    fn redirect_response_is_a_temporary_redirect() {
        let response = redirect_response("/login?redirectedFrom=%2Fprotected%2Fdashboard");
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers().get("location"),
            Some(&HeaderValue::from_static("/login?redirectedFrom=%2Fprotected%2Fdashboard"))
        );
    }
}
