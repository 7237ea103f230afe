// crates/session-gate-core/tests/gate_decision.rs
// ============================================================================
// Module: Gate Decision Tests
// Description: Tests for forward/redirect decisions and fail-closed behavior.
// Purpose: Validate the gate's two-state contract against resolver outcomes.
// ============================================================================

//! ## Overview
//! Validates that valid sessions forward with their mutations, that absent
//! sessions redirect with the exact original path, and that resolution
//! failures collapse into the identical redirect (fail-closed).

#![allow(clippy::unwrap_used, reason = "Tests unwrap on deterministic fixtures.")]
#![allow(clippy::expect_used, reason = "Tests use expect for explicit failure messages.")]
#![allow(clippy::panic, reason = "Tests panic on unexpected decision variants.")]

use async_trait::async_trait;
use session_gate_core::CredentialMaterial;
use session_gate_core::GateDecision;
use session_gate_core::GateRequest;
use session_gate_core::GateSettings;
use session_gate_core::Resolution;
use session_gate_core::ResolverError;
use session_gate_core::ResponseMutation;
use session_gate_core::Session;
use session_gate_core::SessionGate;
use session_gate_core::SessionResolver;
use session_gate_core::StaticSessionResolver;

// ============================================================================
// SECTION: Test Fixtures
// ============================================================================

/// Resolver that fails structurally on every request.
struct FailingResolver;

#[async_trait]
impl SessionResolver for FailingResolver {
    async fn resolve(
        &self,
        _credentials: &CredentialMaterial,
    ) -> Result<Resolution, ResolverError> {
        Err(ResolverError::Transport("connection refused".to_string()))
    }
}

/// Builds a request for the given path with empty credentials.
fn request(path: &str) -> GateRequest {
    GateRequest::new(path, CredentialMaterial::default())
}

// ============================================================================
// SECTION: Forward Path
// ============================================================================

#[tokio::test]
async fn valid_session_forwards() {
    let gate = SessionGate::default();
    let resolver = StaticSessionResolver::authenticated(Some("user-1".to_string()));
    let decision = gate.check(&request("/protected/dashboard"), &resolver).await;
    assert!(decision.is_forward());
}

#[tokio::test]
async fn forward_carries_resolver_mutations() {
    let gate = SessionGate::default();
    let mutation = ResponseMutation {
        name: "set-cookie".to_string(),
        value: "sb-token=refreshed; Path=/".to_string(),
    };
    let resolver = StaticSessionResolver::new(Resolution::Authenticated {
        session: Session::default(),
        mutations: vec![mutation.clone()],
    });
    let decision = gate.check(&request("/protected/dashboard"), &resolver).await;
    match decision {
        GateDecision::Forward {
            mutations,
        } => assert_eq!(mutations, vec![mutation]),
        GateDecision::Redirect {
            target,
        } => panic!("expected forward, got redirect to {}", target.location()),
    }
}

// ============================================================================
// SECTION: Redirect Path
// ============================================================================

#[tokio::test]
async fn anonymous_request_redirects_to_login() {
    let gate = SessionGate::default();
    let resolver = StaticSessionResolver::anonymous();
    let decision = gate.check(&request("/protected/dashboard"), &resolver).await;
    assert_eq!(
        decision.location().expect("redirect location"),
        "/login?redirectedFrom=%2Fprotected%2Fdashboard"
    );
}

#[tokio::test]
async fn redirect_uses_configured_settings() {
    let gate = SessionGate::new(GateSettings {
        login_path: "/auth/sign-in".to_string(),
        redirect_param: "next".to_string(),
    });
    let resolver = StaticSessionResolver::anonymous();
    let decision = gate.check(&request("/protected/archive"), &resolver).await;
    assert_eq!(
        decision.location().expect("redirect location"),
        "/auth/sign-in?next=%2Fprotected%2Farchive"
    );
}

// ============================================================================
// SECTION: Fail-Closed Behavior
// ============================================================================

#[tokio::test]
async fn resolver_failure_redirects_identically_to_no_session() {
    let gate = SessionGate::default();
    let path = request("/protected/dashboard");

    let anonymous = gate.check(&path, &StaticSessionResolver::anonymous()).await;
    let failed = gate.check(&path, &FailingResolver).await;

    assert_eq!(anonymous, failed);
    assert_eq!(anonymous.location(), failed.location());
}

#[tokio::test]
async fn backend_error_never_forwards() {
    let gate = SessionGate::default();
    let decision = gate.decide(
        "/protected/dashboard",
        Err(ResolverError::Backend("unexpected status 500".to_string())),
    );
    assert!(!decision.is_forward());
}

// ============================================================================
// SECTION: Idempotence
// ============================================================================

#[tokio::test]
async fn repeated_anonymous_checks_yield_the_same_redirect() {
    let gate = SessionGate::default();
    let resolver = StaticSessionResolver::anonymous();
    let req = request("/protected/dashboard");

    let first = gate.check(&req, &resolver).await;
    let second = gate.check(&req, &resolver).await;

    assert_eq!(first, second);
}
