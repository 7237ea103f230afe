// crates/session-gate-http/src/audit.rs
// ============================================================================
// Module: Gate Audit Logging
// Description: Structured audit events for gate decisions.
// Purpose: Emit redacted decision logs without hard dependencies.
// Dependencies: serde, sha2
// ============================================================================

//! ## Overview
//! Every gate decision produces one audit event. Events carry the decision,
//! the disposition that led to it, and at most a SHA-256 fingerprint of the
//! credential material; raw credentials never reach a sink. Sinks are
//! intentionally lightweight so deployments can route events to their
//! preferred logging pipeline without redesign.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::net::IpAddr;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use session_gate_core::CredentialMaterial;
use session_gate_core::GateDecision;
use sha2::Digest;
use sha2::Sha256;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Gate decision audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct GateAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Peer IP address when available.
    pub peer_ip: Option<String>,
    /// Requested path.
    pub path: String,
    /// Decision outcome label.
    pub decision: &'static str,
    /// Disposition that produced the decision.
    pub disposition: &'static str,
    /// Redirect location for redirect decisions.
    pub location: Option<String>,
    /// Session subject label for forward decisions.
    pub subject: Option<String>,
    /// Credential fingerprint (sha256) when material was present.
    pub credential_fingerprint: Option<String>,
    /// Failure reason label for fail-closed redirects.
    pub reason: Option<String>,
}

impl GateAuditEvent {
    /// Builds an event from one gate decision.
    #[must_use]
    pub fn from_decision(
        path: &str,
        peer_ip: Option<IpAddr>,
        credentials: &CredentialMaterial,
        disposition: Disposition,
        subject: Option<String>,
        decision: &GateDecision,
    ) -> Self {
        Self {
            event: "session_gate_decision",
            timestamp_ms: now_ms(),
            peer_ip: peer_ip.map(|ip| ip.to_string()),
            path: path.to_string(),
            decision: if decision.is_forward() { "forward" } else { "redirect" },
            disposition: disposition.label(),
            location: decision.location(),
            subject,
            credential_fingerprint: credential_fingerprint(credentials),
            reason: disposition.into_reason(),
        }
    }
}

/// Resolution disposition recorded alongside the decision.
///
/// The gate collapses `NoSession` and `ResolverFailure` into the identical
/// redirect; the audit trail is the only place the two are told apart.
#[derive(Debug, Clone)]
pub enum Disposition {
    /// A valid session was present.
    SessionPresent,
    /// The resolver reported no session.
    NoSession,
    /// Resolution itself failed and the gate failed closed.
    ResolverFailure {
        /// Resolver failure description.
        reason: String,
    },
}

impl Disposition {
    /// Returns the disposition label.
    const fn label(&self) -> &'static str {
        match self {
            Self::SessionPresent => "session",
            Self::NoSession => "no_session",
            Self::ResolverFailure {
                ..
            } => "resolver_failure",
        }
    }

    /// Consumes the disposition into an optional failure reason.
    fn into_reason(self) -> Option<String> {
        match self {
            Self::SessionPresent | Self::NoSession => None,
            Self::ResolverFailure {
                reason,
            } => Some(reason),
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for gate decisions.
pub trait AuditSink: Send + Sync {
    /// Records a gate audit event.
    fn record(&self, event: &GateAuditEvent);
}

/// Audit sink that writes JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, event: &GateAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let mut stderr = std::io::stderr();
            let _ = writeln!(&mut stderr, "{payload}");
        }
    }
}

/// No-op audit sink for disabled auditing and tests.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &GateAuditEvent) {}
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns milliseconds since the Unix epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_millis())
}

/// Fingerprints credential material with SHA-256, when any is present.
#[must_use]
pub fn credential_fingerprint(credentials: &CredentialMaterial) -> Option<String> {
    if credentials.is_empty() {
        return None;
    }
    let mut hasher = Sha256::new();
    hasher.update(b"cookie:");
    hasher.update(credentials.cookie.as_deref().unwrap_or_default().as_bytes());
    hasher.update(b"\nauthorization:");
    hasher.update(credentials.authorization.as_deref().unwrap_or_default().as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        hex.push_str(&format!("{byte:02x}"));
    }
    Some(hex)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
