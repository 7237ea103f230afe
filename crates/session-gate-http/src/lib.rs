// crates/session-gate-http/src/lib.rs
// ============================================================================
// Module: Session Gate HTTP Library
// Description: Public API surface for the Session Gate HTTP transport.
// Purpose: Expose the gateway server, resolver client, and audit sinks.
// Dependencies: crate::{audit, guard, proxy, resolver, server}
// ============================================================================

//! ## Overview
//! The HTTP transport mounts the session gate over the configured protected
//! prefixes only: matching is declarative at the router level, so requests
//! outside the protected set never invoke the gate. Gated requests are
//! resolved against the auth backend and either forwarded to the upstream
//! origin (carrying any refreshed session cookies) or answered with a
//! temporary redirect to the login path. Security posture: inbound requests
//! and backend responses are untrusted; all collaborator I/O is bounded and
//! fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub(crate) mod guard;
pub mod proxy;
pub mod resolver;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditSink;
pub use audit::GateAuditEvent;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use proxy::UpstreamForwarder;
pub use resolver::HttpSessionResolver;
pub use server::GatewayError;
pub use server::GatewayServer;
