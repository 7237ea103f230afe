// crates/session-gate-core/src/resolver.rs
// ============================================================================
// Module: Session Resolver Interface
// Description: Transport-agnostic interface for session resolution.
// Purpose: Define the collaborator contract the gate consumes.
// Dependencies: async-trait, serde, thiserror
// ============================================================================

//! ## Overview
//! The session resolver is an external capability: given the credential
//! material from one request, it reports whether a valid authenticated
//! session exists. The gate never creates, mutates, or destroys sessions;
//! it only consumes this interface. Resolution may also produce auxiliary
//! response mutations (refreshed session cookies) that the transport must
//! propagate on the forward path.
//!
//! Security posture: resolution failures are a trust boundary and the gate
//! fails closed on them; implementations must never report a session they
//! could not positively verify.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::request::CredentialMaterial;

// ============================================================================
// SECTION: Session Types
// ============================================================================

/// Opaque record of a valid authenticated session.
///
/// # Invariants
/// - The gate consumes presence only; `subject` exists for audit labeling
///   and is never required to be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Optional subject label reported by the backend.
    pub subject: Option<String>,
}

/// Response mutation attached by the resolver, propagated on forward.
///
/// # Invariants
/// - Mutations are response header additions (typically `Set-Cookie`) and
///   are applied only when the gate decides to forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMutation {
    /// Response header name.
    pub name: String,
    /// Response header value.
    pub value: String,
}

/// Outcome of one session resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A valid, non-expired session exists.
    Authenticated {
        /// The resolved session.
        session: Session,
        /// Response mutations to propagate on the forward path.
        mutations: Vec<ResponseMutation>,
    },
    /// No valid session exists.
    Anonymous,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Session resolution failures.
///
/// These are structural failures of the resolution step itself, distinct
/// from the expected `Anonymous` outcome. The gate treats both identically
/// (fail-closed), but audit events distinguish them.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// The resolver backend could not be reached.
    #[error("session resolver transport error: {0}")]
    Transport(String),
    /// The resolver backend answered outside its contract.
    #[error("session resolver backend error: {0}")]
    Backend(String),
}

// ============================================================================
// SECTION: Resolver Interface
// ============================================================================

/// Session resolution interface consumed by the gate.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// Resolves whether the credential material names a valid session.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError`] when resolution itself fails; the caller
    /// must treat this the same as an absent session.
    async fn resolve(&self, credentials: &CredentialMaterial) -> Result<Resolution, ResolverError>;
}

// ============================================================================
// SECTION: Static Resolver
// ============================================================================

/// In-memory resolver for tests and development wiring.
///
/// # Invariants
/// - Returns a clone of the configured resolution for every request and
///   never fails.
#[derive(Debug, Clone)]
pub struct StaticSessionResolver {
    /// Resolution returned for every request.
    resolution: Resolution,
}

impl StaticSessionResolver {
    /// Builds a resolver that reports the given resolution unconditionally.
    #[must_use]
    pub const fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
        }
    }

    /// Builds a resolver that authenticates every request.
    #[must_use]
    pub fn authenticated(subject: Option<String>) -> Self {
        Self::new(Resolution::Authenticated {
            session: Session {
                subject,
            },
            mutations: Vec::new(),
        })
    }

    /// Builds a resolver that reports no session for every request.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self::new(Resolution::Anonymous)
    }
}

#[async_trait]
impl SessionResolver for StaticSessionResolver {
    async fn resolve(
        &self,
        _credentials: &CredentialMaterial,
    ) -> Result<Resolution, ResolverError> {
        Ok(self.resolution.clone())
    }
}
