// crates/session-gate-core/src/decision.rs
// ============================================================================
// Module: Gate Decision Types
// Description: Forward/redirect decision values produced by the gate.
// Purpose: Fully determine the HTTP-level response for one gated request.
// Dependencies: serde, url
// ============================================================================

//! ## Overview
//! A [`GateDecision`] is the ephemeral output of one gate invocation,
//! consumed immediately by the transport layer and never persisted. A
//! redirect carries the login path plus the exact original request path in
//! a query parameter, percent-encoded per URL query syntax, so the login
//! flow can resume the original navigation after authentication.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use url::form_urlencoded;

use crate::resolver::ResponseMutation;

// ============================================================================
// SECTION: Redirect Target
// ============================================================================

/// Redirect target pointing at the login entry point.
///
/// # Invariants
/// - `location()` is a deterministic function of the three fields; two
///   targets built from the same inputs render identical `Location` values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectTarget {
    /// Fixed login path.
    pub login_path: String,
    /// Query parameter key carrying the original path.
    pub redirect_param: String,
    /// Exact original request path.
    pub original_path: String,
}

impl RedirectTarget {
    /// Renders the `Location` header value for this target.
    #[must_use]
    pub fn location(&self) -> String {
        let query: String = form_urlencoded::Serializer::new(String::new())
            .append_pair(&self.redirect_param, &self.original_path)
            .finish();
        format!("{}?{}", self.login_path, query)
    }
}

// ============================================================================
// SECTION: Gate Decision
// ============================================================================

/// Decision produced for exactly one gated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Pass the request through unmodified, carrying resolver mutations.
    Forward {
        /// Response mutations attached by the session resolver.
        mutations: Vec<ResponseMutation>,
    },
    /// Redirect to the login entry point with temporary-redirect semantics.
    Redirect {
        /// Redirect target for the `Location` header.
        target: RedirectTarget,
    },
}

impl GateDecision {
    /// Returns true when the decision forwards the request.
    #[must_use]
    pub const fn is_forward(&self) -> bool {
        matches!(self, Self::Forward { .. })
    }

    /// Returns the redirect location, when the decision is a redirect.
    #[must_use]
    pub fn location(&self) -> Option<String> {
        match self {
            Self::Forward {
                ..
            } => None,
            Self::Redirect {
                target,
            } => Some(target.location()),
        }
    }
}
