// crates/session-gate-core/src/gate.rs
// ============================================================================
// Module: Session Gate
// Description: Request-time authorization decision for protected paths.
// Purpose: Forward authenticated requests, redirect everything else to login.
// Dependencies: crate::{decision, request, resolver}
// ============================================================================

//! ## Overview
//! The gate decides, for each request the transport routed to it, whether to
//! forward the request unchanged or redirect it to the login entry point.
//! The decision is a pure function of the request path and session presence;
//! nothing crosses invocations. Resolution failures are absorbed and fail
//! closed: the gate never grants access on infrastructure error, never
//! raises a user-visible fault, and never retries within the request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::decision::GateDecision;
use crate::decision::RedirectTarget;
use crate::request::GateRequest;
use crate::resolver::Resolution;
use crate::resolver::ResolverError;
use crate::resolver::SessionResolver;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default login path requests are redirected to.
pub const DEFAULT_LOGIN_PATH: &str = "/login";
/// Default query parameter key carrying the original path.
pub const DEFAULT_REDIRECT_PARAM: &str = "redirectedFrom";

// ============================================================================
// SECTION: Gate Settings
// ============================================================================

/// Gate wiring: where anonymous requests are sent and under which key the
/// original path travels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateSettings {
    /// Fixed login path for redirects.
    pub login_path: String,
    /// Query parameter key carrying the original path.
    pub redirect_param: String,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            redirect_param: DEFAULT_REDIRECT_PARAM.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Session Gate
// ============================================================================

/// Stateless per-request authorization gate.
///
/// # Invariants
/// - Exactly one decision per invocation; the decision depends on nothing
///   but the request path and the resolution outcome.
/// - `Err` outcomes and `Anonymous` outcomes produce identical redirects.
#[derive(Debug, Clone)]
pub struct SessionGate {
    /// Redirect wiring for anonymous requests.
    settings: GateSettings,
}

impl SessionGate {
    /// Creates a gate with the provided settings.
    #[must_use]
    pub const fn new(settings: GateSettings) -> Self {
        Self {
            settings,
        }
    }

    /// Returns the gate settings.
    #[must_use]
    pub const fn settings(&self) -> &GateSettings {
        &self.settings
    }

    /// Resolves the session and produces the decision for one request.
    ///
    /// The decision is not produced before resolution completes; the only
    /// suspension point is the resolver call itself.
    pub async fn check<R>(&self, request: &GateRequest, resolver: &R) -> GateDecision
    where
        R: SessionResolver + ?Sized,
    {
        let outcome = resolver.resolve(&request.credentials).await;
        self.decide(request.path(), outcome)
    }

    /// Converts a resolution outcome into the decision for the given path.
    ///
    /// This is the pure two-state function: a valid session forwards, and
    /// both the absent-session and failed-resolution outcomes collapse into
    /// the same redirect.
    #[must_use]
    pub fn decide(
        &self,
        original_path: &str,
        outcome: Result<Resolution, ResolverError>,
    ) -> GateDecision {
        match outcome {
            Ok(Resolution::Authenticated {
                mutations, ..
            }) => GateDecision::Forward {
                mutations,
            },
            Ok(Resolution::Anonymous) | Err(_) => GateDecision::Redirect {
                target: RedirectTarget {
                    login_path: self.settings.login_path.clone(),
                    redirect_param: self.settings.redirect_param.clone(),
                    original_path: original_path.to_string(),
                },
            },
        }
    }
}

impl Default for SessionGate {
    fn default() -> Self {
        Self::new(GateSettings::default())
    }
}
