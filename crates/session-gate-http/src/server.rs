// crates/session-gate-http/src/server.rs
// ============================================================================
// Module: Gateway Server
// Description: Axum gateway mounting the session gate over protected prefixes.
// Purpose: Wire the matcher, gate, resolver, forwarder, and audit sink.
// Dependencies: axum, session-gate-config, session-gate-core, tokio
// ============================================================================

//! ## Overview
//! The gateway applies the configured matcher declaratively: each protected
//! prefix is nested with the gate middleware, everything else falls through
//! to the upstream forwarder with the gate never invoked. Collaborators are
//! injected so tests can substitute resolvers and audit sinks; production
//! wiring comes from [`GatewayServer::from_config`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::OriginalUri;
use axum::extract::Request;
use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::IntoResponse;
use axum::response::Response;
use session_gate_config::SessionGateConfig;
use session_gate_core::GateSettings;
use session_gate_core::PathMatcher;
use session_gate_core::SessionGate;
use session_gate_core::SessionResolver;

use crate::audit::AuditSink;
use crate::audit::NoopAuditSink;
use crate::audit::StderrAuditSink;
use crate::guard::session_guard;
use crate::proxy::UpstreamForwarder;
use crate::resolver::HttpSessionResolver;

// ============================================================================
// SECTION: Gateway State
// ============================================================================

/// Shared per-request state for guard and forwarder handlers.
pub struct GatewayState {
    /// The session gate.
    pub(crate) gate: SessionGate,
    /// Injected session resolver collaborator.
    pub(crate) resolver: Arc<dyn SessionResolver>,
    /// Upstream forwarder.
    pub(crate) forwarder: UpstreamForwarder,
    /// Audit sink for gate decisions.
    pub(crate) audit: Arc<dyn AuditSink>,
    /// Maximum inbound request body size in bytes.
    pub(crate) max_body_bytes: usize,
}

// ============================================================================
// SECTION: Gateway Server
// ============================================================================

/// Gateway server instance.
pub struct GatewayServer {
    /// Validated configuration.
    config: SessionGateConfig,
    /// Validated protected-path matcher.
    matcher: PathMatcher,
    /// Shared handler state.
    state: Arc<GatewayState>,
}

impl GatewayServer {
    /// Builds a gateway with injected collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when configuration is invalid or wiring fails.
    pub fn new(
        config: SessionGateConfig,
        resolver: Arc<dyn SessionResolver>,
        audit: Arc<dyn AuditSink>,
    ) -> Result<Self, GatewayError> {
        config.validate().map_err(|err| GatewayError::Config(err.to_string()))?;
        let matcher = config.gate.matcher().map_err(|err| GatewayError::Config(err.to_string()))?;
        let forwarder = UpstreamForwarder::from_config(&config.upstream)?;
        let gate = SessionGate::new(GateSettings {
            login_path: config.gate.login_path.clone(),
            redirect_param: config.gate.redirect_param.clone(),
        });
        let state = Arc::new(GatewayState {
            gate,
            resolver,
            forwarder,
            audit,
            max_body_bytes: config.server.max_body_bytes,
        });
        Ok(Self {
            config,
            matcher,
            state,
        })
    }

    /// Builds a gateway from configuration with production collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when initialization fails.
    pub fn from_config(config: SessionGateConfig) -> Result<Self, GatewayError> {
        let resolver = HttpSessionResolver::from_config(&config.resolver)
            .map_err(|err| GatewayError::Init(err.to_string()))?;
        let audit: Arc<dyn AuditSink> =
            if config.audit.enabled { Arc::new(StderrAuditSink) } else { Arc::new(NoopAuditSink) };
        Self::new(config, Arc::new(resolver), audit)
    }

    /// Builds the gateway router with the matcher applied declaratively.
    #[must_use]
    pub fn router(&self) -> Router {
        let gated: Router<Arc<GatewayState>> = Router::new().fallback(forward_handler).layer(
            middleware::from_fn_with_state(Arc::clone(&self.state), session_guard),
        );
        let mut app: Router<Arc<GatewayState>> = Router::new().fallback(forward_handler);
        for prefix in self.matcher.prefixes() {
            app = app.nest(prefix, gated.clone());
        }
        app.with_state(Arc::clone(&self.state))
    }

    /// Serves the gateway on the configured bind address.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), GatewayError> {
        let addr = self
            .config
            .server
            .bind_addr()
            .map_err(|err| GatewayError::Config(err.to_string()))?;
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|_| GatewayError::Transport("gateway bind failed".to_string()))?;
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .map_err(|_| GatewayError::Transport("gateway server failed".to_string()))
    }
}

// ============================================================================
// SECTION: Forward Handler
// ============================================================================

/// Relays one request to the upstream origin.
async fn forward_handler(
    State(state): State<Arc<GatewayState>>,
    OriginalUri(original): OriginalUri,
    request: Request,
) -> Response {
    let method = request.method().clone();
    let headers = request.headers().clone();
    let body = match axum::body::to_bytes(request.into_body(), state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::PAYLOAD_TOO_LARGE.into_response(),
    };
    state.forwarder.forward(method, &original, &headers, body).await
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Gateway server errors.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================
