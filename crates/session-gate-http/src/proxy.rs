// crates/session-gate-http/src/proxy.rs
// ============================================================================
// Module: Upstream Forwarder
// Description: Forwards allowed traffic to the configured upstream origin.
// Purpose: Preserve method, path, query, headers, and body on the forward path.
// Dependencies: axum, reqwest, session-gate-config
// ============================================================================

//! ## Overview
//! The forwarder relays one request to the upstream origin and converts the
//! answer back into a transport response. Hop-by-hop headers are stripped in
//! both directions, redirects from the origin pass through untouched, and
//! any forwarding failure maps to `502 Bad Gateway` rather than crashing the
//! request pipeline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use axum::body::Body;
use axum::body::Bytes;
use axum::http::HeaderMap;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::response::IntoResponse;
use axum::response::Response;
use reqwest::Client;
use reqwest::Url;
use reqwest::redirect::Policy;
use session_gate_config::UpstreamConfig;

use crate::server::GatewayError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Hop-by-hop headers never forwarded in either direction.
const HOP_BY_HOP_HEADERS: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
];

// ============================================================================
// SECTION: Forwarder
// ============================================================================

/// Relay onto the configured upstream origin.
///
/// # Invariants
/// - The original path and query are preserved verbatim on the origin.
/// - Upstream failures surface as `502 Bad Gateway`, never as a fault.
pub struct UpstreamForwarder {
    /// Upstream origin URL.
    origin: Url,
    /// HTTP client used for upstream requests.
    client: Client,
}

impl UpstreamForwarder {
    /// Builds a forwarder from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the origin or client cannot be built.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, GatewayError> {
        let origin = Url::parse(&config.origin)
            .map_err(|err| GatewayError::Init(format!("invalid upstream origin: {err}")))?;
        if origin.scheme() == "http" && !config.allow_http {
            return Err(GatewayError::Init(
                "cleartext upstream origin requires allow_http".to_string(),
            ));
        }
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| GatewayError::Init(format!("upstream client build failed: {err}")))?;
        Ok(Self {
            origin,
            client,
        })
    }

    /// Forwards one request and converts the upstream answer.
    pub async fn forward(
        &self,
        method: Method,
        original_uri: &Uri,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Response {
        let target = self.target_url(original_uri);
        let request = self
            .client
            .request(method, target)
            .headers(strip_hop_by_hop(headers))
            .body(body.to_vec());

        let upstream = match request.send().await {
            Ok(upstream) => upstream,
            Err(_) => return StatusCode::BAD_GATEWAY.into_response(),
        };

        let status = upstream.status();
        let response_headers = strip_hop_by_hop(upstream.headers());
        let payload = match upstream.bytes().await {
            Ok(payload) => payload,
            Err(_) => return StatusCode::BAD_GATEWAY.into_response(),
        };

        let mut response = Response::new(Body::from(payload));
        *response.status_mut() = status;
        *response.headers_mut() = response_headers;
        response
    }

    /// Builds the upstream URL carrying the original path and query.
    fn target_url(&self, original_uri: &Uri) -> Url {
        let mut target = self.origin.clone();
        target.set_path(original_uri.path());
        target.set_query(original_uri.query());
        target
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns a header map with hop-by-hop headers removed.
fn strip_hop_by_hop(headers: &HeaderMap) -> HeaderMap {
    let mut filtered = HeaderMap::new();
    for (name, value) in headers {
        if HOP_BY_HOP_HEADERS.contains(&name.as_str()) {
            continue;
        }
        filtered.append(name.clone(), value.clone());
    }
    filtered
}

// ============================================================================
// SECTION: Tests
// ============================================================================
