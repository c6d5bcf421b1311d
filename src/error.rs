//! Gateway-level errors.
//!
//! Upstream error statuses (400, 401, 409, ...) are NOT errors here; they are
//! relayed verbatim by the forwarder. This type only covers conditions where
//! the gateway itself has to answer the client.

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors produced while handling a single inbound request.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("request body is not valid JSON: {0}")]
    MalformedBody(#[source] serde_json::Error),

    #[error("failed to read request body: {0}")]
    BodyRead(#[source] axum::Error),

    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("no route for {path}")]
    RouteNotFound { path: String },

    #[error("method {method} not allowed for {path}")]
    MethodNotAllowed {
        method: String,
        path: String,
        allowed: Vec<String>,
    },

    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(#[source] hyper_util::client::legacy::Error),

    #[error("upstream did not respond within {0:?}")]
    UpstreamTimeout(Duration),

    #[error("failed to read upstream response body: {0}")]
    UpstreamBody(#[source] axum::Error),

    #[error("failed to build upstream request: {0}")]
    OutboundRequest(#[from] axum::http::Error),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::MalformedBody(_) | GatewayError::BodyRead(_) => StatusCode::BAD_REQUEST,
            GatewayError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            GatewayError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::UpstreamUnreachable(_) | GatewayError::UpstreamBody(_) => {
                StatusCode::BAD_GATEWAY
            }
            GatewayError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::OutboundRequest(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for the `kind` metric label and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::MalformedBody(_) => "malformed_body",
            GatewayError::BodyRead(_) => "body_read",
            GatewayError::PayloadTooLarge { .. } => "payload_too_large",
            GatewayError::RouteNotFound { .. } => "route_not_found",
            GatewayError::MethodNotAllowed { .. } => "method_not_allowed",
            GatewayError::UpstreamUnreachable(_) => "upstream_unreachable",
            GatewayError::UpstreamTimeout(_) => "upstream_timeout",
            GatewayError::UpstreamBody(_) => "upstream_body",
            GatewayError::OutboundRequest(_) => "outbound_request",
        }
    }

    /// True for NETWORK_FAILURE conditions, i.e. the relay itself failed.
    pub fn is_upstream_failure(&self) -> bool {
        matches!(
            self,
            GatewayError::UpstreamUnreachable(_)
                | GatewayError::UpstreamTimeout(_)
                | GatewayError::UpstreamBody(_)
        )
    }

    /// Client-facing message. Transport details stay in the logs.
    fn detail(&self) -> String {
        match self {
            GatewayError::MalformedBody(e) => format!("Request body is not valid JSON: {}", e),
            GatewayError::BodyRead(_) => "Failed to read request body".to_string(),
            GatewayError::PayloadTooLarge { .. } => "Request body too large".to_string(),
            GatewayError::RouteNotFound { .. } => "Not Found".to_string(),
            GatewayError::MethodNotAllowed { .. } => "Method Not Allowed".to_string(),
            GatewayError::UpstreamUnreachable(_) | GatewayError::UpstreamBody(_) => {
                "Upstream service unavailable".to_string()
            }
            GatewayError::UpstreamTimeout(_) => "Upstream service timed out".to_string(),
            GatewayError::OutboundRequest(_) => "Internal gateway error".to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut response = (status, Json(json!({ "detail": self.detail() }))).into_response();

        if let GatewayError::MethodNotAllowed { allowed, .. } = &self {
            if let Ok(value) = HeaderValue::from_str(&allowed.join(", ")) {
                response.headers_mut().insert(header::ALLOW, value);
            }
        }

        response
    }
}
