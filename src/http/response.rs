//! Relayed responses.
//!
//! The client sees exactly what the upstream produced: status code, body
//! bytes and content type. A `content-encoding` travels with the bytes it
//! describes; other upstream headers are not relayed.

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

/// Content type used when the upstream declares none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// An upstream response ready to be handed back to the client.
#[derive(Debug, Clone)]
pub struct RelayedResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub content_encoding: Option<HeaderValue>,
    pub body: Bytes,
}

impl RelayedResponse {
    /// The content type that will be declared to the client.
    pub fn effective_content_type(&self) -> HeaderValue {
        self.content_type
            .clone()
            .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE))
    }
}

impl IntoResponse for RelayedResponse {
    fn into_response(self) -> Response {
        let content_type = self.effective_content_type();
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        response.headers_mut().insert(header::CONTENT_TYPE, content_type);
        if let Some(encoding) = self.content_encoding {
            response.headers_mut().insert(header::CONTENT_ENCODING, encoding);
        }
        response
    }
}
