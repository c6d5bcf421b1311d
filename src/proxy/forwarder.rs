//! The generic forwarding procedure.
//!
//! Every exposed route goes through `Forwarder::forward`; the route's
//! descriptor decides body and header handling. Exactly one upstream call is
//! made per inbound request, and none when the inbound body is rejected.

use axum::body::{Body, Bytes};
use axum::http::Request;
use http_body_util::LengthLimitError;
use serde::de::IgnoredAny;

use crate::error::GatewayError;
use crate::http::request::RequestIdExt;
use crate::http::response::RelayedResponse;
use crate::proxy::headers::outbound_headers;
use crate::proxy::upstream::UpstreamClient;
use crate::routing::{BodyPolicy, ForwardRoute};

#[derive(Debug, Clone)]
pub struct Forwarder {
    upstream: UpstreamClient,
    max_body_bytes: usize,
}

impl Forwarder {
    pub fn new(upstream: UpstreamClient, max_body_bytes: usize) -> Self {
        Self {
            upstream,
            max_body_bytes,
        }
    }

    /// Forward `request` along `route` and return the upstream's answer.
    ///
    /// Upstream error statuses come back as `Ok`; only failures of the relay
    /// itself are `Err`.
    pub async fn forward(
        &self,
        route: &ForwardRoute,
        request: Request<Body>,
    ) -> Result<RelayedResponse, GatewayError> {
        let request_id = request.request_id();
        let (parts, body) = request.into_parts();

        let body = match route.body {
            BodyPolicy::Json => Some(self.read_json_body(body).await?),
            BodyPolicy::None => None,
        };

        let headers = outbound_headers(
            route.headers,
            &parts.headers,
            &request_id,
            body.as_ref().map(Bytes::len),
        );

        let mut builder = Request::builder()
            .method(route.upstream_method.clone())
            .uri(self.upstream.url_for(route.upstream_path));
        if let Some(outbound) = builder.headers_mut() {
            *outbound = headers;
        }
        let outbound = builder.body(body.map(Body::from).unwrap_or_else(Body::empty))?;

        self.upstream.send(outbound).await
    }

    async fn read_json_body(&self, body: Body) -> Result<Bytes, GatewayError> {
        let bytes = axum::body::to_bytes(body, self.max_body_bytes)
            .await
            .map_err(|e| {
                if exceeds_length_limit(&e) {
                    GatewayError::PayloadTooLarge {
                        limit: self.max_body_bytes,
                    }
                } else {
                    GatewayError::BodyRead(e)
                }
            })?;
        validate_json(&bytes)?;
        Ok(bytes)
    }
}

/// The limit may trip in our own buffering or in the body limit layer, which
/// nests the error one level deeper.
fn exceeds_length_limit(err: &axum::Error) -> bool {
    let mut current = Some(err as &(dyn std::error::Error + 'static));
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}

/// Syntax check only; the document's structure is the upstream's business.
pub fn validate_json(bytes: &[u8]) -> Result<(), GatewayError> {
    serde_json::from_slice::<IgnoredAny>(bytes)
        .map(|_| ())
        .map_err(GatewayError::MalformedBody)
}
