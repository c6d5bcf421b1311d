//! Outbound header construction.
//!
//! Passthrough copies every end-to-end inbound header verbatim. Hop-by-hop
//! headers describe the client connection, not the message, so they stay
//! behind; `content-length` is recomputed from the body actually sent.
//! `accept-encoding` stays behind too: the upstream always answers with an
//! identity-encoded body, which is what the client gets.

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

use crate::http::request::{RequestId, X_REQUEST_ID};
use crate::routing::HeaderPolicy;

/// Connection-scoped headers (RFC 9110 §7.6.1 plus the common legacy ones).
pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-connection"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

/// Content negotiation the gateway does not pass on.
fn is_negotiated_encoding(name: &HeaderName) -> bool {
    *name == header::ACCEPT_ENCODING
}

/// Names listed in the inbound `Connection` header are hop-by-hop too.
fn connection_listed(inbound: &HeaderMap) -> Vec<HeaderName> {
    inbound
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|token| HeaderName::from_bytes(token.trim().as_bytes()).ok())
        .collect()
}

/// Build the outbound header map for one forwarded request.
///
/// `body_len` is `Some` when a body travels with the request.
pub fn outbound_headers(
    policy: HeaderPolicy,
    inbound: &HeaderMap,
    request_id: &RequestId,
    body_len: Option<usize>,
) -> HeaderMap {
    let mut headers = HeaderMap::new();

    match policy {
        HeaderPolicy::Passthrough => {
            let listed = connection_listed(inbound);
            for (name, value) in inbound.iter() {
                if is_hop_by_hop(name)
                    || is_negotiated_encoding(name)
                    || *name == header::CONTENT_LENGTH
                    || listed.contains(name)
                {
                    continue;
                }
                // append keeps repeated headers (e.g. several Cookie lines) intact
                headers.append(name.clone(), value.clone());
            }
        }
        HeaderPolicy::None => {
            if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
                headers.insert(X_REQUEST_ID, value);
            }
        }
    }

    if let Some(len) = body_len {
        if !headers.contains_key(header::CONTENT_TYPE) {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    }

    headers
}
