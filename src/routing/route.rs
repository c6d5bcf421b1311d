//! Forwarding descriptors.
//!
//! A `ForwardRoute` says everything the forwarder needs to know about one
//! exposed endpoint: where it goes upstream, whether a body travels with it
//! and which inbound headers follow it.

use axum::http::Method;

/// What happens to the inbound body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyPolicy {
    /// No body is read or forwarded.
    None,
    /// Body must be syntactically valid JSON; it is forwarded unchanged.
    Json,
}

/// Which inbound headers are copied onto the outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderPolicy {
    /// Only headers the gateway sets itself.
    None,
    /// All end-to-end inbound headers, verbatim.
    Passthrough,
}

/// One entry of the route table.
#[derive(Debug, Clone)]
pub struct ForwardRoute {
    /// Identifier for logs and metrics.
    pub name: &'static str,
    pub method: Method,
    pub path: &'static str,
    pub upstream_method: Method,
    pub upstream_path: &'static str,
    pub body: BodyPolicy,
    pub headers: HeaderPolicy,
}

impl ForwardRoute {
    /// A route forwarded to the same method and path upstream.
    pub fn mirror(
        name: &'static str,
        method: Method,
        path: &'static str,
        body: BodyPolicy,
        headers: HeaderPolicy,
    ) -> Self {
        Self {
            name,
            upstream_method: method.clone(),
            method,
            path,
            upstream_path: path,
            body,
            headers,
        }
    }

    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.method == *method && self.path == path
    }
}

/// The user-service forwarding contract.
pub fn user_service_routes() -> Vec<ForwardRoute> {
    vec![
        ForwardRoute::mirror("register", Method::POST, "/register", BodyPolicy::Json, HeaderPolicy::None),
        ForwardRoute::mirror("login", Method::POST, "/login", BodyPolicy::Json, HeaderPolicy::None),
        ForwardRoute::mirror("get_profile", Method::GET, "/profile", BodyPolicy::None, HeaderPolicy::Passthrough),
        ForwardRoute::mirror("update_profile", Method::PUT, "/profile", BodyPolicy::Json, HeaderPolicy::Passthrough),
    ]
}
