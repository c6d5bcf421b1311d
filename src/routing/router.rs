//! Route lookup.
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc without locks)
//! - Exact (method, path) match; the table is tiny so a linear scan is fine
//! - Explicit `MethodNotAllowed`/`NotFound` rather than a silent default

use axum::http::Method;

use crate::routing::route::{user_service_routes, ForwardRoute};

/// Result of a route lookup.
#[derive(Debug)]
pub enum RouteMatch<'a> {
    Found(&'a ForwardRoute),
    /// The path exists but not for this method.
    MethodNotAllowed { allowed: Vec<Method> },
    NotFound,
}

/// The fixed route table.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<ForwardRoute>,
}

impl RouteTable {
    pub fn new(routes: Vec<ForwardRoute>) -> Self {
        Self { routes }
    }

    /// Table for the user-service endpoints.
    pub fn user_service() -> Self {
        Self::new(user_service_routes())
    }

    pub fn routes(&self) -> &[ForwardRoute] {
        &self.routes
    }

    /// Find the route for `method` and `path` (query string excluded).
    pub fn lookup(&self, method: &Method, path: &str) -> RouteMatch<'_> {
        if let Some(route) = self.routes.iter().find(|r| r.matches(method, path)) {
            return RouteMatch::Found(route);
        }

        let allowed: Vec<Method> = self
            .routes
            .iter()
            .filter(|r| r.path == path)
            .map(|r| r.method.clone())
            .collect();

        if allowed.is_empty() {
            RouteMatch::NotFound
        } else {
            RouteMatch::MethodNotAllowed { allowed }
        }
    }
}
