//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the catch-all gateway handler
//! - Wire up middleware (request ID, tracing, body limit)
//! - Dispatch requests through the route table to the forwarder
//! - Serve until the shutdown broadcast fires

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::http::request::{RequestIdExt, RequestIdLayer};
use crate::observability::metrics;
use crate::proxy::{Forwarder, UpstreamClient};
use crate::routing::{RouteMatch, RouteTable};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub forwarder: Forwarder,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a server exposing the user-service routes.
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_routes(config, RouteTable::user_service())
    }

    /// Create a server with an explicit route table.
    pub fn with_routes(config: GatewayConfig, routes: RouteTable) -> Self {
        let upstream =
            UpstreamClient::new(&config.upstream, config.limits.max_upstream_body_bytes);
        let state = AppState {
            routes: Arc::new(routes),
            forwarder: Forwarder::new(upstream, config.limits.max_body_bytes),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
            .layer(TraceLayer::new_for_http())
            .layer(RequestIdLayer)
    }

    /// The fully layered router, for in-process use.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main gateway handler.
/// Looks up the route and relays the request through the forwarder.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request.request_id();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let route = match state.routes.lookup(&method, &path) {
        RouteMatch::Found(route) => route,
        RouteMatch::MethodNotAllowed { allowed } => {
            tracing::warn!(request_id = %request_id, method = %method, path = %path, "Method not allowed");
            metrics::record_request("none", 405, start_time);
            return GatewayError::MethodNotAllowed {
                method: method.to_string(),
                path,
                allowed: allowed.iter().map(ToString::to_string).collect(),
            }
            .into_response();
        }
        RouteMatch::NotFound => {
            tracing::warn!(request_id = %request_id, method = %method, path = %path, "No route matched");
            metrics::record_request("none", 404, start_time);
            return GatewayError::RouteNotFound { path }.into_response();
        }
    };

    tracing::debug!(
        request_id = %request_id,
        route = route.name,
        method = %method,
        path = %path,
        "Forwarding request"
    );

    match state.forwarder.forward(route, request).await {
        Ok(relayed) => {
            tracing::info!(
                request_id = %request_id,
                route = route.name,
                status = relayed.status.as_u16(),
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Relayed upstream response"
            );
            metrics::record_request(route.name, relayed.status.as_u16(), start_time);
            relayed.into_response()
        }
        Err(e) => {
            let status = e.status_code();
            if e.is_upstream_failure() {
                tracing::error!(
                    request_id = %request_id,
                    route = route.name,
                    error = %e,
                    elapsed_ms = start_time.elapsed().as_millis() as u64,
                    "Upstream request failed"
                );
                metrics::record_upstream_failure(route.name, e.kind());
            } else {
                tracing::warn!(
                    request_id = %request_id,
                    route = route.name,
                    error = %e,
                    "Rejected request"
                );
            }
            metrics::record_request(route.name, status.as_u16(), start_time);
            e.into_response()
        }
    }
}
