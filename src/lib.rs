//! User-service API gateway.
//!
//! Forwards `/register`, `/login` and `/profile` to a single upstream
//! user-service and relays its answers unchanged.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod resilience;
pub mod routing;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
