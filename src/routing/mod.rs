//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (table lookup)
//!     → Return: ForwardRoute, MethodNotAllowed or NotFound
//!
//! Table construction (at startup):
//!     route.rs (user_service_routes)
//!     → RouteTable (immutable, shared via Arc)
//! ```
//!
//! # Design Decisions
//! - One descriptor per exposed route; the forwarder is generic over it
//! - Table built at startup, immutable at runtime
//! - Deterministic: same input always matches same route

pub mod route;
pub mod router;

pub use route::{BodyPolicy, ForwardRoute, HeaderPolicy};
pub use router::{RouteMatch, RouteTable};
