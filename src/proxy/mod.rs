//! Route-forwarder subsystem.
//!
//! # Data Flow
//! ```text
//! ForwardRoute + inbound request
//!     → forwarder.rs (body check, outbound request construction)
//!     → headers.rs (header policy, hop-by-hop stripping)
//!     → upstream.rs (shared pooled client, deadline)
//!     → RelayedResponse (status, content type, body bytes)
//! ```

pub mod forwarder;
pub mod headers;
pub mod upstream;

pub use forwarder::Forwarder;
pub use upstream::UpstreamClient;
