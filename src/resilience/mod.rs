//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (one deadline covers send + body read)
//!     → On elapse: GatewayError::UpstreamTimeout (504)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//! - No retries and no circuit breaking: one inbound request, one upstream call

pub mod timeouts;

pub use timeouts::Deadline;
