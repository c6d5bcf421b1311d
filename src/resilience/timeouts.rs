//! Timeout enforcement.
//!
//! Every upstream exchange runs against one `Deadline`: the send and the
//! body read share the same budget, so a slow trickling body cannot extend
//! the wait past the configured timeout.

use std::future::Future;
use std::time::Duration;

use tokio::time::{timeout_at, Instant};

use crate::error::GatewayError;

/// A fixed point in time by which an upstream exchange must finish.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    /// Start a deadline `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            budget,
        }
    }

    #[cfg(test)]
    fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    /// Run `fut`, failing with `UpstreamTimeout` once the deadline passes.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, GatewayError>
    where
        F: Future<Output = Result<T, GatewayError>>,
    {
        match timeout_at(self.at, fut).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::UpstreamTimeout(self.budget)),
        }
    }
}
