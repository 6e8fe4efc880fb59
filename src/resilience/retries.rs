//! Retry logic.
//!
//! # Responsibilities
//! - Decide whether a failed control-plane call may be repeated
//! - Execute retries with exponential backoff + jitter
//!
//! # Design Decisions
//! - Only queries are retried; replica creation and deletion are not
//!   idempotent and run exactly once
//! - Connection errors, deadlines and 5xx answers are transient; everything
//!   else fails immediately

use std::fmt::Display;
use std::future::Future;

use crate::config::RetryConfig;
use crate::resilience::backoff::Backoff;

/// Errors that know whether repeating the call could succeed.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

/// Attempt budget and backoff schedule for one query.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Backoff,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// A policy that runs the operation once.
    pub fn none() -> Self {
        Self::new(1, Backoff::new(0, 0))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `op` until it succeeds, fails permanently, or the budget runs out.
    pub async fn run<T, E, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, E>
    where
        E: Transient + Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    let delay = self.backoff.delay(attempt);
                    tracing::warn!(
                        operation,
                        attempt,
                        delay = ?delay,
                        error = %e,
                        "Transient control plane failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, Backoff::from(config))
    }
}
