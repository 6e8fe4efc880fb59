//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Control-plane call:
//!     → timeouts.rs (enforce per-call deadline)
//!     → On transient failure of a query: retries.rs (retry with backoff.rs delays)
//!     → Mutations: single attempt, errors surface to the controller
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Retries only for idempotent queries
//! - Retrying is a transport concern; the controller never retries

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use backoff::Backoff;
pub use retries::{RetryPolicy, Transient};
pub use timeouts::{with_deadline, DeadlineExceeded};
