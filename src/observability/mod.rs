//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! controller, client, handler produce:
//!     → logging.rs (structured log events inside the invocation span)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Log aggregation (stderr, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, serve mode only)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Invocation ID flows through every event of an invocation
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
