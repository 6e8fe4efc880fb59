//! HTTP host subsystem (`serve` mode).
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, limits)
//!     → handler.rs (one invocation per POSTed envelope)
//!     → JSON InvocationReport
//! ```

pub mod server;

pub use server::{AppState, HttpServer, X_REQUEST_ID};
