//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Build client + controller → (serve) bind listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Let in-flight invocations finish → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then client, then listener
//! - Config is never reloaded; restart the process to change it

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{build_autoscaler, serve, StartupError};
