//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overlay (cluster_identifier, min_capacity, max_capacity)
//!     → validation.rs (semantic checks)
//!     → AutoscalerConfig (validated, immutable)
//!     → ScalingConfig handed to the controller by value
//! ```
//!
//! # Design Decisions
//! - Config is read once per process lifetime; there is no reload
//! - All fields except the capacities have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::AutoscalerConfig;
pub use schema::ClusterConfig;
pub use schema::ControlPlaneConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::RetryConfig;
pub use schema::StepBounds;
