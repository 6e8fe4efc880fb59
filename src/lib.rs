//! Alarm-driven read-replica autoscaler library.

// Core
pub mod cluster;
pub mod scaling;

// Host integration
pub mod handler;
pub mod http;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use cluster::{ClusterCapacity, ControlPlaneError, HttpControlPlane, InMemoryCluster};
pub use config::AutoscalerConfig;
pub use handler::{handle_invocation, InvocationReport};
pub use scaling::{Autoscaler, InboundEvent, ScalingConfig, ScalingError, ScalingOutcome};
