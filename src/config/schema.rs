//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the autoscaler.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the autoscaler.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AutoscalerConfig {
    /// Target cluster and its capacity bounds.
    pub cluster: ClusterConfig,

    /// Control-plane endpoint and call deadlines.
    pub control_plane: ControlPlaneConfig,

    /// Retry configuration for control-plane queries.
    pub retries: RetryConfig,

    /// HTTP listener used by `serve` mode.
    pub listener: ListenerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Cluster identity and capacity bounds.
///
/// Capacities are optional here so that a file may leave them to the
/// environment; validation rejects a config where either is still missing.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClusterConfig {
    /// Cluster identifier as known to the control plane.
    pub identifier: String,

    /// Replica floor.
    pub min_capacity: Option<u32>,

    /// Replica ceiling.
    pub max_capacity: Option<u32>,

    /// Whether alarm-driven steps check the bounds before mutating.
    pub step_bounds: StepBounds,
}

/// Bounds policy for alarm-driven scale-out and scale-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StepBounds {
    /// No bounds check; the control plane's own limits are the only guard.
    #[default]
    Unchecked,
    /// Skip scale-out at or above the ceiling and scale-in at or below the floor.
    Enforced,
}

/// Control-plane client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ControlPlaneConfig {
    /// Base URL of the control-plane API.
    pub endpoint: String,

    /// Deadline for a single control-plane call in seconds.
    pub request_timeout_secs: u64,

    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Instance class used when the writer's class cannot be determined.
    pub default_instance_class: String,

    /// Engine name sent with instance creation requests.
    pub engine: String,
}

impl Default for ControlPlaneConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8700".to_string(),
            request_timeout_secs: 20,
            connect_timeout_secs: 5,
            default_instance_class: "db.r5.large".to_string(),
            engine: "docdb".to_string(),
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts per query (1 disables retries).
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

/// Listener configuration for `serve` mode.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum accepted notification body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 120,
            max_body_bytes: 256 * 1024, // 256KB, the notification bus message limit
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,

    /// Enable the Prometheus metrics endpoint in `serve` mode.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
