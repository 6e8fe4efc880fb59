//! Metrics collection and exposition.
//!
//! # Metrics
//! - `autoscaler_invocations_total` (counter): invocations by outcome or error kind
//! - `autoscaler_replica_changes_total` (counter): requested replica changes by direction
//! - `autoscaler_observed_replicas` (gauge): replica count seen at decision time
//! - `autoscaler_control_plane_requests_total` (counter): control-plane calls by operation, status
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op, so `invoke` mode pays nothing
//! - The Prometheus exporter is only installed by `serve` mode

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::scaling::ScalingOutcome;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record the result of one invocation.
pub fn record_invocation(outcome: &str) {
    counter!("autoscaler_invocations_total", "outcome" => outcome.to_string()).increment(1);
}

/// Record the replica changes requested by a successful invocation.
pub fn record_outcome(outcome: &ScalingOutcome) {
    let (direction, count) = match outcome {
        ScalingOutcome::FloorRestored { added, .. } => ("out", u64::from(*added)),
        ScalingOutcome::ScaledOut { .. } => ("out", 1),
        ScalingOutcome::ScaledIn { .. } => ("in", 1),
        _ => return,
    };
    counter!("autoscaler_replica_changes_total", "direction" => direction).increment(count);
}

/// Record the replica count observed at decision time.
pub fn record_observed_replicas(cluster: &str, replicas: u32) {
    gauge!("autoscaler_observed_replicas", "cluster" => cluster.to_string()).set(f64::from(replicas));
}

/// Record one control-plane HTTP call.
pub fn record_control_plane_request(operation: &'static str, status: u16) {
    counter!(
        "autoscaler_control_plane_requests_total",
        "operation" => operation,
        "status" => status.to_string()
    )
    .increment(1);
}
