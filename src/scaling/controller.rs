//! Autoscaler controller.
//!
//! Decides, for one notification, which replica changes to request:
//!
//! ```text
//! min > max                → ConfigurationError, no control-plane call
//! replicas < min           → (min - replicas) tolerant adds, notification ignored
//! ALARM                    → one add
//! OK                       → one remove
//! anything else            → nothing
//! ```
//!
//! With [`StepBounds::Enforced`] the alarm-driven steps additionally stay
//! inside `[min, max]`.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::cluster::{ClusterCapacity, ControlPlaneError};
use crate::config::StepBounds;
use crate::observability::metrics;
use crate::scaling::notification::{InboundEvent, NotificationError};
use crate::scaling::types::{AlarmState, ConfigurationError, ScalingConfig, ScalingOutcome};

/// Why an invocation ended without completing its decision.
#[derive(Debug, Error)]
pub enum ScalingError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Notification(#[from] NotificationError),

    #[error(transparent)]
    ControlPlane(#[from] ControlPlaneError),
}

impl ScalingError {
    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ScalingError::Configuration(_) => "configuration",
            ScalingError::Notification(_) => "notification",
            ScalingError::ControlPlane(_) => "control_plane",
        }
    }
}

/// Stateless decision engine; safe to share across concurrent invocations.
#[derive(Clone)]
pub struct Autoscaler {
    cluster: Arc<dyn ClusterCapacity>,
    config: ScalingConfig,
}

impl Autoscaler {
    pub fn new(cluster: Arc<dyn ClusterCapacity>, config: ScalingConfig) -> Self {
        Self { cluster, config }
    }

    pub fn config(&self) -> &ScalingConfig {
        &self.config
    }

    pub fn cluster(&self) -> &Arc<dyn ClusterCapacity> {
        &self.cluster
    }

    /// Run one invocation against the live cluster.
    pub async fn handle(&self, event: &InboundEvent) -> Result<ScalingOutcome, ScalingError> {
        self.config.validate()?;

        let cluster = self.config.cluster_identifier.as_str();
        let observed = self.cluster.count_replicas(cluster).await?;
        metrics::record_observed_replicas(cluster, observed);

        if observed < self.config.min_capacity {
            let added = self.restore_floor(observed).await?;
            return Ok(ScalingOutcome::FloorRestored { observed, added });
        }

        let notification = event.alarm_notification()?;
        debug!(
            cluster,
            observed,
            state = %notification.new_state_value,
            alarm = notification.alarm_name.as_deref().unwrap_or("-"),
            "Alarm notification received"
        );

        self.step(observed, notification.new_state_value).await
    }

    /// Issue one tolerant add per missing replica.
    async fn restore_floor(&self, observed: u32) -> Result<u32, ScalingError> {
        let cluster = self.config.cluster_identifier.as_str();
        let deficit = self.config.min_capacity - observed;

        info!(
            cluster,
            observed,
            min_capacity = self.config.min_capacity,
            deficit,
            "Below minimum capacity, adding replicas"
        );

        for n in 1..=deficit {
            debug!(cluster, replica = n, of = deficit, "Adding replica");
            self.cluster.add_replica(cluster, true).await?;
        }

        Ok(deficit)
    }

    async fn step(&self, observed: u32, state: AlarmState) -> Result<ScalingOutcome, ScalingError> {
        let cluster = self.config.cluster_identifier.as_str();
        let enforced = self.config.step_bounds == StepBounds::Enforced;

        match state {
            AlarmState::Alarm => {
                if enforced && observed >= self.config.max_capacity {
                    info!(cluster, observed, max_capacity = self.config.max_capacity, "Maximum capacity reached");
                    return Ok(ScalingOutcome::AtCeiling { observed });
                }
                info!(cluster, observed, "Scaling out: adding replica");
                self.cluster.add_replica(cluster, false).await?;
                Ok(ScalingOutcome::ScaledOut { observed })
            }
            AlarmState::Ok => {
                if enforced && observed <= self.config.min_capacity {
                    info!(cluster, observed, min_capacity = self.config.min_capacity, "Minimum capacity reached");
                    return Ok(ScalingOutcome::AtFloor { observed });
                }
                info!(cluster, observed, "Scaling in: removing replica");
                self.cluster.remove_replica(cluster).await?;
                Ok(ScalingOutcome::ScaledIn { observed })
            }
            AlarmState::Other(state) => {
                debug!(cluster, observed, state = %state, "No scaling action for alarm state");
                Ok(ScalingOutcome::Unchanged { observed, state })
            }
        }
    }
}

impl std::fmt::Debug for Autoscaler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autoscaler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{CapacityCall, InMemoryCluster};
    use crate::scaling::notification::envelope_for_state;

    fn autoscaler(cluster: &Arc<InMemoryCluster>, min: u32, max: u32) -> Autoscaler {
        Autoscaler::new(cluster.clone(), ScalingConfig::new("orders", min, max))
    }

    #[tokio::test]
    async fn test_inverted_bounds_make_no_calls() {
        let cluster = Arc::new(InMemoryCluster::new("orders", 1));
        let err = autoscaler(&cluster, 5, 3)
            .handle(&envelope_for_state("ALARM"))
            .await
            .unwrap_err();

        assert!(matches!(err, ScalingError::Configuration(_)));
        assert_eq!(err.kind(), "configuration");
        assert!(cluster.calls().is_empty());
    }

    #[tokio::test]
    async fn test_floor_restore_skips_notification() {
        let cluster = Arc::new(InMemoryCluster::new("orders", 1));
        let outcome = autoscaler(&cluster, 3, 10)
            .handle(&InboundEvent::from("not even json"))
            .await
            .unwrap();

        assert_eq!(outcome, ScalingOutcome::FloorRestored { observed: 1, added: 2 });
        assert_eq!(
            cluster.mutations(),
            vec![CapacityCall::Add { ignore_in_progress: true }; 2]
        );
        assert_eq!(cluster.replica_count(), 3);
    }

    #[tokio::test]
    async fn test_alarm_adds_one_intolerant_replica() {
        let cluster = Arc::new(InMemoryCluster::new("orders", 5));
        let outcome = autoscaler(&cluster, 3, 10)
            .handle(&envelope_for_state("ALARM"))
            .await
            .unwrap();

        assert_eq!(outcome, ScalingOutcome::ScaledOut { observed: 5 });
        assert_eq!(
            cluster.mutations(),
            vec![CapacityCall::Add { ignore_in_progress: false }]
        );
    }

    #[tokio::test]
    async fn test_ok_removes_one_replica() {
        let cluster = Arc::new(InMemoryCluster::new("orders", 5));
        let outcome = autoscaler(&cluster, 3, 10)
            .handle(&envelope_for_state("OK"))
            .await
            .unwrap();

        assert_eq!(outcome, ScalingOutcome::ScaledIn { observed: 5 });
        assert_eq!(cluster.mutations(), vec![CapacityCall::Remove]);
        assert_eq!(cluster.replica_count(), 4);
    }

    #[tokio::test]
    async fn test_other_state_is_ignored() {
        let cluster = Arc::new(InMemoryCluster::new("orders", 5));
        let outcome = autoscaler(&cluster, 3, 10)
            .handle(&envelope_for_state("INSUFFICIENT_DATA"))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ScalingOutcome::Unchanged { observed: 5, state: "INSUFFICIENT_DATA".to_string() }
        );
        assert!(cluster.mutations().is_empty());
    }

    #[tokio::test]
    async fn test_unchecked_bounds_scale_past_ceiling() {
        let cluster = Arc::new(InMemoryCluster::new("orders", 10));
        let outcome = autoscaler(&cluster, 3, 10)
            .handle(&envelope_for_state("ALARM"))
            .await
            .unwrap();

        assert_eq!(outcome, ScalingOutcome::ScaledOut { observed: 10 });
        assert_eq!(cluster.replica_count(), 11);
    }

    #[tokio::test]
    async fn test_enforced_bounds_hold_both_ends() {
        let config = ScalingConfig::new("orders", 3, 10).with_step_bounds(StepBounds::Enforced);

        let at_max = Arc::new(InMemoryCluster::new("orders", 10));
        let outcome = Autoscaler::new(at_max.clone(), config.clone())
            .handle(&envelope_for_state("ALARM"))
            .await
            .unwrap();
        assert_eq!(outcome, ScalingOutcome::AtCeiling { observed: 10 });
        assert!(at_max.mutations().is_empty());

        let at_min = Arc::new(InMemoryCluster::new("orders", 3));
        let outcome = Autoscaler::new(at_min.clone(), config)
            .handle(&envelope_for_state("OK"))
            .await
            .unwrap();
        assert_eq!(outcome, ScalingOutcome::AtFloor { observed: 3 });
        assert!(at_min.mutations().is_empty());
    }

    #[tokio::test]
    async fn test_count_failure_stops_invocation() {
        let cluster = Arc::new(InMemoryCluster::new("orders", 5).with_failing_queries());
        let err = autoscaler(&cluster, 3, 10)
            .handle(&envelope_for_state("ALARM"))
            .await
            .unwrap_err();

        assert!(matches!(err, ScalingError::ControlPlane(_)));
        assert!(cluster.mutations().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_notification_above_floor() {
        let cluster = Arc::new(InMemoryCluster::new("orders", 5));
        let err = autoscaler(&cluster, 3, 10)
            .handle(&InboundEvent::from(r#"{"Records": []}"#))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "notification");
        assert!(cluster.mutations().is_empty());
    }
}
