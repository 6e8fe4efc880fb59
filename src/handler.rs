//! Invocation boundary.
//!
//! # Responsibilities
//! - Run one controller invocation inside its own span
//! - Log the result by kind (critical for configuration errors)
//! - Record invocation metrics
//! - Turn every result, success or failure, into an [`InvocationReport`]
//!
//! # Design Decisions
//! - Nothing escapes: a failed invocation is a log entry plus the absence of
//!   a cluster change; redelivery is the notification bus's business
//! - No retries here; the next alarm transition is the retry

use serde::Serialize;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::cluster::ControlPlaneError;
use crate::config::StepBounds;
use crate::observability::logging::CRITICAL;
use crate::observability::metrics;
use crate::scaling::{Autoscaler, InboundEvent, ScalingError, ScalingOutcome};

/// What happened during one invocation.
#[derive(Debug, Clone, Serialize)]
pub struct InvocationReport {
    pub invocation_id: Uuid,
    pub cluster: String,
    #[serde(flatten)]
    pub status: InvocationStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InvocationStatus {
    Completed { outcome: ScalingOutcome },
    Failed { kind: &'static str, error: String },
}

impl InvocationReport {
    pub fn is_completed(&self) -> bool {
        matches!(self.status, InvocationStatus::Completed { .. })
    }

    pub fn outcome(&self) -> Option<&ScalingOutcome> {
        match &self.status {
            InvocationStatus::Completed { outcome } => Some(outcome),
            InvocationStatus::Failed { .. } => None,
        }
    }
}

/// Run one invocation and absorb its result.
pub async fn handle_invocation(
    autoscaler: &Autoscaler,
    event: &InboundEvent,
    invocation_id: Uuid,
) -> InvocationReport {
    let cluster = autoscaler.config().cluster_identifier.clone();
    let span = info_span!("invocation", id = %invocation_id, cluster = %cluster);

    let result = autoscaler.handle(event).instrument(span.clone()).await;
    let status = span.in_scope(|| absorb(result));

    InvocationReport {
        invocation_id,
        cluster,
        status,
    }
}

fn absorb(result: Result<ScalingOutcome, ScalingError>) -> InvocationStatus {
    match result {
        Ok(outcome) => {
            info!(
                outcome = outcome.label(),
                observed = outcome.observed(),
                "Invocation completed"
            );
            metrics::record_invocation(outcome.label());
            metrics::record_outcome(&outcome);
            InvocationStatus::Completed { outcome }
        }
        Err(e) => {
            match &e {
                ScalingError::Configuration(_) => {
                    error!(severity = CRITICAL, error = %e, "Invalid scaling configuration, no action taken");
                }
                ScalingError::Notification(_) => {
                    error!(error = %e, "Could not read alarm notification, no action taken");
                }
                ScalingError::ControlPlane(_) => {
                    error!(error = %e, "Control plane call failed, invocation aborted");
                }
            }
            metrics::record_invocation(e.kind());
            InvocationStatus::Failed {
                kind: e.kind(),
                error: e.to_string(),
            }
        }
    }
}

/// Live view of the cluster against the configured bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterStatus {
    pub cluster: String,
    pub replicas: u32,
    pub min_capacity: u32,
    pub max_capacity: u32,
    pub step_bounds: StepBounds,
    pub below_floor: bool,
}

/// Query the current replica count without changing anything.
pub async fn cluster_status(autoscaler: &Autoscaler) -> Result<ClusterStatus, ControlPlaneError> {
    let config = autoscaler.config();
    let replicas = autoscaler
        .cluster()
        .count_replicas(&config.cluster_identifier)
        .await?;

    Ok(ClusterStatus {
        cluster: config.cluster_identifier.clone(),
        replicas,
        min_capacity: config.min_capacity,
        max_capacity: config.max_capacity,
        step_bounds: config.step_bounds,
        below_floor: replicas < config.min_capacity,
    })
}
