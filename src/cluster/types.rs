//! Control-plane wire types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resilience::{DeadlineExceeded, Transient};

/// Status value the control plane reports for an idle cluster or instance.
pub const STATUS_AVAILABLE: &str = "available";
/// Status value of a cluster that is still being provisioned.
pub const STATUS_CREATING: &str = "creating";

/// Cluster as described by `GET /clusters/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterDescription {
    pub identifier: String,
    pub status: String,
    #[serde(default)]
    pub members: Vec<ClusterMember>,
}

/// One instance attached to a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterMember {
    pub instance_identifier: String,
    pub is_writer: bool,
    pub status: String,
    pub instance_class: String,
}

impl ClusterDescription {
    /// Non-writer instances, in the order the control plane lists them.
    pub fn replicas(&self) -> impl Iterator<Item = &ClusterMember> {
        self.members.iter().filter(|m| !m.is_writer)
    }

    pub fn replica_count(&self) -> u32 {
        self.replicas().count() as u32
    }

    pub fn writer(&self) -> Option<&ClusterMember> {
        self.members.iter().find(|m| m.is_writer)
    }

    pub fn is_creating(&self) -> bool {
        self.status == STATUS_CREATING
    }

    /// True when the cluster or any of its instances is not `available`.
    pub fn is_modifying(&self) -> bool {
        self.status != STATUS_AVAILABLE
            || self.members.iter().any(|m| m.status != STATUS_AVAILABLE)
    }
}

/// Body of `POST /clusters/{id}/instances`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateInstanceRequest {
    pub instance_identifier: String,
    pub instance_class: String,
    pub engine: String,
}

/// Error body returned by the control plane on rejected requests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ControlPlaneFault {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Errors raised by a [`ClusterCapacity`](super::ClusterCapacity) implementation.
#[derive(Debug, Error)]
pub enum ControlPlaneError {
    /// The named cluster does not exist.
    #[error("cluster '{0}' not found")]
    ClusterNotFound(String),

    /// The cluster is already being modified.
    #[error("cluster '{cluster}' is mid-modification: {detail}")]
    ModificationInProgress { cluster: String, detail: String },

    /// There is no non-writer instance to remove.
    #[error("cluster '{0}' has no replica to remove")]
    NoEligibleReplica(String),

    /// The control plane refused the request.
    #[error("control plane rejected {operation} with status {status}: {code} {message}")]
    Rejected {
        operation: &'static str,
        status: u16,
        code: String,
        message: String,
    },

    /// The control plane answered with a server error.
    #[error("control plane unavailable during {operation}: status {status}")]
    Unavailable { operation: &'static str, status: u16 },

    /// Network-level failure.
    #[error("control plane transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The call outlived its deadline.
    #[error("control plane call timed out: {0}")]
    Timeout(#[from] DeadlineExceeded),

    /// The configured endpoint cannot be used as a base URL.
    #[error("invalid control plane endpoint: {0}")]
    InvalidEndpoint(String),

    /// The control plane answered with something we cannot interpret.
    #[error("invalid control plane response: {0}")]
    InvalidResponse(String),
}

impl ControlPlaneError {
    /// Rejections caused by an ongoing modification of the cluster.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, ControlPlaneError::ModificationInProgress { .. })
    }
}

impl Transient for ControlPlaneError {
    fn is_transient(&self) -> bool {
        match self {
            ControlPlaneError::Unavailable { .. } | ControlPlaneError::Timeout(_) => true,
            ControlPlaneError::Transport(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}
