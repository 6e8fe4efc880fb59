//! In-process cluster.
//!
//! Simulates a single cluster's replica count and modification state, and
//! records every call it receives so callers can assert on the exact
//! sequence of control-plane traffic.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::cluster::types::ControlPlaneError;
use crate::cluster::ClusterCapacity;

/// A call received by [`InMemoryCluster`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityCall {
    Count,
    Add { ignore_in_progress: bool },
    Remove,
}

impl CapacityCall {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, CapacityCall::Count)
    }
}

#[derive(Debug)]
struct MemoryState {
    replicas: u32,
    in_progress: bool,
    failing_queries: bool,
    calls: Vec<CapacityCall>,
}

/// Cluster held entirely in memory.
#[derive(Debug)]
pub struct InMemoryCluster {
    identifier: String,
    state: Mutex<MemoryState>,
}

impl InMemoryCluster {
    pub fn new(identifier: impl Into<String>, replicas: u32) -> Self {
        Self {
            identifier: identifier.into(),
            state: Mutex::new(MemoryState {
                replicas,
                in_progress: false,
                failing_queries: false,
                calls: Vec::new(),
            }),
        }
    }

    /// Start the cluster in a mid-modification state.
    pub fn with_in_progress(self, in_progress: bool) -> Self {
        self.lock().in_progress = in_progress;
        self
    }

    /// Make every replica count query fail as if the control plane were down.
    pub fn with_failing_queries(self) -> Self {
        self.lock().failing_queries = true;
        self
    }

    pub fn set_in_progress(&self, in_progress: bool) {
        self.lock().in_progress = in_progress;
    }

    pub fn replica_count(&self) -> u32 {
        self.lock().replicas
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<CapacityCall> {
        self.lock().calls.clone()
    }

    /// Add and remove calls received so far, in order.
    pub fn mutations(&self) -> Vec<CapacityCall> {
        self.lock()
            .calls
            .iter()
            .copied()
            .filter(CapacityCall::is_mutation)
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_cluster(&self, cluster: &str) -> Result<(), ControlPlaneError> {
        if cluster == self.identifier {
            Ok(())
        } else {
            Err(ControlPlaneError::ClusterNotFound(cluster.to_string()))
        }
    }
}

#[async_trait]
impl ClusterCapacity for InMemoryCluster {
    async fn count_replicas(&self, cluster: &str) -> Result<u32, ControlPlaneError> {
        self.lock().calls.push(CapacityCall::Count);
        self.check_cluster(cluster)?;

        let state = self.lock();
        if state.failing_queries {
            return Err(ControlPlaneError::Unavailable {
                operation: "describe",
                status: 503,
            });
        }
        Ok(state.replicas)
    }

    async fn add_replica(
        &self,
        cluster: &str,
        ignore_in_progress: bool,
    ) -> Result<(), ControlPlaneError> {
        self.lock().calls.push(CapacityCall::Add { ignore_in_progress });
        self.check_cluster(cluster)?;

        let mut state = self.lock();
        if state.in_progress {
            if ignore_in_progress {
                tracing::debug!(cluster, "In-memory cluster busy, add ignored");
                return Ok(());
            }
            return Err(ControlPlaneError::ModificationInProgress {
                cluster: cluster.to_string(),
                detail: "cluster is being modified".to_string(),
            });
        }
        state.replicas += 1;
        Ok(())
    }

    async fn remove_replica(&self, cluster: &str) -> Result<(), ControlPlaneError> {
        self.lock().calls.push(CapacityCall::Remove);
        self.check_cluster(cluster)?;

        let mut state = self.lock();
        if state.in_progress {
            return Err(ControlPlaneError::ModificationInProgress {
                cluster: cluster.to_string(),
                detail: "cluster is being modified".to_string(),
            });
        }
        if state.replicas == 0 {
            return Err(ControlPlaneError::NoEligibleReplica(cluster.to_string()));
        }
        state.replicas -= 1;
        Ok(())
    }
}
