//! Cluster capacity subsystem.
//!
//! # Data Flow
//! ```text
//! Autoscaler controller
//!     → ClusterCapacity (count / add one / remove one)
//!         → client.rs (HTTP control plane, deadlines + query retries)
//!         → memory.rs (in-process cluster for tests)
//! ```
//!
//! # Design Decisions
//! - No state is held between calls; every answer is live control-plane truth
//! - Each successful add/remove changes the replica count by exactly one
//! - In-progress tolerance is decided per call by the caller

pub mod client;
pub mod memory;
pub mod types;

use async_trait::async_trait;

pub use client::HttpControlPlane;
pub use memory::{CapacityCall, InMemoryCluster};
pub use types::{ClusterDescription, ClusterMember, ControlPlaneError};

/// Replica-level operations on a managed database cluster.
#[async_trait]
pub trait ClusterCapacity: Send + Sync {
    /// Number of non-writer instances currently attached to `cluster`.
    async fn count_replicas(&self, cluster: &str) -> Result<u32, ControlPlaneError>;

    /// Request one additional replica.
    ///
    /// With `ignore_in_progress` set, a rejection caused by the cluster
    /// already being modified is logged and reported as success.
    async fn add_replica(
        &self,
        cluster: &str,
        ignore_in_progress: bool,
    ) -> Result<(), ControlPlaneError>;

    /// Request deletion of one non-writer instance.
    async fn remove_replica(&self, cluster: &str) -> Result<(), ControlPlaneError>;
}
