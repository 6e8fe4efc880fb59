//! HTTP control-plane client.
//!
//! # Responsibilities
//! - Describe the cluster and derive the live replica count
//! - Create one replica sized like the writer
//! - Delete the first non-writer instance
//! - Enforce per-call deadlines; retry queries on transient failures
//!
//! # Endpoints
//! ```text
//! GET    {endpoint}/clusters/{cluster}            → ClusterDescription
//! POST   {endpoint}/clusters/{cluster}/instances  ← CreateInstanceRequest
//! DELETE {endpoint}/instances/{instance}
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;
use uuid::Uuid;

use crate::cluster::types::{
    ClusterDescription, ControlPlaneError, ControlPlaneFault, CreateInstanceRequest,
};
use crate::cluster::ClusterCapacity;
use crate::config::{ControlPlaneConfig, RetryConfig};
use crate::observability::metrics;
use crate::resilience::{with_deadline, RetryPolicy};

/// [`ClusterCapacity`] backed by the control plane's REST API.
#[derive(Clone)]
pub struct HttpControlPlane {
    http: reqwest::Client,
    endpoint: Url,
    default_instance_class: String,
    engine: String,
    deadline: Duration,
    retry: RetryPolicy,
}

impl HttpControlPlane {
    /// Create a client from validated configuration.
    pub fn new(
        config: &ControlPlaneConfig,
        retries: &RetryConfig,
    ) -> Result<Self, ControlPlaneError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| ControlPlaneError::InvalidEndpoint(format!("{}: {}", config.endpoint, e)))?;
        if endpoint.cannot_be_a_base() {
            return Err(ControlPlaneError::InvalidEndpoint(config.endpoint.clone()));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(concat!("replica-autoscaler/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            default_instance_class: config.default_instance_class.clone(),
            engine: config.engine.clone(),
            deadline: Duration::from_secs(config.request_timeout_secs),
            retry: RetryPolicy::from(retries),
        })
    }

    /// Describe `cluster`, retrying transient failures.
    pub async fn describe_cluster(
        &self,
        cluster: &str,
    ) -> Result<ClusterDescription, ControlPlaneError> {
        self.retry
            .run("describe_cluster", move || self.describe_once(cluster))
            .await
    }

    async fn describe_once(&self, cluster: &str) -> Result<ClusterDescription, ControlPlaneError> {
        with_deadline(self.deadline, self.get_description(cluster)).await?
    }

    async fn get_description(
        &self,
        cluster: &str,
    ) -> Result<ClusterDescription, ControlPlaneError> {
        let response = self.http.get(self.url(&["clusters", cluster])).send().await?;
        let status = response.status();
        metrics::record_control_plane_request("describe_cluster", status.as_u16());

        if status.is_success() {
            return response
                .json::<ClusterDescription>()
                .await
                .map_err(|e| ControlPlaneError::InvalidResponse(e.to_string()));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ControlPlaneError::ClusterNotFound(cluster.to_string()));
        }
        Err(rejection("describe_cluster", cluster, response).await)
    }

    async fn create_replica(
        &self,
        cluster: &str,
        ignore_in_progress: bool,
    ) -> Result<(), ControlPlaneError> {
        let description = self.describe_cluster(cluster).await?;

        // A cluster still being provisioned cannot take replicas even when
        // the caller tolerates ongoing modifications.
        if description.is_creating() {
            return Err(in_progress(cluster, "cluster is still being created"));
        }
        if !ignore_in_progress && description.is_modifying() {
            return Err(in_progress(cluster, "an instance is not available"));
        }

        let request = CreateInstanceRequest {
            instance_identifier: replica_identifier(cluster),
            instance_class: description
                .writer()
                .map(|w| w.instance_class.clone())
                .unwrap_or_else(|| self.default_instance_class.clone()),
            engine: self.engine.clone(),
        };

        tracing::info!(
            cluster,
            instance = %request.instance_identifier,
            instance_class = %request.instance_class,
            "Creating replica"
        );

        with_deadline(self.deadline, self.post_instance(cluster, &request)).await?
    }

    async fn post_instance(
        &self,
        cluster: &str,
        request: &CreateInstanceRequest,
    ) -> Result<(), ControlPlaneError> {
        let url = self.url(&["clusters", cluster, "instances"]);
        let response = self.http.post(url).json(request).send().await?;
        let status = response.status();
        metrics::record_control_plane_request("create_instance", status.as_u16());

        if status.is_success() {
            return Ok(());
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ControlPlaneError::ClusterNotFound(cluster.to_string()));
        }
        Err(rejection("create_instance", cluster, response).await)
    }

    async fn delete_instance(&self, cluster: &str, instance: &str) -> Result<(), ControlPlaneError> {
        let response = self.http.delete(self.url(&["instances", instance])).send().await?;
        let status = response.status();
        metrics::record_control_plane_request("delete_instance", status.as_u16());

        if status.is_success() {
            return Ok(());
        }
        Err(rejection("delete_instance", cluster, response).await)
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.endpoint.clone();
        // cannot_be_a_base endpoints are rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait]
impl ClusterCapacity for HttpControlPlane {
    async fn count_replicas(&self, cluster: &str) -> Result<u32, ControlPlaneError> {
        Ok(self.describe_cluster(cluster).await?.replica_count())
    }

    async fn add_replica(
        &self,
        cluster: &str,
        ignore_in_progress: bool,
    ) -> Result<(), ControlPlaneError> {
        match self.create_replica(cluster, ignore_in_progress).await {
            Err(e) if ignore_in_progress && e.is_in_progress() => {
                tracing::warn!(cluster, error = %e, "Cluster busy, replica request skipped");
                Ok(())
            }
            other => other,
        }
    }

    async fn remove_replica(&self, cluster: &str) -> Result<(), ControlPlaneError> {
        let description = self.describe_cluster(cluster).await?;
        if description.is_modifying() {
            return Err(in_progress(cluster, "an instance is not available"));
        }

        let replica = description
            .replicas()
            .next()
            .ok_or_else(|| ControlPlaneError::NoEligibleReplica(cluster.to_string()))?;
        let instance = replica.instance_identifier.clone();

        tracing::info!(cluster, instance = %instance, "Deleting replica");

        with_deadline(self.deadline, self.delete_instance(cluster, &instance)).await?
    }
}

impl std::fmt::Debug for HttpControlPlane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpControlPlane")
            .field("endpoint", &self.endpoint.as_str())
            .field("deadline", &self.deadline)
            .field("max_attempts", &self.retry.max_attempts())
            .finish()
    }
}

/// Identifier for a new replica: the cluster name plus 8 random hex digits.
pub fn replica_identifier(cluster: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", cluster, &suffix[..8])
}

fn in_progress(cluster: &str, detail: &str) -> ControlPlaneError {
    ControlPlaneError::ModificationInProgress {
        cluster: cluster.to_string(),
        detail: detail.to_string(),
    }
}

/// Map a non-success answer to an error.
///
/// 409 means the cluster is mid-modification; 5xx is transient.
async fn rejection(
    operation: &'static str,
    cluster: &str,
    response: reqwest::Response,
) -> ControlPlaneError {
    let status = response.status();
    let fault = response.json::<ControlPlaneFault>().await.unwrap_or_default();

    if status == StatusCode::CONFLICT {
        let detail = if fault.message.is_empty() { fault.code } else { fault.message };
        return in_progress(cluster, &detail);
    }
    if status.is_server_error() {
        return ControlPlaneError::Unavailable {
            operation,
            status: status.as_u16(),
        };
    }
    ControlPlaneError::Rejected {
        operation,
        status: status.as_u16(),
        code: fault.code,
        message: fault.message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(endpoint: &str) -> ControlPlaneConfig {
        ControlPlaneConfig {
            endpoint: endpoint.to_string(),
            ..ControlPlaneConfig::default()
        }
    }

    #[test]
    fn test_replica_identifier_format() {
        let id = replica_identifier("orders-docdb");
        let suffix = id.strip_prefix("orders-docdb-").unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, replica_identifier("orders-docdb"));
    }

    #[test]
    fn test_url_building_keeps_base_path() {
        let client =
            HttpControlPlane::new(&config("http://cp.internal/api/v1/"), &RetryConfig::default())
                .unwrap();
        assert_eq!(
            client.url(&["clusters", "orders", "instances"]).as_str(),
            "http://cp.internal/api/v1/clusters/orders/instances"
        );
    }

    #[test]
    fn test_url_building_escapes_identifiers() {
        let client =
            HttpControlPlane::new(&config("http://cp.internal"), &RetryConfig::default()).unwrap();
        assert_eq!(
            client.url(&["instances", "a/b"]).as_str(),
            "http://cp.internal/instances/a%2Fb"
        );
    }

    #[test]
    fn test_rejects_invalid_endpoint() {
        let err = HttpControlPlane::new(&config("not a url"), &RetryConfig::default()).unwrap_err();
        assert!(matches!(err, ControlPlaneError::InvalidEndpoint(_)));
    }
}
