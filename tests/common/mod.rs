//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use tokio::net::TcpListener;

use replica_autoscaler::cluster::types::{ClusterDescription, ClusterMember, CreateInstanceRequest};
use replica_autoscaler::cluster::HttpControlPlane;
use replica_autoscaler::config::{ControlPlaneConfig, RetryConfig};

pub const CLUSTER: &str = "orders-docdb";
pub const WRITER_CLASS: &str = "db.r6g.large";

/// Programmable control-plane state.
#[derive(Debug)]
pub struct MockState {
    pub cluster: ClusterDescription,
    /// Answer this many describe calls with 503 before succeeding.
    pub describe_failures: u32,
    pub describe_calls: u32,
    /// Reject instance creation with 409.
    pub conflict_on_create: bool,
    pub created: Vec<CreateInstanceRequest>,
    pub deleted: Vec<String>,
}

pub struct MockControlPlane {
    pub addr: SocketAddr,
    state: Arc<Mutex<MockState>>,
}

impl MockControlPlane {
    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client with short retry delays.
    pub fn client(&self) -> HttpControlPlane {
        let config = ControlPlaneConfig {
            endpoint: self.endpoint(),
            request_timeout_secs: 5,
            ..ControlPlaneConfig::default()
        };
        let retries = RetryConfig {
            max_attempts: 3,
            base_delay_ms: 10,
            max_delay_ms: 50,
        };
        HttpControlPlane::new(&config, &retries).unwrap()
    }

    pub fn replica_count(&self) -> u32 {
        self.state().cluster.replica_count()
    }
}

pub fn member(id: &str, is_writer: bool, status: &str) -> ClusterMember {
    ClusterMember {
        instance_identifier: id.to_string(),
        is_writer,
        status: status.to_string(),
        instance_class: WRITER_CLASS.to_string(),
    }
}

/// An available cluster with one writer and `replicas` available replicas.
pub fn cluster_with(replicas: u32) -> ClusterDescription {
    let mut members = vec![member(&format!("{CLUSTER}-writer"), true, "available")];
    for n in 0..replicas {
        members.push(member(&format!("{CLUSTER}-replica-{n}"), false, "available"));
    }
    ClusterDescription {
        identifier: CLUSTER.to_string(),
        status: "available".to_string(),
        members,
    }
}

/// Start a mock control plane serving `cluster` on an ephemeral port.
pub async fn start_mock_control_plane(cluster: ClusterDescription) -> MockControlPlane {
    let state = Arc::new(Mutex::new(MockState {
        cluster,
        describe_failures: 0,
        describe_calls: 0,
        conflict_on_create: false,
        created: Vec::new(),
        deleted: Vec::new(),
    }));

    let app = Router::new()
        .route("/clusters/{id}", get(describe))
        .route("/clusters/{id}/instances", axum::routing::post(create))
        .route("/instances/{id}", delete(remove))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockControlPlane { addr, state }
}

type Shared = State<Arc<Mutex<MockState>>>;

fn fault(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({ "code": code, "message": message })),
    )
        .into_response()
}

async fn describe(State(state): Shared, Path(id): Path<String>) -> Response {
    let mut state = state.lock().unwrap();
    state.describe_calls += 1;
    if state.describe_failures > 0 {
        state.describe_failures -= 1;
        return fault(StatusCode::SERVICE_UNAVAILABLE, "ServiceUnavailable", "try again");
    }
    if id != state.cluster.identifier {
        return fault(StatusCode::NOT_FOUND, "DBClusterNotFoundFault", "no such cluster");
    }
    Json(state.cluster.clone()).into_response()
}

async fn create(
    State(state): Shared,
    Path(id): Path<String>,
    Json(request): Json<CreateInstanceRequest>,
) -> Response {
    let mut state = state.lock().unwrap();
    if id != state.cluster.identifier {
        return fault(StatusCode::NOT_FOUND, "DBClusterNotFoundFault", "no such cluster");
    }
    if state.conflict_on_create {
        return fault(
            StatusCode::CONFLICT,
            "InvalidDBClusterStateFault",
            "cluster is being modified",
        );
    }
    state.cluster.members.push(ClusterMember {
        instance_identifier: request.instance_identifier.clone(),
        is_writer: false,
        status: "creating".to_string(),
        instance_class: request.instance_class.clone(),
    });
    state.created.push(request);
    StatusCode::CREATED.into_response()
}

async fn remove(State(state): Shared, Path(id): Path<String>) -> Response {
    let mut state = state.lock().unwrap();
    let before = state.cluster.members.len();
    state.cluster.members.retain(|m| m.instance_identifier != id);
    if state.cluster.members.len() == before {
        return fault(StatusCode::NOT_FOUND, "DBInstanceNotFound", "no such instance");
    }
    state.deleted.push(id);
    StatusCode::OK.into_response()
}
