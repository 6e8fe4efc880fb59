//! Serve-mode tests: notifications posted to the HTTP host.

mod common;

use std::sync::Arc;

use common::*;
use tokio::net::TcpListener;

use replica_autoscaler::config::ListenerConfig;
use replica_autoscaler::http::HttpServer;
use replica_autoscaler::lifecycle::Shutdown;
use replica_autoscaler::scaling::notification::envelope_for_state;
use replica_autoscaler::{Autoscaler, ScalingConfig};

struct Host {
    base: String,
    shutdown: Shutdown,
    task: tokio::task::JoinHandle<Result<(), std::io::Error>>,
}

async fn start_host(plane: &MockControlPlane, min: u32, max: u32) -> Host {
    let autoscaler =
        Autoscaler::new(Arc::new(plane.client()), ScalingConfig::new(CLUSTER, min, max));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let shutdown = Shutdown::new();
    let server = HttpServer::new(autoscaler, &ListenerConfig::default());
    let task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    Host { base, shutdown, task }
}

#[tokio::test]
async fn test_posted_alarm_scales_out() {
    let plane = start_mock_control_plane(cluster_with(5)).await;
    let host = start_host(&plane, 3, 10).await;

    let response = reqwest::Client::new()
        .post(format!("{}/invocations", host.base))
        .body(envelope_for_state("ALARM").as_bytes().to_vec())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(response.headers().contains_key("x-request-id"));
    let report: serde_json::Value = response.json().await.unwrap();
    assert_eq!(report["status"], "completed");
    assert_eq!(report["cluster"], CLUSTER);
    assert_eq!(report["outcome"]["action"], "scaled_out");
    assert_eq!(plane.replica_count(), 6);

    host.shutdown.trigger();
    host.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_request_id_becomes_invocation_id() {
    let plane = start_mock_control_plane(cluster_with(5)).await;
    let host = start_host(&plane, 3, 10).await;
    let id = uuid::Uuid::new_v4();

    let report: serde_json::Value = reqwest::Client::new()
        .post(format!("{}/invocations", host.base))
        .header("x-request-id", id.to_string())
        .body(envelope_for_state("INSUFFICIENT_DATA").as_bytes().to_vec())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(report["invocation_id"], id.to_string());
    assert_eq!(report["outcome"]["action"], "unchanged");
}

#[tokio::test]
async fn test_failed_invocation_is_still_answered() {
    let plane = start_mock_control_plane(cluster_with(5)).await;
    let host = start_host(&plane, 5, 3).await;

    let response = reqwest::Client::new()
        .post(format!("{}/invocations", host.base))
        .body(envelope_for_state("ALARM").as_bytes().to_vec())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let report: serde_json::Value = response.json().await.unwrap();
    assert_eq!(report["status"], "failed");
    assert_eq!(report["kind"], "configuration");
    assert_eq!(plane.state().describe_calls, 0);
}

#[tokio::test]
async fn test_status_and_health() {
    let plane = start_mock_control_plane(cluster_with(2)).await;
    let host = start_host(&plane, 3, 10).await;
    let client = reqwest::Client::new();

    let status: serde_json::Value = client
        .get(format!("{}/status", host.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["replicas"], 2);
    assert_eq!(status["below_floor"], true);
    assert_eq!(status["step_bounds"], "unchecked");
    assert!(plane.state().created.is_empty());

    let health: serde_json::Value = client
        .get(format!("{}/health", host.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["cluster"], CLUSTER);
}

#[tokio::test]
async fn test_status_reports_control_plane_failure() {
    let plane = start_mock_control_plane(cluster_with(2)).await;
    plane.state().describe_failures = 10;
    let host = start_host(&plane, 3, 10).await;

    let response = reqwest::get(format!("{}/status", host.base)).await.unwrap();
    assert_eq!(response.status(), 502);
}
