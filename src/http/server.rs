//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Accept notification envelopes and run one invocation per request
//! - Report cluster status and liveness
//! - Stop accepting on shutdown, letting in-flight invocations finish
//!
//! # Routes
//! ```text
//! POST /invocations  body = notification envelope → InvocationReport
//! GET  /status       → ClusterStatus (live replica count)
//! GET  /health       → liveness, no control-plane call
//! ```

use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::config::ListenerConfig;
use crate::handler::{cluster_status, handle_invocation};
use crate::scaling::{Autoscaler, InboundEvent};

/// Header carrying the request ID, reused as the invocation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub autoscaler: Autoscaler,
}

/// HTTP host for the autoscaler.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server for `autoscaler`.
    pub fn new(autoscaler: Autoscaler, config: &ListenerConfig) -> Self {
        let state = AppState { autoscaler };
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ListenerConfig, state: AppState) -> Router {
        Router::new()
            .route("/invocations", post(invocation_handler))
            .route("/status", get(status_handler))
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs))),
            )
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining invocations");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Run one invocation for the posted envelope.
async fn invocation_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let invocation_id = headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok())
        .unwrap_or_else(Uuid::new_v4);
    let event = InboundEvent::from(body.to_vec());

    // Spawned so that a dropped or timed-out request cannot cancel an
    // invocation between two control-plane mutations.
    let task = tokio::spawn(async move {
        handle_invocation(&state.autoscaler, &event, invocation_id).await
    });

    match task.await {
        Ok(report) => Json(report).into_response(),
        Err(e) => {
            tracing::error!(invocation_id = %invocation_id, error = %e, "Invocation task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Invocation task failed").into_response()
        }
    }
}

async fn status_handler(State(state): State<AppState>) -> Response {
    match cluster_status(&state.autoscaler).await {
        Ok(status) => Json(status).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Cluster status query failed");
            (StatusCode::BAD_GATEWAY, e.to_string()).into_response()
        }
    }
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
    cluster: String,
}

async fn health_handler(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        cluster: state.autoscaler.config().cluster_identifier.clone(),
    })
}
