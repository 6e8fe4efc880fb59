//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn the validated configuration into a `ScalingConfig`
//! - Build the control-plane client and the controller
//! - In `serve` mode: install metrics, bind the listener, wire shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - An inverted floor/ceiling is only warned about here; every invocation
//!   refuses it on its own
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::cluster::{ControlPlaneError, HttpControlPlane};
use crate::config::validation::ValidationError;
use crate::config::AutoscalerConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;
use crate::scaling::{Autoscaler, ScalingConfig};

/// Errors that abort process startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ValidationError),

    #[error("control plane client: {0}")]
    ControlPlane(#[from] ControlPlaneError),

    #[error("invalid address '{address}': {source}")]
    Address {
        address: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("listener: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the controller for the configured cluster.
pub fn build_autoscaler(config: &AutoscalerConfig) -> Result<Autoscaler, StartupError> {
    let scaling = ScalingConfig::try_from(&config.cluster)?;
    if let Err(e) = scaling.validate() {
        tracing::warn!(error = %e, "Every invocation will be rejected until the bounds are fixed");
    }

    let client = HttpControlPlane::new(&config.control_plane, &config.retries)?;

    tracing::info!(
        cluster = %scaling.cluster_identifier,
        min_capacity = scaling.min_capacity,
        max_capacity = scaling.max_capacity,
        step_bounds = ?scaling.step_bounds,
        control_plane = %config.control_plane.endpoint,
        "Autoscaler configured"
    );

    Ok(Autoscaler::new(Arc::new(client), scaling))
}

/// Serve invocations over HTTP until SIGINT/SIGTERM.
pub async fn serve(
    config: &AutoscalerConfig,
    autoscaler: Autoscaler,
    bind_override: Option<String>,
) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let address = &config.observability.metrics_address;
        let addr: SocketAddr = address.parse().map_err(|source| StartupError::Address {
            address: address.clone(),
            source,
        })?;
        metrics::init_metrics(addr)?;
    }

    let bind_address = bind_override.unwrap_or_else(|| config.listener.bind_address.clone());
    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for notifications");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(signals::trigger_on_termination(shutdown));

    HttpServer::new(autoscaler, &config.listener)
        .run(listener, server_shutdown)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
