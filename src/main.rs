//! Replica Autoscaler
//!
//! Adds and removes read replicas of a database cluster in response to alarm
//! state-change notifications, within a configured floor and ceiling.
//!
//! # Architecture Overview
//!
//! ```text
//!   notification envelope                      ┌──────────────────────────┐
//!   (file / stdin / POST /invocations)         │      control plane       │
//!            │                                 │  GET    /clusters/{id}   │
//!            ▼                                 │  POST   …/instances      │
//!   ┌─────────────────┐    ┌──────────────┐    │  DELETE /instances/{id}  │
//!   │     handler     │───▶│  Autoscaler  │───▶│                          │
//!   │ span, logs,     │    │  controller  │    └──────────────────────────┘
//!   │ metrics, report │◀───│              │          ▲
//!   └─────────────────┘    └──────────────┘          │
//!                                 │          ┌───────┴────────┐
//!                                 └─────────▶│HttpControlPlane│
//!                                            │deadline + retry│
//!                                            └────────────────┘
//! ```
//!
//! # Usage
//!
//! ```text
//! replica-autoscaler --config autoscaler.toml invoke --event event.json
//! replica-autoscaler invoke --state ALARM
//! replica-autoscaler --config autoscaler.toml serve --bind 0.0.0.0:8080
//! replica-autoscaler --config autoscaler.toml status
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;
use uuid::Uuid;

use replica_autoscaler::config::load_config;
use replica_autoscaler::handler::{cluster_status, handle_invocation};
use replica_autoscaler::lifecycle::{build_autoscaler, serve};
use replica_autoscaler::observability::logging::init_logging;
use replica_autoscaler::scaling::notification::envelope_for_state;
use replica_autoscaler::scaling::InboundEvent;

#[derive(Parser)]
#[command(name = "replica-autoscaler", version)]
#[command(about = "Alarm-driven read-replica autoscaler", long_about = None)]
struct Cli {
    /// TOML configuration file; cluster_identifier, min_capacity and
    /// max_capacity from the environment override it.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Handle one notification and exit
    Invoke {
        /// Envelope file ("-" for stdin, the default)
        #[arg(long, conflicts_with = "state")]
        event: Option<PathBuf>,

        /// Synthesize an envelope carrying this alarm state instead
        #[arg(long)]
        state: Option<String>,
    },
    /// Accept notifications over HTTP
    Serve {
        /// Listener address, overriding the configured one
        #[arg(long)]
        bind: Option<String>,
    },
    /// Show the live replica count against the configured bounds
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.observability)?;

    tracing::info!("replica-autoscaler v{} starting", env!("CARGO_PKG_VERSION"));

    let autoscaler = build_autoscaler(&config)?;

    match cli.command {
        Command::Invoke { event, state } => {
            let event = match state {
                Some(state) => envelope_for_state(&state),
                None => read_event(event).await?,
            };
            let report = handle_invocation(&autoscaler, &event, Uuid::new_v4()).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Serve { bind } => {
            serve(&config, autoscaler, bind).await?;
        }
        Command::Status => {
            let status = cluster_status(&autoscaler).await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }

    Ok(())
}

async fn read_event(path: Option<PathBuf>) -> Result<InboundEvent, std::io::Error> {
    let mut raw = Vec::new();
    match path {
        Some(path) if path.as_os_str() != "-" => {
            raw = tokio::fs::read(path).await?;
        }
        _ => {
            tokio::io::stdin().read_to_end(&mut raw).await?;
        }
    }
    Ok(InboundEvent::from(raw))
}
