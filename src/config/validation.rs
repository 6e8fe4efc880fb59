//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Require the cluster identifier and both capacity bounds
//! - Validate value ranges (timeouts > 0, attempts > 0)
//! - Check the control-plane endpoint and log format
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AutoscalerConfig → Result<(), Vec<ValidationError>>
//! - An inverted floor/ceiling is not rejected here; every invocation refuses to
//!   act on it instead

use thiserror::Error;

use crate::config::schema::AutoscalerConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("cluster identifier must not be empty")]
    MissingClusterIdentifier,

    #[error("'{0}' is not set")]
    MissingCapacity(&'static str),

    #[error("control plane endpoint '{endpoint}' is not a valid URL: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("'{0}' must be greater than zero")]
    ZeroValue(&'static str),

    #[error("unknown log format '{0}' (expected 'pretty' or 'json')")]
    UnknownLogFormat(String),
}

/// Validate a fully merged configuration.
pub fn validate_config(config: &AutoscalerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.cluster.identifier.trim().is_empty() {
        errors.push(ValidationError::MissingClusterIdentifier);
    }
    if config.cluster.min_capacity.is_none() {
        errors.push(ValidationError::MissingCapacity("min_capacity"));
    }
    if config.cluster.max_capacity.is_none() {
        errors.push(ValidationError::MissingCapacity("max_capacity"));
    }

    match url::Url::parse(&config.control_plane.endpoint) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::InvalidEndpoint {
            endpoint: config.control_plane.endpoint.clone(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::InvalidEndpoint {
            endpoint: config.control_plane.endpoint.clone(),
            reason: e.to_string(),
        }),
    }

    if config.control_plane.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("control_plane.request_timeout_secs"));
    }
    if config.control_plane.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("control_plane.connect_timeout_secs"));
    }
    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::ZeroValue("retries.max_attempts"));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("listener.request_timeout_secs"));
    }

    if !matches!(config.observability.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::UnknownLogFormat(
            config.observability.log_format.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
