//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AutoscalerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the cluster identifier.
pub const ENV_CLUSTER_IDENTIFIER: &str = "cluster_identifier";
/// Environment variable holding the replica floor.
pub const ENV_MIN_CAPACITY: &str = "min_capacity";
/// Environment variable holding the replica ceiling.
pub const ENV_MAX_CAPACITY: &str = "max_capacity";
/// Environment variable overriding the control-plane endpoint.
pub const ENV_CONTROL_PLANE_ENDPOINT: &str = "control_plane_endpoint";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("environment variable '{key}' has invalid value '{value}': expected a non-negative integer")]
    Env { key: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration.
///
/// The TOML file is optional; the process environment is overlaid on top of
/// it (or on top of the defaults when no file is given).
pub fn load_config(path: Option<&Path>) -> Result<AutoscalerConfig, ConfigError> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Same as [`load_config`] with an explicit environment lookup.
pub fn load_config_with<F>(path: Option<&Path>, lookup: F) -> Result<AutoscalerConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => AutoscalerConfig::default(),
    };

    let config = apply_env_overrides(config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay the environment settings on a parsed configuration.
pub fn apply_env_overrides<F>(
    mut config: AutoscalerConfig,
    lookup: F,
) -> Result<AutoscalerConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(identifier) = lookup(ENV_CLUSTER_IDENTIFIER) {
        config.cluster.identifier = identifier;
    }
    if let Some(raw) = lookup(ENV_MIN_CAPACITY) {
        config.cluster.min_capacity = Some(parse_capacity(ENV_MIN_CAPACITY, raw)?);
    }
    if let Some(raw) = lookup(ENV_MAX_CAPACITY) {
        config.cluster.max_capacity = Some(parse_capacity(ENV_MAX_CAPACITY, raw)?);
    }
    if let Some(endpoint) = lookup(ENV_CONTROL_PLANE_ENDPOINT) {
        config.control_plane.endpoint = endpoint;
    }
    Ok(config)
}

fn parse_capacity(key: &'static str, raw: String) -> Result<u32, ConfigError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| ConfigError::Env { key, value: raw })
}
