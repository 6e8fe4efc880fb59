//! Scaling configuration, alarm states and decision outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::validation::ValidationError;
use crate::config::{ClusterConfig, StepBounds};

/// Bounds and target of the autoscaler, fixed for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScalingConfig {
    pub cluster_identifier: String,
    pub min_capacity: u32,
    pub max_capacity: u32,
    pub step_bounds: StepBounds,
}

/// The configured floor lies above the ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("min_capacity ({min}) cannot be greater than max_capacity ({max})")]
    InvertedBounds { min: u32, max: u32 },
}

impl ScalingConfig {
    pub fn new(cluster_identifier: impl Into<String>, min_capacity: u32, max_capacity: u32) -> Self {
        Self {
            cluster_identifier: cluster_identifier.into(),
            min_capacity,
            max_capacity,
            step_bounds: StepBounds::default(),
        }
    }

    pub fn with_step_bounds(mut self, step_bounds: StepBounds) -> Self {
        self.step_bounds = step_bounds;
        self
    }

    /// Check the floor/ceiling invariant.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.min_capacity > self.max_capacity {
            return Err(ConfigurationError::InvertedBounds {
                min: self.min_capacity,
                max: self.max_capacity,
            });
        }
        Ok(())
    }
}

impl TryFrom<&ClusterConfig> for ScalingConfig {
    type Error = ValidationError;

    fn try_from(cluster: &ClusterConfig) -> Result<Self, Self::Error> {
        if cluster.identifier.trim().is_empty() {
            return Err(ValidationError::MissingClusterIdentifier);
        }
        let min_capacity = cluster
            .min_capacity
            .ok_or(ValidationError::MissingCapacity("min_capacity"))?;
        let max_capacity = cluster
            .max_capacity
            .ok_or(ValidationError::MissingCapacity("max_capacity"))?;

        Ok(Self {
            cluster_identifier: cluster.identifier.clone(),
            min_capacity,
            max_capacity,
            step_bounds: cluster.step_bounds,
        })
    }
}

/// Alarm state carried by a state-change notification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum AlarmState {
    Alarm,
    Ok,
    /// Any other state, e.g. `INSUFFICIENT_DATA`.
    Other(String),
}

impl From<String> for AlarmState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ALARM" => AlarmState::Alarm,
            "OK" => AlarmState::Ok,
            _ => AlarmState::Other(value),
        }
    }
}

impl fmt::Display for AlarmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlarmState::Alarm => f.write_str("ALARM"),
            AlarmState::Ok => f.write_str("OK"),
            AlarmState::Other(state) => f.write_str(state),
        }
    }
}

/// What one invocation did to the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScalingOutcome {
    /// Replicas were below the floor; `added` replicas were requested and the
    /// notification was not looked at.
    FloorRestored { observed: u32, added: u32 },
    /// One replica was requested in response to `ALARM`.
    ScaledOut { observed: u32 },
    /// One replica was removed in response to `OK`.
    ScaledIn { observed: u32 },
    /// `ALARM` arrived at or above the ceiling with enforced step bounds.
    AtCeiling { observed: u32 },
    /// `OK` arrived at or below the floor with enforced step bounds.
    AtFloor { observed: u32 },
    /// The alarm state calls for no action.
    Unchanged { observed: u32, state: String },
}

impl ScalingOutcome {
    /// Short label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            ScalingOutcome::FloorRestored { .. } => "floor_restored",
            ScalingOutcome::ScaledOut { .. } => "scaled_out",
            ScalingOutcome::ScaledIn { .. } => "scaled_in",
            ScalingOutcome::AtCeiling { .. } => "at_ceiling",
            ScalingOutcome::AtFloor { .. } => "at_floor",
            ScalingOutcome::Unchanged { .. } => "unchanged",
        }
    }

    /// Replica count observed at decision time.
    pub fn observed(&self) -> u32 {
        match self {
            ScalingOutcome::FloorRestored { observed, .. }
            | ScalingOutcome::ScaledOut { observed }
            | ScalingOutcome::ScaledIn { observed }
            | ScalingOutcome::AtCeiling { observed }
            | ScalingOutcome::AtFloor { observed }
            | ScalingOutcome::Unchanged { observed, .. } => *observed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_bounds() {
        assert!(ScalingConfig::new("orders", 3, 10).validate().is_ok());
        assert!(ScalingConfig::new("orders", 3, 3).validate().is_ok());
        assert_eq!(
            ScalingConfig::new("orders", 5, 3).validate(),
            Err(ConfigurationError::InvertedBounds { min: 5, max: 3 })
        );
    }

    #[test]
    fn test_from_cluster_config() {
        let cluster = ClusterConfig {
            identifier: "orders".to_string(),
            min_capacity: Some(1),
            max_capacity: Some(4),
            step_bounds: StepBounds::Enforced,
        };
        let config = ScalingConfig::try_from(&cluster).unwrap();
        assert_eq!(
            config,
            ScalingConfig::new("orders", 1, 4).with_step_bounds(StepBounds::Enforced)
        );
    }

    #[test]
    fn test_from_cluster_config_requires_capacities() {
        let cluster = ClusterConfig {
            identifier: "orders".to_string(),
            min_capacity: Some(1),
            ..ClusterConfig::default()
        };
        assert_eq!(
            ScalingConfig::try_from(&cluster),
            Err(ValidationError::MissingCapacity("max_capacity"))
        );
    }

    #[test]
    fn test_alarm_state_parsing() {
        assert_eq!(AlarmState::from("ALARM".to_string()), AlarmState::Alarm);
        assert_eq!(AlarmState::from("OK".to_string()), AlarmState::Ok);
        assert_eq!(
            AlarmState::from("INSUFFICIENT_DATA".to_string()),
            AlarmState::Other("INSUFFICIENT_DATA".to_string())
        );
        // State values are case-sensitive on the wire.
        assert_eq!(
            AlarmState::from("alarm".to_string()),
            AlarmState::Other("alarm".to_string())
        );
    }

    #[test]
    fn test_outcome_serializes_with_action_tag() {
        let json = serde_json::to_value(ScalingOutcome::FloorRestored { observed: 1, added: 2 })
            .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"action": "floor_restored", "observed": 1, "added": 2})
        );
    }
}
