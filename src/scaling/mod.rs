//! Autoscaling decision engine.
//!
//! # Data Flow
//! ```text
//! InboundEvent (raw envelope)
//!     → controller.rs (validate bounds, count replicas)
//!         → below floor: tolerant adds until min_capacity, done
//!         → otherwise: notification.rs decodes Records[0]
//!             → at most one add or remove
//!     → ScalingOutcome | ScalingError
//! ```
//!
//! # Design Decisions
//! - No state survives an invocation; the cluster is queried fresh every time
//! - Floor enforcement outranks whatever alarm transition arrived
//! - Errors are returned, never logged here; the host layer decides

pub mod controller;
pub mod notification;
pub mod types;

pub use controller::{Autoscaler, ScalingError};
pub use notification::{AlarmNotification, InboundEvent, NotificationError};
pub use types::{AlarmState, ConfigurationError, ScalingConfig, ScalingOutcome};
