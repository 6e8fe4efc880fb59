//! Alarm notification envelopes.
//!
//! # Wire Format
//! ```text
//! { "Records": [ { "Sns": { "Message": "<JSON string>" } }, ... ] }
//!
//! Message:
//! { "AlarmName": "...", "NewStateValue": "ALARM" | "OK" | ..., "NewStateReason": "..." }
//! ```
//!
//! # Design Decisions
//! - The envelope is kept raw and decoded on demand, so a payload that is
//!   never needed is never parsed
//! - Only the first record is consulted

use serde::Deserialize;
use thiserror::Error;

use crate::scaling::types::AlarmState;

/// The notification could not be turned into an alarm state.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("malformed event envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("event envelope contains no records")]
    NoRecords,

    #[error("malformed alarm message: {0}")]
    Message(#[source] serde_json::Error),
}

/// Decoded alarm state-change message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AlarmNotification {
    #[serde(rename = "NewStateValue")]
    pub new_state_value: AlarmState,

    #[serde(rename = "AlarmName", default)]
    pub alarm_name: Option<String>,

    #[serde(rename = "NewStateReason", default)]
    pub new_state_reason: Option<String>,
}

#[derive(Deserialize)]
struct Envelope {
    /// Left undecoded; only the first record is ever looked at.
    #[serde(rename = "Records", default)]
    records: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct Record {
    #[serde(rename = "Sns")]
    sns: SnsEntity,
}

#[derive(Deserialize)]
struct SnsEntity {
    #[serde(rename = "Message")]
    message: String,
}

/// One inbound invocation payload, as received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundEvent {
    raw: Vec<u8>,
}

impl InboundEvent {
    pub fn new(raw: impl Into<Vec<u8>>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Decode the first record's alarm message.
    pub fn alarm_notification(&self) -> Result<AlarmNotification, NotificationError> {
        let envelope: Envelope =
            serde_json::from_slice(&self.raw).map_err(NotificationError::Envelope)?;
        let first = envelope
            .records
            .into_iter()
            .next()
            .ok_or(NotificationError::NoRecords)?;
        let record: Record = serde_json::from_value(first).map_err(NotificationError::Envelope)?;
        serde_json::from_str(&record.sns.message).map_err(NotificationError::Message)
    }
}

impl From<Vec<u8>> for InboundEvent {
    fn from(raw: Vec<u8>) -> Self {
        Self { raw }
    }
}

impl From<&str> for InboundEvent {
    fn from(raw: &str) -> Self {
        Self::new(raw.as_bytes())
    }
}

/// Build the envelope for a single alarm state, as the notification bus
/// would deliver it.
pub fn envelope_for_state(state: &str) -> InboundEvent {
    let message = serde_json::json!({ "NewStateValue": state }).to_string();
    let envelope = serde_json::json!({ "Records": [ { "Sns": { "Message": message } } ] });
    InboundEvent::new(envelope.to_string())
}
