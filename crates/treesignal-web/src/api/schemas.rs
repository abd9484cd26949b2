//! Wire schemas for the JSON API.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use treesignal_types::{ChannelPath, Message, Severity};

/// Payload accepted by the message ingestion endpoint.
#[derive(Debug, Deserialize)]
pub struct MessageIngress {
    /// Hierarchical channel path using `.` separators.
    pub channel: String,
    /// Opaque payload to display.
    pub payload: String,
    #[serde(default = "default_severity")]
    pub severity: String,
    #[serde(default)]
    pub metadata: Option<BTreeMap<String, String>>,
}

fn default_severity() -> String {
    "info".to_string()
}

/// Acknowledgement returned after ingesting a message.
#[derive(Debug, Serialize)]
pub struct MessageAccepted {
    pub id: String,
    pub status: &'static str,
}

/// Outbound representation of a stored message.
#[derive(Debug, Serialize)]
pub struct MessageRecord {
    pub id: String,
    pub channel: ChannelPath,
    pub payload: String,
    pub severity: Severity,
    pub received_at: DateTime<Utc>,
    pub metadata: Option<BTreeMap<String, String>>,
}

impl From<&Message> for MessageRecord {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.clone(),
            channel: message.channel.clone(),
            payload: message.payload.clone(),
            severity: message.severity,
            received_at: message.received_at,
            metadata: message.metadata.clone(),
        }
    }
}

/// Request and echo payload for the decay control endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct DecayConfigBody {
    pub hold_seconds: f64,
    pub decay_seconds: f64,
}

/// Request and echo payload for the colour control endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ColorConfigBody {
    pub assignment_mode: String,
    pub inheritance_mode: String,
}

#[derive(Debug, Deserialize)]
pub struct PruneRequest {
    pub channel: String,
}

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub status: &'static str,
    pub version: String,
}
