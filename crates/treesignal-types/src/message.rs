use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::ChannelPath;

/// Default message lifespan before it ages out of channel history.
pub const DEFAULT_LIFESPAN_SECONDS: f64 = 30.0;

/// Severity levels recognised by the message pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSeverity(pub String);

impl fmt::Display for InvalidSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid severity value")
    }
}

impl Error for InvalidSeverity {}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl FromStr for Severity {
    type Err = InvalidSeverity;

    /// Case-insensitive parse of the wire severity strings.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(InvalidSeverity(raw.to_string())),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable message published to a hierarchical channel.
#[derive(Debug, Clone)]
pub struct Message {
    /// Server-assigned opaque id, 32 lowercase hex chars.
    pub id: String,
    pub channel: ChannelPath,
    /// Opaque UTF-8 payload; the service never interprets it.
    pub payload: String,
    pub severity: Severity,
    pub received_at: DateTime<Utc>,
    pub metadata: Option<BTreeMap<String, String>>,
    /// Seconds this message stays in channel history before expiry.
    pub lifespan_seconds: f64,
}

impl Message {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.received_at + TimeDelta::milliseconds((self.lifespan_seconds * 1000.0) as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_parse_is_case_insensitive() {
        assert_eq!("WARN".parse::<Severity>(), Ok(Severity::Warn));
        assert_eq!("Info".parse::<Severity>(), Ok(Severity::Info));
        assert!("critical".parse::<Severity>().is_err());
    }

    #[test]
    fn severity_serialises_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::Error).unwrap(), r#""error""#);
    }

    #[test]
    fn expiry_is_receive_time_plus_lifespan() {
        let received_at = Utc::now();
        let message = Message {
            id: "0".repeat(32),
            channel: ChannelPath::parse("alpha").unwrap(),
            payload: "hello".to_string(),
            severity: Severity::Info,
            received_at,
            metadata: None,
            lifespan_seconds: 30.0,
        };
        assert_eq!(
            message.expires_at(),
            received_at + TimeDelta::seconds(30)
        );
    }
}
