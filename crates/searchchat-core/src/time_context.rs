//! Snapshot of the requester's local date and time.

use std::fmt::Display;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The user's clock at the moment a message was sent.
///
/// Only used to enrich the system instruction; never stored in history.
/// Fields arrive as text or numbers and are kept as the text to render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserDateTime {
    /// Human-readable local date/time, e.g. "Monday, October 19, 2026 at 3:04:05 PM +02:00".
    #[serde(deserialize_with = "text_or_number")]
    pub local_date_time: String,

    /// Timezone name (IANA name when known, otherwise the UTC offset).
    #[serde(deserialize_with = "text_or_number")]
    pub timezone: String,

    /// ISO-8601 UTC timestamp with milliseconds.
    #[serde(deserialize_with = "text_or_number")]
    pub timestamp: String,

    /// Seconds since the Unix epoch.
    #[serde(deserialize_with = "text_or_number")]
    pub unix_timestamp: String,
}

impl UserDateTime {
    /// Capture a snapshot from a zoned timestamp.
    pub fn capture<Tz>(now: &DateTime<Tz>, timezone: impl Into<String>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self {
            local_date_time: now
                .format("%A, %B %-d, %Y at %-I:%M:%S %p %Z")
                .to_string(),
            timezone: timezone.into(),
            timestamp: now
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            unix_timestamp: now.timestamp().to_string(),
        }
    }
}

fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        _ => Err(serde::de::Error::custom("expected text or number")),
    }
}
