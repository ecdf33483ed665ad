use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifies a channel on the remote platform. Resolution is left to the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRef {
    Id(i64),
    Handle(String),
}

impl From<i64> for ChannelRef {
    fn from(id: i64) -> Self {
        ChannelRef::Id(id)
    }
}

impl From<&str> for ChannelRef {
    fn from(handle: &str) -> Self {
        ChannelRef::Handle(handle.to_string())
    }
}

impl From<String> for ChannelRef {
    fn from(handle: String) -> Self {
        ChannelRef::Handle(handle)
    }
}

impl FromStr for ChannelRef {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(match trimmed.parse::<i64>() {
            Ok(id) => ChannelRef::Id(id),
            Err(_) => ChannelRef::Handle(trimmed.to_string()),
        })
    }
}

impl fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelRef::Id(id) => write!(f, "{id}"),
            ChannelRef::Handle(handle) => f.write_str(handle),
        }
    }
}

/// A raw time boundary as handed to the fetcher, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampInput {
    Aware(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
    Text(String),
}

impl From<DateTime<FixedOffset>> for TimestampInput {
    fn from(value: DateTime<FixedOffset>) -> Self {
        TimestampInput::Aware(value)
    }
}

impl From<DateTime<Utc>> for TimestampInput {
    fn from(value: DateTime<Utc>) -> Self {
        TimestampInput::Aware(value.fixed_offset())
    }
}

impl From<NaiveDateTime> for TimestampInput {
    fn from(value: NaiveDateTime) -> Self {
        TimestampInput::Naive(value)
    }
}

impl From<&str> for TimestampInput {
    fn from(value: &str) -> Self {
        TimestampInput::Text(value.to_string())
    }
}

impl From<String> for TimestampInput {
    fn from(value: String) -> Self {
        TimestampInput::Text(value)
    }
}

/// A message as delivered by a channel source. Either field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMessage {
    pub timestamp: Option<DateTime<FixedOffset>>,
    pub text: Option<String>,
}

/// A message inside the requested window, with its timestamp in UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "date", with = "iso_date")]
    timestamp: DateTime<Utc>,
    text: String,
}

impl Message {
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>, text: String) -> Self {
        Self { timestamp, text }
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// ISO-8601 rendering with an explicit `+00:00` offset.
    #[must_use]
    pub fn date(&self) -> String {
        self.timestamp.to_rfc3339()
    }
}

mod iso_date {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|date| date.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_channel_ref_from_str() {
        assert_eq!("-1001234".parse::<ChannelRef>().unwrap(), ChannelRef::Id(-1_001_234));
        assert_eq!(
            "#general".parse::<ChannelRef>().unwrap(),
            ChannelRef::Handle("#general".to_string())
        );
        assert_eq!(
            " C024BE91L ".parse::<ChannelRef>().unwrap(),
            ChannelRef::Handle("C024BE91L".to_string())
        );
    }

    #[test]
    fn test_message_date_has_explicit_offset() {
        let timestamp = Utc.with_ymd_and_hms(2025, 10, 18, 1, 0, 0).unwrap();
        let message = Message::new(timestamp, "b".into());
        assert_eq!(message.date(), "2025-10-18T01:00:00+00:00");
        assert_eq!(message.timestamp(), timestamp);
        assert_eq!(message.text(), "b");
    }
}
