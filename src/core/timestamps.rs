//! Normalization of raw time boundaries into offset-aware timestamps.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

use crate::core::models::TimestampInput;
use crate::errors::FetchError;

// `%#z` takes `Z`, `+hh`, `+hhmm` and `+hh:mm`.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M%#z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Return the input as an offset-aware timestamp.
///
/// Values that already carry an offset keep it. Naive values are tagged UTC.
///
/// # Errors
///
/// Returns `FetchError::MalformedTimestamp` when text input is not ISO-8601.
pub fn normalize_timestamp(input: &TimestampInput) -> Result<DateTime<FixedOffset>, FetchError> {
    match input {
        TimestampInput::Aware(value) => Ok(*value),
        TimestampInput::Naive(value) => Ok(value.and_utc().fixed_offset()),
        TimestampInput::Text(text) => parse_iso8601(text),
    }
}

/// Parse ISO-8601 text, treating a missing offset as UTC.
///
/// # Examples
///
/// ```
/// use backscroll::core::timestamps::parse_iso8601;
///
/// let naive = parse_iso8601("2025-10-18T00:00:00").unwrap();
/// let explicit = parse_iso8601("2025-10-18T00:00:00+00:00").unwrap();
/// assert_eq!(naive, explicit);
/// assert!(parse_iso8601("not-a-date").is_err());
/// ```
///
/// # Errors
///
/// Returns `FetchError::MalformedTimestamp` when no supported form matches.
pub fn parse_iso8601(text: &str) -> Result<DateTime<FixedOffset>, FetchError> {
    let trimmed = text.trim();
    let expanded = expand_hour_only(trimmed);
    let trimmed = expanded.as_deref().unwrap_or(trimmed);

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed);
    }

    if let Some(parsed) = OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(trimmed, format).ok())
    {
        return Ok(parsed);
    }

    if let Some(parsed) = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
    {
        return Ok(parsed.and_utc().fixed_offset());
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().fixed_offset())
        .ok_or_else(|| FetchError::MalformedTimestamp(text.to_string()))
}

/// Rewrite `YYYY-MM-DDTHH[offset]` as `YYYY-MM-DDTHH:00[offset]`.
///
/// chrono needs a minute field to build a time, so hour-only text gets one.
fn expand_hour_only(text: &str) -> Option<String> {
    let separator = text.get(10..11)?;
    let hour = text.get(11..13)?;
    let rest = text.get(13..)?;

    let is_hour_only = matches!(separator, "T" | " ")
        && hour.bytes().all(|b| b.is_ascii_digit())
        && (rest.is_empty() || rest.starts_with(['+', '-', 'Z', 'z']));

    is_hour_only.then(|| format!("{}:00{}", &text[..13], rest))
}
