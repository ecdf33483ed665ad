use chrono::{DateTime, FixedOffset, Utc};

use crate::core::models::TimestampInput;
use crate::core::timestamps::normalize_timestamp;
use crate::errors::FetchError;

/// Where a message timestamp falls relative to a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// At or before the exclusive lower bound. Everything older is out too.
    AtOrBeforeStart,
    /// Newer than the inclusive upper bound.
    AfterEnd,
    Inside(DateTime<Utc>),
}

/// The interval `(start, end]`, or `(start, +inf)` without an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
}

impl Window {
    #[must_use]
    pub fn new(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Normalize raw boundaries into a window.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::MalformedTimestamp` if either boundary is not ISO-8601.
    pub fn from_inputs(
        start: &TimestampInput,
        end: Option<&TimestampInput>,
    ) -> Result<Self, FetchError> {
        let start = normalize_timestamp(start)?.with_timezone(&Utc);
        let end = end
            .map(normalize_timestamp)
            .transpose()?
            .map(|end| end.with_timezone(&Utc));
        Ok(Self::new(start, end))
    }

    #[must_use]
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    /// True when no timestamp can satisfy `start < ts <= end`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end.is_some_and(|end| end <= self.start)
    }

    #[must_use]
    pub fn position(&self, timestamp: DateTime<FixedOffset>) -> Position {
        let timestamp = timestamp.with_timezone(&Utc);
        if timestamp <= self.start {
            Position::AtOrBeforeStart
        } else if self.end.is_some_and(|end| timestamp > end) {
            Position::AfterEnd
        } else {
            Position::Inside(timestamp)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 18, h, 0, 0).unwrap()
    }

    #[test]
    fn test_bounds_are_exclusive_then_inclusive() {
        let window = Window::new(at(1), Some(at(5)));
        assert_eq!(window.position(at(0).fixed_offset()), Position::AtOrBeforeStart);
        assert_eq!(window.position(at(1).fixed_offset()), Position::AtOrBeforeStart);
        assert_eq!(window.position(at(3).fixed_offset()), Position::Inside(at(3)));
        assert_eq!(window.position(at(5).fixed_offset()), Position::Inside(at(5)));
        assert_eq!(window.position(at(6).fixed_offset()), Position::AfterEnd);
    }

    #[test]
    fn test_unbounded_end() {
        let window = Window::new(at(1), None);
        assert_eq!(window.position(at(23).fixed_offset()), Position::Inside(at(23)));
        assert!(!window.is_empty());
    }

    #[test]
    fn test_position_compares_in_utc() {
        let window = Window::new(at(1), Some(at(5)));
        // 06:00+03:00 is 03:00 UTC
        let shifted = chrono::FixedOffset::east_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 10, 18, 6, 0, 0)
            .unwrap();
        assert_eq!(window.position(shifted), Position::Inside(at(3)));
    }

    #[test]
    fn test_from_inputs() {
        let window = Window::from_inputs(
            &TimestampInput::from("2025-10-18T01:00:00"),
            Some(&TimestampInput::from("2025-10-18T08:00:00+03:00")),
        )
        .unwrap();
        assert_eq!(window.start(), at(1));
        assert_eq!(window.end(), Some(at(5)));

        let err = Window::from_inputs(&TimestampInput::from("2025-10-18"), Some(&"soon".into()))
            .unwrap_err();
        assert!(matches!(err, FetchError::MalformedTimestamp(_)));
    }

    #[test]
    fn test_inverted_window_is_empty() {
        assert!(Window::new(at(5), Some(at(1))).is_empty());
        assert!(Window::new(at(5), Some(at(5))).is_empty());
    }
}
