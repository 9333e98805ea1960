//! Canonical time and watcher count value types.

use std::fmt;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// The single authoritative instant shared by every clock view.
///
/// `CanonicalTime` is `Copy`: views receive their own value and can shift it
/// freely without touching the instant held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalTime(DateTime<Utc>);

impl CanonicalTime {
    /// Wraps a UTC instant.
    #[must_use]
    pub const fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    /// Parses an ISO-8601 / RFC 3339 date-time, normalizing it to UTC.
    ///
    /// # Errors
    ///
    /// Returns the chrono parse error if the input is not a valid date-time.
    pub fn parse(input: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(input).map(|t| Self(t.with_timezone(&Utc)))
    }

    /// Returns this instant shifted by a whole number of hours.
    ///
    /// The shift is pure UTC arithmetic; the host timezone plays no part.
    #[must_use]
    pub fn shifted_hours(self, hours: i32) -> DateTime<Utc> {
        self.0 + Duration::hours(i64::from(hours))
    }
}

impl From<DateTime<Utc>> for CanonicalTime {
    fn from(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }
}

impl fmt::Display for CanonicalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

/// Number of clients currently holding an open push subscription.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct WatcherCount(u64);

impl WatcherCount {
    /// No watchers.
    pub const ZERO: Self = Self(0);

    /// Creates a watcher count.
    #[must_use]
    pub const fn new(count: u64) -> Self {
        Self(count)
    }

    /// Returns the raw count.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for WatcherCount {
    fn from(count: u64) -> Self {
        Self(count)
    }
}

impl fmt::Display for WatcherCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parse_normalizes_offsets_to_utc() {
        let t = CanonicalTime::parse("2024-01-01T09:00:00+09:00").unwrap();
        assert_eq!(t.shifted_hours(0), Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(CanonicalTime::parse("yesterday").is_err());
        assert!(CanonicalTime::parse("2024-01-01").is_err());
    }

    #[test]
    fn shifted_hours_leaves_original_untouched() {
        let t = CanonicalTime::parse("2024-01-01T00:00:00Z").unwrap();
        let shifted = t.shifted_hours(-8);
        assert_eq!(
            shifted,
            Utc.with_ymd_and_hms(2023, 12, 31, 16, 0, 0).unwrap()
        );
        assert_eq!(t, CanonicalTime::parse("2024-01-01T00:00:00Z").unwrap());
    }

    #[test]
    fn display_is_rfc3339_utc() {
        let t = CanonicalTime::parse("2024-03-05T07:08:09.250Z").unwrap();
        assert_eq!(t.to_string(), "2024-03-05T07:08:09.250Z");
    }

    #[test]
    fn watcher_count_display() {
        assert_eq!(WatcherCount::new(3).to_string(), "3");
        assert_eq!(WatcherCount::default(), WatcherCount::ZERO);
    }
}
