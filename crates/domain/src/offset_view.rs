//! Offset clock views.
//!
//! An offset view is a pure function of the canonical time and a location's
//! fixed UTC offset. Arithmetic happens entirely in UTC: the offset is added
//! to the UTC instant and the UTC fields of the result are read back, so the
//! output never depends on the timezone of the machine rendering it.

use chrono::Timelike;

use crate::location::Location;
use crate::time::CanonicalTime;

/// Renders `time` shifted by `offset_hours` as zero-padded `HH:MM:SS`.
#[must_use]
pub fn render_offset(time: CanonicalTime, offset_hours: i32) -> String {
    let shifted = time.shifted_hours(offset_hours);
    format!(
        "{:02}:{:02}:{:02}",
        shifted.hour(),
        shifted.minute(),
        shifted.second()
    )
}

/// A clock view bound to one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetView {
    location: Location,
}

impl OffsetView {
    /// Creates a view for the given location.
    #[must_use]
    pub const fn new(location: Location) -> Self {
        Self { location }
    }

    /// The location this view displays.
    #[must_use]
    pub const fn location(&self) -> Location {
        self.location
    }

    /// Renders the wall-clock string, or `None` while no canonical time is known.
    #[must_use]
    pub fn render(&self, now: Option<CanonicalTime>) -> Option<String> {
        now.map(|t| render_offset(t, self.location.offset_hours))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::LOCATIONS;

    fn t(s: &str) -> CanonicalTime {
        CanonicalTime::parse(s).unwrap()
    }

    #[test]
    fn tokyo_is_nine_hours_ahead() {
        assert_eq!(render_offset(t("2024-01-01T00:00:00Z"), 9), "09:00:00");
    }

    #[test]
    fn los_angeles_wraps_to_previous_day() {
        assert_eq!(render_offset(t("2024-01-01T00:00:00Z"), -8), "16:00:00");
    }

    #[test]
    fn minutes_and_seconds_are_zero_padded() {
        assert_eq!(render_offset(t("2024-06-15T03:04:05Z"), 0), "03:04:05");
        assert_eq!(render_offset(t("2024-06-15T23:59:59Z"), 1), "00:59:59");
    }

    #[test]
    fn subsecond_precision_is_truncated() {
        assert_eq!(render_offset(t("2024-06-15T12:00:00.999Z"), -5), "07:00:00");
    }

    #[test]
    fn every_view_renders_the_same_instant() {
        let now = t("2024-01-01T12:30:15Z");
        let rendered: Vec<_> = LOCATIONS
            .iter()
            .map(|l| OffsetView::new(*l).render(Some(now)).unwrap())
            .collect();
        assert_eq!(
            rendered,
            vec!["07:30:15", "07:30:15", "04:30:15", "12:30:15", "21:30:15"]
        );
    }

    #[test]
    fn no_time_renders_nothing() {
        let view = OffsetView::new(LOCATIONS[0]);
        assert_eq!(view.render(None), None);
    }

    // The rendering must not depend on the host timezone: the same instant
    // expressed with different source offsets yields identical output.
    #[test]
    fn rendering_is_independent_of_source_offset() {
        let utc = t("2024-01-01T00:00:00Z");
        let tokyo_local = t("2024-01-01T09:00:00+09:00");
        let ny_local = t("2023-12-31T19:00:00-05:00");
        for hours in -12..=14 {
            assert_eq!(render_offset(utc, hours), render_offset(tokyo_local, hours));
            assert_eq!(render_offset(utc, hours), render_offset(ny_local, hours));
        }
    }
}
