//! Static registry of displayed locations.

use serde::Serialize;

/// A named place shown as a clock, with a fixed whole-hour offset from UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    /// Display name.
    pub name: &'static str,
    /// Signed offset from UTC in whole hours.
    pub offset_hours: i32,
}

impl Location {
    /// Creates a location.
    #[must_use]
    pub const fn new(name: &'static str, offset_hours: i32) -> Self {
        Self { name, offset_hours }
    }
}

/// The locations rendered by the clock panel, in display order.
pub const LOCATIONS: [Location; 5] = [
    Location::new("Atlanta", -5),
    Location::new("Boston", -5),
    Location::new("Los Angeles", -8),
    Location::new("London", 0),
    Location::new("Tokyo", 9),
];
