//! Clock panel view model.
//!
//! Everything shown on screen is derived here from a store snapshot and
//! the error slot, so the terminal loop only prints.

use std::fmt::Write as _;

use tickwatch_application::TimeSnapshot;
use tickwatch_domain::{LOCATIONS, OffsetView};

/// One rendered clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockFace {
    /// Location name.
    pub location: &'static str,
    /// Local time as `HH:MM:SS`.
    pub time: String,
}

/// Everything the panel displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockPanel {
    /// One face per location; empty until a canonical time exists.
    pub faces: Vec<ClockFace>,
    /// The current error message.
    pub error: Option<String>,
    /// `There are N watchers.`, only while watching.
    pub watcher_line: Option<String>,
    /// Label of the error control.
    pub error_label: &'static str,
    /// Label of the watch control.
    pub watch_label: &'static str,
    /// Whether a subscription is open.
    pub watching: bool,
}

impl ClockPanel {
    /// Builds the panel for a snapshot and the current error.
    #[must_use]
    pub fn build(snapshot: &TimeSnapshot, error: Option<&str>) -> Self {
        let faces = LOCATIONS
            .iter()
            .filter_map(|&location| {
                OffsetView::new(location)
                    .render(snapshot.now)
                    .map(|time| ClockFace {
                        location: location.name,
                        time,
                    })
            })
            .collect();

        Self {
            faces,
            error: error.map(str::to_string),
            watcher_line: snapshot
                .watcher_display()
                .map(|count| format!("There are {count} watchers.")),
            error_label: if error.is_some() {
                "Clear errors"
            } else {
                "Create an error"
            },
            watch_label: if snapshot.watching {
                "Stop watching the clock"
            } else {
                "Start watching the clock"
            },
            watching: snapshot.watching,
        }
    }

    /// Renders the panel as plain text, one line per row.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        if !self.faces.is_empty() {
            let row: Vec<String> = self
                .faces
                .iter()
                .map(|face| format!("[ {} {} ]", face.location, face.time))
                .collect();
            let _ = writeln!(out, "{}", row.join(" "));
        }

        let error_key = if self.error.is_some() { 'c' } else { 'e' };
        let _ = writeln!(
            out,
            "({error_key}) {}   (w) {}",
            self.error_label, self.watch_label
        );

        if let Some(error) = &self.error {
            let _ = writeln!(out, "! {error}");
        }
        if let Some(line) = &self.watcher_line {
            let _ = writeln!(out, "{line}");
        }
        out
    }
}

/// Text shown for the `h` command.
pub const HELP_TEXT: &str = "\
Commands:
  w                                    start or stop watching the clock
  e                                    create an error
  c                                    clear errors
  student <password> <name>            create a student record
  grade <password> <id> <grade> <course>  record a grade
  transcript <password> <id>           show a transcript
  h                                    show this help
  q                                    quit";

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tickwatch_domain::{CanonicalTime, WatcherCount};

    fn at(s: &str) -> Option<CanonicalTime> {
        Some(CanonicalTime::parse(s).unwrap())
    }

    #[test]
    fn no_faces_until_time_is_known() {
        let panel = ClockPanel::build(&TimeSnapshot::default(), None);
        assert!(panel.faces.is_empty());
        assert_eq!(panel.error_label, "Create an error");
        assert_eq!(panel.watch_label, "Start watching the clock");
        assert_eq!(panel.watcher_line, None);
    }

    #[test]
    fn faces_follow_the_location_registry() {
        let snapshot = TimeSnapshot {
            now: at("2024-01-01T00:00:00Z"),
            ..TimeSnapshot::default()
        };
        let panel = ClockPanel::build(&snapshot, None);

        let tokyo = panel.faces.iter().find(|f| f.location == "Tokyo").unwrap();
        let la = panel
            .faces
            .iter()
            .find(|f| f.location == "Los Angeles")
            .unwrap();
        assert_eq!(panel.faces.len(), LOCATIONS.len());
        assert_eq!(tokyo.time, "09:00:00");
        assert_eq!(la.time, "16:00:00");
    }

    #[test]
    fn watcher_line_only_while_watching() {
        let mut snapshot = TimeSnapshot {
            now: at("2024-01-01T00:00:00Z"),
            watchers: WatcherCount::new(3),
            watching: true,
        };
        let panel = ClockPanel::build(&snapshot, None);
        assert_eq!(panel.watcher_line.as_deref(), Some("There are 3 watchers."));
        assert_eq!(panel.watch_label, "Stop watching the clock");

        snapshot.watching = false;
        assert_eq!(ClockPanel::build(&snapshot, None).watcher_line, None);
    }

    #[test]
    fn error_switches_the_control() {
        let panel = ClockPanel::build(&TimeSnapshot::default(), Some("boom"));
        assert_eq!(panel.error_label, "Clear errors");
        assert_eq!(panel.error.as_deref(), Some("boom"));
    }

    #[test]
    fn render_text_layout() {
        let snapshot = TimeSnapshot {
            now: at("2024-01-01T00:00:00Z"),
            watchers: WatcherCount::new(2),
            watching: true,
        };
        let text = ClockPanel::build(&snapshot, Some("boom")).render_text();
        assert_eq!(
            text,
            "[ Atlanta 19:00:00 ] [ Boston 19:00:00 ] [ Los Angeles 16:00:00 ] \
             [ London 00:00:00 ] [ Tokyo 09:00:00 ]\n\
             (c) Clear errors   (w) Stop watching the clock\n\
             ! boom\n\
             There are 2 watchers.\n"
        );
    }
}
