//! Half-open time windows.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A half-open time interval `[start, end)` covered by one time partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Inclusive start of the window
    pub start: DateTime<Utc>,

    /// Exclusive end of the window
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Create a new time window.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Check if an instant falls inside the window.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Length of the window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_time_window_contains() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let window = TimeWindow::new(start, end);

        assert!(window.contains(start));
        assert!(window.contains(Utc.with_ymd_and_hms(2024, 1, 1, 23, 59, 59).unwrap()));
        assert!(!window.contains(end));
        assert_eq!(window.duration(), Duration::days(1));
    }
}
