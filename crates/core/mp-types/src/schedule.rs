//! Partition schedules for time-window dimensions.

use chrono::{DateTime, Datelike, Days, Duration, Months, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Cadence at which a time-window dimension produces partitions.
///
/// All boundaries are computed in UTC. Weekly windows start on Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionSchedule {
    /// One partition per hour
    Hourly,
    /// One partition per day
    #[default]
    Daily,
    /// One partition per week, starting Sunday 00:00
    Weekly,
    /// One partition per calendar month
    Monthly,
}

impl PartitionSchedule {
    /// Key format used when a definition does not set one.
    pub fn default_format(&self) -> &'static str {
        match self {
            Self::Hourly => "%Y-%m-%d-%H:%M",
            Self::Daily | Self::Weekly | Self::Monthly => "%Y-%m-%d",
        }
    }

    /// Latest boundary at or before `instant`.
    pub fn floor(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        let date = instant.date_naive();
        match self {
            Self::Hourly => midnight(date) + Duration::hours(i64::from(instant.hour())),
            Self::Daily => midnight(date),
            Self::Weekly => {
                let offset = u64::from(date.weekday().num_days_from_sunday());
                midnight(date - Days::new(offset))
            }
            Self::Monthly => midnight(date - Days::new(u64::from(date.day0()))),
        }
    }

    /// First boundary strictly after the boundary at or before `instant`.
    ///
    /// `None` past the last representable instant.
    pub fn next_boundary(&self, instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let floor = self.floor(instant);
        match self {
            Self::Hourly => floor.checked_add_signed(Duration::hours(1)),
            Self::Daily => floor.checked_add_signed(Duration::days(1)),
            Self::Weekly => floor.checked_add_signed(Duration::days(7)),
            Self::Monthly => floor.date_naive().checked_add_months(Months::new(1)).map(midnight),
        }
    }

    /// Earliest boundary at or after `instant`.
    pub fn ceil(&self, instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if self.is_boundary(instant) {
            Some(instant)
        } else {
            self.next_boundary(instant)
        }
    }

    /// Check if `instant` falls exactly on a boundary.
    pub fn is_boundary(&self, instant: DateTime<Utc>) -> bool {
        self.floor(instant) == instant
    }
}

impl std::fmt::Display for PartitionSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hourly => write!(f, "hourly"),
            Self::Daily => write!(f, "daily"),
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
        }
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
