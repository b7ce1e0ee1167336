//! Time-window partitions: one key per schedule window.

use chrono::format::{self, Item, Parsed, StrftimeItems};
use chrono::{DateTime, Utc, Weekday};
use mp_error::{MpError, Result};
use mp_types::{PartitionKeyRange, PartitionSchedule, TimeWindow};
use serde::Serialize;
use std::fmt::Write;

use super::identifier_for;
use crate::context::PartitionLoadingContext;

/// Largest number of windows `end_offset` may add or remove.
pub const MAX_END_OFFSET: i64 = 100_000;

/// A partitions definition whose keys are the starts of schedule windows.
///
/// Windows are aligned to the schedule (see [`PartitionSchedule`]) and start
/// at the first boundary at or after `start`. A window is a partition once it
/// has ended, i.e. its end is at or before the effective time of the query
/// (and before `end`, when set). `end_offset` adds windows past the last
/// complete one, or removes windows when negative.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use mp_partitions::{PartitionLoadingContext, TimeWindowPartitionsDefinition};
///
/// let def = TimeWindowPartitionsDefinition::daily(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
/// let ctx = PartitionLoadingContext::new()
///     .with_current_time(Utc.with_ymd_and_hms(2024, 1, 3, 12, 0, 0).unwrap());
///
/// assert_eq!(def.get_partition_keys(&ctx).unwrap(), vec!["2024-01-01", "2024-01-02"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TimeWindowPartitionsDefinition {
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    schedule: PartitionSchedule,
    fmt: String,
    end_offset: i64,
}

impl TimeWindowPartitionsDefinition {
    /// Create a definition with the schedule's default key format.
    pub fn new(start: DateTime<Utc>, schedule: PartitionSchedule) -> Self {
        Self {
            start,
            end: None,
            schedule,
            fmt: schedule.default_format().to_string(),
            end_offset: 0,
        }
    }

    /// Hourly windows starting at `start`.
    pub fn hourly(start: DateTime<Utc>) -> Self {
        Self::new(start, PartitionSchedule::Hourly)
    }

    /// Daily windows starting at `start`.
    pub fn daily(start: DateTime<Utc>) -> Self {
        Self::new(start, PartitionSchedule::Daily)
    }

    /// Weekly windows starting at `start`.
    pub fn weekly(start: DateTime<Utc>) -> Self {
        Self::new(start, PartitionSchedule::Weekly)
    }

    /// Monthly windows starting at `start`.
    pub fn monthly(start: DateTime<Utc>) -> Self {
        Self::new(start, PartitionSchedule::Monthly)
    }

    /// Stop producing windows that end after `end`.
    pub fn with_end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    /// Set the strftime-style key format.
    pub fn with_fmt(mut self, fmt: impl Into<String>) -> Self {
        self.fmt = fmt.into();
        self
    }

    /// Set the number of windows past the last complete one.
    pub fn with_end_offset(mut self, end_offset: i64) -> Self {
        self.end_offset = end_offset;
        self
    }

    /// Start of the definition as given.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Optional end of the definition.
    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    /// Window cadence.
    pub fn schedule(&self) -> PartitionSchedule {
        self.schedule
    }

    /// Key format.
    pub fn key_format(&self) -> &str {
        &self.fmt
    }

    /// Window offset.
    pub fn end_offset(&self) -> i64 {
        self.end_offset
    }

    /// Check that the key format is usable and the offset is bounded.
    ///
    /// A usable format tells consecutive windows apart and parses back to
    /// the window it was formatted from.
    pub fn validate(&self) -> Result<()> {
        if self.fmt.is_empty() {
            return Err(MpError::Definition(
                "Time window partitions definition has an empty key format".to_string(),
            ));
        }
        if StrftimeItems::new(&self.fmt).any(|item| matches!(item, Item::Error)) {
            return Err(MpError::Definition(format!(
                "Invalid time window key format '{}'",
                self.fmt
            )));
        }
        if let Some(end) = self.end {
            if end < self.start {
                return Err(MpError::Definition(format!(
                    "Time window partitions definition ends ({end}) before it starts ({})",
                    self.start
                )));
            }
        }
        self.check_end_offset()?;

        let first = self.first_window_start()?;
        let second = self.schedule.next_boundary(first);
        for start in std::iter::once(first).chain(second) {
            let key = self.format_key(start)?;
            if self.parse_key(&key) != Some(start) {
                return Err(MpError::Definition(format!(
                    "Key format '{}' does not identify {} windows: '{key}' does not parse back to {start}",
                    self.fmt, self.schedule
                )));
            }
        }
        Ok(())
    }

    fn check_end_offset(&self) -> Result<()> {
        if self.end_offset.unsigned_abs() > MAX_END_OFFSET.unsigned_abs() {
            return Err(MpError::Definition(format!(
                "End offset {} is out of range, at most {MAX_END_OFFSET} windows may be added or removed",
                self.end_offset
            )));
        }
        Ok(())
    }

    fn first_window_start(&self) -> Result<DateTime<Utc>> {
        self.schedule.ceil(self.start).ok_or_else(|| {
            MpError::Definition(format!(
                "Time window partitions definition starting {} has no {} windows",
                self.start, self.schedule
            ))
        })
    }

    /// Keys of all windows that exist at the context's effective time.
    pub fn get_partition_keys(&self, ctx: &PartitionLoadingContext) -> Result<Vec<String>> {
        self.window_starts(ctx.effective_dt())?
            .into_iter()
            .map(|start| self.format_key(start))
            .collect()
    }

    /// Check if a key names an existing window.
    pub fn has_partition_key(&self, partition_key: &str, ctx: &PartitionLoadingContext) -> Result<bool> {
        let Some(start) = self.parse_key(partition_key) else {
            return Ok(false);
        };
        Ok(self
            .window_starts(ctx.effective_dt())?
            .binary_search(&start)
            .is_ok())
    }

    /// Keys between two existing windows, inclusive.
    pub fn get_partition_keys_in_range(
        &self,
        range: &PartitionKeyRange,
        ctx: &PartitionLoadingContext,
    ) -> Result<Vec<String>> {
        let starts = self.window_starts(ctx.effective_dt())?;
        let locate = |key: &str| {
            self.parse_key(key)
                .and_then(|start| starts.binary_search(&start).ok())
                .ok_or_else(|| {
                    MpError::UnknownPartition(format!(
                        "'{key}' is not a partition of the time window definition"
                    ))
                })
        };
        let first = locate(&range.start)?;
        let last = locate(&range.end)?;
        if first > last {
            return Ok(Vec::new());
        }
        starts[first..=last]
            .iter()
            .map(|start| self.format_key(*start))
            .collect()
    }

    /// Number of windows that exist at the context's effective time.
    pub fn get_num_partitions(&self, ctx: &PartitionLoadingContext) -> Result<usize> {
        Ok(self.window_starts(ctx.effective_dt())?.len())
    }

    /// SHA-1 over the definition parameters.
    pub fn get_serializable_unique_identifier(&self) -> Result<String> {
        identifier_for(self)
    }

    /// The window a key refers to.
    ///
    /// Does not check that the window already exists; only that the key is a
    /// well-formed, schedule-aligned window start.
    pub fn time_window_for_partition_key(&self, partition_key: &str) -> Result<TimeWindow> {
        let unknown = || {
            MpError::UnknownPartition(format!(
                "'{partition_key}' is not a {} window start in format '{}'",
                self.schedule, self.fmt
            ))
        };
        let start = self.parse_key(partition_key).ok_or_else(unknown)?;
        let end = self.schedule.next_boundary(start).ok_or_else(unknown)?;
        Ok(TimeWindow::new(start, end))
    }

    /// Starts of all windows that exist at `effective_dt`, ascending.
    ///
    /// Windows whose end is not representable are never produced.
    fn window_starts(&self, effective_dt: DateTime<Utc>) -> Result<Vec<DateTime<Utc>>> {
        self.check_end_offset()?;
        let limit = match self.end {
            Some(end) => end.min(effective_dt),
            None => effective_dt,
        };

        let mut starts = Vec::new();
        let Some(mut current) = self.schedule.ceil(self.start) else {
            return Ok(starts);
        };
        let mut next = self.schedule.next_boundary(current);
        while let Some(end) = next.filter(|end| *end <= limit) {
            starts.push(current);
            current = end;
            next = self.schedule.next_boundary(current);
        }

        if self.end_offset > 0 {
            for _ in 0..self.end_offset {
                let Some(end) = next.filter(|end| self.end.map_or(true, |last| *end <= last)) else {
                    break;
                };
                starts.push(current);
                current = end;
                next = self.schedule.next_boundary(current);
            }
        } else if self.end_offset < 0 {
            let remove = usize::try_from(self.end_offset.unsigned_abs()).unwrap_or(usize::MAX);
            starts.truncate(starts.len().saturating_sub(remove));
        }

        Ok(starts)
    }

    fn format_key(&self, start: DateTime<Utc>) -> Result<String> {
        let mut key = String::new();
        write!(key, "{}", start.format(&self.fmt)).map_err(|_| {
            MpError::Definition(format!("Invalid time window key format '{}'", self.fmt))
        })?;
        Ok(key)
    }

    /// Parse a key into an aligned window start. Keys that do not round-trip
    /// through the format are rejected.
    ///
    /// Fields the format leaves out take the value they have at a window
    /// start: midnight, the first of the month, January, Sunday.
    fn parse_key(&self, partition_key: &str) -> Option<DateTime<Utc>> {
        let mut parsed = Parsed::new();
        format::parse(&mut parsed, partition_key, StrftimeItems::new(&self.fmt)).ok()?;
        fill_window_start_defaults(&mut parsed).ok()?;
        let start = parsed.to_naive_datetime_with_offset(0).ok()?.and_utc();

        if start < self.schedule.ceil(self.start)? || !self.schedule.is_boundary(start) {
            return None;
        }
        match self.format_key(start) {
            Ok(canonical) if canonical == partition_key => Some(start),
            _ => None,
        }
    }
}

fn fill_window_start_defaults(parsed: &mut Parsed) -> format::ParseResult<()> {
    let has_week = parsed.week_from_sun().is_some()
        || parsed.week_from_mon().is_some()
        || parsed.isoweek().is_some();
    if has_week && parsed.weekday().is_none() {
        parsed.set_weekday(Weekday::Sun)?;
    }
    let dated_by_year = parsed.ordinal().is_none() && !has_week;
    if dated_by_year && parsed.month().is_none() {
        parsed.set_month(1)?;
    }
    if dated_by_year && parsed.day().is_none() {
        parsed.set_day(1)?;
    }
    if parsed.hour_div_12().is_none() && parsed.hour_mod_12().is_none() {
        parsed.set_hour(0)?;
    }
    if parsed.minute().is_none() {
        parsed.set_minute(0)?;
    }
    Ok(())
}

impl std::fmt::Display for TimeWindowPartitionsDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut schedule = self.schedule.to_string();
        if let Some(first) = schedule.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        write!(f, "{schedule}, starting {} UTC", self.start.format("%Y-%m-%d %H:%M"))?;
        if let Some(end) = self.end {
            write!(f, ", ending {} UTC", end.format("%Y-%m-%d %H:%M"))?;
        }
        if self.end_offset != 0 {
            write!(f, ", end offset {}", self.end_offset)?;
        }
        write!(f, ".")
    }
}
