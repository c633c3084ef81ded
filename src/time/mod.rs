//! Time module for the simulation clock
//!
//! This module provides the hour-resolution [`Timestamp`] used throughout the
//! crate, Julian date conversions for ephemeris evaluation, and the
//! [`TimeGrid`] that enumerates every sample instant of a run.

use crate::constants::{DAY_S, HOUR_S, J2000, JULIAN_CENTURY_DAYS, UNIX_EPOCH_JD};
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::FusedIterator;
use thiserror::Error;

/// Error type for time operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    #[error("Invalid range: duration {duration_s}s with step {step_s}s ({reason})")]
    InvalidRange {
        /// Requested total duration in seconds
        duration_s: i64,
        /// Requested step in seconds
        step_s: i64,
        /// Which constraint was violated
        reason: &'static str,
    },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Time out of range: {0}")]
    OutOfRange(String),
}

/// Result type for time operations
pub type Result<T> = std::result::Result<T, TimeError>;

/// An instant in UTC with a resolution of one hour
///
/// Construction always truncates to the start of the containing hour, so two
/// timestamps inside the same hour compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "DateTime<Utc>")]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from a UTC datetime, truncating to the hour
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        let into_hour = dt.timestamp().rem_euclid(HOUR_S);
        let truncated = dt
            - Duration::seconds(into_hour)
            - Duration::nanoseconds(i64::from(dt.timestamp_subsec_nanos()));
        Self(truncated)
    }

    /// Parse a `YYYY-MM-DD` calendar date as midnight UTC
    pub fn parse_date(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Self::from_date)
            .map_err(|e| TimeError::InvalidDate(format!("'{s}' ({e}); use YYYY-MM-DD")))
    }

    /// Midnight UTC on the given calendar date
    pub fn from_date(date: NaiveDate) -> Self {
        Self(Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN)))
    }

    /// Midnight UTC on a year/month/day triple
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self::from_date)
            .ok_or_else(|| TimeError::InvalidDate(format!("{year:04}-{month:02}-{day:02}")))
    }

    /// The underlying UTC datetime
    pub fn datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Calendar date of this timestamp
    pub fn date(&self) -> NaiveDate {
        self.0.date_naive()
    }

    /// Julian date (UTC based; the sub-minute TT offset is below this
    /// crate's hour resolution)
    pub fn julian_date(&self) -> f64 {
        self.0.timestamp() as f64 / DAY_S + UNIX_EPOCH_JD
    }

    /// Julian centuries elapsed since J2000.0
    pub fn centuries_since_j2000(&self) -> f64 {
        (self.julian_date() - J2000) / JULIAN_CENTURY_DAYS
    }

    /// Add a duration, returning `None` if the result is not representable
    pub fn checked_add(&self, offset: Duration) -> Option<Self> {
        self.0.checked_add_signed(offset).map(Self::from_datetime)
    }

    /// Whole hours from `earlier` to `self`
    pub fn hours_since(&self, earlier: &Timestamp) -> i64 {
        (self.0 - earlier.0).num_hours()
    }

    /// Date formatted with underscores, as used in output file names
    pub fn file_stem_date(&self) -> String {
        let d = self.date();
        format!("{:04}_{:02}_{:02}", d.year(), d.month(), d.day())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S UTC"))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(dt)
    }
}

impl From<NaiveDate> for Timestamp {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

/// The ordered, evenly spaced sample instants of a run
///
/// The grid stores only its start, step and length; timestamps are produced
/// on demand, and [`TimeGrid::iter`] may be called any number of times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeGrid {
    start: Timestamp,
    step_hours: i64,
    len: usize,
}

impl TimeGrid {
    /// Build a grid covering `duration` from `start` at intervals of `step`
    ///
    /// `step` must be a positive whole number of hours and `duration` a
    /// positive multiple of `step`.
    pub fn new(start: Timestamp, duration: Duration, step: Duration) -> Result<Self> {
        let duration_s = duration.num_seconds();
        let step_s = step.num_seconds();
        let invalid = |reason| TimeError::InvalidRange {
            duration_s,
            step_s,
            reason,
        };

        if step_s <= 0 {
            return Err(invalid("step must be positive"));
        }
        if step.subsec_nanos() != 0 || step_s % HOUR_S != 0 {
            return Err(invalid("step must be a whole number of hours"));
        }
        if duration_s <= 0 {
            return Err(invalid("duration must be positive"));
        }
        if duration.subsec_nanos() != 0 || duration_s % step_s != 0 {
            return Err(invalid("duration must be a multiple of step"));
        }

        let len = usize::try_from(duration_s / step_s)
            .map_err(|_| invalid("too many samples"))?;
        let grid = Self {
            start,
            step_hours: step_s / HOUR_S,
            len,
        };

        // The final sample must be representable as a datetime
        if grid.get(len - 1).is_none() {
            return Err(TimeError::OutOfRange(format!(
                "grid starting {start} does not fit {len} steps"
            )));
        }
        Ok(grid)
    }

    /// Convenience constructor taking whole days and whole hours
    pub fn from_days(start: Timestamp, duration_days: u32, step_hours: u32) -> Result<Self> {
        Self::new(
            start,
            Duration::days(i64::from(duration_days)),
            Duration::hours(i64::from(step_hours)),
        )
    }

    /// First timestamp of the grid
    pub fn start(&self) -> Timestamp {
        self.start
    }

    /// Spacing between consecutive timestamps
    pub fn step(&self) -> Duration {
        Duration::hours(self.step_hours)
    }

    /// Number of timestamps in the grid
    pub fn len(&self) -> usize {
        self.len
    }

    /// A validated grid is never empty; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The `index`-th timestamp, if within the grid
    pub fn get(&self, index: usize) -> Option<Timestamp> {
        if index >= self.len {
            return None;
        }
        let hours = i64::try_from(index).ok()?.checked_mul(self.step_hours)?;
        self.start.checked_add(Duration::try_hours(hours)?)
    }

    /// Iterate over all timestamps from the start
    pub fn iter(&self) -> TimeGridIter<'_> {
        TimeGridIter {
            grid: self,
            front: 0,
            back: self.len,
        }
    }
}

impl<'a> IntoIterator for &'a TimeGrid {
    type Item = Timestamp;
    type IntoIter = TimeGridIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy iterator over a [`TimeGrid`]
#[derive(Debug, Clone)]
pub struct TimeGridIter<'a> {
    grid: &'a TimeGrid,
    front: usize,
    back: usize,
}

impl Iterator for TimeGridIter<'_> {
    type Item = Timestamp;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let ts = self.grid.get(self.front);
        self.front += 1;
        ts
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for TimeGridIter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        self.grid.get(self.back)
    }
}

impl ExactSizeIterator for TimeGridIter<'_> {}

impl FusedIterator for TimeGridIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn jan_first_2024() -> Timestamp {
        Timestamp::from_ymd(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_timestamp_truncates_to_hour() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 5, 17, 42, 9).unwrap();
        let ts = Timestamp::from_datetime(dt);
        assert_eq!(
            ts.datetime(),
            Utc.with_ymd_and_hms(2024, 3, 5, 17, 0, 0).unwrap()
        );

        let same_hour =
            Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 3, 5, 17, 5, 0).unwrap());
        assert_eq!(ts, same_hour);
    }

    #[test]
    fn test_deserialize_truncates_to_hour() {
        let ts: Timestamp = serde_json::from_str("\"2024-01-01T05:30:00Z\"").unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 5, 0, 0).unwrap();
        assert_eq!(ts.datetime(), expected);
        assert_eq!(serde_json::to_string(&ts).unwrap(), "\"2024-01-01T05:00:00Z\"");
    }

    #[test]
    fn test_julian_date_of_j2000() {
        // J2000.0 is 2000-01-01 12:00 (TT); at hour resolution UTC matches
        let ts = Timestamp::from_datetime(Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap());
        assert_relative_eq!(ts.julian_date(), J2000, epsilon = 1e-9);
        assert_relative_eq!(ts.centuries_since_j2000(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_date_rejected() {
        assert!(matches!(
            Timestamp::from_ymd(2023, 2, 29),
            Err(TimeError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_display_and_file_stem() {
        let ts = jan_first_2024();
        assert_eq!(ts.to_string(), "2024-01-01 00:00:00 UTC");
        assert_eq!(ts.file_stem_date(), "2024_01_01");
    }

    #[test]
    fn test_default_grid_has_720_hourly_samples() {
        let start = jan_first_2024();
        let grid = TimeGrid::from_days(start, 30, 1).unwrap();
        assert_eq!(grid.len(), 720);

        let samples: Vec<Timestamp> = grid.iter().collect();
        assert_eq!(samples.len(), 720);
        assert_eq!(samples[0], start);
        for pair in samples.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[1].hours_since(&pair[0]), 1);
        }
        assert_eq!(samples[719].hours_since(&start), 719);
    }

    #[rstest]
    #[case(2024, 1, 1)]
    #[case(2025, 8, 14)]
    #[case(1999, 12, 31)]
    #[case(2028, 2, 29)]
    fn test_grid_shape_independent_of_start(#[case] y: i32, #[case] m: u32, #[case] d: u32) {
        let start = Timestamp::from_ymd(y, m, d).unwrap();
        let grid = TimeGrid::from_days(start, 30, 1).unwrap();
        assert_eq!(grid.iter().len(), 720);
        assert_eq!(grid.iter().next(), Some(start));
        assert_eq!(grid.iter().last().map(|t| t.hours_since(&start)), Some(719));
    }

    #[test]
    fn test_grid_is_restartable() {
        let grid = TimeGrid::from_days(jan_first_2024(), 2, 3).unwrap();
        let first: Vec<_> = grid.iter().collect();
        let second: Vec<_> = (&grid).into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 16);

        let reversed: Vec<_> = grid.iter().rev().collect();
        assert_eq!(reversed.first(), first.last());
    }

    #[rstest]
    #[case(Duration::days(30), Duration::zero())]
    #[case(Duration::days(30), Duration::hours(-1))]
    #[case(Duration::zero(), Duration::hours(1))]
    #[case(Duration::hours(-24), Duration::hours(1))]
    #[case(Duration::hours(10), Duration::hours(3))]
    #[case(Duration::days(1), Duration::minutes(30))]
    #[case(Duration::minutes(90), Duration::hours(1))]
    fn test_invalid_ranges(#[case] duration: Duration, #[case] step: Duration) {
        let result = TimeGrid::new(jan_first_2024(), duration, step);
        assert!(matches!(result, Err(TimeError::InvalidRange { .. })));
    }

    #[test]
    fn test_get_out_of_bounds() {
        let grid = TimeGrid::from_days(jan_first_2024(), 1, 6).unwrap();
        assert_eq!(grid.len(), 4);
        assert!(grid.get(3).is_some());
        assert!(grid.get(4).is_none());
        assert_eq!(grid.step(), Duration::hours(6));
    }
}
