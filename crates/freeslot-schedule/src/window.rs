//! The per-day window of interest and local-time resolution.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::ScheduleError;
use crate::interval::TimeInterval;

const TIME_FORMAT: &str = "%H:%M";

/// Wall-clock `[start, end)` applied to every day of a query, e.g. business hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl DayWindow {
    /// # Errors
    /// Returns [`ScheduleError::EmptyWindow`] unless `start < end`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, ScheduleError> {
        if start >= end {
            return Err(ScheduleError::EmptyWindow {
                start: start.format(TIME_FORMAT).to_string(),
                end: end.format(TIME_FORMAT).to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Parse `HH:MM` bounds.
    ///
    /// # Errors
    /// Returns [`ScheduleError::InvalidTime`] or [`ScheduleError::EmptyWindow`].
    pub fn parse(start: &str, end: &str) -> Result<Self, ScheduleError> {
        Self::new(parse_time(start)?, parse_time(end)?)
    }

    /// The window instantiated against one calendar date in `tz`.
    pub fn on(&self, date: NaiveDate, tz: &Tz) -> TimeInterval {
        TimeInterval::new(
            local_instant(date, self.start, tz),
            local_instant(date, self.end, tz),
        )
    }
}

impl Default for DayWindow {
    /// The whole day, `00:00`-`23:59`.
    fn default() -> Self {
        Self {
            start: NaiveTime::default(),
            end: NaiveTime::from_hms_opt(23, 59, 0).unwrap_or_default(),
        }
    }
}

/// # Errors
/// Returns [`ScheduleError::InvalidTime`] when `value` is not `HH:MM`.
pub fn parse_time(value: &str) -> Result<NaiveTime, ScheduleError> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
        .map_err(|_| ScheduleError::InvalidTime(value.to_string()))
}

/// # Errors
/// Returns [`ScheduleError::InvalidDate`] when `value` is not `YYYY-MM-DD`.
pub fn parse_date(value: &str) -> Result<NaiveDate, ScheduleError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ScheduleError::InvalidDate(value.to_string()))
}

/// # Errors
/// Returns [`ScheduleError::UnknownTimeZone`] for names outside the IANA database.
pub fn parse_time_zone(name: &str) -> Result<Tz, ScheduleError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ScheduleError::UnknownTimeZone(name.to_string()))
}

/// Longest forward transition searched when a wall time is skipped.
const MAX_GAP_MINUTES: i64 = 24 * 60;

/// The instant at which the wall clock in `tz` reads `date` `time`.
///
/// Ambiguous readings (clocks turned back) take the earlier instant. Readings
/// skipped by a forward transition resolve to the transition itself, so
/// `a <= b` on the wall clock always gives `local_instant(a) <= local_instant(b)`.
pub fn local_instant(date: NaiveDate, time: NaiveTime, tz: &Tz) -> DateTime<Utc> {
    let naive = date.and_time(time);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => end_of_gap(naive, tz),
    }
}

/// First instant after the forward transition that skipped `naive`.
fn end_of_gap(naive: NaiveDateTime, tz: &Tz) -> DateTime<Utc> {
    (1..=MAX_GAP_MINUTES)
        .map(|minutes| naive + Duration::minutes(minutes))
        .find_map(|candidate| tz.from_local_datetime(&candidate).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

/// Calendar date of `instant` as seen in `tz`.
pub fn local_date(instant: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}
