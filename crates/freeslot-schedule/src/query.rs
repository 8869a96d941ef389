//! Query context: validated user input shared by every stage of one fetch.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::day::{exclude_calendars, BusyMap, DayRow, DaySchedule};
use crate::error::ScheduleError;
use crate::gaps::DisplayMode;
use crate::window::{local_instant, parse_date, parse_time, parse_time_zone, DayWindow};

/// Raw user input for one query. Blank strings count as missing.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub time_zone: Option<String>,
    pub mode: DisplayMode,
    pub excluded: Vec<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl QueryRequest {
    /// Check the request and fill unset times and zone from the defaults.
    ///
    /// # Errors
    /// Any [`ScheduleError`]; missing dates are reported first.
    pub fn validate(
        &self,
        default_window: &DayWindow,
        default_zone: Tz,
    ) -> Result<QueryContext, ScheduleError> {
        let start = present(&self.start_date).ok_or(ScheduleError::MissingStartDate)?;
        let end = present(&self.end_date).ok_or(ScheduleError::MissingEndDate)?;
        let start_date = parse_date(start)?;
        let end_date = parse_date(end)?;
        if end_date < start_date {
            return Err(ScheduleError::EndBeforeStart {
                start: start_date,
                end: end_date,
            });
        }

        let window_start = match present(&self.start_time) {
            Some(t) => parse_time(t)?,
            None => default_window.start,
        };
        let window_end = match present(&self.end_time) {
            Some(t) => parse_time(t)?,
            None => default_window.end,
        };
        let window = DayWindow::new(window_start, window_end)?;

        let time_zone = match present(&self.time_zone) {
            Some(name) => parse_time_zone(name)?,
            None => default_zone,
        };

        Ok(QueryContext {
            start_date,
            end_date,
            window,
            time_zone,
            mode: self.mode,
            excluded: self.excluded.iter().cloned().collect(),
        })
    }
}

/// Everything a query needs after validation. Immutable for the life of the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryContext {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub window: DayWindow,
    pub time_zone: Tz,
    pub mode: DisplayMode,
    pub excluded: BTreeSet<String>,
}

impl QueryContext {
    /// Lower bound sent to the provider: the first day's window start.
    pub fn time_min(&self) -> DateTime<Utc> {
        local_instant(self.start_date, self.window.start, &self.time_zone)
    }

    /// Upper bound sent to the provider: the last day's window end.
    pub fn time_max(&self) -> DateTime<Utc> {
        local_instant(self.end_date, self.window.end, &self.time_zone)
    }

    pub fn is_excluded(&self, calendar_id: &str) -> bool {
        self.excluded.contains(calendar_id)
    }

    /// Every date from start to end, inclusive.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end_date;
        self.start_date.iter_days().take_while(move |d| *d <= end)
    }

    /// One row per date, holding free gaps or busy blocks according to `mode`.
    pub fn day_rows(&self, busy: &BusyMap) -> Vec<DayRow> {
        let busy = exclude_calendars(busy, &self.excluded);
        self.dates()
            .map(|date| {
                let schedule = DaySchedule::collect(date, &busy, &self.time_zone);
                tracing::debug!(%date, busy = schedule.busy.len(), "Computed day schedule");
                DayRow {
                    date,
                    intervals: schedule.intervals(&self.window, self.mode, &self.time_zone),
                }
            })
            .collect()
    }
}
