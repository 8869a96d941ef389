//! Per-day grouping of a provider's busy data.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::gaps::{busy_blocks, free_intervals, DisplayMode};
use crate::interval::TimeInterval;
use crate::window::{local_date, DayWindow};

/// Calendar id to that calendar's busy intervals, as returned by the provider.
pub type BusyMap = BTreeMap<String, Vec<TimeInterval>>;

/// Copy of `busy` without the calendars listed in `excluded`.
pub fn exclude_calendars(busy: &BusyMap, excluded: &BTreeSet<String>) -> BusyMap {
    busy.iter()
        .filter(|(id, _)| !excluded.contains(*id))
        .map(|(id, intervals)| (id.clone(), intervals.clone()))
        .collect()
}

/// All busy intervals, across calendars, that start on one local date.
///
/// An interval spanning midnight belongs only to the day it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub busy: Vec<TimeInterval>,
}

impl DaySchedule {
    pub fn collect(date: NaiveDate, busy: &BusyMap, tz: &Tz) -> Self {
        let busy = busy
            .values()
            .flatten()
            .filter(|interval| local_date(interval.start, tz) == date)
            .copied()
            .collect();
        Self { date, busy }
    }

    /// Free gaps or sorted busy blocks, depending on `mode`.
    pub fn intervals(&self, window: &DayWindow, mode: DisplayMode, tz: &Tz) -> Vec<TimeInterval> {
        match mode {
            DisplayMode::Free => free_intervals(&self.busy, &window.on(self.date, tz)),
            DisplayMode::Busy => busy_blocks(&self.busy),
        }
    }
}

/// One rendered-ready line of output: a date and the intervals to list under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRow {
    pub date: NaiveDate,
    pub intervals: Vec<TimeInterval>,
}
