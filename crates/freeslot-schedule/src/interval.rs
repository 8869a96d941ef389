//! Time intervals and the interval normalizer.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A `[start, end)` range of instants.
///
/// Provider data does not guarantee `start <= end`; see [`TimeInterval::is_empty`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// `end < start`.
    pub fn is_malformed(&self) -> bool {
        self.end < self.start
    }

    /// Covers no time at all. Malformed intervals count as zero-length at `start`.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn duration(&self) -> Duration {
        if self.is_empty() {
            Duration::zero()
        } else {
            self.end - self.start
        }
    }

    /// Intersection with `bounds`, or `None` when it would be empty.
    pub fn clip_to(&self, bounds: &TimeInterval) -> Option<TimeInterval> {
        let clipped = TimeInterval::new(self.start.max(bounds.start), self.end.min(bounds.end));
        (!clipped.is_empty()).then_some(clipped)
    }

    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Keeps only intervals that cover time, logging the malformed ones.
pub(crate) fn drop_empty(intervals: &[TimeInterval]) -> Vec<TimeInterval> {
    intervals
        .iter()
        .filter(|interval| {
            if interval.is_malformed() {
                tracing::debug!(
                    start = %interval.start,
                    end = %interval.end,
                    "Dropping busy interval that ends before it starts"
                );
            }
            !interval.is_empty()
        })
        .copied()
        .collect()
}

/// Sorts busy intervals by start and coalesces overlapping or touching ones.
///
/// The result is strictly increasing and non-overlapping: each block ends
/// before the next one starts. Empty and malformed intervals are dropped.
pub fn normalize(intervals: &[TimeInterval]) -> Vec<TimeInterval> {
    let mut sorted = drop_empty(intervals);
    // Stable: equal starts keep their input order.
    sorted.sort_by_key(|interval| interval.start);

    let mut merged: Vec<TimeInterval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        match merged.last_mut() {
            Some(last) if interval.start <= last.end => {
                if interval.end > last.end {
                    last.end = interval.end;
                }
            }
            _ => merged.push(interval),
        }
    }
    merged
}

#[cfg(test)]
pub(crate) mod test_support {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::TimeInterval;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    /// Instant on 2024-02-05 (a Monday) at `h:m` UTC.
    pub fn at(h: u32, m: u32) -> DateTime<Utc> {
        on(5, h, m)
    }

    /// Instant on 2024-02-`day` at `h:m` UTC.
    pub fn on(day: u32, h: u32, m: u32) -> DateTime<Utc> {
        let naive = NaiveDate::from_ymd_opt(2024, 2, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap();
        Utc.from_utc_datetime(&naive)
    }

    pub fn span(start: (u32, u32), end: (u32, u32)) -> TimeInterval {
        TimeInterval::new(at(start.0, start.1), at(end.0, end.1))
    }
}
