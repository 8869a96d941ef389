//! Gap calculation: free intervals inside a day window.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::interval::{drop_empty, normalize, TimeInterval};

/// Which interval sequence a day row displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Gaps between busy blocks within the window.
    #[default]
    Free,
    /// The day's busy intervals as reported, sorted by start.
    Busy,
}

impl FromStr for DisplayMode {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "busy" => Ok(Self::Busy),
            _ => Err(ScheduleError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Busy => write!(f, "busy"),
        }
    }
}

/// Free intervals of `window` not covered by any of `day_schedule`.
///
/// Busy intervals may arrive unsorted, overlapping, malformed, or reaching
/// outside the window; each is clipped to the window before the sweep, so a
/// block that starts before the window only pushes the first free gap later
/// and a block running past the window end suppresses the trailing gap.
///
/// The result is sorted, non-overlapping, and never contains an empty
/// interval. It is empty when the window is fully busy.
pub fn free_intervals(day_schedule: &[TimeInterval], window: &TimeInterval) -> Vec<TimeInterval> {
    if window.is_empty() {
        return Vec::new();
    }

    let busy: Vec<TimeInterval> = normalize(day_schedule)
        .iter()
        .filter_map(|block| block.clip_to(window))
        .collect();

    if busy.is_empty() {
        return vec![*window];
    }

    let mut free = Vec::new();
    let mut previous_end = window.start;

    for block in &busy {
        if block.start > previous_end {
            free.push(TimeInterval::new(previous_end, block.start.min(window.end)));
        }
        if block.end > previous_end {
            previous_end = block.end;
        }
    }

    if previous_end < window.end {
        free.push(TimeInterval::new(previous_end, window.end));
    }

    free
}

/// The day's busy intervals sorted by start, without merging.
///
/// Overlapping blocks from different calendars stay separate rows. Empty and
/// malformed intervals are dropped.
pub fn busy_blocks(day_schedule: &[TimeInterval]) -> Vec<TimeInterval> {
    let mut blocks = drop_empty(day_schedule);
    blocks.sort_by_key(|interval| interval.start);
    blocks
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::interval::test_support::span;

    fn window() -> TimeInterval {
        span((8, 0), (18, 0))
    }

    /// Free and busy pieces inside the window, sorted, with no gaps between them.
    fn assert_partitions(busy: &[TimeInterval], window: &TimeInterval) {
        let free = free_intervals(busy, window);
        let mut pieces: Vec<TimeInterval> = normalize(busy)
            .iter()
            .filter_map(|b| b.clip_to(window))
            .chain(free.iter().copied())
            .collect();
        pieces.sort_by_key(|p| p.start);

        let mut cursor = window.start;
        for piece in &pieces {
            assert!(!piece.is_empty(), "empty piece {:?}", piece);
            assert_eq!(piece.start, cursor, "gap or overlap at {}", cursor);
            cursor = piece.end;
        }
        assert_eq!(cursor, window.end);
    }

    #[test]
    fn test_no_busy_means_whole_window_free() {
        assert_eq!(free_intervals(&[], &window()), vec![window()]);
    }

    #[test]
    fn test_single_meeting() {
        let busy = vec![span((9, 0), (10, 0))];
        assert_eq!(
            free_intervals(&busy, &window()),
            vec![span((8, 0), (9, 0)), span((10, 0), (18, 0))]
        );
    }

    #[test]
    fn test_busy_starting_before_window() {
        let busy = vec![span((7, 0), (9, 0)), span((9, 30), (11, 0))];
        assert_eq!(
            free_intervals(&busy, &window()),
            vec![span((9, 0), (9, 30)), span((11, 0), (18, 0))]
        );
    }

    #[test]
    fn test_busy_running_past_window_end() {
        let busy = vec![span((17, 0), (19, 30))];
        assert_eq!(
            free_intervals(&busy, &window()),
            vec![span((8, 0), (17, 0))]
        );
    }

    #[test]
    fn test_busy_covering_whole_window() {
        assert!(free_intervals(&[span((8, 0), (18, 0))], &window()).is_empty());
        assert!(free_intervals(&[span((6, 0), (20, 0))], &window()).is_empty());
    }

    #[test]
    fn test_busy_entirely_outside_window() {
        let busy = vec![span((6, 0), (7, 0)), span((19, 0), (20, 0))];
        assert_eq!(free_intervals(&busy, &window()), vec![window()]);
    }

    #[test]
    fn test_busy_starting_exactly_at_window_end() {
        let busy = vec![span((9, 0), (10, 0)), span((18, 0), (19, 0))];
        assert_eq!(
            free_intervals(&busy, &window()),
            vec![span((8, 0), (9, 0)), span((10, 0), (18, 0))]
        );
    }

    #[test]
    fn test_overlapping_calendars_coalesce() {
        let busy = vec![
            span((13, 0), (15, 0)),
            span((9, 0), (11, 0)),
            span((10, 0), (12, 0)),
            span((14, 0), (14, 30)),
        ];
        assert_eq!(
            free_intervals(&busy, &window()),
            vec![
                span((8, 0), (9, 0)),
                span((12, 0), (13, 0)),
                span((15, 0), (18, 0)),
            ]
        );
    }

    #[test]
    fn test_back_to_back_meetings_leave_no_empty_gap() {
        let busy = vec![span((9, 0), (10, 0)), span((10, 0), (11, 0))];
        assert_eq!(
            free_intervals(&busy, &window()),
            vec![span((8, 0), (9, 0)), span((11, 0), (18, 0))]
        );
    }

    #[test]
    fn test_malformed_interval_is_ignored() {
        let busy = vec![span((12, 0), (10, 0))];
        assert_eq!(free_intervals(&busy, &window()), vec![window()]);

        let busy = vec![span((12, 0), (10, 0)), span((9, 0), (9, 30))];
        assert_eq!(
            free_intervals(&busy, &window()),
            vec![span((8, 0), (9, 0)), span((9, 30), (18, 0))]
        );
    }

    #[test]
    fn test_empty_window_yields_nothing() {
        let inverted = span((18, 0), (8, 0));
        assert!(free_intervals(&[], &inverted).is_empty());
    }

    #[test]
    fn test_free_intervals_order_independent() {
        let busy = vec![
            span((7, 30), (8, 15)),
            span((9, 0), (10, 0)),
            span((9, 45), (10, 30)),
            span((12, 0), (13, 0)),
            span((17, 30), (18, 30)),
        ];
        let expected = free_intervals(&busy, &window());

        let mut reversed = busy.clone();
        reversed.reverse();
        assert_eq!(free_intervals(&reversed, &window()), expected);

        let rotated: Vec<_> = busy[2..].iter().chain(&busy[..2]).copied().collect();
        assert_eq!(free_intervals(&rotated, &window()), expected);

        let swapped = vec![busy[3], busy[0], busy[4], busy[2], busy[1]];
        assert_eq!(free_intervals(&swapped, &window()), expected);
    }

    #[test]
    fn test_free_and_busy_partition_window() {
        assert_partitions(&[], &window());
        assert_partitions(&[span((9, 0), (10, 0))], &window());
        assert_partitions(&[span((7, 0), (9, 0)), span((9, 30), (11, 0))], &window());
        assert_partitions(&[span((17, 0), (19, 30))], &window());
        assert_partitions(
            &[
                span((10, 0), (12, 0)),
                span((11, 0), (11, 30)),
                span((12, 0), (13, 0)),
                span((15, 0), (14, 0)),
                span((16, 0), (16, 45)),
            ],
            &window(),
        );
    }

    #[test]
    fn test_busy_blocks_sorted_not_merged() {
        let busy = vec![
            span((10, 0), (11, 0)),
            span((9, 0), (10, 30)),
            span((9, 0), (10, 30)),
            span((12, 0), (11, 0)),
        ];
        assert_eq!(
            busy_blocks(&busy),
            vec![
                span((9, 0), (10, 30)),
                span((9, 0), (10, 30)),
                span((10, 0), (11, 0)),
            ]
        );
    }

    #[test]
    fn test_display_mode_from_str() {
        assert_eq!("free".parse::<DisplayMode>().unwrap(), DisplayMode::Free);
        assert_eq!(" Busy ".parse::<DisplayMode>().unwrap(), DisplayMode::Busy);
        assert!(matches!(
            "both".parse::<DisplayMode>(),
            Err(ScheduleError::UnknownMode(_))
        ));
    }
}
