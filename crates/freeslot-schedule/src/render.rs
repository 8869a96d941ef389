//! Day row formatting.
//!
//! A row is a date heading followed by one entry per interval, e.g.
//! `Monday, 2/5<ul><li>8:00 AM - 9:00 AM</li></ul>` in HTML.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::day::{DayRow, DaySchedule};
use crate::error::ScheduleError;
use crate::gaps::DisplayMode;
use crate::interval::TimeInterval;
use crate::window::DayWindow;

/// Output markup for rendered rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStyle {
    /// HTML fragment suitable for pasting into mail or documents.
    #[default]
    Html,
    /// Plain text, one entry per line.
    Text,
}

impl FromStr for RowStyle {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "text" | "txt" => Ok(Self::Text),
            _ => Err(ScheduleError::UnknownStyle(s.to_string())),
        }
    }
}

impl fmt::Display for RowStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Html => write!(f, "html"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// `Monday, 2/5`
pub fn format_date_heading(date: NaiveDate) -> String {
    date.format("%A, %-m/%-d").to_string()
}

/// 12-hour wall-clock time in `tz`, e.g. `9:05 AM`.
pub fn format_time(instant: DateTime<Utc>, tz: &Tz) -> String {
    instant.with_timezone(tz).format("%-I:%M %p").to_string()
}

fn format_entry(interval: &TimeInterval, tz: &Tz) -> String {
    format!(
        "{} - {}",
        format_time(interval.start, tz),
        format_time(interval.end, tz)
    )
}

/// Render one day: heading plus one entry per interval.
pub fn format_day_row(
    date: NaiveDate,
    intervals: &[TimeInterval],
    tz: &Tz,
    style: RowStyle,
) -> String {
    let heading = format_date_heading(date);
    match style {
        RowStyle::Html => {
            let items: String = intervals
                .iter()
                .map(|i| format!("<li>{}</li>", format_entry(i, tz)))
                .collect();
            format!("{}<ul>{}</ul>", heading, items)
        }
        RowStyle::Text => {
            let mut lines = vec![heading];
            lines.extend(intervals.iter().map(|i| format!("  - {}", format_entry(i, tz))));
            lines.join("\n")
        }
    }
}

/// Render a day's free gaps or busy blocks, chosen by `mode`.
pub fn render_day(
    schedule: &DaySchedule,
    window: &DayWindow,
    mode: DisplayMode,
    tz: &Tz,
    style: RowStyle,
) -> String {
    let intervals = schedule.intervals(window, mode, tz);
    format_day_row(schedule.date, &intervals, tz, style)
}

/// Join rendered rows into the final output.
pub fn render_rows(rows: &[String], style: RowStyle) -> String {
    match style {
        RowStyle::Html => rows.concat(),
        RowStyle::Text => rows.join("\n\n"),
    }
}

/// Render computed rows in date order and join them.
pub fn render_day_rows(rows: &[DayRow], tz: &Tz, style: RowStyle) -> String {
    let rendered: Vec<String> = rows
        .iter()
        .map(|row| format_day_row(row.date, &row.intervals, tz, style))
        .collect();
    render_rows(&rendered, style)
}
