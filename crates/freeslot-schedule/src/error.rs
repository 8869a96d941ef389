//! Input validation errors raised before any network call is made.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Start date is missing")]
    MissingStartDate,

    #[error("End date is missing")]
    MissingEndDate,

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("Day window {start}-{end} is empty")]
    EmptyWindow { start: String, end: String },

    #[error("End date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("Unknown time zone: {0}")]
    UnknownTimeZone(String),

    #[error("Unknown display mode '{0}', expected 'free' or 'busy'")]
    UnknownMode(String),

    #[error("Unknown output format '{0}', expected 'html' or 'text'")]
    UnknownStyle(String),
}

impl ScheduleError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingStartDate | Self::MissingEndDate => {
                "Please select a start and end date."
            }
            Self::InvalidDate(_) => "Dates must look like 2024-02-01.",
            Self::InvalidTime(_) => "Times must look like 08:30.",
            Self::EmptyWindow { .. } => "The day's start time must be before its end time.",
            Self::EndBeforeStart { .. } => "The end date must not be before the start date.",
            Self::UnknownTimeZone(_) => "Unknown time zone. Use a name like Europe/Berlin.",
            Self::UnknownMode(_) => "Display mode must be 'free' or 'busy'.",
            Self::UnknownStyle(_) => "Output format must be 'html' or 'text'.",
        }
    }
}
