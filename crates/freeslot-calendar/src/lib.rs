//! Google Calendar access for freeslot.
//!
//! Lists the user's calendars and reads their busy intervals.

pub mod client;
pub mod error;
pub mod types;

pub use client::{CalendarClient, CALENDAR_API_BASE};
pub use error::CalendarError;
pub use types::{AccessRole, Calendar, FreeBusyRequest, FreeBusyResponse};
