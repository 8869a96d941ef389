//! Query orchestration for the `freeslot` binary.
//!
//! Validates input, fetches busy data and renders day rows. Any failure
//! aborts the whole query; nothing partial is returned.

pub mod query;

pub use query::{build_context, calendar_line, fetch_day_rows, list_calendars, run_query};
