//! Free/busy computation for Freeslot.
//!
//! Pure, synchronous core: busy intervals in, free intervals (or sorted busy
//! blocks) out, one calendar day at a time. Fetching and authentication live
//! in the other crates.

pub mod day;
pub mod error;
pub mod gaps;
pub mod interval;
pub mod query;
pub mod render;
pub mod window;

pub use day::{exclude_calendars, BusyMap, DayRow, DaySchedule};
pub use error::ScheduleError;
pub use gaps::{busy_blocks, free_intervals, DisplayMode};
pub use interval::{normalize, TimeInterval};
pub use query::{QueryContext, QueryRequest};
pub use render::{format_day_row, render_day, render_day_rows, render_rows, RowStyle};
pub use window::{local_instant, parse_time_zone, DayWindow};
