//! Calendar API types and data structures.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use freeslot_schedule::{BusyMap, TimeInterval};
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;

/// Calendar metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calendar {
    pub id: String,
    pub display_name: String,
    pub time_zone: Option<String>,
    pub is_primary: bool,
    pub access_role: AccessRole,
}

/// Calendar access role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AccessRole {
    Owner,
    Writer,
    #[default]
    Reader,
    FreeBusyReader,
}

impl fmt::Display for AccessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Writer => write!(f, "writer"),
            Self::Reader => write!(f, "reader"),
            Self::FreeBusyReader => write!(f, "free/busy only"),
        }
    }
}

// API Response Types

/// API response for calendar list.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarListResponse {
    #[serde(default)]
    pub items: Vec<ApiCalendar>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCalendar {
    pub id: String,
    pub summary: Option<String>,
    pub summary_override: Option<String>,
    pub time_zone: Option<String>,
    #[serde(default)]
    pub primary: bool,
    pub access_role: Option<String>,
}

impl From<ApiCalendar> for Calendar {
    fn from(api: ApiCalendar) -> Self {
        let access_role = match api.access_role.as_deref() {
            Some("owner") => AccessRole::Owner,
            Some("writer") => AccessRole::Writer,
            Some("reader") => AccessRole::Reader,
            Some("freeBusyReader") => AccessRole::FreeBusyReader,
            _ => AccessRole::Reader,
        };

        let display_name = api
            .summary_override
            .or(api.summary)
            .unwrap_or_else(|| api.id.clone());

        Self {
            id: api.id,
            display_name,
            time_zone: api.time_zone,
            is_primary: api.primary,
            access_role,
        }
    }
}

/// Body of a `POST /freeBusy` request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeBusyRequest {
    pub time_min: String,
    pub time_max: String,
    pub items: Vec<FreeBusyRequestItem>,
}

#[derive(Debug, Serialize)]
pub struct FreeBusyRequestItem {
    pub id: String,
}

impl FreeBusyRequest {
    pub fn new(time_min: DateTime<Utc>, time_max: DateTime<Utc>, calendar_ids: &[String]) -> Self {
        Self {
            time_min: time_min.to_rfc3339(),
            time_max: time_max.to_rfc3339(),
            items: calendar_ids
                .iter()
                .map(|id| FreeBusyRequestItem { id: id.clone() })
                .collect(),
        }
    }
}

/// API response for a free/busy query.
#[derive(Debug, Deserialize)]
pub struct FreeBusyResponse {
    #[serde(default)]
    pub calendars: BTreeMap<String, ApiFreeBusyCalendar>,
}

#[derive(Debug, Deserialize)]
pub struct ApiFreeBusyCalendar {
    #[serde(default)]
    pub busy: Vec<ApiTimePeriod>,
    #[serde(default)]
    pub errors: Vec<ApiFreeBusyError>,
}

#[derive(Debug, Deserialize)]
pub struct ApiTimePeriod {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiFreeBusyError {
    pub domain: Option<String>,
    pub reason: String,
}

impl FreeBusyResponse {
    /// Convert to a [`BusyMap`], failing on any calendar the provider could not read.
    pub fn into_busy_map(self) -> Result<BusyMap, CalendarError> {
        let mut busy_map = BusyMap::new();

        for (id, calendar) in self.calendars {
            if let Some(error) = calendar.errors.first() {
                return Err(CalendarError::CalendarUnavailable {
                    id,
                    reason: error.reason.clone(),
                });
            }

            let intervals = calendar
                .busy
                .iter()
                .map(parse_period)
                .collect::<Result<Vec<_>, _>>()?;
            busy_map.insert(id, intervals);
        }

        Ok(busy_map)
    }
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>, CalendarError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| CalendarError::InvalidInterval(value.to_string()))
}

fn parse_period(period: &ApiTimePeriod) -> Result<TimeInterval, CalendarError> {
    Ok(TimeInterval::new(
        parse_instant(&period.start)?,
        parse_instant(&period.end)?,
    ))
}
