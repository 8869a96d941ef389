//! Google Calendar API client.

use chrono::{DateTime, Utc};
use freeslot_schedule::BusyMap;
use tracing::instrument;

use crate::error::CalendarError;
use crate::types::*;

pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Calendars per freeBusy request accepted by the API.
const FREE_BUSY_MAX_ITEMS: usize = 50;

pub struct CalendarClient {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl CalendarClient {
    pub fn new(access_token: &str) -> Self {
        Self::with_base_url(access_token, CALENDAR_API_BASE)
    }

    pub fn with_base_url(access_token: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token: access_token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// List every calendar on the user's calendar list, following pagination.
    #[instrument(skip(self), level = "info")]
    pub async fn list_calendars(&self) -> Result<Vec<Calendar>, CalendarError> {
        let mut calendars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!("{}/users/me/calendarList", self.base_url);
            if let Some(pt) = &page_token {
                url.push_str(&format!("?pageToken={}", urlencoding::encode(pt)));
            }

            let response = self
                .client
                .get(&url)
                .header("Authorization", self.auth_header())
                .send()
                .await?;

            let resp: CalendarListResponse = self.handle_response(response).await?;
            calendars.extend(resp.items.into_iter().map(Calendar::from));

            match resp.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        tracing::debug!("Listed {} calendars", calendars.len());
        Ok(calendars)
    }

    /// Busy intervals per calendar between `time_min` and `time_max`.
    ///
    /// An empty `calendar_ids` makes no request. Larger id lists are split
    /// across several requests and the results merged.
    #[instrument(skip(self, calendar_ids), fields(calendars = calendar_ids.len()), level = "info")]
    pub async fn query_free_busy(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        calendar_ids: &[String],
    ) -> Result<BusyMap, CalendarError> {
        let mut busy_map = BusyMap::new();
        let url = format!("{}/freeBusy", self.base_url);

        for chunk in calendar_ids.chunks(FREE_BUSY_MAX_ITEMS) {
            let body = FreeBusyRequest::new(time_min, time_max, chunk);

            let response = self
                .client
                .post(&url)
                .header("Authorization", self.auth_header())
                .json(&body)
                .send()
                .await?;

            let resp: FreeBusyResponse = self.handle_response(response).await?;
            busy_map.extend(resp.into_busy_map()?);
        }

        Ok(busy_map)
    }

    /// Helper to handle API responses and errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, CalendarError> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| CalendarError::ApiError {
                status: status.as_u16(),
                message: format!("JSON parse error: {}", e),
            })
        } else if status.as_u16() == 401 {
            Err(CalendarError::TokenExpired)
        } else if status.as_u16() == 403 {
            Err(CalendarError::AuthRequired)
        } else if status.as_u16() == 404 {
            let text = response.text().await.unwrap_or_default();
            Err(CalendarError::CalendarNotFound(text))
        } else if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            Err(CalendarError::RateLimited(retry_after))
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(CalendarError::ApiError {
                status: status.as_u16(),
                message: text,
            })
        }
    }
}
