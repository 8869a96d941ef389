//! Calendar-specific error types.

use freeslot_core::{AppError, AuthError, ProviderError, ReqwestErrorExt};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Authentication required")]
    AuthRequired,

    #[error("Token expired")]
    TokenExpired,

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    #[error("Calendar not found: {0}")]
    CalendarNotFound(String),

    #[error("Calendar {id} unavailable: {reason}")]
    CalendarUnavailable { id: String, reason: String },

    #[error("Invalid busy interval: {0}")]
    InvalidInterval(String),

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

impl CalendarError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthRequired => "Please sign in to your Google account".to_string(),
            Self::TokenExpired => "Your session has expired. Please sign in again.".to_string(),
            Self::RateLimited(secs) => format!("Too many requests. Please wait {} seconds.", secs),
            Self::CalendarNotFound(_) => "Calendar not found".to_string(),
            Self::CalendarUnavailable { id, .. } => {
                format!("Busy times for calendar {} are unavailable", id)
            }
            Self::InvalidInterval(_) => "Google Calendar returned an unreadable time".to_string(),
            Self::ApiError { status, .. } => format!("Calendar error (HTTP {})", status),
            Self::NetworkError(_) => "Network error. Check your connection.".to_string(),
        }
    }

    /// Whether a new token might fix this error.
    pub fn should_refresh_token(&self) -> bool {
        matches!(self, Self::TokenExpired | Self::AuthRequired)
    }

    /// Whether the same request could succeed later. Queries never retry;
    /// this only shapes the message shown.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::NetworkError(_))
    }
}

impl From<CalendarError> for AppError {
    fn from(err: CalendarError) -> Self {
        match err {
            CalendarError::TokenExpired => AppError::Auth(AuthError::TokenExpired),
            CalendarError::AuthRequired => AppError::Auth(AuthError::TokenNotFound(
                "calendar access was refused for this token".into(),
            )),
            CalendarError::RateLimited(secs) => AppError::Provider(ProviderError::ServerError {
                status: 429,
                message: format!("retry after {} seconds", secs),
            }),
            CalendarError::CalendarNotFound(id) => AppError::Provider(ProviderError::ServerError {
                status: 404,
                message: id,
            }),
            CalendarError::ApiError { status, message } => {
                AppError::Provider(ProviderError::ServerError { status, message })
            }
            err @ (CalendarError::CalendarUnavailable { .. }
            | CalendarError::InvalidInterval(_)) => {
                AppError::Provider(ProviderError::InvalidResponse(err.to_string()))
            }
            CalendarError::NetworkError(e) => AppError::Provider(e.into_provider_error()),
        }
    }
}
