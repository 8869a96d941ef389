//! Centralized error types for Freeslot.
//!
//! Every stage of a query fails into [`AppError`]; there are no retries, so
//! the first error aborts the whole query and nothing is rendered.
//! Use `user_message()` for text shown to the user.

use freeslot_schedule::ScheduleError;
use thiserror::Error;

/// Top-level application error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Calendar provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    Input(#[from] ScheduleError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for the terminal.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Auth(e) => e.user_message(),
            AppError::Provider(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Input(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Calendar provider failures: transport errors and non-2xx responses.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ProviderError::ConnectionFailed(_) => {
                "Unable to reach Google Calendar. Check your internet connection."
            }
            ProviderError::Timeout => "Google Calendar did not answer in time. Please try again.",
            ProviderError::ServerError { status, .. } if *status >= 500 => {
                "Google Calendar is experiencing issues. Please try again later."
            }
            ProviderError::ServerError { status: 429, .. } => {
                "Too many requests to Google Calendar. Please wait and try again."
            }
            ProviderError::ServerError { .. } => "The calendar request failed.",
            ProviderError::InvalidResponse(_) => {
                "Google Calendar sent an unexpected response. Please try again."
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
        }
    }
}

/// Token acquisition errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Token not found for service: {0}")]
    TokenNotFound(String),

    #[error("Consent was denied: {0}")]
    ConsentDenied(String),

    #[error("Interactive consent unavailable: {0}")]
    ConsentUnavailable(String),

    #[error("OAuth flow failed: {0}")]
    OAuthFailed(String),

    #[error("Token storage error: {0}")]
    StorageError(String),

    #[error("Port {0} already in use for OAuth callback")]
    PortInUse(u16),
}

impl AuthError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::TokenExpired => "Your session has expired. Run `freeslot login`.",
            AuthError::TokenNotFound(_) => "Not signed in. Run `freeslot login`.",
            AuthError::ConsentDenied(_) => "Access to your calendars was denied.",
            AuthError::ConsentUnavailable(_) => {
                "Sign-in is not available. Check the [google] settings and run `freeslot login`."
            }
            AuthError::OAuthFailed(_) => "Sign-in failed. Please try again.",
            AuthError::StorageError(_) => "Failed to read or save credentials.",
            AuthError::PortInUse(_) => "Sign-in port is busy. Close other apps and try again.",
        }
    }
}

/// Extension trait for converting reqwest errors to provider errors.
pub trait ReqwestErrorExt {
    fn into_provider_error(self) -> ProviderError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_provider_error(self) -> ProviderError {
        if self.is_timeout() {
            ProviderError::Timeout
        } else if self.is_decode() {
            ProviderError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            ProviderError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            ProviderError::ConnectionFailed(self.to_string())
        }
    }
}
