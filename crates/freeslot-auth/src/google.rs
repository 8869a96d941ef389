//! Google OAuth2 provider for Calendar read access.

use anyhow::{Context, Result};
use freeslot_core::GoogleConfig;
use serde::{Deserialize, Serialize};

use crate::oauth::{OAuth2Config, OAuth2Provider};
use crate::storage::TokenSet;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

// Covers calendarList and freeBusy
const CALENDAR_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

pub const GOOGLE_SERVICE_ID: &str = "google";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleTokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: u64,
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
}

impl GoogleTokenResponse {
    /// Token set after a refresh; Google omits the refresh token when it is unchanged.
    pub fn into_token_set(self, previous_refresh_token: Option<String>) -> TokenSet {
        TokenSet {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(previous_refresh_token),
            expires_at: chrono::Utc::now().timestamp() + self.expires_in as i64,
            scopes: self.scope.split_whitespace().map(str::to_string).collect(),
        }
    }
}

pub struct GoogleOAuth2Provider {
    config: OAuth2Config,
}

impl GoogleOAuth2Provider {
    pub fn new(client_id: String, client_secret: String, redirect_port: u16) -> Self {
        Self {
            config: OAuth2Config {
                client_id,
                client_secret,
                auth_url: GOOGLE_AUTH_URL.to_string(),
                token_url: GOOGLE_TOKEN_URL.to_string(),
                redirect_port,
                scopes: vec![CALENDAR_READONLY_SCOPE.to_string()],
                // Ask for a refresh token on every consent
                extra_params: vec![
                    ("access_type".to_string(), "offline".to_string()),
                    ("prompt".to_string(), "consent".to_string()),
                ],
            },
        }
    }

    pub fn from_config(google: &GoogleConfig) -> Self {
        Self::new(
            google.client_id.clone(),
            google.client_secret.clone(),
            google.redirect_port,
        )
    }

    /// Point token requests somewhere else (tests)
    pub fn with_token_url(mut self, token_url: &str) -> Self {
        self.config.token_url = token_url.to_string();
        self
    }

    /// False for empty or placeholder client credentials
    pub fn is_configured(&self) -> bool {
        GoogleConfig::credentials_configured(&self.config.client_id, &self.config.client_secret)
    }

    /// Refresh an expired access token.
    #[tracing::instrument(skip(self, refresh_token), level = "info")]
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<GoogleTokenResponse> {
        let client = reqwest::Client::new();

        let response = client
            .post(&self.config.token_url)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .context("Failed to send refresh request")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Token refresh failed: {}", error_text);
        }

        response
            .json::<GoogleTokenResponse>()
            .await
            .context("Failed to parse refresh response")
    }
}

impl OAuth2Provider for GoogleOAuth2Provider {
    fn service_id(&self) -> &str {
        GOOGLE_SERVICE_ID
    }

    fn config(&self) -> &OAuth2Config {
        &self.config
    }
}
