//! Access token acquisition for calendar requests.

use freeslot_core::{AuthError, Config};

use crate::google::{GoogleOAuth2Provider, GOOGLE_SERVICE_ID};
use crate::oauth::OAuth2Provider;
use crate::storage::{TokenSet, TokenStore};

/// Source of bearer tokens for the calendar API.
pub trait TokenProvider: Send + Sync {
    /// A usable access token, or the reason none can be had.
    async fn get_token(&self) -> Result<String, AuthError>;
}

/// Stored Google token, refreshed when close to expiry, with interactive
/// consent as the last resort.
pub struct GoogleTokenProvider {
    oauth: GoogleOAuth2Provider,
    store: TokenStore,
    interactive: bool,
}

impl GoogleTokenProvider {
    pub fn new(oauth: GoogleOAuth2Provider, store: TokenStore, interactive: bool) -> Self {
        Self {
            oauth,
            store,
            interactive,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            GoogleOAuth2Provider::from_config(&config.google),
            TokenStore::new(config.tokens_dir()),
            config.google.interactive,
        )
    }

    /// Run consent now regardless of any stored token.
    ///
    /// # Errors
    /// [`AuthError::ConsentUnavailable`] without client credentials, otherwise
    /// whatever the consent flow reports.
    pub async fn login(&self) -> Result<TokenSet, AuthError> {
        if !self.oauth.is_configured() {
            return Err(AuthError::ConsentUnavailable(
                "Google OAuth client id/secret are not configured".into(),
            ));
        }
        let token_set = self.oauth.authenticate().await?;
        self.save(&token_set)?;
        Ok(token_set)
    }

    /// Forget the stored token.
    ///
    /// # Errors
    /// [`AuthError::StorageError`] when the token file cannot be removed.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.store
            .delete(GOOGLE_SERVICE_ID)
            .map_err(|e| AuthError::StorageError(format!("{:#}", e)))
    }

    fn save(&self, token_set: &TokenSet) -> Result<(), AuthError> {
        self.store
            .store(GOOGLE_SERVICE_ID, token_set)
            .map_err(|e| AuthError::StorageError(format!("{:#}", e)))
    }

    async fn refresh(&self, stored: &TokenSet) -> Option<String> {
        let refresh_token = stored.refresh_token.as_deref()?;
        match self.oauth.refresh_token(refresh_token).await {
            Ok(response) => {
                let token_set = response.into_token_set(stored.refresh_token.clone());
                if let Err(e) = self.save(&token_set) {
                    tracing::warn!("Refreshed token could not be saved: {}", e);
                }
                Some(token_set.access_token)
            }
            Err(e) => {
                tracing::warn!("Token refresh failed: {:#}", e);
                None
            }
        }
    }
}

impl TokenProvider for GoogleTokenProvider {
    async fn get_token(&self) -> Result<String, AuthError> {
        let stored = self
            .store
            .retrieve(GOOGLE_SERVICE_ID)
            .map_err(|e| AuthError::StorageError(format!("{:#}", e)))?;

        if let Some(token_set) = stored {
            if !token_set.needs_refresh() {
                return Ok(token_set.access_token);
            }
            if let Some(access_token) = self.refresh(&token_set).await {
                return Ok(access_token);
            }
            if !token_set.is_expired() {
                return Ok(token_set.access_token);
            }
        }

        if !self.interactive {
            return Err(AuthError::ConsentUnavailable(
                "no valid token stored and interactive sign-in is disabled".into(),
            ));
        }

        tracing::info!("No usable Google token, starting sign-in");
        self.login().await.map(|token_set| token_set.access_token)
    }
}

/// A fixed token, for tests and for tokens supplied from outside.
pub struct StaticTokenProvider(pub String);

impl TokenProvider for StaticTokenProvider {
    async fn get_token(&self) -> Result<String, AuthError> {
        Ok(self.0.clone())
    }
}
