use anyhow::{Context, Result};
use freeslot_core::AuthError;
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge,
    PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use warp::Filter;

use crate::storage::TokenSet;

const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

const SUCCESS_PAGE: &str = "<html><body><h1>Authorization successful!</h1><p>You can close this window and return to the terminal.</p></body></html>";
const DENIED_PAGE: &str = "<html><body><h1>Authorization denied</h1><p>Freeslot was not given access to your calendars.</p></body></html>";

type CallbackSender = Arc<Mutex<Option<oneshot::Sender<HashMap<String, String>>>>>;

/// OAuth2 configuration
#[derive(Debug, Clone)]
pub struct OAuth2Config {
    /// Client ID from OAuth provider
    pub client_id: String,

    /// Client secret from OAuth provider
    pub client_secret: String,

    /// Authorization endpoint URL
    pub auth_url: String,

    /// Token endpoint URL
    pub token_url: String,

    /// Localhost port the redirect URI points at
    pub redirect_port: u16,

    /// Scopes to request
    pub scopes: Vec<String>,

    /// Provider-specific authorization parameters
    pub extra_params: Vec<(String, String)>,
}

impl OAuth2Config {
    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}/callback", self.redirect_port)
    }
}

/// An authorization URL plus the secrets needed to finish the flow.
pub struct AuthorizationRequest {
    pub url: String,
    pub csrf_token: CsrfToken,
    pub pkce_verifier: PkceCodeVerifier,
}

/// OAuth2 provider trait
pub trait OAuth2Provider: Send + Sync {
    /// Get the service identifier (e.g., "google")
    fn service_id(&self) -> &str;

    /// Get the OAuth2 configuration
    fn config(&self) -> &OAuth2Config;

    fn client(&self) -> Result<BasicClient> {
        let config = self.config();

        Ok(BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            AuthUrl::new(config.auth_url.clone()).context("Invalid auth URL")?,
            Some(TokenUrl::new(config.token_url.clone()).context("Invalid token URL")?),
        )
        .set_auth_type(AuthType::RequestBody)
        .set_redirect_uri(
            RedirectUrl::new(config.redirect_uri()).context("Invalid redirect URI")?,
        ))
    }

    /// Build the authorization URL to open in the browser
    fn authorize(&self) -> Result<AuthorizationRequest> {
        let config = self.config();
        let client = self.client()?;

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut auth_request = client.authorize_url(CsrfToken::new_random);
        for scope in &config.scopes {
            auth_request = auth_request.add_scope(Scope::new(scope.clone()));
        }
        for (name, value) in &config.extra_params {
            auth_request = auth_request.add_extra_param(name.as_str(), value.as_str());
        }

        let (auth_url, csrf_token) = auth_request.set_pkce_challenge(pkce_challenge).url();

        Ok(AuthorizationRequest {
            url: auth_url.to_string(),
            csrf_token,
            pkce_verifier,
        })
    }

    /// Exchange an authorization code for a token set
    async fn exchange_code(&self, code: String, pkce_verifier: PkceCodeVerifier) -> Result<TokenSet> {
        let token_result = self
            .client()?
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(async_http_client)
            .await
            .context("Failed to exchange authorization code")?;

        let expires_in = token_result
            .expires_in()
            .map(|d| d.as_secs() as i64)
            .unwrap_or(DEFAULT_EXPIRES_IN_SECS);

        let scopes = token_result
            .scopes()
            .map(|s| s.iter().map(|scope| scope.to_string()).collect())
            .unwrap_or_default();

        tracing::info!("OAuth2 flow completed for {}", self.service_id());
        Ok(TokenSet {
            access_token: token_result.access_token().secret().clone(),
            refresh_token: token_result.refresh_token().map(|t| t.secret().clone()),
            expires_at: chrono::Utc::now().timestamp() + expires_in,
            scopes,
        })
    }

    /// Run the interactive consent flow: browser plus a local callback server
    async fn authenticate(&self) -> Result<TokenSet, AuthError> {
        let request = self
            .authorize()
            .map_err(|e| AuthError::OAuthFailed(e.to_string()))?;
        let port = self.config().redirect_port;

        let (tx, rx) = oneshot::channel::<HashMap<String, String>>();
        let tx: CallbackSender = Arc::new(Mutex::new(Some(tx)));

        let routes = warp::get()
            .and(warp::path("callback"))
            .and(warp::query::<HashMap<String, String>>())
            .and(warp::any().map(move || tx.clone()))
            .and_then(|params: HashMap<String, String>, tx: CallbackSender| async move {
                let page = if params.contains_key("error") {
                    DENIED_PAGE
                } else {
                    SUCCESS_PAGE
                };
                if let Some(sender) = tx.lock().await.take() {
                    let _ = sender.send(params);
                }
                Ok::<_, warp::Rejection>(warp::reply::html(page))
            });

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let (addr, server) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(([127, 0, 0, 1], port), async {
                let _ = shutdown_rx.await;
            })
            .map_err(|_| AuthError::PortInUse(port))?;
        tokio::spawn(server);
        tracing::debug!("OAuth callback listening on {}", addr);

        tracing::info!("Opening browser for {} authorization", self.service_id());
        if let Err(e) = webbrowser::open(&request.url) {
            tracing::warn!(
                "Could not open a browser ({}). Visit this URL to continue: {}",
                e,
                request.url
            );
        }

        let params = rx.await;
        let _ = shutdown_tx.send(());
        let params = params.map_err(|_| {
            AuthError::OAuthFailed("Callback server stopped before consent finished".into())
        })?;

        let code = callback_code(&params, request.csrf_token.secret())?;
        self.exchange_code(code, request.pkce_verifier)
            .await
            .map_err(|e| AuthError::OAuthFailed(format!("{:#}", e)))
    }
}

/// Pull the authorization code out of the redirect's query parameters.
fn callback_code(params: &HashMap<String, String>, expected_state: &str) -> Result<String, AuthError> {
    if let Some(error) = params.get("error") {
        return Err(AuthError::ConsentDenied(error.clone()));
    }

    let state = params.get("state").map(String::as_str).unwrap_or_default();
    if state != expected_state {
        return Err(AuthError::OAuthFailed("CSRF token mismatch".into()));
    }

    params
        .get("code")
        .filter(|code| !code.is_empty())
        .cloned()
        .ok_or_else(|| AuthError::OAuthFailed("Callback did not include a code".into()))
}
