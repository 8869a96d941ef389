use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Seconds before expiry at which a token is refreshed.
const REFRESH_MARGIN_SECS: i64 = 300;

/// Token set for OAuth2 authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    /// Access token for API requests
    pub access_token: String,

    /// Optional refresh token for token renewal
    pub refresh_token: Option<String>,

    /// Token expiration timestamp (Unix timestamp)
    pub expires_at: i64,

    /// Scopes granted to this token
    pub scopes: Vec<String>,
}

impl TokenSet {
    /// Check if the token needs refresh (within 5 minutes of expiry)
    pub fn needs_refresh(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        now >= self.expires_at - REFRESH_MARGIN_SECS
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        now >= self.expires_at
    }
}

/// File-backed token storage, one JSON file per service.
#[derive(Debug, Clone)]
pub struct TokenStore {
    dir: PathBuf,
}

impl TokenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn token_path(&self, service: &str) -> PathBuf {
        self.dir.join(format!("{}.json", service))
    }

    /// Store a token set
    pub fn store(&self, service: &str, token_set: &TokenSet) -> Result<()> {
        fs::create_dir_all(&self.dir).context("Failed to create tokens directory")?;
        let path = self.token_path(service);

        let json = serde_json::to_string_pretty(token_set)
            .context("Failed to serialize token set")?;
        fs::write(&path, json).context("Failed to write token file")?;
        restrict_permissions(&path)?;

        tracing::info!("Stored token for service: {} at {:?}", service, path);
        Ok(())
    }

    /// Retrieve a token set, or `None` if none was stored
    pub fn retrieve(&self, service: &str) -> Result<Option<TokenSet>> {
        let path = self.token_path(service);
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path).context("Failed to read token file")?;
        let token_set: TokenSet =
            serde_json::from_str(&json).context("Failed to deserialize token set")?;

        tracing::debug!("Retrieved token for service: {}", service);
        Ok(Some(token_set))
    }

    /// Delete a stored token set; a missing file is not an error
    pub fn delete(&self, service: &str) -> Result<()> {
        let path = self.token_path(service);

        if path.exists() {
            fs::remove_file(&path).context("Failed to delete token file")?;
            tracing::info!("Deleted token for service: {}", service);
        }

        Ok(())
    }

    pub fn has_token(&self, service: &str) -> bool {
        matches!(self.retrieve(service), Ok(Some(_)))
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &std::path::Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .context("Failed to restrict token file permissions")
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &std::path::Path) -> Result<()> {
    Ok(())
}
