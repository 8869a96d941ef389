use anyhow::{Context, Result};
use chrono_tz::Tz;
use freeslot_schedule::{parse_time_zone, DayWindow, DisplayMode, RowStyle, ScheduleError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

const APP_DIR: &str = "freeslot";
const CONFIG_FILE: &str = "config.toml";
const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";
const ENV_CLIENT_ID: &str = "FREESLOT_GOOGLE_CLIENT_ID";
const ENV_CLIENT_SECRET: &str = "FREESLOT_GOOGLE_CLIENT_SECRET";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Platform config directory for Freeslot (e.g. `~/.config/freeslot` on Linux).
pub fn app_config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Failed to get config directory")?
        .join(APP_DIR))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding this config file and stored tokens
    #[serde(skip, default = "default_config_dir")]
    pub config_dir: PathBuf,

    /// Google OAuth client settings
    #[serde(default)]
    pub google: GoogleConfig,

    /// Calendar API settings
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Default day window
    #[serde(default)]
    pub window: WindowConfig,

    /// Output preferences
    #[serde(default)]
    pub display: DisplayConfig,
}

fn default_config_dir() -> PathBuf {
    app_config_dir().unwrap_or_else(|_| PathBuf::from(".").join(APP_DIR))
}

/// Google OAuth configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// OAuth client ID from the Google Cloud console (desktop app type)
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default = "default_client_secret")]
    pub client_secret: String,
    /// Localhost port the consent redirect lands on
    #[serde(default = "default_redirect_port")]
    pub redirect_port: u16,
    /// Open a browser for consent when no usable token is stored
    #[serde(default = "default_interactive")]
    pub interactive: bool,
}

fn default_client_id() -> String {
    "YOUR_GOOGLE_CLIENT_ID".to_string()
}

fn default_client_secret() -> String {
    "YOUR_GOOGLE_CLIENT_SECRET".to_string()
}

fn default_redirect_port() -> u16 {
    8080
}

fn default_interactive() -> bool {
    true
}

impl GoogleConfig {
    /// Check if credentials are configured (not placeholders)
    pub fn is_configured(&self) -> bool {
        Self::credentials_configured(&self.client_id, &self.client_secret)
    }

    /// False for empty or placeholder client credentials
    pub fn credentials_configured(client_id: &str, client_secret: &str) -> bool {
        !client_id.is_empty()
            && !client_secret.is_empty()
            && !client_id.starts_with("YOUR_")
            && !client_secret.starts_with("YOUR_")
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
            client_secret: default_client_secret(),
            redirect_port: default_redirect_port(),
            interactive: default_interactive(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Base URL of the Calendar v3 API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Calendar ids never included in free/busy queries
    #[serde(default)]
    pub excluded: Vec<String>,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            excluded: Vec::new(),
        }
    }
}

/// Day window used when a query does not name one, as `HH:MM`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    pub start: String,
    pub end: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            start: "00:00".to_string(),
            end: "23:59".to_string(),
        }
    }
}

impl WindowConfig {
    pub fn day_window(&self) -> Result<DayWindow, ScheduleError> {
        DayWindow::parse(&self.start, &self.end)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub mode: DisplayMode,
    #[serde(default)]
    pub format: RowStyle,
    /// IANA zone name; the system zone is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            google: GoogleConfig::default(),
            calendar: CalendarConfig::default(),
            window: WindowConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the platform config directory, creating a default file if missing
    pub fn load() -> Result<Self> {
        let dir = app_config_dir()?;
        let mut config = Self::load_from(&dir.join(CONFIG_FILE))?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from `path`, creating a default file if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str::<Config>(&contents).map_err(|e| {
                ConfigError::ParseError(format!("{}: {}", path.display(), e.message()))
            })?
        } else {
            let config = Self::default();
            config.save_to(path)?;
            tracing::info!("Wrote default configuration to {}", path.display());
            config
        };

        if let Some(parent) = path.parent() {
            config.config_dir = parent.to_path_buf();
        }
        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns an error if validation fails with critical errors; warnings are logged.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(id) = std::env::var(ENV_CLIENT_ID) {
            self.google.client_id = id;
        }
        if let Ok(secret) = std::env::var(ENV_CLIENT_SECRET) {
            self.google.client_secret = secret;
        }
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.calendar.api_base_url, "calendar.api_base_url", &mut result);

        if let Err(e) = self.window.day_window() {
            result.add_error("window", e.to_string());
        }

        if let Some(zone) = &self.display.time_zone {
            if let Err(e) = parse_time_zone(zone) {
                result.add_error("display.time_zone", e.to_string());
            }
        }

        if self.google.redirect_port == 0 {
            result.add_error("google.redirect_port", "Port cannot be 0");
        }

        if !self.google.is_configured() {
            result.add_warning(
                "google",
                "Google OAuth client not configured - sign-in will be unavailable",
            );
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }
                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Zone for local dates and times: the configured one, else the system zone, else UTC.
    pub fn time_zone(&self) -> Tz {
        if let Some(name) = &self.display.time_zone {
            match parse_time_zone(name) {
                Ok(tz) => return tz,
                Err(e) => tracing::warn!("Ignoring display.time_zone: {}", e),
            }
        }
        system_time_zone()
    }

    /// Save configuration to the platform config directory
    pub fn save(&self) -> Result<()> {
        self.save_to(&app_config_dir()?.join(CONFIG_FILE))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents).context("Failed to write config file")?;
        Ok(())
    }

    /// Directory for stored OAuth tokens
    pub fn tokens_dir(&self) -> PathBuf {
        self.config_dir.join("tokens")
    }
}

fn system_time_zone() -> Tz {
    match iana_time_zone::get_timezone() {
        Ok(name) => parse_time_zone(&name).unwrap_or_else(|_| {
            tracing::warn!("System time zone {} not recognized, using UTC", name);
            chrono_tz::UTC
        }),
        Err(e) => {
            tracing::warn!("Could not detect system time zone ({}), using UTC", e);
            chrono_tz::UTC
        }
    }
}
