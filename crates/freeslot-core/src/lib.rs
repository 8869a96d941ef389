pub mod config;
pub mod error;

pub use config::{
    app_config_dir, CalendarConfig, Config, DisplayConfig, GoogleConfig, ValidationResult,
    WindowConfig,
};
pub use error::{AppError, AuthError, ConfigError, ProviderError, ReqwestErrorExt};

use anyhow::Result;

/// Initialize logging.
///
/// Logs go to stderr so rendered output on stdout stays clean. `RUST_LOG`
/// takes precedence over `default_level`.
pub fn init(default_level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!("Freeslot core initialized");
    Ok(())
}
