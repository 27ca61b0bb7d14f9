//! Application configuration module
//!
//! Configuration is loaded from environment variables with the
//! `DRAFT_PREVIEW` prefix; nested values use double underscores.
//!
//! # Example
//!
//! ```no_run
//! use draft_preview::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Serving previews on {:?}", config.server.socket_addr());
//! ```

mod error;
mod preview;
mod server;

pub use error::{ConfigError, ValidationError};
pub use preview::{PreviewConfig, MAX_SESSIONS_LIMIT, MIN_IDLE_TIMEOUT_SECS};
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a usable
/// development configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, log filter)
    #[serde(default)]
    pub server: ServerConfig,

    /// Preview session service
    #[serde(default)]
    pub preview: PreviewConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `DRAFT_PREVIEW` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `DRAFT_PREVIEW__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `DRAFT_PREVIEW__PREVIEW__MAX_SESSIONS=20` -> `preview.max_sessions = 20`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("DRAFT_PREVIEW")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid value found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.preview.validate(&self.server.environment)?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
