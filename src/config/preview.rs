//! Preview service configuration

use http::Uri;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;
use crate::application::preview::RegistrySettings;
use crate::domain::preview::ExpiryPolicy;

/// Upper bound on `max_sessions`.
pub const MAX_SESSIONS_LIMIT: usize = 1000;

/// Lower bound on `idle_timeout_secs`.
pub const MIN_IDLE_TIMEOUT_SECS: u64 = 60;

/// Preview service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PreviewConfig {
    /// Mount the preview routes and background tasks
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Public URL prefix for preview links; empty gives relative links
    #[serde(default)]
    pub base_url: String,

    /// Directory holding markdown drafts
    #[serde(default = "default_drafts_dir")]
    pub drafts_dir: PathBuf,

    /// Maximum concurrent preview sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Seconds without viewer activity before a session expires
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// Seconds after creation before a session expires regardless of activity
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,

    /// Seconds between expiry sweeps
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Extra origins allowed to open preview sockets (comma-separated)
    pub allowed_origins: Option<String>,

    /// Watch `drafts_dir` and push reloads on save
    #[serde(default = "default_watch_drafts")]
    pub watch_drafts: bool,
}

impl PreviewConfig {
    /// Get allowed origins as a vector
    pub fn allowed_origins_list(&self) -> Vec<String> {
        self.allowed_origins
            .as_ref()
            .map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn expiry_policy(&self) -> ExpiryPolicy {
        ExpiryPolicy {
            idle_timeout: Duration::from_secs(self.idle_timeout_secs),
            max_age: Duration::from_secs(self.max_age_secs),
        }
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Settings for the session registry
    pub fn registry_settings(&self) -> RegistrySettings {
        RegistrySettings::default()
            .with_capacity(self.max_sessions)
            .with_base_url(self.base_url.trim_end_matches('/'))
            .with_expiry(self.expiry_policy())
    }

    /// Validate preview configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.max_sessions == 0 || self.max_sessions > MAX_SESSIONS_LIMIT {
            return Err(ValidationError::InvalidMaxSessions {
                max: MAX_SESSIONS_LIMIT,
            });
        }
        if self.idle_timeout_secs < MIN_IDLE_TIMEOUT_SECS {
            return Err(ValidationError::IdleTimeoutTooShort {
                min: MIN_IDLE_TIMEOUT_SECS,
            });
        }
        if self.max_age_secs < self.idle_timeout_secs {
            return Err(ValidationError::MaxAgeBelowIdleTimeout);
        }
        if self.sweep_interval_secs == 0 || self.sweep_interval_secs > self.idle_timeout_secs {
            return Err(ValidationError::InvalidSweepInterval);
        }
        self.validate_base_url(environment)
    }

    fn validate_base_url(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.base_url.is_empty() {
            return Ok(());
        }

        let uri: Uri = self
            .base_url
            .parse()
            .map_err(|_| ValidationError::InvalidBaseUrl(self.base_url.clone()))?;
        let scheme = uri.scheme_str();
        if !matches!(scheme, Some("http") | Some("https")) || uri.host().is_none() {
            return Err(ValidationError::InvalidBaseUrl(self.base_url.clone()));
        }
        if *environment == Environment::Production && scheme != Some("https") {
            return Err(ValidationError::BaseUrlMustBeHttps);
        }
        Ok(())
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            base_url: String::new(),
            drafts_dir: default_drafts_dir(),
            max_sessions: default_max_sessions(),
            idle_timeout_secs: default_idle_timeout(),
            max_age_secs: default_max_age(),
            sweep_interval_secs: default_sweep_interval(),
            allowed_origins: None,
            watch_drafts: default_watch_drafts(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_drafts_dir() -> PathBuf {
    PathBuf::from("drafts")
}

fn default_max_sessions() -> usize {
    50
}

fn default_idle_timeout() -> u64 {
    15 * 60
}

fn default_max_age() -> u64 {
    2 * 60 * 60
}

fn default_sweep_interval() -> u64 {
    30
}

fn default_watch_drafts() -> bool {
    true
}
