//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid log filter: {0}")]
    InvalidLogLevel(String),

    #[error("max_sessions must be between 1 and {max}")]
    InvalidMaxSessions { max: usize },

    #[error("idle_timeout_secs must be at least {min}")]
    IdleTimeoutTooShort { min: u64 },

    #[error("max_age_secs must not be shorter than idle_timeout_secs")]
    MaxAgeBelowIdleTimeout,

    #[error("sweep_interval_secs must be between 1 and idle_timeout_secs")]
    InvalidSweepInterval,

    #[error("Invalid preview base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Preview base URL must use HTTPS in production")]
    BaseUrlMustBeHttps,
}
