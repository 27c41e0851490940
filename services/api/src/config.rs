//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use axum::http::HeaderValue;
use chrono::Duration;
use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub cors_origin: HeaderValue,
    /// Where finished courses are POSTed. Without it, courses are kept in memory.
    pub publish_url: Option<String>,
    pub publish_token: Option<String>,
    /// Idle wizard sessions older than this are discarded.
    pub session_ttl: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Load Server Settings ---
        let bind_address_str =
            lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin_str =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());
        let cors_origin = cors_origin_str.parse::<HeaderValue>().map_err(|e| {
            ConfigError::InvalidValue("CORS_ORIGIN".to_string(), e.to_string())
        })?;

        // --- Load Publisher Settings ---
        let publish_url = lookup("PUBLISH_URL").filter(|url| !url.trim().is_empty());
        let publish_token = lookup("PUBLISH_TOKEN").filter(|token| !token.trim().is_empty());
        if publish_token.is_some() && publish_url.is_none() {
            return Err(ConfigError::MissingVar("PUBLISH_URL".to_string()));
        }

        // --- Load Session Settings ---
        let ttl_minutes = match lookup("SESSION_TTL_MINUTES") {
            Some(raw) => raw.parse::<u32>().ok().filter(|m| *m > 0).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "SESSION_TTL_MINUTES".to_string(),
                    format!("'{}' is not a positive number of minutes", raw),
                )
            })?,
            None => 120,
        };

        Ok(Self {
            bind_address,
            log_level,
            cors_origin,
            publish_url,
            publish_token,
            session_ttl: Duration::minutes(i64::from(ttl_minutes)),
        })
    }
}
