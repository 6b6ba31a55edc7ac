//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    /// When set, counters, sessions and users live in PostgreSQL instead of memory.
    pub database_url: Option<String>,
    pub session_secret: String,
    pub session_cookie_name: String,
    pub session_ttl_hours: i64,
    pub cookie_secure: bool,
    pub admin_username: String,
    pub admin_password: String,
    pub cors_origin: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 5000)),
            log_level: Level::INFO,
            database_url: None,
            session_secret: "kpi-dashboard-secret-key".to_string(),
            session_cookie_name: "kpi_session".to_string(),
            session_ttl_hours: 24,
            // Plaintext deployments need this off; production should enable it.
            cookie_secure: false,
            admin_username: "admin".to_string(),
            admin_password: "massana".to_string(),
            cors_origin: None,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable source, falling back to
    /// [`Config::default`] for anything unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        // --- Server Settings ---
        let bind_address = match lookup("BIND_ADDRESS") {
            Some(raw) => raw.parse::<SocketAddr>().map_err(|e| {
                ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
            })?,
            None => defaults.bind_address,
        };

        let log_level = match lookup("RUST_LOG") {
            Some(raw) => raw.parse::<Level>().map_err(|_| {
                ConfigError::InvalidValue(
                    "RUST_LOG".to_string(),
                    format!("'{}' is not a valid log level", raw),
                )
            })?,
            None => defaults.log_level,
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        // --- Session Settings ---
        let session_secret = lookup("SESSION_SECRET").unwrap_or(defaults.session_secret);
        if session_secret.is_empty() {
            return Err(ConfigError::InvalidValue(
                "SESSION_SECRET".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let session_cookie_name =
            lookup("SESSION_COOKIE_NAME").unwrap_or(defaults.session_cookie_name);
        if session_cookie_name.is_empty()
            || !session_cookie_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ConfigError::InvalidValue(
                "SESSION_COOKIE_NAME".to_string(),
                format!("'{}' is not a valid cookie name", session_cookie_name),
            ));
        }

        let session_ttl_hours = match lookup("SESSION_TTL_HOURS") {
            Some(raw) => match raw.parse::<i64>() {
                Ok(hours) if hours > 0 => hours,
                _ => {
                    return Err(ConfigError::InvalidValue(
                        "SESSION_TTL_HOURS".to_string(),
                        format!("'{}' is not a positive number of hours", raw),
                    ))
                }
            },
            None => defaults.session_ttl_hours,
        };

        let cookie_secure = match lookup("COOKIE_SECURE") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "COOKIE_SECURE".to_string(),
                    format!("'{}' is not a boolean", raw),
                )
            })?,
            None => defaults.cookie_secure,
        };

        // --- Credential Settings ---
        let admin_username = lookup("ADMIN_USERNAME").unwrap_or(defaults.admin_username);
        let admin_password = lookup("ADMIN_PASSWORD").unwrap_or(defaults.admin_password);
        if admin_username.is_empty() || admin_password.is_empty() {
            return Err(ConfigError::InvalidValue(
                "ADMIN_USERNAME/ADMIN_PASSWORD".to_string(),
                "credentials must not be empty".to_string(),
            ));
        }

        let cors_origin = lookup("CORS_ORIGIN").filter(|origin| !origin.is_empty());

        Ok(Self {
            bind_address,
            log_level,
            database_url,
            session_secret,
            session_cookie_name,
            session_ttl_hours,
            cookie_secure,
            admin_username,
            admin_password,
            cors_origin,
        })
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
