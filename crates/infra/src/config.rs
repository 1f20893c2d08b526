//! Configuration loading and representation.
//!
//! Everything comes from environment variables; unset variables fall back to
//! development defaults.

use std::collections::HashMap;
use std::net::SocketAddr;

use thiserror::Error;

use rockparade_observability::LogFormat;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is not a valid socket address: {value}")]
    InvalidAddr { name: &'static str, value: String },

    #[error("{name} must be 'true' or 'false', got '{value}'")]
    InvalidBool { name: &'static str, value: String },

    #[error("LOG_FORMAT: {0}")]
    InvalidLogFormat(String),

    #[error("{name} must not be empty")]
    Empty { name: &'static str },
}

/// Where repositories keep their data.
#[derive(Clone, PartialEq, Eq)]
pub enum StorageBackend {
    InMemory,
    Postgres { database_url: String },
}

impl core::fmt::Debug for StorageBackend {
    // The URL may carry credentials.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InMemory => f.write_str("InMemory"),
            Self::Postgres { .. } => f.write_str("Postgres { database_url: <redacted> }"),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub storage: StorageBackend,
    pub load_fixtures: bool,
    pub log_format: LogFormat,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"<redacted>")
            .field("storage", &self.storage)
            .field("load_fixtures", &self.load_fixtures)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl AppConfig {
    /// Read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Build from an explicit variable map (testable without touching the process env).
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &str| vars.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

        let bind_raw = get("BIND_ADDR").unwrap_or(DEFAULT_BIND_ADDR);
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::InvalidAddr {
            name: "BIND_ADDR",
            value: bind_raw.to_string(),
        })?;

        let jwt_secret = match vars.get("JWT_SECRET") {
            Some(secret) if secret.is_empty() => return Err(ConfigError::Empty { name: "JWT_SECRET" }),
            Some(secret) => secret.clone(),
            None => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                DEV_JWT_SECRET.to_string()
            }
        };

        let storage = match get("DATABASE_URL") {
            Some(url) => StorageBackend::Postgres {
                database_url: url.to_string(),
            },
            None => StorageBackend::InMemory,
        };

        let load_fixtures = match get("LOAD_FIXTURES") {
            None => true,
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidBool {
                        name: "LOAD_FIXTURES",
                        value: raw.to_string(),
                    })
                }
            },
        };

        let log_format = match get("LOG_FORMAT") {
            None => LogFormat::default(),
            Some(raw) => raw
                .parse()
                .map_err(|e: rockparade_observability::ParseLogFormatError| {
                    ConfigError::InvalidLogFormat(e.to_string())
                })?,
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            storage,
            load_fixtures,
            log_format,
        })
    }
}
