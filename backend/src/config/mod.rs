//! Configuration module for the flashcards backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::db::DEFAULT_MAX_CONNECTIONS;

/// Error raised for malformed configuration values.
#[derive(Debug, thiserror::Error)]
#[error("invalid value for {var}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub reason: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Service name reported in logs
    pub service_name: String,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Maximum number of pooled database connections
    pub max_connections: u32,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Origins allowed to make cross-origin requests
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let service_name =
            env::var("FLASHCARDS_SERVICE_NAME").unwrap_or_else(|_| "flashcards".to_string());

        let db_path = env::var("FLASHCARDS_DB_PATH")
            .unwrap_or_else(|_| "./data/flashcards.sqlite".to_string())
            .into();

        let max_connections = match env::var("FLASHCARDS_MAX_CONNECTIONS") {
            Ok(raw) => raw.parse().map_err(|e: std::num::ParseIntError| ConfigError {
                var: "FLASHCARDS_MAX_CONNECTIONS",
                reason: e.to_string(),
            })?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        let bind_addr = env::var("FLASHCARDS_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError {
                var: "FLASHCARDS_BIND_ADDR",
                reason: e.to_string(),
            })?;

        let log_level = env::var("FLASHCARDS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_json = env::var("FLASHCARDS_LOG_JSON")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let allowed_origins = env::var("FLASHCARDS_ALLOWED_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or_else(|_| vec!["http://localhost:5173".to_string()]);

        Ok(Self {
            service_name,
            db_path,
            max_connections,
            bind_addr,
            log_level,
            log_json,
            allowed_origins,
        })
    }
}

/// Split a comma separated origin list, dropping blanks.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
