//! Configuration module for the homework backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Which data provider backs the action router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Sqlite,
    Memory,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid value for {}: {:?}", self.key, self.value)
    }
}

impl std::error::Error for ConfigError {}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
    pub store: StoreKind,
    /// Seed the demo teacher and student when the user table is empty
    pub seed_demo: bool,
    /// Optional JSON roster file upserted into the user table at startup
    pub roster_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup("HOMEWORK_DB_PATH")
            .unwrap_or_else(|| "./data/homework.sqlite".to_string())
            .into();

        let bind_raw =
            lookup("HOMEWORK_BIND_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string());
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError {
            key: "HOMEWORK_BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        let log_level = lookup("HOMEWORK_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let log_format = match lookup("HOMEWORK_LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError {
                    key: "HOMEWORK_LOG_FORMAT",
                    value: other.to_string(),
                })
            }
        };

        let store = match lookup("HOMEWORK_STORE").as_deref() {
            None | Some("sqlite") => StoreKind::Sqlite,
            Some("memory") => StoreKind::Memory,
            Some(other) => {
                return Err(ConfigError {
                    key: "HOMEWORK_STORE",
                    value: other.to_string(),
                })
            }
        };

        let seed_demo = match lookup("HOMEWORK_SEED_DEMO").as_deref() {
            None => true,
            Some(raw) => parse_bool(raw).ok_or_else(|| ConfigError {
                key: "HOMEWORK_SEED_DEMO",
                value: raw.to_string(),
            })?,
        };

        let roster_path = lookup("HOMEWORK_ROSTER_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            db_path,
            bind_addr,
            log_level,
            log_format,
            store,
            seed_demo,
            roster_path,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
