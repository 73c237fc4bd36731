//! Configuration management for the users API.
//!
//! Configuration is loaded from environment variables following the 12-factor app pattern.
//! An optional `.env` file is applied first and overrides variables already set.

use crate::constants::{
    DEFAULT_CONNECTION_TIMEOUT, DEFAULT_CONNECTION_TIMEOUT_SECS, DEFAULT_MYSQL_PORT,
    DEFAULT_QUERY_TIMEOUT, DEFAULT_QUERY_TIMEOUT_SECS,
};
use crate::error::ServerError;
use crate::server::HttpConfig;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Service configuration, built once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection configuration
    pub database: DatabaseConfig,

    /// HTTP listener configuration
    pub http: HttpConfig,
}

/// Database connection configuration.
#[derive(Clone)]
pub struct DatabaseConfig {
    /// MySQL hostname or IP address
    pub host: String,

    /// MySQL port (default: 3306)
    pub port: u16,

    /// Username
    pub user: String,

    /// Password (may be empty)
    pub password: String,

    /// Database to select after login
    pub database: String,

    /// CA bundle used to verify the server certificate
    pub ssl_ca: PathBuf,

    /// Upper bound on connect + TLS handshake + authentication
    pub connect_timeout: Duration,

    /// Upper bound on query execution + fetching all rows
    pub query_timeout: Duration,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("ssl_ca", &self.ssl_ca)
            .field("connect_timeout", &self.connect_timeout)
            .field("query_timeout", &self.query_timeout)
            .finish()
    }
}

impl DatabaseConfig {
    /// Create a configuration with default port and timeouts.
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
        ssl_ca: impl Into<PathBuf>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_MYSQL_PORT,
            user: user.into(),
            password: password.into(),
            database: database.into(),
            ssl_ca: ssl_ca.into(),
            connect_timeout: DEFAULT_CONNECTION_TIMEOUT,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// `host:port` for log lines.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// ## Required
    /// - `MYSQL_HOST`: MySQL hostname
    /// - `MYSQL_USER`: MySQL username
    /// - `MYSQL_PASSWORD`: MySQL password (may be empty)
    /// - `MYSQL_DB`: Database name
    /// - `SSL_CA`: Path to the CA bundle used to verify the server certificate
    ///
    /// ## Optional
    /// - `MYSQL_PORT`: Port number (default: 3306)
    /// - `MYSQL_CONNECT_TIMEOUT`: Connection timeout in seconds (default: 30)
    /// - `MYSQL_QUERY_TIMEOUT`: Query timeout in seconds (default: 30)
    /// - `HTTP_HOST`, `HTTP_PORT`, `HTTP_TRACING`: see [`HttpConfig`]
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = required(&lookup, "MYSQL_HOST")?;
        let user = required(&lookup, "MYSQL_USER")?;
        let database = required(&lookup, "MYSQL_DB")?;
        let ssl_ca = required(&lookup, "SSL_CA")?;

        // An empty password is legitimate, an absent one is not
        let password = lookup("MYSQL_PASSWORD").ok_or_else(|| {
            ServerError::config("MYSQL_PASSWORD environment variable is required")
        })?;

        let port = parse_or(&lookup, "MYSQL_PORT", DEFAULT_MYSQL_PORT)?;

        let connect_timeout_secs = parse_or(
            &lookup,
            "MYSQL_CONNECT_TIMEOUT",
            DEFAULT_CONNECTION_TIMEOUT_SECS,
        )?;

        let query_timeout_secs =
            parse_or(&lookup, "MYSQL_QUERY_TIMEOUT", DEFAULT_QUERY_TIMEOUT_SECS)?;

        Ok(Config {
            database: DatabaseConfig {
                host,
                port,
                user,
                password,
                database,
                ssl_ca: PathBuf::from(ssl_ca),
                connect_timeout: Duration::from_secs(connect_timeout_secs),
                query_timeout: Duration::from_secs(query_timeout_secs),
            },
            http: HttpConfig::from_lookup(&lookup)?,
        })
    }
}

/// Apply a dotenv file, overriding variables that are already set.
///
/// Returns `Ok(false)` when the file does not exist.
pub fn load_env_file(path: &Path) -> Result<bool, ServerError> {
    match dotenvy::from_path_override(path) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(ServerError::config(format!(
            "failed to load {}: {}",
            path.display(),
            e
        ))),
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String, ServerError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ServerError::config(format!("{} environment variable is required", key)))
}

pub(crate) fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ServerError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ServerError::config(format!("{} has an invalid value: '{}'", key, raw))),
    }
}

pub(crate) fn parse_flag<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.to_lowercase() == "true" || v == "1")
        .unwrap_or(default)
}
