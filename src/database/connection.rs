//! Per-request connection management for MySQL.
//!
//! There is no pool: every [`ConnectionProvider::acquire`] opens a fresh
//! TLS-verified session, and the caller closes it when the request is done.

use crate::config::DatabaseConfig;
use crate::database::query::{fetch_rows, ResultRow};
use crate::error::ServerError;
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlSslMode};
use sqlx::Connection;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error};

/// Source of single-use database connections.
#[async_trait]
pub trait ConnectionProvider: Send + Sync + 'static {
    /// Connection handle handed to the caller.
    type Connection: DbConnection;

    /// Open one connection. Exactly one attempt, no retries.
    ///
    /// Failures are logged here and returned as [`ServerError::Connection`].
    async fn acquire(&self) -> Result<Self::Connection, ServerError>;

    /// Number of connections handed out and not yet released.
    fn open_connections(&self) -> usize;
}

/// An open, exclusively owned database connection.
#[async_trait]
pub trait DbConnection: Send {
    /// Execute `query` and eagerly collect every row.
    async fn fetch_all(&mut self, query: &str) -> Result<Vec<ResultRow>, ServerError>;

    /// Close the connection gracefully.
    async fn close(self) -> Result<(), ServerError>;
}

/// Counter of live connections shared between a provider and its leases.
#[derive(Debug, Clone, Default)]
pub struct OpenConnections(Arc<AtomicUsize>);

impl OpenConnections {
    /// Create a counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current number of outstanding leases.
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    /// Register a connection; it is unregistered when the lease drops.
    pub fn lease(&self) -> ConnectionLease {
        self.0.fetch_add(1, Ordering::SeqCst);
        ConnectionLease(self.0.clone())
    }
}

/// Keeps a connection counted as open until dropped.
#[derive(Debug)]
pub struct ConnectionLease(Arc<AtomicUsize>);

impl Drop for ConnectionLease {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Build driver connect options from configuration.
///
/// Certificate verification against `ssl_ca` is always on. The server's
/// hostname is not matched against the certificate (`VERIFY_CA`).
pub fn connect_options(config: &DatabaseConfig) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.database)
        .ssl_mode(MySqlSslMode::VerifyCa)
        .ssl_ca(&config.ssl_ca)
}

/// Connection provider backed by a real MySQL server.
pub struct MySqlProvider {
    options: MySqlConnectOptions,
    address: String,
    connect_timeout: Duration,
    open: OpenConnections,
}

impl MySqlProvider {
    /// Create a provider from configuration. No connection is made here.
    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            options: connect_options(config),
            address: config.address(),
            connect_timeout: config.connect_timeout,
            open: OpenConnections::new(),
        }
    }

    async fn connect(&self) -> Result<MySqlConnection, ServerError> {
        match timeout(self.connect_timeout, MySqlConnection::connect_with(&self.options)).await {
            Ok(Ok(conn)) => Ok(conn),
            Ok(Err(e)) => Err(ServerError::connection_with_source(
                format!("Failed to connect to {}", self.address),
                e,
            )),
            Err(_) => Err(ServerError::connect_timeout(self.connect_timeout.as_secs())),
        }
    }
}

#[async_trait]
impl ConnectionProvider for MySqlProvider {
    type Connection = MySqlSession;

    async fn acquire(&self) -> Result<MySqlSession, ServerError> {
        debug!("Connecting to {}", self.address);

        match self.connect().await {
            Ok(conn) => {
                let lease = self.open.lease();
                debug!("Connected to {} ({} open)", self.address, self.open.count());
                Ok(MySqlSession { conn, lease })
            }
            Err(err) => {
                error!("Database connection error: {}", err.detail());
                Err(err)
            }
        }
    }

    fn open_connections(&self) -> usize {
        self.open.count()
    }
}

/// A live MySQL session. Dropping it releases the socket without `COM_QUIT`.
pub struct MySqlSession {
    conn: MySqlConnection,
    lease: ConnectionLease,
}

#[async_trait]
impl DbConnection for MySqlSession {
    async fn fetch_all(&mut self, query: &str) -> Result<Vec<ResultRow>, ServerError> {
        fetch_rows(&mut self.conn, query).await
    }

    async fn close(self) -> Result<(), ServerError> {
        let MySqlSession { conn, lease } = self;
        let closed = conn
            .close()
            .await
            .map_err(|e| ServerError::connection_with_source("Failed to close connection", e));
        drop(lease);
        closed
    }
}
