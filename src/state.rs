//! Shared application state handed to request handlers.

use crate::config::DatabaseConfig;
use crate::constants::DEFAULT_QUERY_TIMEOUT;
use crate::database::{ConnectionProvider, MySqlProvider};
use std::sync::Arc;
use std::time::Duration;

/// Read-only state shared by all requests.
///
/// Holds the connection provider and the query timeout; nothing in here
/// changes after startup.
pub struct AppState<P> {
    /// Source of per-request connections.
    pub provider: Arc<P>,

    /// Upper bound on query execution plus fetching.
    pub query_timeout: Duration,
}

impl<P> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            query_timeout: self.query_timeout,
        }
    }
}

impl<P: ConnectionProvider> AppState<P> {
    /// Create state around a provider using the default query timeout.
    pub fn new(provider: P) -> Self {
        Self {
            provider: Arc::new(provider),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Override the query timeout.
    pub fn with_query_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }
}

impl AppState<MySqlProvider> {
    /// Build state for a real MySQL server from configuration.
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self::new(MySqlProvider::new(config)).with_query_timeout(config.query_timeout)
    }
}
