//! Error types for the users API.
//!
//! Request-time failures come in exactly two kinds, connection and query,
//! and each maps to a fixed client-facing message. Internal detail is kept
//! for logs and never sent to the client.

use crate::constants::{CONNECTION_ERROR_MESSAGE, INTERNAL_ERROR_MESSAGE, QUERY_ERROR_MESSAGE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Domain-specific errors for the users API.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration error (startup only)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The database could not be reached, authenticated or TLS-verified.
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Query execution or row materialization failed on an open connection.
    #[error("Query error: {message}")]
    Query {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl ServerError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a connection error with a source.
    pub fn connection_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a query error with a source.
    pub fn query_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Query {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Connection attempt exceeded the configured timeout.
    pub fn connect_timeout(seconds: u64) -> Self {
        Self::connection(format!("connection attempt exceeded {} seconds", seconds))
    }

    /// Query execution exceeded the configured timeout.
    pub fn query_timeout(seconds: u64) -> Self {
        Self::query(format!("query exceeded {} seconds", seconds))
    }

    /// Check if this is a connection-kind error.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// Check if this is a query-kind error.
    pub fn is_query(&self) -> bool {
        matches!(self, Self::Query { .. })
    }

    /// Fixed message reported to HTTP clients for this error.
    pub fn client_message(&self) -> &'static str {
        match self {
            Self::Connection { .. } => CONNECTION_ERROR_MESSAGE,
            Self::Query { .. } => QUERY_ERROR_MESSAGE,
            Self::Config(_) => INTERNAL_ERROR_MESSAGE,
        }
    }

    /// Full error chain for logging, including the driver's message.
    pub fn detail(&self) -> String {
        let mut detail = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            detail.push_str(": ");
            detail.push_str(&err.to_string());
            source = err.source();
        }
        detail
    }
}

/// Every request-time error is a 500 with a `{"error": ...}` body.
impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.client_message() });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
