//! HTTP server: router construction, listener binding and graceful shutdown.

use crate::config::{parse_flag, parse_or};
use crate::constants::{DEFAULT_HTTP_HOST, DEFAULT_HTTP_PORT, USERS_PATH};
use crate::database::ConnectionProvider;
use crate::error::ServerError;
use crate::handlers::list_users;
use crate::shutdown::ShutdownSignal;
use crate::state::AppState;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

/// HTTP listener configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Host to bind to.
    pub host: String,

    /// Port to listen on.
    pub port: u16,

    /// Enable request tracing via tower-http TraceLayer.
    ///
    /// When enabled, all HTTP requests are traced with structured logging
    /// including request method, path, status code, and latency.
    pub enable_tracing: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HTTP_HOST.to_string(),
            port: DEFAULT_HTTP_PORT,
            enable_tracing: true,
        }
    }
}

impl HttpConfig {
    /// Create configuration through an arbitrary key lookup.
    ///
    /// - `HTTP_HOST`: bind address (default: 0.0.0.0)
    /// - `HTTP_PORT`: port (default: 5000)
    /// - `HTTP_TRACING`: request tracing (default: true)
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            host: lookup("HTTP_HOST").unwrap_or(defaults.host),
            port: parse_or(lookup, "HTTP_PORT", defaults.port)?,
            enable_tracing: parse_flag(lookup, "HTTP_TRACING", defaults.enable_tracing),
        })
    }

    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Build the application router.
///
/// Only `GET /users` is routed; other paths and methods get axum's defaults.
pub fn router<P: ConnectionProvider>(state: AppState<P>, config: &HttpConfig) -> Router {
    let router = Router::new()
        .route(USERS_PATH, get(list_users::<P>))
        .with_state(state);

    if config.enable_tracing {
        router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
    } else {
        router
    }
}

/// Bind the listener and serve until the shutdown signal fires.
pub async fn start_http_server<P: ConnectionProvider>(
    state: AppState<P>,
    config: HttpConfig,
    mut shutdown_signal: ShutdownSignal,
) -> Result<(), anyhow::Error> {
    let app = router(state, &config);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr).await?;

    info!("HTTP server listening on http://{}", addr);
    info!("Users endpoint: http://{}{}", addr, USERS_PATH);
    if config.enable_tracing {
        info!("Request tracing enabled");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal.recv().await;
            info!("HTTP server received shutdown signal");
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_http_config_defaults() {
        let config = HttpConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert!(config.enable_tracing);
    }

    #[test]
    fn test_http_config_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("HTTP_HOST", "127.0.0.1"),
            ("HTTP_PORT", "8081"),
            ("HTTP_TRACING", "false"),
        ]
        .into_iter()
        .collect();
        let config = HttpConfig::from_lookup(&|k: &str| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:8081");
        assert!(!config.enable_tracing);
    }

    #[test]
    fn test_http_config_invalid_port() {
        let err = HttpConfig::from_lookup(&|k: &str| (k == "HTTP_PORT").then(|| "99999".to_string()))
            .unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }
}
