//! HTTP request handlers.
//!
//! The service has one route, `GET /users`, which runs the fixed users query
//! on a connection opened for that request alone.

use crate::constants::USERS_QUERY;
use crate::database::{ConnectionProvider, DbConnection, ResultRow};
use crate::error::ServerError;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// `GET /users`: every row of the users table as a JSON array.
pub async fn list_users<P: ConnectionProvider>(
    State(state): State<AppState<P>>,
) -> Result<Json<Vec<ResultRow>>, ServerError> {
    let rows = fetch_users(state.provider.as_ref(), state.query_timeout).await?;
    info!("Returning {} users", rows.len());
    Ok(Json(rows))
}

/// Acquire a connection, run the users query and close the connection.
///
/// The connection is closed on both the success and the failure path; a
/// failed close is logged and does not change the outcome.
pub async fn fetch_users<P: ConnectionProvider>(
    provider: &P,
    query_timeout: Duration,
) -> Result<Vec<ResultRow>, ServerError> {
    let mut conn = provider.acquire().await?;

    let fetched = match timeout(query_timeout, conn.fetch_all(USERS_QUERY)).await {
        Ok(result) => result,
        Err(_) => Err(ServerError::query_timeout(query_timeout.as_secs())),
    };

    if let Err(e) = conn.close().await {
        warn!("Failed to close database connection: {}", e.detail());
    }

    fetched.inspect_err(|e| error!("Query error: {}", e.detail()))
}
