//! # users-api
//!
//! A read-only HTTP service exposing a MySQL `users` table as JSON.
//!
//! ## Architecture
//!
//! - **Connection provider** ([`database::MySqlProvider`]): opens one
//!   TLS-verified connection per request; no pooling
//! - **Request handler** ([`handlers::list_users`]): runs `SELECT * FROM users`,
//!   closes the connection on every path and returns the rows as a JSON array
//! - Failures are [`ServerError`] values that render as a fixed
//!   `{"error": ...}` body with status 500

pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod handlers;
pub mod server;
pub mod shutdown;
pub mod state;
pub mod telemetry;

pub use config::{Config, DatabaseConfig};
pub use error::ServerError;
pub use server::{router, start_http_server, HttpConfig};
pub use state::AppState;
