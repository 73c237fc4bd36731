//! Centralized constants for the users API.
//!
//! Default values and fixed strings used throughout the codebase.

use std::time::Duration;

// =============================================================================
// Timeout Constants
// =============================================================================

/// Default connection timeout in seconds.
pub const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 30;

/// Default query timeout in seconds.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

/// Default connection timeout as Duration.
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(DEFAULT_CONNECTION_TIMEOUT_SECS);

/// Default query timeout as Duration.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS);

// =============================================================================
// Network Constants
// =============================================================================

/// Default MySQL server port.
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Default HTTP bind address (all interfaces).
pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";

/// Default HTTP port.
pub const DEFAULT_HTTP_PORT: u16 = 5000;

// =============================================================================
// Query Constants
// =============================================================================

/// The only query this service runs.
pub const USERS_QUERY: &str = "SELECT * FROM users";

/// Route serving the users table.
pub const USERS_PATH: &str = "/users";

// =============================================================================
// Client-facing Error Messages
// =============================================================================

/// Body message when the database connection cannot be established.
pub const CONNECTION_ERROR_MESSAGE: &str = "Database connection error";

/// Body message when the query or row materialization fails.
pub const QUERY_ERROR_MESSAGE: &str = "Failed to fetch data";

/// Body message for any other server-side failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
