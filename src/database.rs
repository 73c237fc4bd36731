//! Database connectivity and query execution.

mod connection;
mod query;
pub mod types;

pub use connection::{
    connect_options, ConnectionLease, ConnectionProvider, DbConnection, MySqlProvider,
    MySqlSession, OpenConnections,
};
pub use query::{fetch_rows, ResultRow};
pub use types::{ColumnKind, SqlValue, TypeMapper};
