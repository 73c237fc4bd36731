//! Query execution and result handling.

use crate::database::types::{SqlValue, TypeMapper};
use crate::error::ServerError;
use serde::ser::{Serialize, SerializeMap, Serializer};
use sqlx::mysql::{MySqlConnection, MySqlRow};
use sqlx::{Column, Row};
use std::time::Instant;
use tracing::debug;

/// A single row of query results.
///
/// Columns keep the order of the result set, so the serialized JSON object
/// lists keys in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultRow {
    columns: Vec<(String, SqlValue)>,
}

impl ResultRow {
    /// Create a new result row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value by column name.
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Append a column value.
    pub fn insert(&mut self, column: impl Into<String>, value: SqlValue) {
        self.columns.push((column.into(), value));
    }

    /// Column names in result-set order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Convert a driver row, decoding every column.
    pub fn from_mysql(row: &MySqlRow) -> Result<Self, sqlx::Error> {
        let mut result_row = ResultRow::new();
        for (idx, col) in row.columns().iter().enumerate() {
            let value = TypeMapper::extract_column(row, idx)?;
            result_row.insert(col.name(), value);
        }
        Ok(result_row)
    }
}

impl<K: Into<String>> FromIterator<(K, SqlValue)> for ResultRow {
    fn from_iter<I: IntoIterator<Item = (K, SqlValue)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl Serialize for ResultRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Execute a query on an open connection and materialize every row.
///
/// All-or-nothing: a failure on any row discards the rows already read.
pub async fn fetch_rows(
    conn: &mut MySqlConnection,
    query: &str,
) -> Result<Vec<ResultRow>, ServerError> {
    let start = Instant::now();

    debug!("Executing query: {}", truncate_for_log(query, 200));

    let raw_rows = sqlx::query(query)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| ServerError::query_with_source("Query execution failed", e))?;

    let rows = raw_rows
        .iter()
        .map(ResultRow::from_mysql)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ServerError::query_with_source("Failed to decode row", e))?;

    debug!(
        "Query completed: {} rows in {} ms",
        rows.len(),
        start.elapsed().as_millis()
    );

    Ok(rows)
}

/// Truncate a string for logging purposes.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let mut end = max_len;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}
