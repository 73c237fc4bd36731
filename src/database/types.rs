//! MySQL type mapping to JSON-serializable values.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::ser::{Serialize, Serializer};
use sqlx::mysql::types::MySqlTime;
use sqlx::mysql::MySqlRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

/// A SQL value that can be serialized to JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f32),
    Double(f64),
    /// DECIMAL as sent by the server, digit for digit.
    Decimal(String),
    String(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Timestamp(DateTime<Utc>),
    Json(serde_json::Value),
}

impl Serialize for SqlValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SqlValue::Null => serializer.serialize_unit(),
            SqlValue::Bool(v) => serializer.serialize_bool(*v),
            SqlValue::Int(v) => serializer.serialize_i64(*v),
            SqlValue::UInt(v) => serializer.serialize_u64(*v),
            SqlValue::Float(v) => serializer.serialize_f32(*v),
            SqlValue::Double(v) => serializer.serialize_f64(*v),
            SqlValue::Decimal(v) | SqlValue::String(v) => serializer.serialize_str(v),
            SqlValue::Bytes(v) => {
                serializer.serialize_str(&format!("0x{}", hex::encode_upper(v)))
            }
            SqlValue::Date(v) => v.serialize(serializer),
            SqlValue::Time(v) => v.serialize(serializer),
            SqlValue::DateTime(v) => v.serialize(serializer),
            SqlValue::Timestamp(v) => v.serialize(serializer),
            SqlValue::Json(v) => v.serialize(serializer),
        }
    }
}

/// How a MySQL column is decoded, keyed by the driver's type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Bool,
    Signed,
    Unsigned,
    Float,
    Double,
    Decimal,
    Date,
    Time,
    DateTime,
    Timestamp,
    Json,
    Binary,
    Text,
}

impl ColumnKind {
    /// Classify a MySQL type name as reported by the driver.
    ///
    /// Anything unrecognized (VARCHAR, TEXT, ENUM, SET, ...) decodes as text.
    pub fn of(type_name: &str) -> Self {
        match type_name {
            "BOOLEAN" => ColumnKind::Bool,
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => ColumnKind::Signed,
            "BIT" | "YEAR" => ColumnKind::Unsigned,
            name if name.ends_with(" UNSIGNED") => ColumnKind::Unsigned,
            "FLOAT" => ColumnKind::Float,
            "DOUBLE" => ColumnKind::Double,
            "DECIMAL" => ColumnKind::Decimal,
            "DATE" => ColumnKind::Date,
            "TIME" => ColumnKind::Time,
            "DATETIME" => ColumnKind::DateTime,
            "TIMESTAMP" => ColumnKind::Timestamp,
            "JSON" => ColumnKind::Json,
            "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB"
            | "GEOMETRY" => ColumnKind::Binary,
            _ => ColumnKind::Text,
        }
    }
}

/// Type mapper for converting MySQL row columns to [`SqlValue`]s.
pub struct TypeMapper;

impl TypeMapper {
    /// Extract a value from a row column.
    ///
    /// DECIMAL keeps the server's text, since DECIMAL(65) does not fit any
    /// Rust numeric type. TIME values outside a time of day (negative, or
    /// 24 hours and up) become interval text such as `"-838:59:59"`.
    ///
    /// If the typed decode fails, the column is read as UTF-8 text and then
    /// as raw bytes, bypassing the driver's column type checks.
    pub fn extract_column(row: &MySqlRow, idx: usize) -> Result<SqlValue, sqlx::Error> {
        if row.try_get_raw(idx)?.is_null() {
            return Ok(SqlValue::Null);
        }

        let kind = ColumnKind::of(row.column(idx).type_info().name());

        let decoded = match kind {
            ColumnKind::Bool => row.try_get::<bool, _>(idx).map(SqlValue::Bool),
            ColumnKind::Signed => row.try_get::<i64, _>(idx).map(SqlValue::Int),
            ColumnKind::Unsigned => row.try_get::<u64, _>(idx).map(SqlValue::UInt),
            ColumnKind::Float => row.try_get::<f32, _>(idx).map(SqlValue::Float),
            ColumnKind::Double => row.try_get::<f64, _>(idx).map(SqlValue::Double),
            ColumnKind::Decimal => row
                .try_get_unchecked::<String, _>(idx)
                .map(SqlValue::Decimal),
            ColumnKind::Date => row.try_get::<NaiveDate, _>(idx).map(SqlValue::Date),
            ColumnKind::Time => Self::extract_time(row, idx),
            ColumnKind::DateTime => row.try_get::<NaiveDateTime, _>(idx).map(SqlValue::DateTime),
            ColumnKind::Timestamp => row.try_get::<DateTime<Utc>, _>(idx).map(SqlValue::Timestamp),
            ColumnKind::Json => row.try_get::<serde_json::Value, _>(idx).map(SqlValue::Json),
            // GEOMETRY is not accepted by the driver's byte decoder
            ColumnKind::Binary => row.try_get_unchecked::<Vec<u8>, _>(idx).map(SqlValue::Bytes),
            ColumnKind::Text => row.try_get::<String, _>(idx).map(SqlValue::String),
        };

        decoded.or_else(|err| Self::fallback(row, idx).ok_or(err))
    }

    fn extract_time(row: &MySqlRow, idx: usize) -> Result<SqlValue, sqlx::Error> {
        let interval = row.try_get::<MySqlTime, _>(idx)?;
        Ok(match NaiveTime::try_from(interval) {
            Ok(time) => SqlValue::Time(time),
            Err(_) => SqlValue::String(interval.to_string()),
        })
    }

    fn fallback(row: &MySqlRow, idx: usize) -> Option<SqlValue> {
        if let Ok(v) = row.try_get_unchecked::<String, _>(idx) {
            return Some(SqlValue::String(v));
        }
        row.try_get_unchecked::<Vec<u8>, _>(idx)
            .ok()
            .map(SqlValue::Bytes)
    }
}
