//! Column decoding shared by the SQL repositories.
//!
//! The `Any` driver only moves primitive values, so UUIDs and timestamps are
//! stored as TEXT and booleans as INTEGER 0/1.

use crate::error::DbError;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::any::AnyRow;
use sqlx::{Row, ValueRef};
use tracing::error;
use uuid::Uuid;

pub(crate) fn query_error(context: &str, e: sqlx::Error) -> DbError {
    error!("{}: {}", context, e);
    DbError::QueryError(e.to_string())
}

pub(crate) fn get_string(row: &AnyRow, column: &str) -> Result<String, DbError> {
    row.try_get::<String, _>(column)
        .map_err(|e| DbError::DecodeError(format!("{}: {}", column, e)))
}

pub(crate) fn get_optional_string(row: &AnyRow, column: &str) -> Result<Option<String>, DbError> {
    if is_null(row, column)? {
        return Ok(None);
    }
    get_string(row, column).map(Some)
}

pub(crate) fn get_uuid(row: &AnyRow, column: &str) -> Result<Uuid, DbError> {
    parse_uuid(column, &get_string(row, column)?)
}

pub(crate) fn get_optional_uuid(row: &AnyRow, column: &str) -> Result<Option<Uuid>, DbError> {
    get_optional_string(row, column)?
        .map(|value| parse_uuid(column, &value))
        .transpose()
}

pub(crate) fn get_bool(row: &AnyRow, column: &str) -> Result<bool, DbError> {
    row.try_get::<i64, _>(column)
        .map(|v| v != 0)
        .map_err(|e| DbError::DecodeError(format!("{}: {}", column, e)))
}

pub(crate) fn get_optional_bool(row: &AnyRow, column: &str) -> Result<Option<bool>, DbError> {
    if is_null(row, column)? {
        return Ok(None);
    }
    get_bool(row, column).map(Some)
}

/// The `Any` driver refuses to decode NULL into `Option<T>`, so NULL is
/// detected on the raw value first.
fn is_null(row: &AnyRow, column: &str) -> Result<bool, DbError> {
    row.try_get_raw(column)
        .map(|value| value.is_null())
        .map_err(|e| DbError::DecodeError(format!("{}: {}", column, e)))
}

pub(crate) fn get_timestamp(row: &AnyRow, column: &str) -> Result<DateTime<Utc>, DbError> {
    parse_timestamp(column, &get_string(row, column)?)
}

pub(crate) fn get_optional_timestamp(
    row: &AnyRow,
    column: &str,
) -> Result<Option<DateTime<Utc>>, DbError> {
    get_optional_string(row, column)?
        .map(|value| parse_timestamp(column, &value))
        .transpose()
}

/// Fixed-width RFC 3339 so stored timestamps sort lexicographically.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

fn parse_uuid(column: &str, value: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::DecodeError(format!("{}: {}", column, e)))
}

fn parse_timestamp(column: &str, value: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| DbError::DecodeError(format!("{}: {}", column, e)))
}
