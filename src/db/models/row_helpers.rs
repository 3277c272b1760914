//! Row decoding helpers
//!
//! Money lives in TEXT columns as canonical decimal strings and timestamps
//! in INTEGER columns as UTC epoch milliseconds; these helpers decode both
//! into their domain types with proper column-level errors.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Row, sqlite::SqliteRow};
use std::str::FromStr;

/// Decode a TEXT column holding a canonical decimal string.
pub fn decimal_column(row: &SqliteRow, column: &'static str) -> Result<Decimal, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    Decimal::from_str(&raw).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.into(),
        source: Box::new(e),
    })
}

/// Decode an INTEGER column holding UTC epoch milliseconds.
pub fn datetime_column(row: &SqliteRow, column: &'static str) -> Result<DateTime<Utc>, sqlx::Error> {
    let ms: i64 = row.try_get(column)?;
    DateTime::from_timestamp_millis(ms).ok_or_else(|| sqlx::Error::ColumnDecode {
        index: column.into(),
        source: format!("timestamp out of range: {ms}").into(),
    })
}
