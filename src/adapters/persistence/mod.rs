//! Content store adapters. Implement ContentStore for MySQL and local SQLite.

pub mod mysql_store;
pub mod sqlite_store;

pub use mysql_store::MySqlStore;
pub use sqlite_store::SqliteStore;

use crate::domain::DomainError;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::future::Future;
use std::time::Duration;

/// Timestamp layout used for query parameters and DATE_FORMAT output.
pub(crate) const STORE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn format_store_timestamp(instant: DateTime<Utc>) -> String {
    instant.format(STORE_TIMESTAMP_FORMAT).to_string()
}

/// Parse a UTC creation timestamp as stored (`2025-05-12 00:00:00` or ISO-8601 with `T`/`Z`).
pub(crate) fn parse_store_timestamp(raw: &str) -> Result<NaiveDateTime, DomainError> {
    let trimmed = raw.trim().trim_end_matches('Z');
    NaiveDateTime::parse_from_str(trimmed, STORE_TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|e| DomainError::DataUnavailable(format!("bad createdAt {:?}: {}", raw, e)))
}

/// Bound a store call so a stuck query cannot hang the run.
pub(crate) async fn with_timeout<T, F>(
    timeout: Duration,
    what: &str,
    fut: F,
) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    tokio::time::timeout(timeout, fut).await.map_err(|_| {
        DomainError::DataUnavailable(format!("{} timed out after {:?}", what, timeout))
    })?
}
