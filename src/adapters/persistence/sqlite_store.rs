//! SQLite-backed content store via libsql. Implements ContentStore for local runs.
//!
//! Expects the same tables as the MySQL store (`subscriber`, `sentence`, `vocab`, `video`),
//! with `createdAt` stored as UTC text, either `YYYY-MM-DD HH:MM:SS` or ISO-8601
//! (`2025-05-12T00:00:00.000Z`). Both sides of the range check go through `datetime()`
//! so the two layouts compare as instants. Does not create or migrate the schema.

use super::{format_store_timestamp, parse_store_timestamp, with_timeout};
use crate::domain::{ContentRow, DomainError};
use crate::ports::ContentStore;
use chrono::{DateTime, Utc};
use libsql::{params, Connection, Database};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const RECIPIENTS_QUERY: &str = "SELECT email FROM subscriber ORDER BY id";

const CONTENT_QUERY: &str = r#"
SELECT s.id, s.sentence, s.meaning, s.createdAt, v.id, v.word, v.definition, vd.videoUrl
FROM sentence s
LEFT JOIN vocab v ON v.sentenceId = s.id
LEFT JOIN video vd ON vd.sentenceId = s.id
WHERE datetime(s.createdAt) >= datetime(?1) AND datetime(s.createdAt) < datetime(?2)
ORDER BY datetime(s.createdAt), s.id, v.id
"#;

pub struct SqliteStore {
    db: Database,
    db_path: PathBuf,
    query_timeout: Duration,
}

impl SqliteStore {
    /// Open an existing database file.
    pub async fn open(
        path: impl AsRef<Path>,
        query_timeout: Duration,
    ) -> Result<Self, DomainError> {
        let db_path = path.as_ref().to_path_buf();
        if !db_path.exists() {
            return Err(DomainError::DataUnavailable(format!(
                "SQLite database not found: {}",
                db_path.display()
            )));
        }
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(|e| DomainError::DataUnavailable(e.to_string()))?;
        info!(path = %db_path.display(), "SQLite content store opened");
        Ok(Self {
            db,
            db_path,
            query_timeout,
        })
    }

    /// Connection scoped to one query; dropped (closed) when the caller returns.
    fn connect(&self) -> Result<Connection, DomainError> {
        self.db.connect().map_err(|e| {
            DomainError::DataUnavailable(format!("{}: {}", self.db_path.display(), e))
        })
    }
}

#[async_trait::async_trait]
impl ContentStore for SqliteStore {
    async fn fetch_recipients(&self) -> Result<Vec<String>, DomainError> {
        with_timeout(self.query_timeout, "recipients query", async {
            let conn = self.connect()?;
            let mut rows = conn
                .query(RECIPIENTS_QUERY, ())
                .await
                .map_err(|e| DomainError::DataUnavailable(e.to_string()))?;
            let mut emails = Vec::new();
            while let Some(row) = rows
                .next()
                .await
                .map_err(|e| DomainError::DataUnavailable(e.to_string()))?
            {
                let email: String = row
                    .get(0)
                    .map_err(|e| DomainError::DataUnavailable(e.to_string()))?;
                emails.push(email);
            }
            debug!(count = emails.len(), "fetched recipients from SQLite");
            Ok(emails)
        })
        .await
    }

    async fn fetch_content_rows(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ContentRow>, DomainError> {
        with_timeout(self.query_timeout, "content query", async {
            let conn = self.connect()?;
            let mut rows = conn
                .query(
                    CONTENT_QUERY,
                    params![format_store_timestamp(from), format_store_timestamp(to)],
                )
                .await
                .map_err(|e| DomainError::DataUnavailable(e.to_string()))?;
            let mut out = Vec::new();
            while let Some(row) = rows
                .next()
                .await
                .map_err(|e| DomainError::DataUnavailable(e.to_string()))?
            {
                let id: i64 = row
                    .get(0)
                    .map_err(|e| DomainError::DataUnavailable(e.to_string()))?;
                let created_at: String = row
                    .get(3)
                    .map_err(|e| DomainError::DataUnavailable(e.to_string()))?;
                out.push(ContentRow {
                    id,
                    sentence: row.get::<String>(1).unwrap_or_default(),
                    meaning: row.get::<String>(2).unwrap_or_default(),
                    created_at: parse_store_timestamp(&created_at)?,
                    vocab_id: row.get::<i64>(4).ok(),
                    vocab_word: row.get::<String>(5).ok(),
                    vocab_definition: row.get::<String>(6).ok(),
                    video_url: row.get::<String>(7).ok(),
                });
            }
            debug!(rows = out.len(), "fetched content rows from SQLite");
            Ok(out)
        })
        .await
    }
}
