//! MySQL-backed content store via mysql_async. Implements ContentStore.
//!
//! Opens one connection per query and disconnects it before returning, on the
//! error path too. No pool: a run issues exactly two queries.

use super::{format_store_timestamp, parse_store_timestamp, with_timeout};
use crate::domain::{ContentRow, DomainError};
use crate::ports::ContentStore;
use crate::shared::config::MySqlSettings;
use chrono::{DateTime, Utc};
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Opts, OptsBuilder};
use std::time::Duration;
use tracing::{debug, warn};

const RECIPIENTS_QUERY: &str = "SELECT email FROM subscriber ORDER BY id";

const CONTENT_QUERY: &str = r#"
SELECT s.id,
       s.sentence,
       s.meaning,
       DATE_FORMAT(s.createdAt, '%Y-%m-%d %H:%i:%s'),
       v.id,
       v.word,
       v.definition,
       vd.videoUrl
FROM sentence s
LEFT JOIN vocab v ON v.sentenceId = s.id
LEFT JOIN video vd ON vd.sentenceId = s.id
WHERE s.createdAt >= ? AND s.createdAt < ?
ORDER BY s.createdAt, s.id, v.id
"#;

/// Every column is nullable here so a NULL never panics inside `FromRow`.
type RawContentRow = (
    i64,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<i64>,
    Option<String>,
    Option<String>,
    Option<String>,
);

/// MySQL store. Holds connection options only; no live connection between calls.
pub struct MySqlStore {
    opts: Opts,
    query_timeout: Duration,
}

impl MySqlStore {
    pub fn new(settings: &MySqlSettings, query_timeout: Duration) -> Self {
        let builder = OptsBuilder::default()
            .ip_or_hostname(settings.host.clone())
            .tcp_port(settings.port)
            .user(Some(settings.user.clone()))
            .pass(Some(settings.password.clone()))
            .db_name(Some(settings.database.clone()));
        Self {
            opts: Opts::from(builder),
            query_timeout,
        }
    }

    async fn connect(&self) -> Result<Conn, DomainError> {
        Conn::new(self.opts.clone())
            .await
            .map_err(|e| DomainError::DataUnavailable(format!("MySQL connect failed: {}", e)))
    }

    /// Disconnect, logging (not propagating) a failed goodbye.
    async fn release(conn: Conn) {
        if let Err(e) = conn.disconnect().await {
            warn!(error = %e, "MySQL disconnect failed");
        }
    }
}

#[async_trait::async_trait]
impl ContentStore for MySqlStore {
    async fn fetch_recipients(&self) -> Result<Vec<String>, DomainError> {
        with_timeout(self.query_timeout, "recipients query", async {
            let mut conn = self.connect().await?;
            let result: Result<Vec<Option<String>>, _> = conn.query(RECIPIENTS_QUERY).await;
            Self::release(conn).await;
            let raw = result
                .map_err(|e| DomainError::DataUnavailable(format!("recipients query: {}", e)))?;
            let emails = collect_emails(raw);
            debug!(count = emails.len(), "fetched recipients from MySQL");
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
            let mut conn = self.connect().await?;
            let result: Result<Vec<RawContentRow>, _> = conn
                .exec(
                    CONTENT_QUERY,
                    (format_store_timestamp(from), format_store_timestamp(to)),
                )
                .await;
            Self::release(conn).await;
            let raw =
                result.map_err(|e| DomainError::DataUnavailable(format!("content query: {}", e)))?;
            debug!(rows = raw.len(), "fetched content rows from MySQL");

            raw.into_iter().map(map_content_row).collect()
        })
        .await
    }
}

/// Drop NULL addresses; the aggregator handles blanks and duplicates.
fn collect_emails(raw: Vec<Option<String>>) -> Vec<String> {
    let total = raw.len();
    let emails: Vec<String> = raw.into_iter().flatten().collect();
    if emails.len() < total {
        warn!(skipped = total - emails.len(), "subscriber rows with NULL email skipped");
    }
    emails
}

/// NULL text columns become empty strings; a NULL `createdAt` cannot be placed in a week.
fn map_content_row(raw: RawContentRow) -> Result<ContentRow, DomainError> {
    let (id, sentence, meaning, created_at, vocab_id, vocab_word, vocab_definition, video_url) =
        raw;
    let created_at = created_at.ok_or_else(|| {
        DomainError::DataUnavailable(format!("sentence {} has NULL createdAt", id))
    })?;
    Ok(ContentRow {
        id,
        sentence: sentence.unwrap_or_default(),
        meaning: meaning.unwrap_or_default(),
        created_at: parse_store_timestamp(&created_at)?,
        vocab_id,
        vocab_word,
        vocab_definition,
        video_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_row(
        sentence: Option<&str>,
        meaning: Option<&str>,
        created_at: Option<&str>,
    ) -> RawContentRow {
        (
            7,
            sentence.map(String::from),
            meaning.map(String::from),
            created_at.map(String::from),
            Some(70),
            Some("leg".into()),
            None,
            None,
        )
    }

    #[test]
    fn test_null_text_columns_map_to_empty_strings() {
        let row = map_content_row(raw_row(None, None, Some("2025-05-12 09:00:00"))).unwrap();
        assert_eq!(row.id, 7);
        assert_eq!(row.sentence, "");
        assert_eq!(row.meaning, "");
        assert_eq!(row.created_at.to_string(), "2025-05-12 09:00:00");
        assert_eq!(row.vocab_id, Some(70));
        assert_eq!(row.vocab_word.as_deref(), Some("leg"));
        assert_eq!(row.vocab_definition, None);
    }

    #[test]
    fn test_null_created_at_is_data_unavailable() {
        let err = map_content_row(raw_row(Some("Break a leg"), Some("행운을 빌어"), None))
            .unwrap_err();
        assert!(matches!(err, DomainError::DataUnavailable(_)));
        assert!(err.to_string().contains("sentence 7"));
    }

    #[test]
    fn test_null_emails_are_skipped() {
        let emails = collect_emails(vec![
            Some("a@example.com".into()),
            None,
            Some("b@example.com".into()),
        ]);
        assert_eq!(emails, vec!["a@example.com", "b@example.com"]);
    }
}
