//! Fetch recipients and weekly content; reshape flat joined rows into ContentItems.
//!
//! - Store rows repeat sentence fields once per vocab x video match
//! - Rows are folded by sentence id in first-appearance order
//! - Dates are converted to the same zone WeekCalculator used

use crate::domain::{ContentItem, ContentRow, DomainError, ReportingWeek, VocabEntry};
use crate::ports::ContentStore;
use chrono::TimeZone;
use chrono_tz::Tz;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};

pub struct ContentAggregator {
    store: Arc<dyn ContentStore>,
    tz: Tz,
}

impl ContentAggregator {
    pub fn new(store: Arc<dyn ContentStore>, tz: Tz) -> Self {
        Self { store, tz }
    }

    /// Current subscribers in store order. Blank and repeated addresses
    /// (case-insensitive) are dropped; the first occurrence wins.
    pub async fn fetch_recipients(&self) -> Result<Vec<String>, DomainError> {
        let raw = self.store.fetch_recipients().await?;
        let fetched = raw.len();
        let mut seen = HashSet::new();
        let recipients: Vec<String> = raw
            .into_iter()
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty())
            .filter(|email| seen.insert(email.to_lowercase()))
            .collect();
        info!(fetched, unique = recipients.len(), "fetched recipients");
        Ok(recipients)
    }

    /// Content items created during `week` (local calendar dates, inclusive).
    pub async fn fetch_content_for_week(
        &self,
        week: &ReportingWeek,
    ) -> Result<Vec<ContentItem>, DomainError> {
        let (from, to) = week.utc_bounds(self.tz);
        let rows = self.store.fetch_content_rows(from, to).await?;
        let row_count = rows.len();

        let mut items = reshape_rows(rows, self.tz);
        items.retain(|item| {
            let inside = week.contains(item.created_at);
            if !inside {
                warn!(
                    id = item.id,
                    created_at = %item.created_at,
                    "store returned content outside the reporting week; dropped"
                );
            }
            inside
        });

        info!(
            rows = row_count,
            items = items.len(),
            start = %week.start,
            end = %week.end,
            "aggregated weekly content"
        );
        Ok(items)
    }
}

/// Group flat rows by sentence id into one ContentItem each.
///
/// Vocabulary keeps row order and is deduplicated (a sentence with two videos
/// returns every vocab row twice). The first non-null video URL wins.
pub fn reshape_rows(rows: Vec<ContentRow>, tz: Tz) -> Vec<ContentItem> {
    let mut items: Vec<ContentItem> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();
    let mut seen_vocab: HashSet<(i64, i64)> = HashSet::new();

    for row in rows {
        let pos = *index.entry(row.id).or_insert_with(|| {
            items.push(ContentItem {
                id: row.id,
                text: row.sentence.clone(),
                meaning: row.meaning.clone(),
                created_at: tz.from_utc_datetime(&row.created_at).date_naive(),
                vocabulary: Vec::new(),
                video_url: None,
            });
            items.len() - 1
        });
        let item = &mut items[pos];

        if item.video_url.is_none() {
            item.video_url = row.video_url;
        }

        let Some(word) = row.vocab_word.filter(|w| !w.trim().is_empty()) else {
            continue;
        };
        let entry = VocabEntry {
            word,
            definition: row.vocab_definition,
        };
        let duplicate = match row.vocab_id {
            Some(vocab_id) => !seen_vocab.insert((row.id, vocab_id)),
            None => item.vocabulary.contains(&entry),
        };
        if !duplicate {
            item.vocabulary.push(entry);
        }
    }

    items
}
