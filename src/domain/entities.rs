//! Domain entities. Pure data structures for the digest.
//!
//! No database/mail types here; adapters map into these.

use chrono::{NaiveDate, NaiveDateTime};

/// Monday-to-Sunday calendar range a digest run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingWeek {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Human-readable label of a reporting week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekLabel {
    pub month: u32,
    pub week_of_month: u32,
    /// `YYYY. MM. DD. ~ YYYY. MM. DD.`
    pub range_text: String,
}

impl WeekLabel {
    /// Phrase shared by the mail subject and the HTML header.
    pub fn headline(&self) -> String {
        format!("{}월 {}주차 주간 영어 문장", self.month, self.week_of_month)
    }
}

/// A vocabulary note attached to exactly one content item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabEntry {
    pub word: String,
    pub definition: Option<String>,
}

/// One sentence-style learning unit with optional vocabulary and video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    pub id: i64,
    pub text: String,
    pub meaning: String,
    /// Calendar date in the target time zone.
    pub created_at: NaiveDate,
    pub vocabulary: Vec<VocabEntry>,
    pub video_url: Option<String>,
}

/// Flat row as returned by the store: sentence fields repeated per joined vocab/video match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRow {
    pub id: i64,
    pub sentence: String,
    pub meaning: String,
    /// Creation instant in UTC.
    pub created_at: NaiveDateTime,
    pub vocab_id: Option<i64>,
    pub vocab_word: Option<String>,
    pub vocab_definition: Option<String>,
    pub video_url: Option<String>,
}

/// Rendered message bundle, consumed once by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestDocument {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Fully addressed message handed to the mail port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Result of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReceipt {
    /// Transport-assigned message identifier.
    pub message_id: String,
    pub recipient_count: usize,
}
