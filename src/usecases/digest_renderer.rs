//! Digest renderer. Turns weekly ContentItems into a self-contained HTML mail plus a
//! plain-text fallback.
//!
//! Pure and infallible: missing or malformed optional fields are left out of the
//! output, never reported as errors. The footer year is the only part that depends
//! on when rendering happens.

use crate::domain::{format_day_label, ContentItem, DigestDocument, VocabEntry, WeekLabel};
use chrono::{Datelike, Utc};

/// Service name shown in the header, subject and footer.
pub const BRAND: &str = "매일영어";

const STYLE: &str = r#"
    body { margin: 0; padding: 0; background-color: #f4f5f7; font-family: 'Apple SD Gothic Neo', 'Malgun Gothic', sans-serif; color: #222222; }
    .container { max-width: 600px; margin: 0 auto; padding: 24px 16px; }
    .header { text-align: center; padding: 24px 0 16px; }
    .brand { margin: 0; font-size: 14px; font-weight: bold; color: #4a6cf7; letter-spacing: 1px; }
    .header h1 { margin: 8px 0 4px; font-size: 22px; }
    .range { margin: 0; font-size: 13px; color: #888888; }
    .item { background-color: #ffffff; border-radius: 8px; padding: 20px; margin-bottom: 16px; }
    .date { margin: 0 0 8px; font-size: 12px; color: #888888; }
    .sentence { margin: 0 0 6px; font-size: 18px; font-weight: bold; }
    .meaning { margin: 0 0 12px; font-size: 15px; color: #555555; }
    .vocab { margin: 0 0 12px; padding: 10px 12px; background-color: #f0f3ff; border-radius: 6px; font-size: 14px; line-height: 1.6; }
    .video { display: inline-block; font-size: 14px; color: #4a6cf7; text-decoration: none; }
    .empty { text-align: center; color: #888888; }
    .footer { text-align: center; font-size: 12px; color: #aaaaaa; padding-top: 16px; }
"#;

const EMPTY_WEEK_NOTICE: &str = "이번 주에는 등록된 문장이 없습니다.";
const VIDEO_LINK_TEXT: &str = "영상 보기";

#[derive(Debug, Default, Clone, Copy)]
pub struct DigestRenderer;

impl DigestRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render with the current year in the copyright footer.
    pub fn render(&self, items: &[ContentItem], label: &WeekLabel) -> DigestDocument {
        self.render_for_year(items, label, Utc::now().year())
    }

    /// Deterministic rendering: identical inputs give byte-identical output.
    pub fn render_for_year(
        &self,
        items: &[ContentItem],
        label: &WeekLabel,
        year: i32,
    ) -> DigestDocument {
        let headline = label.headline();
        let subject = format!("[{}] {}", BRAND, headline);
        DigestDocument {
            html: render_html(items, label, &headline, &subject, year),
            text: render_text(items, label, &subject, year),
            subject,
        }
    }
}

fn render_html(
    items: &[ContentItem],
    label: &WeekLabel,
    headline: &str,
    subject: &str,
    year: i32,
) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(subject)));
    html.push_str(&format!("<style>{}</style>\n", STYLE));
    html.push_str("</head>\n<body>\n<div class=\"container\">\n");

    // Header
    html.push_str("<div class=\"header\">\n");
    html.push_str(&format!("<p class=\"brand\">{}</p>\n", BRAND));
    html.push_str(&format!("<h1>{}</h1>\n", escape_html(headline)));
    html.push_str(&format!(
        "<p class=\"range\">{}</p>\n",
        escape_html(&label.range_text)
    ));
    html.push_str("</div>\n");

    if items.is_empty() {
        html.push_str(&format!("<p class=\"empty\">{}</p>\n", EMPTY_WEEK_NOTICE));
    }

    for item in items {
        html.push_str("<div class=\"item\">\n");
        html.push_str(&format!(
            "<p class=\"date\">{}</p>\n",
            format_day_label(item.created_at)
        ));
        html.push_str(&format!(
            "<p class=\"sentence\">{}</p>\n",
            escape_html(&item.text)
        ));
        html.push_str(&format!(
            "<p class=\"meaning\">{}</p>\n",
            escape_html(&item.meaning)
        ));

        if !item.vocabulary.is_empty() {
            let lines: Vec<String> = item
                .vocabulary
                .iter()
                .map(|entry| escape_html(&vocab_line(entry)))
                .collect();
            html.push_str(&format!(
                "<div class=\"vocab\">{}</div>\n",
                lines.join("<br>")
            ));
        }

        if let Some(url) = video_link(item) {
            html.push_str(&format!(
                "<a class=\"video\" href=\"{}\" target=\"_blank\">{}</a>\n",
                escape_html(url),
                VIDEO_LINK_TEXT
            ));
        }
        html.push_str("</div>\n");
    }

    // Footer
    html.push_str("<div class=\"footer\">\n");
    html.push_str(&format!(
        "<p>이번 주도 {}와 함께해 주셔서 감사합니다.</p>\n",
        BRAND
    ));
    html.push_str(&format!(
        "<p>&copy; {} {}. All rights reserved.</p>\n",
        year, BRAND
    ));
    html.push_str("</div>\n</div>\n</body>\n</html>\n");

    html
}

fn render_text(items: &[ContentItem], label: &WeekLabel, subject: &str, year: i32) -> String {
    let mut text = String::new();
    text.push_str(&format!("{}\n{}\n\n", subject, label.range_text));

    if items.is_empty() {
        text.push_str(&format!("{}\n\n", EMPTY_WEEK_NOTICE));
    }

    for item in items {
        text.push_str(&format!("{}\n", format_day_label(item.created_at)));
        text.push_str(&format!("{}\n{}\n", item.text, item.meaning));
        for entry in &item.vocabulary {
            text.push_str(&format!("- {}\n", vocab_line(entry)));
        }
        if let Some(url) = video_link(item) {
            text.push_str(&format!("{}: {}\n", VIDEO_LINK_TEXT, url));
        }
        text.push('\n');
    }

    text.push_str(&format!("(c) {} {}\n", year, BRAND));
    text
}

/// `word: definition`, or just `word` when the definition is missing.
fn vocab_line(entry: &VocabEntry) -> String {
    match entry.definition.as_deref().map(str::trim) {
        Some(definition) if !definition.is_empty() => format!("{}: {}", entry.word, definition),
        _ => entry.word.clone(),
    }
}

/// The item's video URL when it is a usable http(s) link.
fn video_link(item: &ContentItem) -> Option<&str> {
    item.video_url
        .as_deref()
        .map(str::trim)
        .filter(|url| url.starts_with("https://") || url.starts_with("http://"))
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
