//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{ContentRow, DomainError, OutboundEmail};
use chrono::{DateTime, Utc};

/// Relational content store. Read-only from the digest's point of view.
///
/// Implementations acquire a connection per call and release it on every exit
/// path before returning.
#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    /// Subscriber addresses in insertion order. Empty is not an error.
    async fn fetch_recipients(&self) -> Result<Vec<String>, DomainError>;

    /// Sentence rows created in `[from, to)`, left-joined with vocabulary and video.
    ///
    /// One row per sentence x vocab x video match, ordered by creation time,
    /// sentence id, then vocabulary id.
    async fn fetch_content_rows(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ContentRow>, DomainError>;
}

/// Mail transport. One call sends one message to every address in `email.to`.
#[async_trait::async_trait]
pub trait MailPort: Send + Sync {
    /// Returns the transport-assigned message id.
    async fn send_email(&self, email: &OutboundEmail) -> Result<String, DomainError>;
}
