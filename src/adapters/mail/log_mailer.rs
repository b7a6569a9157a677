//! Dry-run mailer. Logs the message instead of sending it.
//!
//! Used when DIGEST_DRY_RUN is set, and as the mail port in tests: it records every
//! message it was asked to send.

use crate::domain::{DomainError, OutboundEmail};
use crate::ports::MailPort;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

#[derive(Default)]
pub struct LogMailer {
    sent: Mutex<Vec<OutboundEmail>>,
}

impl LogMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages accepted so far, in send order.
    ///
    /// # Panics
    /// If a sender panicked while holding the mailbox lock.
    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().expect("dry-run mailbox poisoned").clone()
    }
}

#[async_trait::async_trait]
impl MailPort for LogMailer {
    async fn send_email(&self, email: &OutboundEmail) -> Result<String, DomainError> {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let mut sent = self
            .sent
            .lock()
            .map_err(|_| DomainError::DispatchFailed("dry-run mailbox poisoned".into()))?;
        sent.push(email.clone());
        let message_id = format!("dry-run-{}-{}", millis, sent.len());

        info!(
            message_id = %message_id,
            from = %email.from,
            recipients = email.to.len(),
            subject = %email.subject,
            html_len = email.html.len(),
            "[DRY RUN] digest not sent"
        );
        Ok(message_id)
    }
}
