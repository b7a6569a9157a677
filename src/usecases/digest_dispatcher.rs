//! Send a rendered digest to all recipients in one message. Delegates to MailPort.

use crate::domain::{DigestDocument, DispatchReceipt, DomainError, OutboundEmail};
use crate::ports::MailPort;
use std::sync::Arc;
use tracing::info;

pub struct DigestDispatcher {
    mail: Arc<dyn MailPort>,
    sender: String,
}

impl DigestDispatcher {
    pub fn new(mail: Arc<dyn MailPort>, sender: String) -> Self {
        Self { mail, sender }
    }

    /// One transport call with every recipient on `To`. No retry on failure.
    ///
    /// # Errors
    /// `PreconditionViolation` if `recipients` is empty (callers skip earlier);
    /// `DispatchFailed` if the transport rejects the message.
    pub async fn send(
        &self,
        recipients: &[String],
        document: DigestDocument,
    ) -> Result<DispatchReceipt, DomainError> {
        if recipients.is_empty() {
            return Err(DomainError::PreconditionViolation(
                "dispatch called with no recipients".to_string(),
            ));
        }

        let email = OutboundEmail {
            from: self.sender.clone(),
            to: recipients.to_vec(),
            subject: document.subject,
            html: document.html,
            text: document.text,
        };
        let message_id = self.mail.send_email(&email).await?;

        info!(
            message_id = %message_id,
            recipients = recipients.len(),
            "digest dispatched"
        );
        Ok(DispatchReceipt {
            message_id,
            recipient_count: recipients.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mail::LogMailer;

    struct RejectingMailer;

    #[async_trait::async_trait]
    impl MailPort for RejectingMailer {
        async fn send_email(&self, _email: &OutboundEmail) -> Result<String, DomainError> {
            Err(DomainError::DispatchFailed("MessageRejected: address not verified".into()))
        }
    }

    fn document() -> DigestDocument {
        DigestDocument {
            subject: "[매일영어] 5월 2주차 주간 영어 문장".into(),
            html: "<html><body>Mocked sentence</body></html>".into(),
            text: "Mocked sentence".into(),
        }
    }

    #[tokio::test]
    async fn test_send_addresses_all_recipients_in_one_message() {
        let mailer = Arc::new(LogMailer::new());
        let dispatcher = DigestDispatcher::new(mailer.clone(), "digest@example.com".into());
        let recipients = vec!["a@example.com".to_string(), "b@example.com".to_string()];

        let receipt = dispatcher.send(&recipients, document()).await.unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, recipients);
        assert_eq!(sent[0].from, "digest@example.com");
        assert_eq!(sent[0].subject, document().subject);
        assert_eq!(receipt.recipient_count, 2);
        assert!(!receipt.message_id.is_empty());
    }

    #[tokio::test]
    async fn test_empty_recipients_is_precondition_violation() {
        let mailer = Arc::new(LogMailer::new());
        let dispatcher = DigestDispatcher::new(mailer.clone(), "digest@example.com".into());

        let err = dispatcher.send(&[], document()).await.unwrap_err();

        assert!(matches!(err, DomainError::PreconditionViolation(_)));
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_is_dispatch_failed() {
        let dispatcher =
            DigestDispatcher::new(Arc::new(RejectingMailer), "digest@example.com".into());
        let err = dispatcher
            .send(&["a@example.com".to_string()], document())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "DispatchFailed");
    }
}
