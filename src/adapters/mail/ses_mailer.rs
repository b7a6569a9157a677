//! Amazon SES (v2) adapter. Implements MailPort with a single SendEmail call.

use crate::domain::{DomainError, OutboundEmail};
use crate::ports::MailPort;
use aws_sdk_sesv2::config::Region;
use aws_sdk_sesv2::error::DisplayErrorContext;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use aws_sdk_sesv2::Client;
use tracing::info;

const CHARSET: &str = "UTF-8";

/// SES v2 mailer. Credentials come from the default AWS provider chain.
pub struct SesMailer {
    client: Client,
}

impl SesMailer {
    /// Build a client for `region` from the ambient AWS environment.
    pub async fn from_env(region: String) -> Self {
        let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(region))
            .load()
            .await;
        Self {
            client: Client::new(&shared),
        }
    }

    fn utf8_content(data: &str) -> Result<Content, DomainError> {
        Content::builder()
            .data(data)
            .charset(CHARSET)
            .build()
            .map_err(|e| DomainError::DispatchFailed(format!("invalid message content: {}", e)))
    }
}

#[async_trait::async_trait]
impl MailPort for SesMailer {
    async fn send_email(&self, email: &OutboundEmail) -> Result<String, DomainError> {
        let body = Body::builder()
            .html(Self::utf8_content(&email.html)?)
            .text(Self::utf8_content(&email.text)?)
            .build();
        let message = Message::builder()
            .subject(Self::utf8_content(&email.subject)?)
            .body(body)
            .build();
        let destination = Destination::builder()
            .set_to_addresses(Some(email.to.clone()))
            .build();

        let output = self
            .client
            .send_email()
            .from_email_address(&email.from)
            .destination(destination)
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .map_err(|e| DomainError::DispatchFailed(DisplayErrorContext(&e).to_string()))?;

        let message_id = output.message_id().unwrap_or_default().to_string();
        info!(message_id = %message_id, recipients = email.to.len(), "SES accepted digest");
        Ok(message_id)
    }
}
