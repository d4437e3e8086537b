//! SMTP delivery of notification messages.

use async_trait::async_trait;
use lettre::message::{header, Mailbox};
use lettre::transport::smtp::authentication::Credentials as SmtpCredentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use slotwatch_core::{Credentials, Error, Result, Settings};

use crate::message::NotificationMessage;

/// Outbound notification seam. The monitor only depends on this trait, so
/// delivery can be faked in tests and swapped without touching check logic.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &NotificationMessage) -> Result<()>;
}

/// Plain-text email over SMTP with STARTTLS, authenticated with the sender
/// credentials.
#[derive(Debug)]
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpNotifier {
    pub fn new(credentials: &Credentials, settings: &Settings) -> Result<Self> {
        let from: Mailbox = credentials.smtp_email.parse().map_err(|e| {
            Error::Notify(format!(
                "invalid sender address '{}': {e}",
                credentials.smtp_email
            ))
        })?;
        let to: Mailbox = credentials.notification_email.parse().map_err(|e| {
            Error::Notify(format!(
                "invalid notification address '{}': {e}",
                credentials.notification_email
            ))
        })?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)
            .map_err(|e| Error::Notify(format!("SMTP STARTTLS error: {e}")))?
            .credentials(SmtpCredentials::new(
                credentials.smtp_email.clone(),
                credentials.smtp_app_password.clone(),
            ))
            .port(settings.smtp_port)
            .build();

        Ok(Self { transport, from, to })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, message: &NotificationMessage) -> Result<()> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(message.subject.as_str())
            .header(header::ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| Error::Notify(format!("failed to build email: {e}")))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| Error::Notify(format!("failed to send email: {e}")))?;

        info!(subject = %message.subject, "Notification sent");
        Ok(())
    }
}
