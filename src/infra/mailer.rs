//! Outbound mail.
//!
//! One plaintext message per recovery request, delivered over an encrypted
//! SMTP session. Sender credentials come from process configuration; a
//! missing configuration is reported when a send is attempted, never at
//! startup.

use async_trait::async_trait;
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::SmtpConfig;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Outbound-mail abstraction so services can be tested without SMTP.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one plaintext message
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()>;
}

/// SMTP-backed mailer using an implicit-TLS relay.
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        if !self.config.is_configured() {
            return Err(AppError::mail(
                "the system sender is not configured (SMTP_HOST / SMTP_FROM)",
            ));
        }

        // is_configured() guarantees host and from are present
        let host = self.config.host.clone().unwrap_or_default();
        let from = self.config.from.clone().unwrap_or_default();

        let email = Message::builder()
            .from(from.parse().map_err(|e| AppError::mail(format!("invalid sender address: {}", e)))?)
            .to(to.parse().map_err(|e| AppError::mail(format!("invalid recipient address: {}", e)))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::mail(format!("failed to build message: {}", e)))?;

        let creds = Credentials::new(
            self.config.username.clone().unwrap_or_default(),
            self.config.password.clone().unwrap_or_default(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&host)
            .map_err(|e| AppError::mail(format!("relay {}: {}", host, e)))?
            .port(self.config.port)
            .credentials(creds)
            .build();

        mailer
            .send(email)
            .await
            .map_err(|e| AppError::mail(format!("SMTP delivery via {}: {}", host, e)))?;

        tracing::info!(to, subject, "Recovery mail sent");
        Ok(())
    }
}
