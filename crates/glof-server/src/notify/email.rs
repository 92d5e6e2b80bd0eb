use std::time::Instant;

use async_trait::async_trait;
use futures::future::join_all;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use glof_core::message::render_email_html;

use super::{EmailReport, EmailSender};
use crate::config::EmailConfig;
use crate::error::{AppError, AppResult};

// ============================================================================
// SMTP Mailer - STARTTLS relay with one message per recipient
// ============================================================================

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig) -> AppResult<Self> {
        let sender = if config.from.is_empty() {
            &config.username
        } else {
            &config.from
        };
        let from: Mailbox = sender
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid sender address '{}': {}", sender, e)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| AppError::Config(format!("Invalid SMTP relay {}: {}", config.smtp_host, e)))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        println!(
            "[EMAIL] SMTP relay {}:{} as {}",
            config.smtp_host, config.smtp_port, from
        );

        Ok(Self { transport, from })
    }

    fn build_message(&self, recipient: &str, subject: &str, body: &str) -> AppResult<Message> {
        let to: Mailbox = recipient
            .parse()
            .map_err(|e| AppError::Notification(format!("Invalid recipient {}: {}", recipient, e)))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(
                body.to_string(),
                render_email_html(body),
            ))
            .map_err(|e| AppError::Notification(format!("Failed to build email: {}", e)))
    }

    async fn send_one(&self, recipient: &str, subject: &str, body: &str) -> AppResult<()> {
        let message = self.build_message(recipient, subject, body)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::Notification(format!("SMTP delivery failed: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl EmailSender for SmtpMailer {
    async fn send(&self, recipients: &[String], subject: &str, body: &str) -> AppResult<EmailReport> {
        let start = Instant::now();

        let results = join_all(
            recipients
                .iter()
                .map(|recipient| self.send_one(recipient, subject, body)),
        )
        .await;

        let mut report = EmailReport::default();
        for (recipient, result) in recipients.iter().zip(results) {
            match result {
                Ok(()) => report.successful_sends += 1,
                Err(e) => {
                    tracing::error!(recipient = %recipient, error = %e, "Failed to send alert email");
                    report.failed_recipients.push(recipient.clone());
                }
            }
        }

        tracing::info!(
            sent = %report.successful_sends,
            failed = %report.failed_recipients.len(),
            duration_ms = %start.elapsed().as_millis(),
            "Alert emails processed"
        );

        Ok(report)
    }
}
