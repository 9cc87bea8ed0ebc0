//! Logger mailer that only logs emails.
//!
//! Useful for staging environments or when you want to see what a campaign
//! would send without reaching any customer.

use async_trait::async_trait;

use crate::error::MailerError;
use crate::mailer::Mailer;

/// Logger mailer that emits tracing events instead of sending.
pub struct LoggerMailer {
    /// If true, also log the body. If false, just recipient and subject.
    log_full: bool,
}

impl LoggerMailer {
    /// Create a logger mailer with brief output.
    pub fn new() -> Self {
        Self { log_full: false }
    }

    /// Create a logger mailer that also logs bodies.
    pub fn full() -> Self {
        Self { log_full: true }
    }

    /// Set whether to log full email details.
    pub fn log_full(mut self, full: bool) -> Self {
        self.log_full = full;
        self
    }
}

impl Default for LoggerMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Mailer for LoggerMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailerError> {
        let message_id = uuid::Uuid::new_v4();

        if self.log_full {
            tracing::info!(
                message_id = %message_id,
                to = %to,
                subject = %subject,
                body_len = body.len(),
                "Email logged (full)"
            );
            tracing::debug!(body = %body, "Text body");
        } else {
            tracing::info!(message_id = %message_id, to = %to, subject = %subject, "Email logged");
        }

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "logger"
    }
}
