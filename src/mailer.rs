//! Mailer trait: the single-message delivery capability.
//!
//! # Architecture: Why `async_trait`?
//!
//! The dispatcher holds its mailer as `Arc<dyn Mailer>` and moves clones of it
//! into one task per recipient. Native async traits are not object-safe, so the
//! trait goes through `#[async_trait]`, which boxes each returned future.
//!
//! Sending is I/O-bound: one heap allocation per call disappears next to a
//! 50-500ms provider round trip.
//!
//! Dynamic dispatch lets the provider be chosen from configuration at startup
//! (see [`MailerConfig`](crate::MailerConfig)) and lets tests substitute a
//! [`LocalMailer`](crate::providers::LocalMailer) without touching the dispatcher.

use async_trait::async_trait;

use crate::error::MailerError;

/// Trait for email delivery providers.
///
/// Implementations send exactly one plain-text message per call and never
/// retry. Malformed input is not rejected up front: whatever the provider
/// answers is reported as [`MailerError::Rejected`].
///
/// # Example
///
/// ```rust,ignore
/// use bulkmail::{Mailer, MailerConfig};
///
/// let mailer = ResendMailer::new(MailerConfig::from_env()?);
/// mailer.send("jane@example.com", "Spring sale", "20% off this week").await?;
/// ```
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one message to one recipient.
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailerError>;

    /// Get the provider name (for logging/metrics).
    fn provider_name(&self) -> &'static str {
        "unknown"
    }

    /// Check that required configuration is present.
    ///
    /// Providers that need credentials return [`MailerError::NotConfigured`]
    /// here and from every [`send`](Mailer::send) until they are supplied.
    fn validate_config(&self) -> Result<(), MailerError> {
        Ok(())
    }
}
