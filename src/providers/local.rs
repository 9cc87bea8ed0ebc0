//! Local mailer for development and testing.
//!
//! Captures every message in memory for programmatic assertions, and can be
//! told to fail or stall for chosen recipients to exercise partial-failure
//! and ordering paths of a campaign.
//!
//! # Testing Usage
//!
//! ```rust,ignore
//! use bulkmail::providers::LocalMailer;
//! use bulkmail::testing::*;
//!
//! #[tokio::test]
//! async fn test_newsletter_reaches_everyone() {
//!     let mailer = LocalMailer::new();
//!     mailer.fail_for("bounce@example.com", MailerError::Rejected("mailbox full".into()));
//!
//!     // Code under test
//!     dispatcher(mailer.clone()).dispatch(&account, "News", "Hello").await?;
//!
//!     assert_email_count(&mailer, 2);
//!     assert_no_emails_to(&mailer, "bounce@example.com");
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::MailerError;
use crate::mailer::Mailer;

/// A message captured by [`LocalMailer`].
#[derive(Debug, Clone)]
pub struct SentEmail {
    /// Unique identifier
    pub id: String,
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// Plain text body
    pub body: String,
    /// When the message was "sent"
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Inner {
    /// Delivered messages in send order.
    sent: RwLock<Vec<SentEmail>>,
    /// Every address send() was called with, including failures.
    attempts: RwLock<Vec<String>>,
    /// If set, every send fails with this error.
    fail_with: RwLock<Option<MailerError>>,
    /// Per-address failures, keyed by lowercase address.
    fail_for: RwLock<HashMap<String, MailerError>>,
    delay: RwLock<Option<Duration>>,
    /// Per-address delays, keyed by lowercase address.
    delay_for: RwLock<HashMap<String, Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// Local mailer that stores emails in memory.
///
/// Clones share captured mail and failure settings.
#[derive(Debug, Clone, Default)]
pub struct LocalMailer {
    inner: Arc<Inner>,
}

impl LocalMailer {
    /// Create a new local mailer with an empty mailbox.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Failure Simulation (for testing)
    // =========================================================================

    /// Make every send fail as rejected with `message`.
    pub fn set_failure(&self, message: impl Into<String>) {
        self.fail_with_error(MailerError::Rejected(message.into()));
    }

    /// Make every send fail with `error`.
    pub fn fail_with_error(&self, error: MailerError) {
        *self.inner.fail_with.write() = Some(error);
    }

    /// Make sends to `address` fail with `error`.
    pub fn fail_for(&self, address: &str, error: MailerError) {
        self.inner
            .fail_for
            .write()
            .insert(address.to_ascii_lowercase(), error);
    }

    /// Clear all failure settings.
    pub fn clear_failure(&self) {
        *self.inner.fail_with.write() = None;
        self.inner.fail_for.write().clear();
    }

    /// Delay every send by `delay`.
    pub fn set_delay(&self, delay: Duration) {
        *self.inner.delay.write() = Some(delay);
    }

    /// Delay sends to `address` by `delay`. Overrides [`set_delay`](Self::set_delay).
    pub fn delay_for(&self, address: &str, delay: Duration) {
        self.inner
            .delay_for
            .write()
            .insert(address.to_ascii_lowercase(), delay);
    }

    fn failure_for(&self, address: &str) -> Option<MailerError> {
        if let Some(err) = self.inner.fail_for.read().get(&address.to_ascii_lowercase()) {
            return Some(err.clone());
        }
        self.inner.fail_with.read().clone()
    }

    fn delay_of(&self, address: &str) -> Option<Duration> {
        if let Some(delay) = self.inner.delay_for.read().get(&address.to_ascii_lowercase()) {
            return Some(*delay);
        }
        *self.inner.delay.read()
    }

    // =========================================================================
    // Email Access (for testing assertions)
    // =========================================================================

    /// Get all captured emails, in send order.
    pub fn emails(&self) -> Vec<SentEmail> {
        self.inner.sent.read().clone()
    }

    /// Get the most recently sent email.
    pub fn last_email(&self) -> Option<SentEmail> {
        self.inner.sent.read().last().cloned()
    }

    /// Get the count of delivered emails.
    pub fn email_count(&self) -> usize {
        self.inner.sent.read().len()
    }

    /// Check if any email was delivered.
    pub fn has_emails(&self) -> bool {
        self.email_count() > 0
    }

    /// Every address `send` was called with, failures included, in call order.
    pub fn attempts(&self) -> Vec<String> {
        self.inner.attempts.read().clone()
    }

    /// Number of `send` calls, failures included.
    pub fn attempt_count(&self) -> usize {
        self.inner.attempts.read().len()
    }

    /// Highest number of sends that were in progress at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.inner.max_in_flight.load(Ordering::SeqCst)
    }

    /// Clear captured emails and attempts.
    pub fn clear(&self) {
        self.inner.sent.write().clear();
        self.inner.attempts.write().clear();
        self.inner.max_in_flight.store(0, Ordering::SeqCst);
    }

    /// Remove and return all captured emails.
    pub fn flush(&self) -> Vec<SentEmail> {
        std::mem::take(&mut *self.inner.sent.write())
    }

    // =========================================================================
    // Query Helpers (for testing)
    // =========================================================================

    /// Check if an email was delivered to a specific address.
    pub fn sent_to(&self, address: &str) -> bool {
        self.inner
            .sent
            .read()
            .iter()
            .any(|e| e.to.eq_ignore_ascii_case(address))
    }

    /// Check if an email with matching subject was delivered.
    pub fn sent_with_subject(&self, subject: &str) -> bool {
        self.inner.sent.read().iter().any(|e| e.subject == subject)
    }

    /// Find emails matching a predicate.
    pub fn find_emails<F>(&self, predicate: F) -> Vec<SentEmail>
    where
        F: Fn(&SentEmail) -> bool,
    {
        self.inner
            .sent
            .read()
            .iter()
            .filter(|e| predicate(e))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Mailer for LocalMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailerError> {
        self.inner.attempts.write().push(to.to_string());

        let in_flight = self.inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        if let Some(delay) = self.delay_of(to) {
            tokio::time::sleep(delay).await;
        }

        self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(err) = self.failure_for(to) {
            return Err(err);
        }

        self.inner.sent.write().push(SentEmail {
            id: uuid::Uuid::new_v4().to_string(),
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            sent_at: Utc::now(),
        });
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "local"
    }
}
