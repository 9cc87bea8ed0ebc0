//! Campaign records and dispatch results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::account::AccountId;
use crate::error::MailerError;

/// Outcome of sending the campaign to one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SendOutcome {
    /// The provider accepted the message.
    Success,
    /// The send failed; the reason is kept for display.
    Failure {
        /// Human-readable reason
        reason: String,
    },
}

impl SendOutcome {
    /// Create a failure outcome.
    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
        }
    }

    /// Whether the send succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<Result<(), MailerError>> for SendOutcome {
    fn from(result: Result<(), MailerError>) -> Self {
        match result {
            Ok(()) => Self::Success,
            Err(e) => Self::failure(e.to_string()),
        }
    }
}

/// One row of a campaign's results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientResult {
    /// Recipient address
    pub address: String,
    /// What happened
    pub outcome: SendOutcome,
}

/// Identifier assigned by a [`CampaignRecorder`](crate::CampaignRecorder).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap a store-assigned identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable history entry for one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    /// Subject line
    pub subject: String,
    /// Plain text body
    pub body: String,
    /// Owning account
    pub account_id: AccountId,
    /// When the dispatch started sending
    pub created_at: DateTime<Utc>,
    /// Number of distinct recipients the message went out to
    pub recipient_count: usize,
    /// Per-recipient outcomes, in recipient order
    pub results: Vec<RecipientResult>,
}

impl Campaign {
    /// Number of successful sends.
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_success()).count()
    }

    /// Number of failed sends.
    pub fn failure_count(&self) -> usize {
        self.results.len() - self.success_count()
    }
}

/// Summary of a dispatch that reached at least one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignReport {
    /// Sends the provider accepted
    pub success_count: usize,
    /// Sends that failed
    pub failure_count: usize,
    /// Per-recipient outcomes, in recipient order
    pub results: Vec<RecipientResult>,
    /// History id, if the campaign was recorded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<RecordId>,
    /// Set when the emails went out but the history write failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence_warning: Option<String>,
}

impl CampaignReport {
    pub(crate) fn new(results: Vec<RecipientResult>) -> Self {
        let success_count = results.iter().filter(|r| r.outcome.is_success()).count();
        Self {
            success_count,
            failure_count: results.len() - success_count,
            results,
            record_id: None,
            persistence_warning: None,
        }
    }

    /// Every recipient was reached and the campaign was recorded.
    pub fn is_complete_success(&self) -> bool {
        self.failure_count == 0 && self.persistence_warning.is_none()
    }

    /// Whether the history write failed.
    pub fn has_persistence_warning(&self) -> bool {
        self.persistence_warning.is_some()
    }

    /// Failed addresses with their reasons, in recipient order.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.results.iter().filter_map(|r| match &r.outcome {
            SendOutcome::Failure { reason } => Some((r.address.as_str(), reason.as_str())),
            SendOutcome::Success => None,
        })
    }

    /// Outcome for one address.
    pub fn outcome_for(&self, address: &str) -> Option<&SendOutcome> {
        self.results
            .iter()
            .find(|r| r.address.eq_ignore_ascii_case(address))
            .map(|r| &r.outcome)
    }
}

/// Result of [`Dispatcher::dispatch`](crate::Dispatcher::dispatch).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CampaignResult {
    /// The account has no recipients. Nothing was sent or recorded.
    NoRecipients,
    /// Every send settled.
    Completed(CampaignReport),
}

impl CampaignResult {
    /// The report, if any sends happened.
    pub fn report(&self) -> Option<&CampaignReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::NoRecipients => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(address: &str, outcome: SendOutcome) -> RecipientResult {
        RecipientResult {
            address: address.into(),
            outcome,
        }
    }

    #[test]
    fn test_report_counts() {
        let report = CampaignReport::new(vec![
            row("a@example.com", SendOutcome::Success),
            row("b@example.com", SendOutcome::failure("bounced")),
            row("c@example.com", SendOutcome::Success),
        ]);

        assert_eq!(report.success_count, 2);
        assert_eq!(report.failure_count, 1);
        assert!(!report.is_complete_success());
        assert_eq!(
            report.failures().collect::<Vec<_>>(),
            vec![("b@example.com", "bounced")]
        );
        assert_eq!(
            report.outcome_for("C@example.com"),
            Some(&SendOutcome::Success)
        );
    }

    #[test]
    fn test_outcome_from_mailer_result() {
        assert_eq!(SendOutcome::from(Ok(())), SendOutcome::Success);
        assert_eq!(
            SendOutcome::from(Err(MailerError::NotConfigured)),
            SendOutcome::failure("Email provider not configured")
        );
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let json = serde_json::to_value(SendOutcome::failure("nope")).unwrap();
        assert_eq!(json, serde_json::json!({"status": "failure", "reason": "nope"}));
    }
}
