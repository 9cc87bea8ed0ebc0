//! Campaign dispatch: one message, every recipient of an account.
//!
//! A dispatch is a single linear pass:
//!
//! ```text
//! Validating -> Resolving -> NoRecipients
//!                         -> Sending -> Aggregating -> Recording -> Completed
//! ```
//!
//! Sends run as one tokio task per recipient and are joined at a single
//! barrier. Results are matched to recipients by position, so the report
//! order is the resolver's order whatever order the sends finish in.
//!
//! Only validation and resolver failures make `dispatch` return `Err`. Failed
//! sends are counted in the report, and a failed history write becomes
//! [`CampaignReport::persistence_warning`]: by then the emails are out.

use chrono::Utc;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::Instrument;

#[cfg(feature = "metrics")]
use std::time::Instant;

use crate::account::{AccountId, Recipient};
use crate::campaign::{Campaign, CampaignReport, CampaignResult, RecipientResult, SendOutcome};
use crate::error::{DispatchError, ValidationError};
use crate::mailer::Mailer;
use crate::recorder::CampaignRecorder;
use crate::resolver::RecipientResolver;

/// Sends one message to every recipient of an account and records the campaign.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use bulkmail::{AccountId, CampaignResult, Dispatcher, MailerConfig, MemoryStore};
///
/// let store = MemoryStore::shared();
/// let mailer = MailerConfig::from_env()?.build()?;
/// let dispatcher = Dispatcher::new(mailer, store.clone(), store.clone());
///
/// match dispatcher.dispatch(&AccountId::new("uid-42"), "Spring sale", "20% off").await? {
///     CampaignResult::NoRecipients => println!("No customers found for this account."),
///     CampaignResult::Completed(report) => {
///         println!("{} sent, {} failed", report.success_count, report.failure_count);
///     }
/// }
/// ```
#[derive(Clone)]
pub struct Dispatcher {
    mailer: Arc<dyn Mailer>,
    resolver: Arc<dyn RecipientResolver>,
    recorder: Arc<dyn CampaignRecorder>,
}

impl Dispatcher {
    /// Create a dispatcher from its three collaborators.
    pub fn new(
        mailer: Arc<dyn Mailer>,
        resolver: Arc<dyn RecipientResolver>,
        recorder: Arc<dyn CampaignRecorder>,
    ) -> Self {
        Self {
            mailer,
            resolver,
            recorder,
        }
    }

    /// The mailer sends go through.
    pub fn mailer(&self) -> &Arc<dyn Mailer> {
        &self.mailer
    }

    /// Send `subject`/`body` to every current recipient of `account`.
    ///
    /// Returns once every send has settled and the record attempt finished.
    /// Must be called from within a tokio runtime.
    pub async fn dispatch(
        &self,
        account: &AccountId,
        subject: &str,
        body: &str,
    ) -> Result<CampaignResult, DispatchError> {
        validate(account, subject, body)?;

        let provider = self.mailer.provider_name();
        let span = tracing::info_span!(
            "bulkmail.dispatch",
            provider = provider,
            account = %account,
            subject = %subject,
            recipients = tracing::field::Empty,
        );

        self.run(account, subject, body).instrument(span).await
    }

    async fn run(
        &self,
        account: &AccountId,
        subject: &str,
        body: &str,
    ) -> Result<CampaignResult, DispatchError> {
        let provider = self.mailer.provider_name();

        let recipients = match self.resolver.resolve(account).await {
            Ok(recipients) => distinct_addresses(recipients),
            Err(e) => {
                tracing::error!(error = %e, "Failed to resolve recipients");
                #[cfg(feature = "metrics")]
                metrics::counter!("bulkmail_campaigns_total", "status" => "store_unavailable")
                    .increment(1);
                return Err(e.into());
            }
        };

        if recipients.is_empty() {
            tracing::info!("No recipients for this account, nothing sent");
            #[cfg(feature = "metrics")]
            metrics::counter!("bulkmail_campaigns_total", "status" => "no_recipients")
                .increment(1);
            return Ok(CampaignResult::NoRecipients);
        }

        tracing::Span::current().record("recipients", recipients.len());
        tracing::debug!("Sending campaign");

        let created_at = Utc::now();

        #[cfg(feature = "metrics")]
        let start = Instant::now();

        let results = self.send_all(&recipients, subject, body).await;

        #[cfg(feature = "metrics")]
        {
            let duration = start.elapsed().as_secs_f64();
            let succeeded = results.iter().filter(|r| r.outcome.is_success()).count();
            metrics::counter!("bulkmail_sends_total", "provider" => provider, "status" => "success")
                .increment(succeeded as u64);
            metrics::counter!("bulkmail_sends_total", "provider" => provider, "status" => "error")
                .increment((results.len() - succeeded) as u64);
            metrics::histogram!("bulkmail_dispatch_duration_seconds", "provider" => provider)
                .record(duration);
            metrics::histogram!("bulkmail_campaign_size", "provider" => provider)
                .record(results.len() as f64);
        }

        let mut report = CampaignReport::new(results.clone());
        let campaign = Campaign {
            subject: subject.to_string(),
            body: body.to_string(),
            account_id: account.clone(),
            created_at,
            recipient_count: recipients.len(),
            results,
        };

        match self.recorder.record(&campaign).await {
            Ok(id) => {
                tracing::debug!(record_id = %id, "Campaign recorded");
                report.record_id = Some(id);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Emails sent but campaign could not be recorded");
                report.persistence_warning = Some(e.to_string());
            }
        }

        #[cfg(feature = "metrics")]
        metrics::counter!("bulkmail_campaigns_total", "status" => "completed").increment(1);

        tracing::info!(
            provider = provider,
            sent = report.success_count,
            failed = report.failure_count,
            "Campaign completed"
        );

        Ok(CampaignResult::Completed(report))
    }

    /// Fan out one task per address and join them all.
    ///
    /// Output position `i` always belongs to `addresses[i]`.
    async fn send_all(
        &self,
        addresses: &[String],
        subject: &str,
        body: &str,
    ) -> Vec<RecipientResult> {
        let subject: Arc<str> = Arc::from(subject);
        let body: Arc<str> = Arc::from(body);

        let handles: Vec<_> = addresses
            .iter()
            .map(|address| {
                let mailer = Arc::clone(&self.mailer);
                let to = address.clone();
                let subject = Arc::clone(&subject);
                let body = Arc::clone(&body);

                tokio::spawn(
                    async move {
                        tracing::debug!(to = %to, "Sending email");
                        mailer.send(&to, &subject, &body).await
                    }
                    .in_current_span(),
                )
            })
            .collect();

        let settled = join_all(handles).await;

        let mut results = Vec::with_capacity(addresses.len());
        for (address, joined) in addresses.iter().zip(settled) {
            let outcome = match joined {
                Ok(sent) => {
                    if let Err(ref e) = sent {
                        tracing::warn!(to = %address, error = %e, "Email delivery failed");
                    }
                    SendOutcome::from(sent)
                }
                Err(e) => {
                    tracing::error!(to = %address, error = %e, "Send task did not complete");
                    SendOutcome::failure(format!("Send task failed: {}", e))
                }
            };
            results.push(RecipientResult {
                address: address.clone(),
                outcome,
            });
        }
        results
    }
}

fn validate(account: &AccountId, subject: &str, body: &str) -> Result<(), ValidationError> {
    if account.is_blank() {
        return Err(ValidationError::MissingField("account"));
    }
    if subject.trim().is_empty() {
        return Err(ValidationError::MissingField("subject"));
    }
    if body.trim().is_empty() {
        return Err(ValidationError::MissingField("body"));
    }
    Ok(())
}

/// Addresses in resolver order, blanks dropped, case-insensitive duplicates
/// collapsed onto their first occurrence.
fn distinct_addresses(recipients: Vec<Recipient>) -> Vec<String> {
    let mut seen = HashSet::new();
    recipients
        .into_iter()
        .map(|r| r.address.trim().to_string())
        .filter(|address| !address.is_empty())
        .filter(|address| seen.insert(address.to_ascii_lowercase()))
        .collect()
}
