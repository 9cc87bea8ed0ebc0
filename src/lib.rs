//! # Bulkmail
//!
//! Store customer contacts per account and send one message to all of them.
//!
//! ## Quick Start
//!
//! Set environment variables:
//! ```bash
//! RESEND_API_KEY=re_xxxxx
//! EMAIL_FROM="Business Bulk Email <onboarding@resend.dev>"
//! ```
//!
//! Wire the dispatcher once, then call it per campaign:
//! ```rust,ignore
//! use bulkmail::{AccountId, Dispatcher, MailerConfig, MemoryStore, NewRecipient};
//!
//! let store = MemoryStore::shared();
//! let mailer = MailerConfig::from_env()?.build()?;
//! let dispatcher = Dispatcher::new(mailer, store.clone(), store.clone());
//!
//! let account = AccountId::new("uid-42");
//! store.add_recipient(&account, NewRecipient::new("jane@example.com").name("Jane"))?;
//!
//! let result = dispatcher.dispatch(&account, "Spring sale", "20% off this week").await?;
//! ```
//!
//! Every recipient gets its own send task. A failed send never stops the
//! others; it shows up in the report with its reason.
//!
//! ## Components
//!
//! | Piece | Trait / Type | Reference implementation |
//! |-------|--------------|--------------------------|
//! | Mailer | [`Mailer`] | [`providers::ResendMailer`], [`providers::LocalMailer`], [`providers::LoggerMailer`] |
//! | Recipient Resolver | [`RecipientResolver`] | [`MemoryStore`] |
//! | Campaign Recorder | [`CampaignRecorder`] | [`MemoryStore`] |
//! | Dispatcher | [`Dispatcher`] | |
//!
//! ## Feature Flags
//!
//! - `resend` - Resend API provider (default)
//! - `local` - LocalMailer and [`testing`] assertions (default)
//! - `metrics` - Prometheus-style metrics (counters/histograms)
//!
//! ## Metrics
//!
//! Enable `features = ["metrics"]` to emit:
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `bulkmail_campaigns_total` | Counter | status | Dispatch calls by outcome |
//! | `bulkmail_sends_total` | Counter | provider, status | Individual sends |
//! | `bulkmail_dispatch_duration_seconds` | Histogram | provider | Fan-out duration |
//! | `bulkmail_campaign_size` | Histogram | provider | Recipients per campaign |
//!
//! Install a recorder (e.g., `metrics-exporter-prometheus`) in your app to collect them.

/// The version of the bulkmail crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod account;
mod address;
mod campaign;
mod config;
mod dispatcher;
mod error;
mod mailer;
mod recorder;
mod resolver;
mod storage;

pub mod providers;

#[cfg(feature = "local")]
pub mod testing;

// Re-exports
pub use account::{AccountId, NewRecipient, Recipient, RecipientId};
pub use address::Address;
pub use campaign::{Campaign, CampaignReport, CampaignResult, RecipientResult, RecordId, SendOutcome};
pub use config::{MailerConfig, ProviderKind};
pub use dispatcher::Dispatcher;
pub use error::{
    ConfigError, DispatchError, MailerError, RecorderError, StoreError, ValidationError,
};
pub use mailer::Mailer;
pub use recorder::CampaignRecorder;
pub use resolver::RecipientResolver;
pub use storage::{MemoryStore, StoredCampaign, StoredRecipient};

/// Check if email is configured from the environment.
///
/// Returns `true` only if `EMAIL_PROVIDER` (or its default) is valid and the
/// selected provider has its credentials.
pub fn is_configured() -> bool {
    match MailerConfig::from_env() {
        Ok(config) => config.is_configured(),
        Err(e) => {
            tracing::warn!(error = %e, "Invalid email configuration");
            false
        }
    }
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        AccountId, Address, CampaignRecorder, CampaignReport, CampaignResult, DispatchError,
        Dispatcher, Mailer, MailerConfig, MailerError, MemoryStore, NewRecipient, Recipient,
        RecipientResolver, SendOutcome,
    };
}
