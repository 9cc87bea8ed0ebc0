//! Error types for bulkmail.
//!
//! Each failure domain gets its own enum so callers can tell at the type level
//! which ones abort a dispatch and which ones are folded into its report.

use thiserror::Error;

/// Errors a [`Mailer`](crate::Mailer) can return for a single send.
///
/// These never abort a campaign. The dispatcher records them per recipient.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MailerError {
    /// Provider credentials are absent. No network call was attempted.
    #[error("Email provider not configured")]
    NotConfigured,

    /// The provider answered and refused the message.
    #[error("Rejected by provider: {0}")]
    Rejected(String),

    /// The request never got a usable answer (connect, timeout, decode).
    #[error("Transport error: {0}")]
    Transport(String),
}

impl MailerError {
    /// Create a rejection carrying the HTTP status the provider answered with.
    pub fn rejected_with_status(
        provider: &'static str,
        message: impl Into<String>,
        status: u16,
    ) -> Self {
        Self::Rejected(format!("{} ({}, status {})", message.into(), provider, status))
    }
}

#[cfg(feature = "resend")]
impl From<reqwest::Error> for MailerError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// The recipient store could not be queried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Backing collection unavailable.
    #[error("Recipient store unavailable: {0}")]
    Unavailable(String),
}

/// The campaign history could not be written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecorderError {
    /// Backing collection unavailable.
    #[error("Campaign store unavailable: {0}")]
    StoreUnavailable(String),
}

/// Bad input supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Missing required field.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Invalid email address format.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Errors that make [`Dispatcher::dispatch`](crate::Dispatcher::dispatch) return
/// without a report.
///
/// Partial send failure is not one of them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Subject, body or account failed validation. Nothing was read or sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Recipients could not be resolved. Nothing was sent.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<StoreError> for DispatchError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(reason) => Self::StoreUnavailable(reason),
        }
    }
}

/// Configuration error (unknown provider, feature not compiled in, bad value).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `EMAIL_PROVIDER` names a provider this build does not know.
    #[error("Unknown EMAIL_PROVIDER: {0}. Valid providers are: resend, logger, local")]
    UnknownProvider(String),

    /// The provider exists but its cargo feature is off.
    #[error("EMAIL_PROVIDER={0} but '{0}' feature is not enabled. Add `features = [\"{0}\"]` to Cargo.toml")]
    FeatureDisabled(&'static str),

    /// The sender address could not be parsed.
    #[error("Invalid sender address: {0}")]
    InvalidSender(String),
}
