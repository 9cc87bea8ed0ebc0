//! Mailer configuration.
//!
//! Credentials are carried in a [`MailerConfig`] value and handed to the
//! provider constructor. Nothing here is global: build the config once at
//! startup, call [`MailerConfig::build`], and pass the mailer to the
//! [`Dispatcher`](crate::Dispatcher).
//!
//! ## Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `EMAIL_PROVIDER` | `resend` (default), `logger`, `logger_full`, `local` |
//! | `EMAIL_FROM` | Sender email, or `Name <email>` |
//! | `EMAIL_FROM_NAME` | Sender display name |
//! | `RESEND_API_KEY` | Resend API key |
//! | `RESEND_BASE_URL` | Override the Resend API endpoint |

use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::address::Address;
use crate::error::ConfigError;
use crate::mailer::Mailer;
use crate::providers;

/// Sender used when `EMAIL_FROM` is not set.
pub const DEFAULT_SENDER_NAME: &str = "Business Bulk Email";
/// Sender address used when `EMAIL_FROM` is not set.
pub const DEFAULT_SENDER_EMAIL: &str = "onboarding@resend.dev";
/// Default Resend endpoint.
pub const DEFAULT_RESEND_BASE_URL: &str = "https://api.resend.com";

pub(crate) fn default_sender() -> Address {
    Address::with_name(DEFAULT_SENDER_NAME, DEFAULT_SENDER_EMAIL)
}

/// Which [`Mailer`] implementation to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Resend HTTP API
    Resend,
    /// Log recipient and subject only
    Logger,
    /// Log bodies too
    LoggerFull,
    /// Capture in memory.
    ///
    /// The built mailer is only reachable as `dyn Mailer`, so nothing can read
    /// what it captured. Build a [`LocalMailer`](crate::providers::LocalMailer)
    /// directly and keep a clone when the captured mail matters.
    Local,
}

impl ProviderKind {
    /// The `EMAIL_PROVIDER` spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resend => "resend",
            Self::Logger => "logger",
            Self::LoggerFull => "logger_full",
            Self::Local => "local",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "resend" => Ok(Self::Resend),
            "logger" => Ok(Self::Logger),
            "logger_full" => Ok(Self::LoggerFull),
            "local" => Ok(Self::Local),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to build a mailer.
#[derive(Clone)]
pub struct MailerConfig {
    /// Provider to build
    pub provider: ProviderKind,
    /// Sender of every message
    pub from: Address,
    /// Resend API key; `None` makes every send fail with `NotConfigured`
    pub resend_api_key: Option<String>,
    /// Resend endpoint
    pub resend_base_url: String,
}

impl MailerConfig {
    /// Config for `provider` with the default sender and no credentials.
    pub fn new(provider: ProviderKind) -> Self {
        Self {
            provider,
            from: default_sender(),
            resend_api_key: None,
            resend_base_url: DEFAULT_RESEND_BASE_URL.to_string(),
        }
    }

    /// Resend config with an API key.
    pub fn resend(api_key: impl Into<String>) -> Self {
        Self::new(ProviderKind::Resend).api_key(api_key)
    }

    /// Set the Resend API key. Blank keys count as absent.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.resend_api_key = if key.trim().is_empty() { None } else { Some(key) };
        self
    }

    /// Set the sender.
    pub fn from(mut self, from: impl Into<Address>) -> Self {
        self.from = from.into();
        self
    }

    /// Set the Resend endpoint.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.resend_base_url = url.into();
        self
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through `lookup` (an environment stand-in).
    ///
    /// A missing API key is not an error: the mailer is built anyway and
    /// fails closed on every send.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = match lookup("EMAIL_PROVIDER") {
            Some(p) if !p.trim().is_empty() => p.parse()?,
            _ => {
                tracing::debug!("EMAIL_PROVIDER not set, defaulting to resend");
                ProviderKind::Resend
            }
        };

        let mut config = Self::new(provider);

        if let Some(from) = lookup("EMAIL_FROM").filter(|f| !f.trim().is_empty()) {
            let mut address = Address::parse_mailbox(&from)
                .map_err(|e| ConfigError::InvalidSender(e.to_string()))?;
            if let Some(name) = lookup("EMAIL_FROM_NAME").filter(|n| !n.trim().is_empty()) {
                address = address.name(name);
            }
            config.from = address;
        }

        if let Some(key) = lookup("RESEND_API_KEY") {
            config = config.api_key(key);
        }
        if let Some(url) = lookup("RESEND_BASE_URL").filter(|u| !u.trim().is_empty()) {
            config.resend_base_url = url;
        }

        Ok(config)
    }

    /// Whether the selected provider has the credentials it needs.
    pub fn is_configured(&self) -> bool {
        match self.provider {
            ProviderKind::Resend => self.resend_api_key.is_some(),
            ProviderKind::Logger | ProviderKind::LoggerFull | ProviderKind::Local => true,
        }
    }

    /// Build the configured mailer.
    ///
    /// [`ProviderKind::Local`] yields a mailer whose captures cannot be read
    /// back; it accepts every send and keeps the mail to itself.
    pub fn build(&self) -> Result<Arc<dyn Mailer>, ConfigError> {
        if !self.is_configured() {
            tracing::warn!(
                provider = %self.provider,
                "Email provider has no credentials; every send will fail with NotConfigured"
            );
        }

        match self.provider {
            #[cfg(feature = "resend")]
            ProviderKind::Resend => Ok(Arc::new(providers::ResendMailer::from_config(self))),
            #[cfg(not(feature = "resend"))]
            ProviderKind::Resend => Err(ConfigError::FeatureDisabled("resend")),

            #[cfg(feature = "local")]
            ProviderKind::Local => Ok(Arc::new(providers::LocalMailer::new())),
            #[cfg(not(feature = "local"))]
            ProviderKind::Local => Err(ConfigError::FeatureDisabled("local")),

            ProviderKind::Logger => Ok(Arc::new(providers::LoggerMailer::new())),
            ProviderKind::LoggerFull => Ok(Arc::new(providers::LoggerMailer::full())),
        }
    }
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self::new(ProviderKind::Resend)
    }
}

impl fmt::Debug for MailerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailerConfig")
            .field("provider", &self.provider)
            .field("from", &self.from)
            .field(
                "resend_api_key",
                &self.resend_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("resend_base_url", &self.resend_base_url)
            .finish()
    }
}
