//! Resend API provider.
//!
//! # Example
//!
//! ```rust,ignore
//! use bulkmail::providers::ResendMailer;
//!
//! let mailer = ResendMailer::new("re_xxxxx")
//!     .from(("Business Bulk Email", "onboarding@resend.dev"));
//! ```
//!
//! A mailer built without an API key (see [`ResendMailer::unconfigured`]) is
//! still a valid [`Mailer`]: every send fails with
//! [`MailerError::NotConfigured`] and never touches the network.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::config::MailerConfig;
use crate::error::MailerError;
use crate::mailer::Mailer;

const RESEND_API_URL: &str = "https://api.resend.com";

/// Resend API email provider.
pub struct ResendMailer {
    api_key: Option<String>,
    from: Address,
    client: Client,
    base_url: String,
}

impl ResendMailer {
    /// Create a new Resend mailer with the given API key.
    ///
    /// A blank key counts as absent.
    pub fn new(api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        Self {
            api_key: if api_key.trim().is_empty() {
                None
            } else {
                Some(api_key)
            },
            from: crate::config::default_sender(),
            client: Client::new(),
            base_url: RESEND_API_URL.to_string(),
        }
    }

    /// Create a mailer with no credentials. Every send fails closed.
    pub fn unconfigured() -> Self {
        Self::new("")
    }

    /// Build from a [`MailerConfig`].
    pub fn from_config(config: &MailerConfig) -> Self {
        let mailer = match &config.resend_api_key {
            Some(key) => Self::new(key.as_str()),
            None => Self::unconfigured(),
        };
        mailer
            .from(config.from.clone())
            .base_url(config.resend_base_url.clone())
    }

    /// Create with a custom reqwest client.
    pub fn with_client(api_key: impl Into<String>, client: Client) -> Self {
        Self {
            client,
            ..Self::new(api_key)
        }
    }

    /// Set the sender address.
    pub fn from(mut self, from: impl Into<Address>) -> Self {
        self.from = from.into();
        self
    }

    /// Set a custom base URL (for testing).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailerError> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::error!("Missing RESEND_API_KEY, refusing to send");
            return Err(MailerError::NotConfigured);
        };

        let request = ResendRequest {
            from: self.from.formatted(),
            to: vec![to],
            subject,
            text: body,
        };

        let url = format!("{}/emails", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .header("User-Agent", format!("bulkmail/{}", crate::VERSION))
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            match response.json::<ResendResponse>().await {
                Ok(result) => tracing::debug!(message_id = %result.id, "Resend accepted email"),
                Err(e) => tracing::debug!(error = %e, "Resend accepted email without an id"),
            }
            Ok(())
        } else {
            let message = match response.json::<ResendError>().await {
                Ok(error) => error.message,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string(),
            };
            Err(MailerError::rejected_with_status(
                "resend",
                message,
                status.as_u16(),
            ))
        }
    }

    fn provider_name(&self) -> &'static str {
        "resend"
    }

    fn validate_config(&self) -> Result<(), MailerError> {
        match self.api_key {
            Some(_) => Ok(()),
            None => Err(MailerError::NotConfigured),
        }
    }
}

// ============================================================================
// Resend API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ResendRequest<'a> {
    from: String,
    to: Vec<&'a str>,
    subject: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResendResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ResendError {
    message: String,
}
