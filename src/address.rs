//! Email address type with optional display name.

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// An email address with an optional display name.
///
/// Used for the sender of every campaign message and for rendering recipients.
///
/// ```
/// use bulkmail::Address;
///
/// let addr: Address = ("Business Bulk Email", "onboarding@resend.dev").into();
/// assert_eq!(addr.formatted(), "Business Bulk Email <onboarding@resend.dev>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Optional display name
    pub name: Option<String>,
    /// Email address
    pub email: String,
}

impl Address {
    /// Create an address without validation.
    ///
    /// Logs a warning if the email is obviously broken. Use [`Address::parse`]
    /// for strict validation.
    pub fn new(email: impl Into<String>) -> Self {
        let email = email.into();

        if !Self::basic_sanity_check(&email) {
            tracing::warn!(
                email = %email,
                "Creating address with potentially invalid email. Use Address::parse() for strict validation."
            );
        }

        Self { name: None, email }
    }

    /// Create an address with a display name, without validation.
    pub fn with_name(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self::new(email).name(name)
    }

    fn basic_sanity_check(email: &str) -> bool {
        !email.is_empty() && email.contains('@')
    }

    /// Set the display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Parse and validate an email address (RFC 5321/5322).
    ///
    /// Surrounding whitespace is trimmed first.
    ///
    /// ```
    /// use bulkmail::Address;
    ///
    /// assert!(Address::parse(" user@example.com ").is_ok());
    /// assert!(Address::parse("not-an-email").is_err());
    /// assert!(Address::parse("").is_err());
    /// ```
    pub fn parse(email: &str) -> Result<Self, ValidationError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ValidationError::MissingField("email"));
        }
        if !EmailAddress::is_valid(email) {
            return Err(ValidationError::InvalidAddress(format!(
                "'{}' is not a valid email address",
                email
            )));
        }

        Ok(Self {
            name: None,
            email: email.to_string(),
        })
    }

    /// Parse a `Name <email>` string, or a bare email.
    ///
    /// ```
    /// use bulkmail::Address;
    ///
    /// let addr = Address::parse_mailbox("Business Bulk Email <onboarding@resend.dev>").unwrap();
    /// assert_eq!(addr.name.as_deref(), Some("Business Bulk Email"));
    /// assert_eq!(addr.email, "onboarding@resend.dev");
    /// ```
    pub fn parse_mailbox(input: &str) -> Result<Self, ValidationError> {
        let input = input.trim();
        match (input.rfind('<'), input.ends_with('>')) {
            (Some(open), true) => {
                let name = input[..open].trim().trim_matches('"').trim();
                let addr = Self::parse(&input[open + 1..input.len() - 1])?;
                if name.is_empty() {
                    Ok(addr)
                } else {
                    Ok(addr.name(name))
                }
            }
            _ => Self::parse(input),
        }
    }

    /// Format as "Name <email>" or just "email" if no name.
    pub fn formatted(&self) -> String {
        match &self.name {
            Some(name) if name.is_empty() => self.email.clone(),
            Some(name) => format!("{} <{}>", name, self.email),
            None => self.email.clone(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.formatted())
    }
}

impl From<&str> for Address {
    fn from(email: &str) -> Self {
        Self::new(email)
    }
}

impl From<String> for Address {
    fn from(email: String) -> Self {
        Self::new(email)
    }
}

impl From<(&str, &str)> for Address {
    fn from((name, email): (&str, &str)) -> Self {
        Self::with_name(name, email)
    }
}

impl From<(String, String)> for Address {
    fn from((name, email): (String, String)) -> Self {
        Self::with_name(name, email)
    }
}
