//! Accounts and the recipients they own.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::address::Address;
use crate::error::ValidationError;

/// Opaque tenant identifier handed over by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Wrap an identifier. No validation; the dispatcher rejects blank ids.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AccountId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifier of a stored recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipientId(uuid::Uuid);

impl RecipientId {
    pub(crate) fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for RecipientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A customer contact on an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// Email address. Non-empty for every recipient created through [`NewRecipient`].
    pub address: String,
    /// Optional display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Optional age
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
}

impl Recipient {
    /// Create a recipient with just an address.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            display_name: None,
            age: None,
        }
    }

    /// Set the display name.
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Set the age.
    pub fn age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }
}

/// Unvalidated input of the add-customer form.
///
/// ```
/// use bulkmail::NewRecipient;
///
/// let recipient = NewRecipient::new("jane@example.com")
///     .name("Jane")
///     .age(41)
///     .validate()
///     .unwrap();
/// assert_eq!(recipient.display_name.as_deref(), Some("Jane"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewRecipient {
    /// Email address as typed
    pub email: String,
    /// Name as typed; blank means none
    #[serde(default)]
    pub name: Option<String>,
    /// Age, if given
    #[serde(default)]
    pub age: Option<u32>,
}

impl NewRecipient {
    /// Start from an email address.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Default::default()
        }
    }

    /// Set the name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the age.
    pub fn age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    /// Check the address and normalize blank names to `None`.
    pub fn validate(self) -> Result<Recipient, ValidationError> {
        let address = Address::parse(&self.email)?;
        let display_name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Ok(Recipient {
            address: address.email,
            display_name,
            age: self.age,
        })
    }
}
