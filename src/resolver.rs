//! Recipient lookup.

use async_trait::async_trait;

use crate::account::{AccountId, Recipient};
use crate::error::StoreError;

/// Reads the current recipients of an account.
///
/// Implementations return only recipients owned by `account`. An unknown
/// account and an account without recipients both yield an empty `Vec`.
/// The call is a pure read: every dispatch gets a fresh snapshot.
#[async_trait]
pub trait RecipientResolver: Send + Sync {
    /// Resolve the recipients of `account`, in storage order.
    async fn resolve(&self, account: &AccountId) -> Result<Vec<Recipient>, StoreError>;
}
