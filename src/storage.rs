//! In-memory recipient and campaign store.
//!
//! [`MemoryStore`] is the reference implementation of both
//! [`RecipientResolver`] and [`CampaignRecorder`]. It backs development
//! setups and tests; production deployments plug their own database in
//! behind the same traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::account::{AccountId, NewRecipient, Recipient, RecipientId};
use crate::campaign::{Campaign, RecordId};
use crate::error::{RecorderError, StoreError, ValidationError};
use crate::recorder::CampaignRecorder;
use crate::resolver::RecipientResolver;

/// A stored recipient with metadata.
#[derive(Debug, Clone)]
pub struct StoredRecipient {
    /// Unique identifier
    pub id: RecipientId,
    /// Owning account
    pub account_id: AccountId,
    /// The contact
    pub recipient: Recipient,
    /// When the contact was added
    pub added_at: DateTime<Utc>,
}

/// A recorded campaign with its id.
#[derive(Debug, Clone)]
pub struct StoredCampaign {
    /// Identifier returned by `record`
    pub id: RecordId,
    /// The campaign as recorded
    pub campaign: Campaign,
}

/// Thread-safe in-memory store for recipients and campaign history.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Recipients in insertion order.
    recipients: RwLock<Vec<StoredRecipient>>,
    campaigns: RwLock<HashMap<RecordId, Campaign>>,
    /// Order of campaign ids for maintaining insertion order.
    campaign_order: RwLock<Vec<RecordId>>,
    /// If set, resolve() fails with this message.
    resolver_down: RwLock<Option<String>>,
    /// If set, record() fails with this message.
    recorder_down: RwLock<Option<String>>,
    resolve_calls: AtomicUsize,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store wrapped in an Arc for sharing.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    // =========================================================================
    // Customers
    // =========================================================================

    /// Validate and add a recipient to `account`.
    pub fn add_recipient(
        &self,
        account: &AccountId,
        input: NewRecipient,
    ) -> Result<RecipientId, ValidationError> {
        if account.is_blank() {
            return Err(ValidationError::MissingField("account"));
        }
        let recipient = input.validate()?;
        let id = RecipientId::generate();

        self.recipients.write().push(StoredRecipient {
            id,
            account_id: account.clone(),
            recipient,
            added_at: Utc::now(),
        });

        tracing::debug!(account = %account, recipient_id = %id, "Recipient added");
        Ok(id)
    }

    /// Delete a recipient. Only succeeds within the owning account.
    pub fn remove_recipient(&self, account: &AccountId, id: RecipientId) -> bool {
        let mut recipients = self.recipients.write();
        let before = recipients.len();
        recipients.retain(|r| !(r.id == id && &r.account_id == account));
        before != recipients.len()
    }

    /// Recipients of `account`, in insertion order.
    pub fn recipients(&self, account: &AccountId) -> Vec<StoredRecipient> {
        self.recipients
            .read()
            .iter()
            .filter(|r| &r.account_id == account)
            .cloned()
            .collect()
    }

    // =========================================================================
    // Campaign History
    // =========================================================================

    /// Campaigns recorded for `account`, newest first.
    pub fn campaigns(&self, account: &AccountId) -> Vec<StoredCampaign> {
        let campaigns = self.campaigns.read();
        let order = self.campaign_order.read();

        order
            .iter()
            .rev()
            .filter_map(|id| {
                campaigns
                    .get(id)
                    .filter(|c| &c.account_id == account)
                    .map(|c| StoredCampaign {
                        id: id.clone(),
                        campaign: c.clone(),
                    })
            })
            .collect()
    }

    /// Get a campaign by id.
    pub fn campaign(&self, id: &RecordId) -> Option<Campaign> {
        self.campaigns.read().get(id).cloned()
    }

    /// Total number of recorded campaigns across all accounts.
    pub fn campaign_count(&self) -> usize {
        self.campaigns.read().len()
    }

    // =========================================================================
    // Failure Simulation (for testing)
    // =========================================================================

    /// Make `resolve()` fail with `StoreError::Unavailable`.
    pub fn set_resolver_unavailable(&self, message: impl Into<String>) {
        *self.resolver_down.write() = Some(message.into());
    }

    /// Make `record()` fail with `RecorderError::StoreUnavailable`.
    pub fn set_recorder_unavailable(&self, message: impl Into<String>) {
        *self.recorder_down.write() = Some(message.into());
    }

    /// Clear both simulated outages.
    pub fn clear_failures(&self) {
        *self.resolver_down.write() = None;
        *self.recorder_down.write() = None;
    }

    /// How many times `resolve()` was called.
    pub fn resolve_count(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecipientResolver for MemoryStore {
    async fn resolve(&self, account: &AccountId) -> Result<Vec<Recipient>, StoreError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(ref message) = *self.resolver_down.read() {
            return Err(StoreError::Unavailable(message.clone()));
        }

        Ok(self
            .recipients(account)
            .into_iter()
            .map(|stored| stored.recipient)
            .collect())
    }
}

#[async_trait]
impl CampaignRecorder for MemoryStore {
    async fn record(&self, campaign: &Campaign) -> Result<RecordId, RecorderError> {
        if let Some(ref message) = *self.recorder_down.read() {
            return Err(RecorderError::StoreUnavailable(message.clone()));
        }

        let id = RecordId::new(uuid::Uuid::new_v4().to_string());
        {
            let mut campaigns = self.campaigns.write();
            let mut order = self.campaign_order.write();
            campaigns.insert(id.clone(), campaign.clone());
            order.push(id.clone());
        }

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign(account: &str, subject: &str) -> Campaign {
        Campaign {
            subject: subject.into(),
            body: "Body".into(),
            account_id: AccountId::new(account),
            created_at: Utc::now(),
            recipient_count: 0,
            results: vec![],
        }
    }

    #[tokio::test]
    async fn test_resolve_is_scoped_to_account() {
        let store = MemoryStore::new();
        let alice = AccountId::new("alice");
        let bob = AccountId::new("bob");

        store
            .add_recipient(&alice, NewRecipient::new("one@example.com"))
            .unwrap();
        store
            .add_recipient(&bob, NewRecipient::new("two@example.com"))
            .unwrap();
        store
            .add_recipient(&alice, NewRecipient::new("three@example.com"))
            .unwrap();

        let resolved = store.resolve(&alice).await.unwrap();
        let addresses: Vec<_> = resolved.iter().map(|r| r.address.as_str()).collect();
        assert_eq!(addresses, vec!["one@example.com", "three@example.com"]);

        assert!(store
            .resolve(&AccountId::new("nobody"))
            .await
            .unwrap()
            .is_empty());
        assert_eq!(store.resolve_count(), 2);
    }

    #[test]
    fn test_remove_requires_owner() {
        let store = MemoryStore::new();
        let alice = AccountId::new("alice");
        let id = store
            .add_recipient(&alice, NewRecipient::new("one@example.com"))
            .unwrap();

        assert!(!store.remove_recipient(&AccountId::new("mallory"), id));
        assert_eq!(store.recipients(&alice).len(), 1);

        assert!(store.remove_recipient(&alice, id));
        assert!(store.recipients(&alice).is_empty());
        assert!(!store.remove_recipient(&alice, id));
    }

    #[test]
    fn test_add_rejects_invalid_input() {
        let store = MemoryStore::new();
        assert!(store
            .add_recipient(&AccountId::new("alice"), NewRecipient::new("not-an-email"))
            .is_err());
        assert_eq!(
            store.add_recipient(&AccountId::new(""), NewRecipient::new("a@example.com")),
            Err(ValidationError::MissingField("account"))
        );
    }

    #[tokio::test]
    async fn test_campaign_history_newest_first() {
        let store = MemoryStore::new();

        let first = store.record(&campaign("alice", "First")).await.unwrap();
        store.record(&campaign("bob", "Other")).await.unwrap();
        let second = store.record(&campaign("alice", "Second")).await.unwrap();

        let history = store.campaigns(&AccountId::new("alice"));
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, second);
        assert_eq!(history[1].id, first);
        assert_eq!(store.campaign(&first).unwrap().subject, "First");
        assert_eq!(store.campaign_count(), 3);
    }

    #[tokio::test]
    async fn test_simulated_outages() {
        let store = MemoryStore::new();
        store.set_resolver_unavailable("firestore down");
        store.set_recorder_unavailable("firestore down");

        assert_eq!(
            store.resolve(&AccountId::new("alice")).await,
            Err(StoreError::Unavailable("firestore down".into()))
        );
        assert!(store.record(&campaign("alice", "Lost")).await.is_err());
        assert_eq!(store.campaign_count(), 0);

        store.clear_failures();
        assert!(store.resolve(&AccountId::new("alice")).await.is_ok());
        assert!(store.record(&campaign("alice", "Kept")).await.is_ok());
    }
}
