//! Campaign history.

use async_trait::async_trait;

use crate::campaign::{Campaign, RecordId};
use crate::error::RecorderError;

/// Append-only campaign history.
///
/// Implementations never update or delete a stored campaign.
#[async_trait]
pub trait CampaignRecorder: Send + Sync {
    /// Store `campaign` and return its id.
    async fn record(&self, campaign: &Campaign) -> Result<RecordId, RecorderError>;
}
