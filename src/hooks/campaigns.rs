//! Campaign list hook for the browse page and the creator dashboard.
//!
//! DESIGN
//! ======
//! Without an owner filter the hook lists active campaigns with the owner's
//! profile joined. With a filter it lists every campaign of that owner,
//! whatever its status. Mutation results that fall outside the filter (for
//! example a browse-list campaign that is no longer active) leave the store.

use crate::error::ApiError;
use crate::gateway::{Query, decode_row, encode};
use crate::model::campaign::{CAMPAIGNS_TABLE, NewCampaignRow, STATUS_ACTIVE, WITH_OWNER_PROFILE};
use crate::model::{Campaign, CampaignDraft, CampaignPatch};
use crate::state::AppContext;

use super::load;
use super::store::RecordStore;

#[cfg(test)]
#[path = "campaigns_test.rs"]
mod campaigns_test;

pub struct CampaignsHook {
    ctx: AppContext,
    owner_id: Option<String>,
    store: RecordStore<Campaign>,
}

impl CampaignsHook {
    #[must_use]
    pub fn new(ctx: &AppContext, owner_id: Option<String>) -> Self {
        Self { ctx: ctx.clone(), owner_id, store: RecordStore::new() }
    }

    #[must_use]
    pub fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }

    fn columns(&self) -> &'static str {
        if self.owner_id.is_some() { "*" } else { WITH_OWNER_PROFILE }
    }

    fn query(&self) -> Query {
        let query = Query::new(CAMPAIGNS_TABLE).columns(self.columns()).order("created_at", false);
        match &self.owner_id {
            Some(owner) => query.eq("owner_id", owner.as_str()),
            None => query.eq("status", STATUS_ACTIVE),
        }
    }

    fn in_view(&self, campaign: &Campaign) -> bool {
        match &self.owner_id {
            Some(owner) => campaign.owner_id == *owner,
            None => campaign.is_active(),
        }
    }

    /// Load (or reload) the list.
    ///
    /// # Errors
    ///
    /// Returns the gateway error; previously loaded campaigns are kept.
    pub async fn fetch(&self) -> Result<(), ApiError> {
        load(&self.ctx, &self.store, &self.query(), "Failed to load campaigns").await
    }

    /// Campaigns, newest first.
    #[must_use]
    pub fn campaigns(&self) -> Vec<Campaign> {
        self.store.snapshot()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Campaign> {
        self.store.get(id)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    /// Loaded with no campaigns, for the empty-state view.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Create a campaign owned by the signed-in user.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` without a session (no request is made), or the
    /// gateway error.
    pub async fn create_campaign(&self, draft: CampaignDraft) -> Result<Campaign, ApiError> {
        let result = self.insert(&draft).await;
        let campaign = self.ctx.settle(result, "Campaign created", "Failed to create campaign")?;
        tracing::info!(campaign_id = %campaign.id, owner_id = %campaign.owner_id, "campaign created");
        self.store.reconcile(campaign.clone(), self.in_view(&campaign));
        Ok(campaign)
    }

    async fn insert(&self, draft: &CampaignDraft) -> Result<Campaign, ApiError> {
        let owner_id = self.ctx.require_user()?;
        let row = encode(&NewCampaignRow { owner_id: &owner_id, draft })?;
        let stored = self.ctx.gateway.insert(CAMPAIGNS_TABLE, row, self.columns()).await?;
        decode_row(stored)
    }

    /// Persist the provided fields of `patch`.
    ///
    /// # Errors
    ///
    /// `Validation` for an empty patch, `NotFound` when no row has `id`, or
    /// the gateway error.
    pub async fn update_campaign(&self, id: &str, patch: CampaignPatch) -> Result<Campaign, ApiError> {
        if patch.is_empty() {
            return Err(ApiError::validation("nothing to update"));
        }
        let result = self.patch(id, &patch).await;
        let campaign = self.ctx.settle(result, "Campaign updated", "Failed to update campaign")?;
        tracing::info!(campaign_id = %campaign.id, "campaign updated");
        self.store.reconcile(campaign.clone(), self.in_view(&campaign));
        Ok(campaign)
    }

    async fn patch(&self, id: &str, patch: &CampaignPatch) -> Result<Campaign, ApiError> {
        let patch = encode(patch)?;
        let stored = self.ctx.gateway.update(CAMPAIGNS_TABLE, id, patch, self.columns()).await?;
        decode_row(stored)
    }

    /// # Errors
    ///
    /// Returns the gateway error; the store is left unchanged.
    pub async fn delete_campaign(&self, id: &str) -> Result<(), ApiError> {
        let result = self.ctx.gateway.delete(CAMPAIGNS_TABLE, id).await;
        self.ctx.settle(result, "Campaign deleted", "Failed to delete campaign")?;
        tracing::info!(campaign_id = %id, "campaign deleted");
        self.store.remove(id);
        Ok(())
    }

    /// Detach from the view. Late results are discarded.
    pub fn close(&self) {
        self.store.close();
    }
}
