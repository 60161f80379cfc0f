//! Aggregate read for the public campaign page.
//!
//! DESIGN
//! ======
//! The campaign (active only, owner profile joined), its plans and its public
//! posts are read concurrently. The page shows all three or nothing: any
//! sub-read failure clears the state and raises a single error notice. A
//! missing or inactive campaign is an outcome, not an error, so the view can
//! route to its not-found page.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::ApiError;
use crate::gateway::{Query, decode_rows};
use crate::model::campaign::{CAMPAIGNS_TABLE, STATUS_ACTIVE, WITH_OWNER_PROFILE};
use crate::model::plan::PLANS_TABLE;
use crate::model::post::POSTS_TABLE;
use crate::model::{Campaign, CampaignPlan, CampaignPost, Record, Visibility};
use crate::state::AppContext;

#[cfg(test)]
#[path = "detail_test.rs"]
mod detail_test;

/// Everything the campaign page renders.
#[derive(Clone, Debug, PartialEq)]
pub struct CampaignDetail {
    pub campaign: Campaign,
    /// Cheapest first.
    pub plans: Vec<CampaignPlan>,
    /// Public posts only, newest first.
    pub posts: Vec<CampaignPost>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DetailOutcome {
    Found(CampaignDetail),
    /// No active campaign has this id.
    NotFound,
    /// A newer load or `close` superseded this one; its result was dropped.
    Discarded,
}

struct DetailState {
    detail: Option<CampaignDetail>,
    loading: bool,
    generation: u64,
    closed: bool,
}

pub struct CampaignDetailHook {
    ctx: AppContext,
    campaign_id: String,
    state: Mutex<DetailState>,
}

impl CampaignDetailHook {
    #[must_use]
    pub fn new(ctx: &AppContext, campaign_id: impl Into<String>) -> Self {
        Self {
            ctx: ctx.clone(),
            campaign_id: campaign_id.into(),
            state: Mutex::new(DetailState { detail: None, loading: true, generation: 0, closed: false }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DetailState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn campaign_id(&self) -> &str {
        &self.campaign_id
    }

    #[must_use]
    pub fn detail(&self) -> Option<CampaignDetail> {
        self.lock().detail.clone()
    }

    #[must_use]
    pub fn campaign(&self) -> Option<Campaign> {
        self.lock().detail.as_ref().map(|d| d.campaign.clone())
    }

    #[must_use]
    pub fn plans(&self) -> Vec<CampaignPlan> {
        self.lock().detail.as_ref().map(|d| d.plans.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn posts(&self) -> Vec<CampaignPost> {
        self.lock().detail.as_ref().map(|d| d.posts.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    /// Read campaign, plans and public posts together.
    ///
    /// # Errors
    ///
    /// Returns the first sub-read error. The exposed state is cleared so no
    /// partial page is shown.
    pub async fn load(&self) -> Result<DetailOutcome, ApiError> {
        let generation = {
            let mut state = self.lock();
            if state.closed {
                return Ok(DetailOutcome::Discarded);
            }
            state.generation += 1;
            state.loading = true;
            state.generation
        };

        let result = self.read().await;

        let mut state = self.lock();
        if state.closed || state.generation != generation {
            tracing::debug!(campaign_id = %self.campaign_id, "stale detail load discarded");
            return Ok(DetailOutcome::Discarded);
        }
        state.loading = false;
        match result {
            Ok(detail) => {
                state.detail.clone_from(&detail);
                drop(state);
                Ok(match detail {
                    Some(detail) => DetailOutcome::Found(detail),
                    None => {
                        tracing::debug!(campaign_id = %self.campaign_id, "campaign not found or inactive");
                        DetailOutcome::NotFound
                    }
                })
            }
            Err(e) => {
                state.detail = None;
                drop(state);
                self.ctx.fail("Failed to load campaign", &e);
                Err(e)
            }
        }
    }

    async fn read(&self) -> Result<Option<CampaignDetail>, ApiError> {
        let id = self.campaign_id.as_str();
        let campaign_query = Query::new(CAMPAIGNS_TABLE)
            .columns(WITH_OWNER_PROFILE)
            .eq("id", id)
            .eq("status", STATUS_ACTIVE);
        let plans_query = Query::new(PLANS_TABLE).eq("campaign_id", id).order("price", true);
        let posts_query = Query::new(POSTS_TABLE)
            .eq("campaign_id", id)
            .eq("visibility", Visibility::All.as_str())
            .order("created_at", false);

        let gateway = &self.ctx.gateway;
        let (campaign_rows, plan_rows, post_rows) = tokio::try_join!(
            gateway.select(&campaign_query),
            gateway.select(&plans_query),
            gateway.select(&posts_query),
        )?;

        let Some(campaign) = decode_rows::<Campaign>(campaign_rows)?.into_iter().next() else {
            return Ok(None);
        };
        let mut plans = decode_rows::<CampaignPlan>(plan_rows)?;
        plans.sort_by(CampaignPlan::display_order);
        let mut posts = decode_rows::<CampaignPost>(post_rows)?;
        posts.sort_by(CampaignPost::display_order);

        Ok(Some(CampaignDetail { campaign, plans, posts }))
    }

    /// Detach from the view. An in-flight load is discarded.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.loading = false;
        state.generation += 1;
    }
}
