//! Support plans of one campaign, cheapest first.

use crate::error::ApiError;
use crate::forms::PlanForm;
use crate::gateway::{Query, decode_row, encode};
use crate::model::CampaignPlan;
use crate::model::plan::{NewPlanRow, PLANS_TABLE};
use crate::state::AppContext;

use super::load;
use super::store::RecordStore;

#[cfg(test)]
#[path = "plans_test.rs"]
mod plans_test;

pub struct CampaignPlansHook {
    ctx: AppContext,
    campaign_id: String,
    store: RecordStore<CampaignPlan>,
}

impl CampaignPlansHook {
    #[must_use]
    pub fn new(ctx: &AppContext, campaign_id: impl Into<String>) -> Self {
        Self { ctx: ctx.clone(), campaign_id: campaign_id.into(), store: RecordStore::new() }
    }

    #[must_use]
    pub fn campaign_id(&self) -> &str {
        &self.campaign_id
    }

    fn belongs(&self, plan: &CampaignPlan) -> bool {
        plan.campaign_id == self.campaign_id
    }

    /// # Errors
    ///
    /// Returns the gateway error; previously loaded plans are kept.
    pub async fn fetch(&self) -> Result<(), ApiError> {
        let query = Query::new(PLANS_TABLE).eq("campaign_id", self.campaign_id.as_str()).order("price", true);
        load(&self.ctx, &self.store, &query, "Failed to load plans").await
    }

    /// Reload after an external change.
    ///
    /// # Errors
    ///
    /// Same as [`CampaignPlansHook::fetch`].
    pub async fn refetch(&self) -> Result<(), ApiError> {
        self.fetch().await
    }

    /// Plans sorted by ascending price.
    #[must_use]
    pub fn plans(&self) -> Vec<CampaignPlan> {
        self.store.snapshot()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Validate `form` and add the plan to this campaign.
    ///
    /// # Errors
    ///
    /// `Validation` for an empty name or a bad price (no request is made), or
    /// the gateway error.
    pub async fn create_plan(&self, form: &PlanForm) -> Result<CampaignPlan, ApiError> {
        let input = form.validate()?;
        let result = async {
            let row = encode(&NewPlanRow { campaign_id: &self.campaign_id, input: &input })?;
            decode_row::<CampaignPlan>(self.ctx.gateway.insert(PLANS_TABLE, row, "*").await?)
        }
        .await;
        let plan = self.ctx.settle(result, "Plan created", "Failed to create plan")?;
        tracing::info!(campaign_id = %self.campaign_id, plan_id = %plan.id, price = plan.price, "plan created");
        self.store.reconcile(plan.clone(), self.belongs(&plan));
        Ok(plan)
    }

    /// Validate `form` and overwrite the plan's editable fields.
    ///
    /// # Errors
    ///
    /// Same as [`CampaignPlansHook::create_plan`], plus `NotFound`.
    pub async fn update_plan(&self, id: &str, form: &PlanForm) -> Result<CampaignPlan, ApiError> {
        let input = form.validate()?;
        let result = async {
            let patch = encode(&input)?;
            decode_row::<CampaignPlan>(self.ctx.gateway.update(PLANS_TABLE, id, patch, "*").await?)
        }
        .await;
        let plan = self.ctx.settle(result, "Plan updated", "Failed to update plan")?;
        tracing::info!(plan_id = %plan.id, "plan updated");
        self.store.reconcile(plan.clone(), self.belongs(&plan));
        Ok(plan)
    }

    /// # Errors
    ///
    /// Returns the gateway error; the store is left unchanged.
    pub async fn delete_plan(&self, id: &str) -> Result<(), ApiError> {
        let result = self.ctx.gateway.delete(PLANS_TABLE, id).await;
        self.ctx.settle(result, "Plan deleted", "Failed to delete plan")?;
        tracing::info!(plan_id = %id, "plan deleted");
        self.store.remove(id);
        Ok(())
    }

    pub fn close(&self) {
        self.store.close();
    }
}
