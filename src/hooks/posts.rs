//! Posts of one campaign, newest first, for the creator's post manager.
//!
//! Type/visibility filtering is a view concern; see [`crate::forms::PostFilter`].

use crate::error::ApiError;
use crate::forms::PostForm;
use crate::gateway::{Query, decode_row, encode};
use crate::model::post::{NewPostRow, POSTS_TABLE};
use crate::model::{CampaignPost, PostPatch};
use crate::state::AppContext;

use super::load;
use super::store::RecordStore;

#[cfg(test)]
#[path = "posts_test.rs"]
mod posts_test;

pub struct CampaignPostsHook {
    ctx: AppContext,
    campaign_id: String,
    store: RecordStore<CampaignPost>,
}

impl CampaignPostsHook {
    #[must_use]
    pub fn new(ctx: &AppContext, campaign_id: impl Into<String>) -> Self {
        Self { ctx: ctx.clone(), campaign_id: campaign_id.into(), store: RecordStore::new() }
    }

    #[must_use]
    pub fn campaign_id(&self) -> &str {
        &self.campaign_id
    }

    fn belongs(&self, post: &CampaignPost) -> bool {
        post.campaign_id == self.campaign_id
    }

    /// # Errors
    ///
    /// Returns the gateway error; previously loaded posts are kept.
    pub async fn fetch(&self) -> Result<(), ApiError> {
        let query = Query::new(POSTS_TABLE).eq("campaign_id", self.campaign_id.as_str()).order("created_at", false);
        load(&self.ctx, &self.store, &query, "Failed to load posts").await
    }

    /// # Errors
    ///
    /// Same as [`CampaignPostsHook::fetch`].
    pub async fn refetch(&self) -> Result<(), ApiError> {
        self.fetch().await
    }

    #[must_use]
    pub fn posts(&self) -> Vec<CampaignPost> {
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

    /// Validate `form` and publish the post on this campaign.
    ///
    /// # Errors
    ///
    /// `Validation` when the form is incomplete (no request is made), or the
    /// gateway error.
    pub async fn create_post(&self, form: &PostForm) -> Result<CampaignPost, ApiError> {
        let input = form.validate()?;
        let result = async {
            let row = encode(&NewPostRow { campaign_id: &self.campaign_id, input: &input })?;
            decode_row::<CampaignPost>(self.ctx.gateway.insert(POSTS_TABLE, row, "*").await?)
        }
        .await;
        let post = self.ctx.settle(result, "Post published", "Failed to publish post")?;
        tracing::info!(
            campaign_id = %self.campaign_id,
            post_id = %post.id,
            post_type = %post.post_type,
            visibility = %post.visibility,
            "post created"
        );
        self.store.reconcile(post.clone(), self.belongs(&post));
        Ok(post)
    }

    /// # Errors
    ///
    /// `Validation` for an empty patch, `NotFound` when no row has `id`, or
    /// the gateway error.
    pub async fn update_post(&self, id: &str, patch: PostPatch) -> Result<CampaignPost, ApiError> {
        if patch.is_empty() {
            return Err(ApiError::validation("nothing to update"));
        }
        let result = async {
            let patch = encode(&patch)?;
            decode_row::<CampaignPost>(self.ctx.gateway.update(POSTS_TABLE, id, patch, "*").await?)
        }
        .await;
        let post = self.ctx.settle(result, "Post updated", "Failed to update post")?;
        tracing::info!(post_id = %post.id, "post updated");
        self.store.reconcile(post.clone(), self.belongs(&post));
        Ok(post)
    }

    /// # Errors
    ///
    /// Returns the gateway error; the store is left unchanged.
    pub async fn delete_post(&self, id: &str) -> Result<(), ApiError> {
        let result = self.ctx.gateway.delete(POSTS_TABLE, id).await;
        self.ctx.settle(result, "Post deleted", "Failed to delete post")?;
        tracing::info!(post_id = %id, "post deleted");
        self.store.remove(id);
        Ok(())
    }

    pub fn close(&self) {
        self.store.close();
    }
}
