//! Campaign create/edit form and category picker.

use super::non_empty;
use crate::error::ApiError;
use crate::model::{Campaign, CampaignDraft, CampaignPatch};

#[cfg(test)]
#[path = "campaign_test.rs"]
mod campaign_test;

/// Labels offered by the category picker.
pub const CATEGORIES: [&str; 8] =
    ["Podcast", "Video", "Art", "Music", "Writing", "Technology", "Education", "Other"];

pub const MAX_CATEGORIES: usize = 3;

/// Multi-select category picker capped at [`MAX_CATEGORIES`] labels.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategorySelection {
    selected: Vec<String>,
}

impl CategorySelection {
    #[must_use]
    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.selected.iter().any(|s| s == label)
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.selected.len() >= MAX_CATEGORIES
    }

    /// Whether the picker should enable `label`. Selected labels stay enabled
    /// so they can be deselected.
    #[must_use]
    pub fn can_select(&self, label: &str) -> bool {
        self.contains(label) || !self.is_full()
    }

    /// Select or deselect `label`. Returns false when the selection is full
    /// and `label` was not already selected.
    pub fn toggle(&mut self, label: &str) -> bool {
        if let Some(pos) = self.selected.iter().position(|s| s == label) {
            self.selected.remove(pos);
            return true;
        }
        if self.is_full() {
            return false;
        }
        self.selected.push(label.to_string());
        true
    }
}

impl From<&[String]> for CategorySelection {
    /// Keeps the first [`MAX_CATEGORIES`] distinct labels.
    fn from(labels: &[String]) -> Self {
        let mut selection = Self::default();
        for label in labels {
            if !selection.contains(label) && !selection.is_full() {
                selection.selected.push(label.clone());
            }
        }
        selection
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CampaignForm {
    pub title: String,
    pub description: String,
    /// Set by the image uploader.
    pub image_url: Option<String>,
    pub categories: CategorySelection,
}

impl CampaignForm {
    #[must_use]
    pub fn from_campaign(campaign: &Campaign) -> Self {
        Self {
            title: campaign.title.clone(),
            description: campaign.description.clone().unwrap_or_default(),
            image_url: campaign.image_url.clone(),
            categories: CategorySelection::from(campaign.category.as_slice()),
        }
    }

    /// # Errors
    ///
    /// Returns `Validation` when the title is blank.
    pub fn validate(&self) -> Result<CampaignDraft, ApiError> {
        let title = non_empty(&self.title).ok_or_else(|| ApiError::validation("campaign title is required"))?;
        Ok(CampaignDraft {
            title,
            description: non_empty(&self.description),
            image_url: self.image_url.as_deref().and_then(non_empty),
            category: self.categories.selected().to_vec(),
        })
    }

    /// Full patch for an edit submission.
    ///
    /// # Errors
    ///
    /// Same as [`CampaignForm::validate`].
    pub fn to_patch(&self) -> Result<CampaignPatch, ApiError> {
        let draft = self.validate()?;
        Ok(CampaignPatch {
            title: Some(draft.title),
            description: Some(draft.description),
            image_url: Some(draft.image_url),
            category: Some(draft.category),
            status: None,
        })
    }
}
