//! Campaign rows, drafts and patches.
//!
//! Category is stored as a list of up to three labels. Older rows carry a
//! single string (or null); those are migrated on read.

use std::cmp::Ordering;

use serde::{Deserialize, Deserializer, Serialize};

use super::{Record, newest_first};

#[cfg(test)]
#[path = "campaign_test.rs"]
mod campaign_test;

pub const CAMPAIGNS_TABLE: &str = "campaigns";
pub const STATUS_ACTIVE: &str = "active";
/// Column list that joins the owner's display profile.
pub const WITH_OWNER_PROFILE: &str = "*,profiles(full_name,avatar_url)";

/// Owner display fields joined from `profiles`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_category")]
    pub category: Vec<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profiles: Option<Profile>,
}

impl Campaign {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == STATUS_ACTIVE
    }

    /// Owner display name, if the profile was joined and has one.
    #[must_use]
    pub fn owner_name(&self) -> Option<&str> {
        self.profiles.as_ref().and_then(|p| p.full_name.as_deref())
    }
}

impl Record for Campaign {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_order(a: &Self, b: &Self) -> Ordering {
        newest_first(&a.created_at, &a.id, &b.created_at, &b.id)
    }
}

/// A campaign before the backend assigns id, timestamps and status.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CampaignDraft {
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category: Vec<String>,
}

/// Insert payload: the draft plus the session owner.
#[derive(Serialize)]
pub(crate) struct NewCampaignRow<'a> {
    pub owner_id: &'a str,
    #[serde(flatten)]
    pub draft: &'a CampaignDraft,
}

/// Partial campaign update. Only `Some` fields are sent; `Some(None)` clears
/// a nullable column.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CampaignPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl CampaignPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CategoryRepr {
    One(String),
    Many(Vec<String>),
}

fn deserialize_category<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let repr = Option::<CategoryRepr>::deserialize(deserializer)?;
    Ok(match repr {
        None => Vec::new(),
        Some(CategoryRepr::One(label)) if label.trim().is_empty() => Vec::new(),
        Some(CategoryRepr::One(label)) => vec![label],
        Some(CategoryRepr::Many(labels)) => labels.into_iter().filter(|l| !l.trim().is_empty()).collect(),
    })
}
