//! Campaign posts and their type/visibility tags.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Record, newest_first};

#[cfg(test)]
#[path = "post_test.rs"]
mod post_test;

pub const POSTS_TABLE: &str = "posts";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    #[default]
    Text,
    Image,
    Video,
    Audio,
}

impl PostType {
    pub const ALL: [PostType; 4] = [Self::Text, Self::Image, Self::Video, Self::Audio];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }

    /// Non-text posts must carry a media URL.
    #[must_use]
    pub fn requires_media(self) -> bool {
        !matches!(self, Self::Text)
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access tier required to view a post.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Public.
    #[default]
    All,
    Supporters,
    Premium,
}

impl Visibility {
    pub const ALL: [Visibility; 3] = [Self::All, Self::Supporters, Self::Premium];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Supporters => "supporters",
            Self::Premium => "premium",
        }
    }

    #[must_use]
    pub fn is_public(self) -> bool {
        matches!(self, Self::All)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CampaignPost {
    pub id: String,
    pub campaign_id: String,
    pub title: String,
    pub content: String,
    pub post_type: PostType,
    #[serde(default)]
    pub media_url: Option<String>,
    pub visibility: Visibility,
    pub created_at: String,
    pub updated_at: String,
}

impl Record for CampaignPost {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_order(a: &Self, b: &Self) -> Ordering {
        newest_first(&a.created_at, &a.id, &b.created_at, &b.id)
    }
}

/// A validated post payload, produced by [`crate::forms::PostForm::validate`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PostInput {
    pub title: String,
    pub content: String,
    pub post_type: PostType,
    pub media_url: Option<String>,
    pub visibility: Visibility,
}

#[derive(Serialize)]
pub(crate) struct NewPostRow<'a> {
    pub campaign_id: &'a str,
    #[serde(flatten)]
    pub input: &'a PostInput,
}

/// Partial post update. `media_url: Some(None)` clears the column.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_type: Option<PostType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

impl PostPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
