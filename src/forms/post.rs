//! Post create/edit form and the client-side list filter.

use crate::error::ApiError;
use crate::model::{CampaignPost, PostInput, PostPatch, PostType, Visibility};

#[cfg(test)]
#[path = "post_test.rs"]
mod post_test;

pub const MAX_TITLE_LENGTH: usize = 100;
pub const MAX_CONTENT_LENGTH: usize = 5000;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PostForm {
    pub title: String,
    pub content: String,
    pub post_type: PostType,
    /// Uploaded image URL, or a pasted video/audio URL.
    pub media_url: String,
    pub visibility: Visibility,
}

impl PostForm {
    #[must_use]
    pub fn from_post(post: &CampaignPost) -> Self {
        Self {
            title: post.title.clone(),
            content: post.content.clone(),
            post_type: post.post_type,
            media_url: post.media_url.clone().unwrap_or_default(),
            visibility: post.visibility,
        }
    }

    /// Back to a blank text post, as after a successful submit.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// # Errors
    ///
    /// Returns `Validation` for a blank or over-long title or content, or a
    /// missing media URL on image/video/audio posts.
    pub fn validate(&self) -> Result<PostInput, ApiError> {
        let title = self.title.trim();
        let content = self.content.trim();
        if title.is_empty() {
            return Err(ApiError::validation("post title is required"));
        }
        if content.is_empty() {
            return Err(ApiError::validation("post content is required"));
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(ApiError::validation(format!("post title must be at most {MAX_TITLE_LENGTH} characters")));
        }
        if content.chars().count() > MAX_CONTENT_LENGTH {
            return Err(ApiError::validation(format!(
                "post content must be at most {MAX_CONTENT_LENGTH} characters"
            )));
        }

        let media_url = self.media_url.trim();
        let media_url = if self.post_type.requires_media() {
            if media_url.is_empty() {
                let message = match self.post_type {
                    PostType::Image => "upload an image for image posts",
                    _ => "a media URL is required for video and audio posts",
                };
                return Err(ApiError::validation(message));
            }
            Some(media_url.to_string())
        } else {
            None
        };

        Ok(PostInput {
            title: title.to_string(),
            content: content.to_string(),
            post_type: self.post_type,
            media_url,
            visibility: self.visibility,
        })
    }

    /// Full patch for an edit submission. Switching to a text post clears
    /// the stored media URL.
    ///
    /// # Errors
    ///
    /// Same as [`PostForm::validate`].
    pub fn to_patch(&self) -> Result<PostPatch, ApiError> {
        let input = self.validate()?;
        Ok(PostPatch {
            title: Some(input.title),
            content: Some(input.content),
            post_type: Some(input.post_type),
            media_url: Some(input.media_url),
            visibility: Some(input.visibility),
        })
    }
}

/// Client-side post filter. `None` means "any".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub post_type: Option<PostType>,
    pub visibility: Option<Visibility>,
}

impl PostFilter {
    #[must_use]
    pub fn matches(&self, post: &CampaignPost) -> bool {
        self.post_type.is_none_or(|t| t == post.post_type)
            && self.visibility.is_none_or(|v| v == post.visibility)
    }

    /// Matching posts, in their original order.
    #[must_use]
    pub fn apply(&self, posts: &[CampaignPost]) -> Vec<CampaignPost> {
        posts.iter().filter(|p| self.matches(p)).cloned().collect()
    }
}
