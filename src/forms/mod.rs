//! Headless form state and validation for the create/edit dialogs.
//!
//! SYSTEM CONTEXT
//! ==============
//! Dialogs bind their inputs to these structs, call `validate` (or
//! `to_patch` when editing) and pass the typed result to a hook. Validation
//! failures are `ApiError::Validation` and never reach the backend.

pub mod campaign;
pub mod plan;
pub mod post;

pub use campaign::{CATEGORIES, CampaignForm, CategorySelection, MAX_CATEGORIES};
pub use plan::{BenefitRows, PlanForm};
pub use post::{MAX_CONTENT_LENGTH, MAX_TITLE_LENGTH, PostFilter, PostForm};

/// Trim, mapping an empty result to `None`.
pub(crate) fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
