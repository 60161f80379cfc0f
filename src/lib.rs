//! Patronage data-access layer: campaigns, support plans, posts and media
//! uploads for a creator-support platform.
//!
//! SYSTEM CONTEXT
//! ==============
//! Views own resource hooks ([`hooks`]) built from one shared
//! [`state::AppContext`]. Hooks read and mutate rows through the
//! [`gateway::Gateway`] seam, keep a normalized local copy, and raise toast
//! notices through [`notify::Notifier`]. Dialogs validate user input with
//! [`forms`] before any request is made.
//!
//! ```text
//! view -> form::validate -> hook -> gateway -> hook store -> view
//! ```

pub mod config;
pub mod error;
pub mod forms;
pub mod gateway;
pub mod hooks;
pub mod model;
pub mod notify;
pub mod session;
pub mod state;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::BackendConfig;
pub use error::{ApiError, ErrorCode};
pub use hooks::{CampaignDetailHook, CampaignPlansHook, CampaignPostsHook, CampaignsHook, DetailOutcome};
pub use session::{Session, SessionContext};
pub use state::AppContext;
pub use upload::{MediaFile, MediaUploader, UploadOptions};
