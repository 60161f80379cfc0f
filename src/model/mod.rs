//! Typed records for the campaign, plan, post and profile tables.
//!
//! SYSTEM CONTEXT
//! ==============
//! Rows arrive from the gateway as JSON and are decoded into these types at
//! the hook boundary. Every record type implements [`Record`] so the shared
//! store can key it by id and sort it for display.

pub mod campaign;
pub mod plan;
pub mod post;

use std::cmp::Ordering;

use serde::de::DeserializeOwned;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub use campaign::{Campaign, CampaignDraft, CampaignPatch, Profile};
pub use plan::{CampaignPlan, PlanInput};
pub use post::{CampaignPost, PostInput, PostPatch, PostType, Visibility};

/// A backend row the local store can key and order.
pub trait Record: Clone + DeserializeOwned + Send + 'static {
    fn id(&self) -> &str;

    /// Ordering used when the store hands a snapshot to a view.
    fn display_order(a: &Self, b: &Self) -> Ordering;
}

/// Chronological order of two backend timestamps.
///
/// Both are parsed as RFC 3339, so trimmed fractions (`…:00Z` vs `…:00.5Z`)
/// and mixed offsets compare by instant. Unparseable values fall back to
/// string order.
pub(crate) fn cmp_timestamps(a: &str, b: &str) -> Ordering {
    match (OffsetDateTime::parse(a, &Rfc3339), OffsetDateTime::parse(b, &Rfc3339)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

/// Newest-first ordering on backend timestamps, with id as a stable tiebreak.
pub(crate) fn newest_first(a_created: &str, a_id: &str, b_created: &str, b_id: &str) -> Ordering {
    cmp_timestamps(b_created, a_created).then_with(|| a_id.cmp(b_id))
}
