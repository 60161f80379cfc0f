//! Resource hooks: stateful data-access handles owned by views.
//!
//! SYSTEM CONTEXT
//! ==============
//! A view constructs a hook with the shared [`AppContext`], calls `fetch` on
//! mount and `close` on unmount, and reads snapshots between renders.
//! Mutations take validated form output, go through the gateway and are
//! reconciled into the hook's [`store::RecordStore`].
//!
//! ERROR HANDLING
//! ==============
//! Validation failures return before any network call and raise no notice;
//! the dialog shows them inline. Every other failure is logged, raised as an
//! error notice and returned so the invoking dialog can stay open.

pub mod campaigns;
pub mod detail;
pub mod plans;
pub mod posts;
pub(crate) mod store;

pub use campaigns::CampaignsHook;
pub use detail::{CampaignDetail, CampaignDetailHook, DetailOutcome};
pub use plans::CampaignPlansHook;
pub use posts::CampaignPostsHook;

use crate::error::ApiError;
use crate::gateway::{Query, decode_rows};
use crate::model::Record;
use crate::state::AppContext;
use store::RecordStore;

/// Run `query` and replace the store's records with the result.
///
/// Results of a superseded or closed fetch are dropped without a notice.
pub(crate) async fn load<T: Record>(
    ctx: &AppContext,
    store: &RecordStore<T>,
    query: &Query,
    failure: &str,
) -> Result<(), ApiError> {
    let Some(ticket) = store.begin_fetch() else {
        return Ok(());
    };

    match ctx.gateway.select(query).await.and_then(decode_rows::<T>) {
        Ok(rows) => {
            let count = rows.len();
            if store.finish_fetch(ticket, Some(rows)) {
                tracing::debug!(table = %query.table, count, "rows loaded");
            } else {
                tracing::debug!(table = %query.table, "stale fetch discarded");
            }
            Ok(())
        }
        Err(e) => {
            if store.finish_fetch(ticket, None) {
                ctx.fail(failure, &e);
            }
            Err(e)
        }
    }
}
