//! Normalized record store shared by every resource hook.
//!
//! DESIGN
//! ======
//! Records are keyed by id. Fetches replace the whole set; mutations
//! reconcile one record at a time from the row the backend returned
//! (insert/update upsert, delete removes). Views get sorted snapshots.
//!
//! Each fetch takes a generation ticket. Starting a newer fetch, applying a
//! mutation, or closing the store when the owning view unmounts makes older
//! tickets stale and their results are dropped on arrival. Reconciled
//! records always win over rows read before the mutation.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::model::Record;

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

/// Proof that a fetch was started at a given generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct FetchTicket(u64);

pub(crate) struct RecordStore<T> {
    inner: Mutex<StoreInner<T>>,
}

struct StoreInner<T> {
    records: HashMap<String, T>,
    loading: bool,
    /// Bumped by every fetch, mutation and close.
    generation: u64,
    /// Ticket of the most recently started fetch.
    latest_fetch: u64,
    closed: bool,
}

impl<T: Record> RecordStore<T> {
    /// A store that reports loading until its first fetch settles.
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                records: HashMap::new(),
                loading: true,
                generation: 0,
                latest_fetch: 0,
                closed: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark a fetch as in flight. Returns `None` once the store is closed.
    pub(crate) fn begin_fetch(&self) -> Option<FetchTicket> {
        let mut inner = self.lock();
        if inner.closed {
            return None;
        }
        inner.generation += 1;
        inner.latest_fetch = inner.generation;
        inner.loading = true;
        Some(FetchTicket(inner.generation))
    }

    /// Settle a fetch. `Some(rows)` replaces the record set, `None` (failure)
    /// keeps it. Returns false when the ticket was stale and nothing changed.
    ///
    /// The most recent fetch always clears `loading`, even when a mutation
    /// made its rows stale.
    pub(crate) fn finish_fetch(&self, ticket: FetchTicket, rows: Option<Vec<T>>) -> bool {
        let mut inner = self.lock();
        if inner.closed {
            return false;
        }
        if ticket.0 == inner.latest_fetch {
            inner.loading = false;
        }
        if ticket.0 != inner.generation {
            return false;
        }
        if let Some(rows) = rows {
            inner.records = rows.into_iter().map(|r| (r.id().to_string(), r)).collect();
        }
        true
    }

    pub(crate) fn upsert(&self, record: T) -> bool {
        let mut inner = self.lock();
        if inner.closed {
            return false;
        }
        inner.generation += 1;
        inner.records.insert(record.id().to_string(), record);
        true
    }

    pub(crate) fn remove(&self, id: &str) -> bool {
        let mut inner = self.lock();
        if inner.closed {
            return false;
        }
        inner.generation += 1;
        inner.records.remove(id).is_some()
    }

    /// Apply a row returned by a mutation. Rows that no longer belong to the
    /// owning view (`keep == false`) are removed instead.
    pub(crate) fn reconcile(&self, record: T, keep: bool) {
        if keep {
            self.upsert(record);
        } else {
            self.remove(record.id());
        }
    }

    pub(crate) fn get(&self, id: &str) -> Option<T> {
        self.lock().records.get(id).cloned()
    }

    /// All records in display order.
    pub(crate) fn snapshot(&self) -> Vec<T> {
        let mut records: Vec<T> = self.lock().records.values().cloned().collect();
        records.sort_by(T::display_order);
        records
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.lock().loading
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.lock().records.len()
    }

    /// Loaded and holding nothing. A store that is still loading is not empty.
    pub(crate) fn is_empty(&self) -> bool {
        let inner = self.lock();
        !inner.loading && inner.records.is_empty()
    }

    /// Detach from the owning view. In-flight fetches and late mutation
    /// results are discarded from here on.
    pub(crate) fn close(&self) {
        let mut inner = self.lock();
        inner.closed = true;
        inner.loading = false;
        inner.generation += 1;
    }

    #[cfg(test)]
    pub(crate) fn is_closed(&self) -> bool {
        self.lock().closed
    }
}
