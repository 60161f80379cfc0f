//! Backend gateway: the seam between hooks and the hosted backend.
//!
//! ARCHITECTURE
//! ============
//! Hooks build a [`Query`] (table, columns, equality filters, ordering) and
//! hand rows to the gateway as JSON. The production implementation is
//! [`rest::RestGateway`]; tests inject an in-memory gateway instead.
//!
//! DESIGN
//! ======
//! Rows cross the seam as `serde_json::Value` so the trait stays
//! object-safe. Decoding into typed records happens in [`decode_rows`] and
//! [`decode_row`] on the hook side.

pub mod rest;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::upload::MediaFile;


// =============================================================================
// QUERY
// =============================================================================

/// Equality filter on one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A filtered, ordered row read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub table: String,
    /// Column list, including relationship joins such as `profiles(full_name)`.
    pub columns: String,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
}

impl Query {
    #[must_use]
    pub fn new(table: &str) -> Self {
        Self { table: table.to_string(), columns: "*".to_string(), filters: Vec::new(), order: None }
    }

    #[must_use]
    pub fn columns(mut self, columns: &str) -> Self {
        columns.clone_into(&mut self.columns);
        self
    }

    #[must_use]
    pub fn eq(mut self, column: &str, value: impl Into<String>) -> Self {
        self.filters.push(Filter { column: column.to_string(), value: value.into() });
        self
    }

    #[must_use]
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order { column: column.to_string(), ascending });
        self
    }
}

// =============================================================================
// GATEWAY
// =============================================================================

/// Operations consumed from the hosted backend.
#[async_trait::async_trait]
pub trait Gateway: Send + Sync {
    /// Read rows matching every filter in `query`.
    async fn select(&self, query: &Query) -> Result<Vec<Value>, ApiError>;

    /// Insert one row and return it as stored, projected through `columns`.
    async fn insert(&self, table: &str, row: Value, columns: &str) -> Result<Value, ApiError>;

    /// Update the row with `id` and return it as stored.
    ///
    /// Returns [`ApiError::NotFound`] when no row matched.
    async fn update(&self, table: &str, id: &str, patch: Value, columns: &str) -> Result<Value, ApiError>;

    /// Delete the row with `id`. Deleting a missing row is not an error.
    async fn delete(&self, table: &str, id: &str) -> Result<(), ApiError>;

    /// Store an object under `key`. Existing keys are never overwritten.
    async fn upload(&self, bucket: &str, key: &str, file: &MediaFile) -> Result<(), ApiError>;

    /// Public URL for an uploaded object.
    fn public_url(&self, bucket: &str, key: &str) -> String;

    /// Revoke the session identified by `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<(), ApiError>;
}

// =============================================================================
// CODEC HELPERS
// =============================================================================

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Parse(e.to_string()))
}

pub(crate) fn decode_row<T: DeserializeOwned>(row: Value) -> Result<T, ApiError> {
    serde_json::from_value(row).map_err(|e| ApiError::Parse(e.to_string()))
}

pub(crate) fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, ApiError> {
    rows.into_iter().map(decode_row).collect()
}
