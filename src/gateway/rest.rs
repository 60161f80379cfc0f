//! HTTP gateway for the hosted backend's rows, storage and auth APIs.
//!
//! Thin `reqwest` wrapper. Query-string building and response parsing are
//! pure functions so they can be tested without a server.

use std::time::Duration;

use reqwest::RequestBuilder;
use serde_json::Value;

use super::{Gateway, Query};
use crate::config::BackendConfig;
use crate::error::ApiError;
use crate::session::SessionContext;
use crate::upload::MediaFile;

#[cfg(test)]
#[path = "rest_test.rs"]
mod rest_test;

const ROWS_PATH: &str = "rest/v1";
const STORAGE_PATH: &str = "storage/v1/object";
const LOGOUT_PATH: &str = "auth/v1/logout";
const UPLOAD_CACHE_CONTROL: &str = "3600";

// =============================================================================
// CLIENT
// =============================================================================

pub struct RestGateway {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    session: SessionContext,
}

impl RestGateway {
    /// Build a gateway that authenticates as the session user when signed in,
    /// and with the anon key otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &BackendConfig, session: SessionContext) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.url.clone(), anon_key: config.anon_key.clone(), session })
    }

    fn rows_url(&self, table: &str) -> String {
        format!("{}/{ROWS_PATH}/{table}", self.base_url)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self
            .session
            .access_token()
            .unwrap_or_else(|| self.anon_key.clone());
        request.header("apikey", &self.anon_key).bearer_auth(token)
    }

    async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = self
            .authed(request)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(parse_error(status, &text));
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl Gateway for RestGateway {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, ApiError> {
        let request = self
            .http
            .get(self.rows_url(&query.table))
            .query(&query_params(query));
        let text = self.send(request).await?;
        parse_rows(&text)
    }

    async fn insert(&self, table: &str, row: Value, columns: &str) -> Result<Value, ApiError> {
        let request = self
            .http
            .post(self.rows_url(table))
            .query(&[("select", columns)])
            .header("Prefer", "return=representation")
            .json(&row);
        let text = self.send(request).await?;
        parse_rows(&text)?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Parse(format!("insert into {table} returned no row")))
    }

    async fn update(&self, table: &str, id: &str, patch: Value, columns: &str) -> Result<Value, ApiError> {
        let request = self
            .http
            .patch(self.rows_url(table))
            .query(&[("select".to_string(), columns.to_string()), id_filter(id)])
            .header("Prefer", "return=representation")
            .json(&patch);
        let text = self.send(request).await?;
        parse_rows(&text)?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound { table: table.to_string(), id: id.to_string() })
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), ApiError> {
        let request = self
            .http
            .delete(self.rows_url(table))
            .query(&[id_filter(id)]);
        self.send(request).await?;
        Ok(())
    }

    async fn upload(&self, bucket: &str, key: &str, file: &MediaFile) -> Result<(), ApiError> {
        let url = format!("{}/{STORAGE_PATH}/{bucket}/{key}", self.base_url);
        let request = self
            .http
            .post(url)
            .header("content-type", &file.content_type)
            .header("cache-control", UPLOAD_CACHE_CONTROL)
            .header("x-upsert", "false")
            .body(file.bytes.clone());
        self.send(request).await?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        public_object_url(&self.base_url, bucket, key)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ApiError> {
        let response = self
            .http
            .post(format!("{}/{LOGOUT_PATH}", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status, &text));
        }
        Ok(())
    }
}

// =============================================================================
// WIRE HELPERS
// =============================================================================

/// Query-string pairs for a row read: `select`, one `col=eq.value` per filter,
/// then `order=col.asc|desc`.
pub(crate) fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = Vec::with_capacity(query.filters.len() + 2);
    params.push(("select".to_string(), query.columns.clone()));
    for filter in &query.filters {
        params.push((filter.column.clone(), format!("eq.{}", filter.value)));
    }
    if let Some(order) = &query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push(("order".to_string(), format!("{}.{direction}", order.column)));
    }
    params
}

pub(crate) fn id_filter(id: &str) -> (String, String) {
    ("id".to_string(), format!("eq.{id}"))
}

pub(crate) fn public_object_url(base_url: &str, bucket: &str, key: &str) -> String {
    format!("{base_url}/{STORAGE_PATH}/public/{bucket}/{key}")
}

pub(crate) fn parse_rows(text: &str) -> Result<Vec<Value>, ApiError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str::<Value>(text).map_err(|e| ApiError::Parse(e.to_string()))? {
        Value::Array(rows) => Ok(rows),
        Value::Null => Ok(Vec::new()),
        row @ Value::Object(_) => Ok(vec![row]),
        other => Err(ApiError::Parse(format!("expected row array, got {other}"))),
    }
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    code: Option<Value>,
}

/// Map a non-2xx response to an `ApiError`.
pub(crate) fn parse_error(status: u16, body: &str) -> ApiError {
    if status == 401 {
        return ApiError::NotAuthenticated;
    }
    let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
    let (message, code) = match parsed {
        Some(b) => {
            let code = b.code.map(|c| match c {
                Value::String(s) => s,
                other => other.to_string(),
            });
            (b.message.filter(|m| !m.is_empty()).or(b.error), code)
        }
        None => (None, None),
    };
    let message = message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| if body.trim().is_empty() { format!("HTTP {status}") } else { body.trim().to_string() });
    ApiError::Backend { status, code, message }
}
