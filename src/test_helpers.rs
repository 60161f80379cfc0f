//! In-memory gateway, recording notifier and record fixtures for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::error::ApiError;
use crate::gateway::{Gateway, Query};
use crate::model::{Campaign, CampaignPlan, CampaignPost, PostType, Visibility};
use crate::notify::{Notice, Notifier};
use crate::session::{Session, SessionContext};
use crate::state::AppContext;
use crate::upload::MediaFile;

// =============================================================================
// GATEWAY
// =============================================================================

/// One stored object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub bucket: String,
    pub key: String,
    pub content_type: String,
    pub size: usize,
}

#[derive(Default)]
struct MemoryInner {
    tables: HashMap<String, Vec<Value>>,
    next_id: u64,
    clock: u64,
    calls: Vec<String>,
    failures: HashSet<String>,
    objects: Vec<StoredObject>,
    delay: Option<Duration>,
}

/// Gateway over in-memory tables. Records every call as `op:table`
/// (`sign_out` for sign-out) so tests can assert which requests were made.
#[derive(Default)]
pub struct MemoryGateway {
    inner: Mutex<MemoryInner>,
}

impl MemoryGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a row as-is, filling only a missing id and timestamps.
    pub fn seed(&self, table: &str, row: Value) {
        let mut inner = self.lock();
        let row = inner.stamp(table, row);
        inner.tables.entry(table.to_string()).or_default().push(row);
    }

    pub fn seed_record<T: Serialize>(&self, table: &str, record: &T) {
        self.seed(table, row(record));
    }

    #[must_use]
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.lock().tables.get(table).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Make every `op` against `table` fail with a 500 until [`Self::recover`].
    /// Sign-out uses the table name `auth`.
    pub fn fail_on(&self, op: &str, table: &str) {
        self.lock().failures.insert(format!("{op}:{table}"));
    }

    pub fn recover(&self) {
        self.lock().failures.clear();
    }

    /// Delay every select response and upload by `delay` (use with paused time).
    pub fn set_delay(&self, delay: Duration) {
        self.lock().delay = Some(delay);
    }

    #[must_use]
    pub fn objects(&self) -> Vec<StoredObject> {
        self.lock().objects.clone()
    }

    fn begin(&self, op: &str, table: &str) -> Result<Option<Duration>, ApiError> {
        let mut inner = self.lock();
        let call = if op == "sign_out" { op.to_string() } else { format!("{op}:{table}") };
        inner.calls.push(call);
        if inner.failures.contains(&format!("{op}:{table}")) {
            return Err(ApiError::Backend { status: 500, code: None, message: format!("{op} on {table} failed") });
        }
        Ok(inner.delay)
    }

    async fn pause(delay: Option<Duration>) {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl MemoryInner {
    fn tick(&mut self) -> String {
        self.clock += 1;
        format!("2026-01-01T00:00:00.{:06}Z", self.clock)
    }

    fn stamp(&mut self, table: &str, row: Value) -> Value {
        let mut object = match row {
            Value::Object(object) => object,
            other => return other,
        };
        if !object.contains_key("id") {
            self.next_id += 1;
            object.insert("id".into(), json!(format!("{table}-{}", self.next_id)));
        }
        if !object.contains_key("created_at") {
            let now = self.tick();
            object.insert("created_at".into(), json!(now));
        }
        if table != "campaign_plans" && !object.contains_key("updated_at") {
            let created = object.get("created_at").cloned().unwrap_or(Value::Null);
            object.insert("updated_at".into(), created);
        }
        if table == "campaigns" && !object.contains_key("status") {
            object.insert("status".into(), json!("active"));
        }
        Value::Object(object)
    }

    /// Apply the `profiles(...)` join when the column list asks for it.
    fn project(&self, row: &Value, columns: &str) -> Value {
        let mut row = row.clone();
        if columns.contains("profiles(")
            && let Value::Object(object) = &mut row
        {
            let owner = object.get("owner_id").cloned().unwrap_or(Value::Null);
            let profile = self
                .tables
                .get("profiles")
                .and_then(|profiles| profiles.iter().find(|p| p.get("id") == Some(&owner)))
                .map(|p| json!({ "full_name": p["full_name"], "avatar_url": p["avatar_url"] }))
                .unwrap_or(Value::Null);
            object.insert("profiles".into(), profile);
        }
        row
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn compare(a: &Value, b: &Value) -> std::cmp::Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => text(a).cmp(&text(b)),
    }
}

#[async_trait::async_trait]
impl Gateway for MemoryGateway {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, ApiError> {
        let delay = self.begin("select", &query.table)?;

        // Rows are read when the request starts; the delay models the response in flight.
        let rows = {
            let inner = self.lock();
            let mut rows: Vec<Value> = inner
                .tables
                .get(&query.table)
                .into_iter()
                .flatten()
                .filter(|row| query.filters.iter().all(|f| row.get(&f.column).is_some_and(|v| text(v) == f.value)))
                .map(|row| inner.project(row, &query.columns))
                .collect();
            if let Some(order) = &query.order {
                rows.sort_by(|a, b| {
                    let ord = compare(&a[&order.column], &b[&order.column]);
                    if order.ascending { ord } else { ord.reverse() }
                });
            }
            rows
        };
        Self::pause(delay).await;
        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Value, columns: &str) -> Result<Value, ApiError> {
        self.begin("insert", table)?;
        let mut inner = self.lock();
        let stored = inner.stamp(table, row);
        inner.tables.entry(table.to_string()).or_default().push(stored.clone());
        Ok(inner.project(&stored, columns))
    }

    async fn update(&self, table: &str, id: &str, patch: Value, columns: &str) -> Result<Value, ApiError> {
        self.begin("update", table)?;
        let mut inner = self.lock();
        let now = inner.tick();
        let not_found = || ApiError::NotFound { table: table.to_string(), id: id.to_string() };
        let row = inner
            .tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|r| r.get("id").is_some_and(|v| text(v) == id)))
            .ok_or_else(not_found)?;
        if let (Value::Object(target), Value::Object(fields)) = (&mut *row, patch) {
            target.extend(fields);
            if target.contains_key("updated_at") {
                target.insert("updated_at".into(), json!(now));
            }
        }
        let updated = row.clone();
        Ok(inner.project(&updated, columns))
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), ApiError> {
        self.begin("delete", table)?;
        if let Some(rows) = self.lock().tables.get_mut(table) {
            rows.retain(|r| r.get("id").is_none_or(|v| text(v) != id));
        }
        Ok(())
    }

    async fn upload(&self, bucket: &str, key: &str, file: &MediaFile) -> Result<(), ApiError> {
        let delay = self.begin("upload", bucket)?;
        Self::pause(delay).await;
        self.lock().objects.push(StoredObject {
            bucket: bucket.to_string(),
            key: key.to_string(),
            content_type: file.content_type.clone(),
            size: file.bytes.len(),
        });
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("https://storage.test/{bucket}/{key}")
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), ApiError> {
        self.begin("sign_out", "auth")?;
        Ok(())
    }
}

// =============================================================================
// NOTIFIER
// =============================================================================

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn errors(&self) -> Vec<Notice> {
        self.notices().into_iter().filter(Notice::is_error).collect()
    }

    #[must_use]
    pub fn successes(&self) -> Vec<Notice> {
        self.notices().into_iter().filter(|n| !n.is_error()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap_or_else(PoisonError::into_inner).push(notice);
    }
}

// =============================================================================
// CONTEXT
// =============================================================================

/// An [`AppContext`] wired to in-memory collaborators the test can inspect.
pub struct TestApp {
    pub ctx: AppContext,
    pub gateway: Arc<MemoryGateway>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    #[must_use]
    pub fn signed_in(user_id: &str) -> Self {
        Self::with_session(SessionContext::signed_in(session_for(user_id)))
    }

    #[must_use]
    pub fn anonymous() -> Self {
        let session = SessionContext::new();
        session.restore(None);
        Self::with_session(session)
    }

    fn with_session(session: SessionContext) -> Self {
        let gateway = Arc::new(MemoryGateway::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let ctx = AppContext::new(gateway.clone(), session, notifier.clone());
        Self { ctx, gateway, notifier }
    }
}

#[must_use]
pub fn session_for(user_id: &str) -> Session {
    Session { user_id: user_id.to_string(), access_token: format!("token-{user_id}") }
}

// =============================================================================
// FIXTURES
// =============================================================================

/// Serialize a record into a backend row.
#[must_use]
pub fn row<T: Serialize>(record: &T) -> Value {
    serde_json::to_value(record).unwrap_or_else(|_| Value::Object(Map::new()))
}

#[must_use]
pub fn campaign(id: &str, owner_id: &str, status: &str) -> Campaign {
    Campaign {
        id: id.to_string(),
        owner_id: owner_id.to_string(),
        title: format!("Campaign {id}"),
        description: Some("About this campaign".to_string()),
        image_url: None,
        category: vec!["Art".to_string()],
        status: status.to_string(),
        created_at: "2026-01-01T00:00:00.000000Z".to_string(),
        updated_at: "2026-01-01T00:00:00.000000Z".to_string(),
        profiles: None,
    }
}

#[must_use]
pub fn plan(id: &str, campaign_id: &str, price: f64) -> CampaignPlan {
    CampaignPlan {
        id: id.to_string(),
        campaign_id: campaign_id.to_string(),
        name: format!("Plan {id}"),
        description: None,
        price,
        benefits: Vec::new(),
        created_at: "2026-01-01T00:00:00.000000Z".to_string(),
    }
}

#[must_use]
pub fn post(id: &str, campaign_id: &str, post_type: PostType, visibility: Visibility) -> CampaignPost {
    CampaignPost {
        id: id.to_string(),
        campaign_id: campaign_id.to_string(),
        title: format!("Post {id}"),
        content: "Body".to_string(),
        post_type,
        media_url: post_type.requires_media().then(|| format!("https://media.test/{id}")),
        visibility,
        created_at: "2026-01-01T00:00:00.000000Z".to_string(),
        updated_at: "2026-01-01T00:00:00.000000Z".to_string(),
    }
}
