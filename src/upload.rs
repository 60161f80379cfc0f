//! Media upload helper for campaign images and post media.
//!
//! DESIGN
//! ======
//! Type and size are checked before any network call. Accepted files are
//! stored under `{user_id}/{unix_millis}.{ext}` and resolved to a public URL.
//!
//! The backend reports no real progress. While the upload call is pending a
//! timer raises the progress value by 10 every 100 ms, capped at 90; it only
//! reaches 100 once the call succeeds. Progress is cosmetic: completion is
//! decided by the upload result alone.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;

use crate::config::{BackendConfig, DEFAULT_MEDIA_BUCKET};
use crate::error::ApiError;
use crate::state::AppContext;

#[cfg(test)]
#[path = "upload_test.rs"]
mod upload_test;

pub const DEFAULT_MAX_SIZE_MB: u64 = 5;
pub const DEFAULT_ACCEPTED_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/gif"];

const PROGRESS_TICK: Duration = Duration::from_millis(100);
const PROGRESS_STEP: u8 = 10;
const PROGRESS_CAP: u8 = 90;
const PROGRESS_DONE: u8 = 100;

/// A file picked by the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl MediaFile {
    #[must_use]
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), content_type: content_type.into(), bytes }
    }

    /// Text after the last `.` of the file name, when it is non-empty ASCII
    /// alphanumeric. Anything else (`photo.png?x`, `a.b#c`) has no extension,
    /// so the storage key stays safe to place in a URL path.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadOptions {
    pub bucket: String,
    pub max_size_mb: u64,
    pub accepted_types: Vec<String>,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_MEDIA_BUCKET.to_string(),
            max_size_mb: DEFAULT_MAX_SIZE_MB,
            accepted_types: DEFAULT_ACCEPTED_TYPES.iter().map(|t| (*t).to_string()).collect(),
        }
    }
}

impl UploadOptions {
    /// Defaults, with the bucket taken from `MEDIA_BUCKET`.
    #[must_use]
    pub fn from_config(config: &BackendConfig) -> Self {
        Self::default().with_bucket(config.media_bucket.as_str())
    }

    #[must_use]
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    #[must_use]
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_mb * 1024 * 1024
    }

    /// # Errors
    ///
    /// Returns `Validation` for an unaccepted MIME type or an oversized file.
    pub fn validate(&self, file: &MediaFile) -> Result<(), ApiError> {
        if !self.accepted_types.iter().any(|t| *t == file.content_type) {
            let allowed: Vec<&str> = self
                .accepted_types
                .iter()
                .map(|t| t.split_once('/').map_or(t.as_str(), |(_, sub)| sub))
                .collect();
            return Err(ApiError::validation(format!("file type not allowed; use: {}", allowed.join(", "))));
        }
        if file.size() > self.max_size_bytes() {
            return Err(ApiError::validation(format!("image must be at most {}MB", self.max_size_mb)));
        }
        Ok(())
    }
}

/// What the uploader currently shows in place of the picker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Preview {
    /// Upload in flight for this file.
    Pending { file_name: String },
    Uploaded { url: String },
}

/// Storage key for an upload: `{user_id}/{millis}.{ext}`, or without an
/// extension when the file name has none.
#[must_use]
pub fn storage_key(user_id: &str, millis: i128, file: &MediaFile) -> String {
    match file.extension() {
        Some(ext) => format!("{user_id}/{millis}.{ext}"),
        None => format!("{user_id}/{millis}"),
    }
}

fn now_millis() -> i128 {
    time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000
}

pub struct MediaUploader {
    ctx: AppContext,
    options: UploadOptions,
    preview: Mutex<Option<Preview>>,
    uploading: AtomicBool,
    progress: watch::Sender<u8>,
}

impl MediaUploader {
    #[must_use]
    pub fn new(ctx: &AppContext, options: UploadOptions) -> Self {
        let (progress, _rx) = watch::channel(0);
        Self { ctx: ctx.clone(), options, preview: Mutex::new(None), uploading: AtomicBool::new(false), progress }
    }

    /// Start from an already stored image, as edit dialogs do.
    #[must_use]
    pub fn with_value(self, url: Option<String>) -> Self {
        *self.lock_preview() = url.map(|url| Preview::Uploaded { url });
        self
    }

    #[must_use]
    pub fn options(&self) -> &UploadOptions {
        &self.options
    }

    fn lock_preview(&self) -> MutexGuard<'_, Option<Preview>> {
        self.preview.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn preview(&self) -> Option<Preview> {
        self.lock_preview().clone()
    }

    #[must_use]
    pub fn is_uploading(&self) -> bool {
        self.uploading.load(Ordering::Acquire)
    }

    /// Watch the cosmetic progress value (0–100).
    #[must_use]
    pub fn progress(&self) -> watch::Receiver<u8> {
        self.progress.subscribe()
    }

    /// Clear the current image.
    pub fn remove(&self) {
        *self.lock_preview() = None;
        self.progress.send_replace(0);
    }

    /// Validate and upload `file`, returning its public URL.
    ///
    /// # Errors
    ///
    /// Returns `Validation` without any network call when the file is rejected,
    /// `NotAuthenticated` without a session, or the gateway error. Every
    /// failure clears the preview and raises an error notice, except the
    /// `Validation` returned while another upload is still pending.
    pub async fn upload(&self, file: &MediaFile) -> Result<String, ApiError> {
        if self.uploading.swap(true, Ordering::AcqRel) {
            return Err(ApiError::validation("an upload is already in progress"));
        }
        if let Err(e) = self.options.validate(file) {
            self.uploading.store(false, Ordering::Release);
            self.reset_after_failure();
            self.ctx.fail("Image rejected", &e);
            return Err(e);
        }

        *self.lock_preview() = Some(Preview::Pending { file_name: file.name.clone() });
        self.progress.send_replace(0);

        let result = self.upload_inner(file).await;
        self.uploading.store(false, Ordering::Release);

        match result {
            Ok(url) => {
                self.progress.send_replace(PROGRESS_DONE);
                *self.lock_preview() = Some(Preview::Uploaded { url: url.clone() });
                tracing::info!(bucket = %self.options.bucket, size = file.size(), "media uploaded");
                self.ctx.succeed("Image uploaded");
                Ok(url)
            }
            Err(e) => {
                self.reset_after_failure();
                self.ctx.fail("Image upload failed", &e);
                Err(e)
            }
        }
    }

    async fn upload_inner(&self, file: &MediaFile) -> Result<String, ApiError> {
        let user_id = self.ctx.require_user()?;
        let key = storage_key(&user_id, now_millis(), file);
        let bucket = self.options.bucket.as_str();

        let mut call = self.ctx.gateway.upload(bucket, &key, file);
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + PROGRESS_TICK, PROGRESS_TICK);
        loop {
            tokio::select! {
                result = &mut call => {
                    result?;
                    break;
                }
                _ = ticker.tick() => {
                    self.progress.send_modify(|p| *p = p.saturating_add(PROGRESS_STEP).min(PROGRESS_CAP));
                }
            }
        }

        Ok(self.ctx.gateway.public_url(bucket, &key))
    }

    fn reset_after_failure(&self) {
        *self.lock_preview() = None;
        self.progress.send_replace(0);
    }
}
