//! Toast notifications raised by hooks and the uploader.
//!
//! Views plug in their own toast renderer by implementing [`Notifier`]. The
//! default [`TracingNotifier`] only logs.

use crate::error::{ApiError, ErrorCode};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// One user-facing notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: Option<String>,
    /// Grepable error code for error notices.
    pub code: Option<&'static str>,
    /// Whether resubmitting might succeed.
    pub retryable: bool,
}

impl Notice {
    #[must_use]
    pub fn success(title: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, title: title.into(), description: None, code: None, retryable: false }
    }

    #[must_use]
    pub fn error(title: impl Into<String>, err: &ApiError) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            description: Some(err.to_string()),
            code: Some(err.error_code()),
            retryable: err.retryable(),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Logs notices through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => tracing::info!(title = %notice.title, "notice"),
            NoticeLevel::Error => tracing::warn!(
                title = %notice.title,
                description = notice.description.as_deref().unwrap_or(""),
                code = notice.code.unwrap_or(""),
                retryable = notice.retryable,
                "error notice"
            ),
        }
    }
}
