//! Error taxonomy for the data-access layer.
//!
//! DESIGN
//! ======
//! Every failure a hook can surface is an `ApiError`. Validation failures are
//! produced locally and never reach the backend; everything else comes from
//! the gateway. `ErrorCode` gives each variant a grepable code and a retryable
//! flag so views can decide whether a "try again" affordance makes sense.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Trait for errors that carry a grepable code and retry hint.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// Errors produced by hooks, forms, the uploader and the gateway.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Client-side validation rejected the input. No network call was made.
    #[error("{0}")]
    Validation(String),

    /// No session is available, or the backend rejected the credentials.
    #[error("not authenticated")]
    NotAuthenticated,

    /// An update or single-row read matched no row.
    #[error("{table} row not found: {id}")]
    NotFound { table: String, id: String },

    /// The backend rejected the operation.
    #[error("backend error (status {status}): {message}")]
    Backend { status: u16, code: Option<String>, message: String },

    /// The HTTP request could not be completed.
    #[error("request failed: {0}")]
    Request(String),

    /// A response body could not be decoded.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// A configuration value is present but invalid.
    #[error("config parse failed: {0}")]
    Config(String),

    /// A required environment variable is not set.
    #[error("missing config: env var {var} not set")]
    MissingEnv { var: String },
}

impl ApiError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl ErrorCode for ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E_VALIDATION",
            Self::NotAuthenticated => "E_NOT_AUTHENTICATED",
            Self::NotFound { .. } => "E_NOT_FOUND",
            Self::Backend { .. } => "E_BACKEND",
            Self::Request(_) => "E_REQUEST",
            Self::Parse(_) => "E_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::Config(_) => "E_CONFIG_PARSE",
            Self::MissingEnv { .. } => "E_MISSING_ENV",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Backend { status: 429 | 500..=599, .. })
    }
}
