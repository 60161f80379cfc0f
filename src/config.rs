//! Backend configuration parsed from environment variables.

use crate::error::ApiError;

pub const DEFAULT_MEDIA_BUCKET: &str = "campaign-images";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for BackendTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Project base URL, without a trailing slash.
    pub url: String,
    /// Public (anon) API key sent with every request.
    pub anon_key: String,
    /// Object-store bucket used when an upload does not name one.
    pub media_bucket: String,
    pub timeouts: BackendTimeouts,
}

impl BackendConfig {
    /// Load a `.env` file if one exists, then build config from the environment.
    ///
    /// # Errors
    ///
    /// See [`BackendConfig::from_env`].
    pub fn load() -> Result<Self, ApiError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, ".env file could not be read");
            }
        }
        Self::from_env()
    }

    /// Build typed backend config from environment variables.
    ///
    /// Required:
    /// - `BACKEND_URL`: `http(s)://` project URL
    /// - `BACKEND_ANON_KEY`: public API key
    ///
    /// Optional:
    /// - `MEDIA_BUCKET`: default `campaign-images`
    /// - `BACKEND_REQUEST_TIMEOUT_SECS`: default 30
    /// - `BACKEND_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or the URL is not http(s).
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup. `from_env` delegates here.
    ///
    /// # Errors
    ///
    /// Returns an error if a required key is missing or the URL is not http(s).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = required(&lookup, "BACKEND_URL")?;
        let url = url.trim().trim_end_matches('/').to_string();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ApiError::Config(format!("BACKEND_URL must be an http(s) URL, got '{url}'")));
        }

        let anon_key = required(&lookup, "BACKEND_ANON_KEY")?;
        let media_bucket = lookup("MEDIA_BUCKET")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_MEDIA_BUCKET.to_string());
        let timeouts = BackendTimeouts {
            request_secs: parse_u64(&lookup, "BACKEND_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_u64(&lookup, "BACKEND_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { url, anon_key, media_bucket, timeouts })
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String, ApiError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::MissingEnv { var: key.to_string() })
}

fn parse_u64<F>(lookup: &F, key: &str, default: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
