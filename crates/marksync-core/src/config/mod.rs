//! Remote endpoint configuration shared by the sync client and the CLI.
//!
//! [`ClientConfig`] carries the API base URL plus the timeout and retry knobs
//! used by [`crate::sync::SyncClient`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::util::{is_http_url, normalize_text_option};

/// Base URL used when neither the environment nor a config file sets one.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "MARKSYNC_API_URL";
/// Environment variable holding the bearer key for the upload endpoint.
pub const API_KEY_ENV: &str = "MARKSYNC_API_KEY";

const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_BACKOFF_BASE_MS: u64 = 1_000;
const DEFAULT_BACKOFF_JITTER_MS: u64 = 500;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Per-attempt request timeout
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Extra attempts after the first one fails with a retryable error
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_backoff_jitter_ms")]
    pub backoff_jitter_ms: u64,
    /// Sent as `Authorization: Bearer <key>` when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
            backoff_jitter_ms: DEFAULT_BACKOFF_JITTER_MS,
            api_key: None,
        }
    }
}

impl ClientConfig {
    /// Defaults with `MARKSYNC_API_URL` and `MARKSYNC_API_KEY` applied when
    /// set.
    pub fn from_env() -> Result<Self, String> {
        Self::default()
            .with_api_base_url(std::env::var(API_URL_ENV).ok())
            .with_api_key(std::env::var(API_KEY_ENV).ok())
            .normalized()
    }

    /// Override the API key; blank values keep the current one.
    #[must_use]
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        if let Some(key) = normalize_text_option(api_key) {
            self.api_key = Some(key);
        }
        self
    }

    /// Override the base URL; blank values keep the current one.
    #[must_use]
    pub fn with_api_base_url(mut self, api_base_url: Option<String>) -> Self {
        if let Some(url) = normalize_text_option(api_base_url) {
            self.api_base_url = url;
        }
        self
    }

    /// Validate and canonicalize (trimmed, no trailing slash).
    pub fn normalized(mut self) -> Result<Self, String> {
        let url = normalize_text_option(Some(self.api_base_url))
            .ok_or_else(|| "api_base_url must not be empty".to_string())?;
        if !is_http_url(&url) {
            return Err(format!(
                "api_base_url must include http:// or https:// (got '{url}')"
            ));
        }
        if self.timeout_ms == 0 {
            return Err("timeout_ms must be greater than zero".to_string());
        }

        self.api_base_url = url.trim_end_matches('/').to_string();
        self.api_key = normalize_text_option(self.api_key);
        Ok(self)
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Absolute URL for an API path such as `/directory/sync`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

const fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

const fn default_backoff_base_ms() -> u64 {
    DEFAULT_BACKOFF_BASE_MS
}

const fn default_backoff_jitter_ms() -> u64 {
    DEFAULT_BACKOFF_JITTER_MS
}
