//! Persistent CLI configuration.

use std::env;
use std::path::{Path, PathBuf};

use marksync_core::config::{ClientConfig, API_KEY_ENV, API_URL_ENV};
use marksync_core::util::{is_http_url, normalize_text_option};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "cli-config.json";
const APP_DIR: &str = "marksync";
pub const BOOKMARKS_ENV: &str = "MARKSYNC_BOOKMARKS";
pub const SYNC_KEY_ENV: &str = "MARKSYNC_SYNC_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub bookmarks_path: Option<PathBuf>,
    /// Bearer key for the chunked upload endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

const fn default_config_version() -> u32 {
    1
}

fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

pub fn default_config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

pub fn default_settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn default_bookmarks_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("bookmarks.json")
}

impl CliConfig {
    pub fn load() -> Result<Self, String> {
        Self::load_from_path(&default_config_path())
    }

    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|error| format!("Failed to read config at {}: {}", path.display(), error))?;
        let mut config = serde_json::from_str::<Self>(&raw)
            .map_err(|error| format!("Failed to parse config at {}: {}", path.display(), error))?;
        config.normalize();
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf, String> {
        let path = default_config_path();
        self.save_to_path(&path)?;
        Ok(path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    error
                )
            })?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)
            .map_err(|error| format!("Failed to serialize config: {error}"))?;
        std::fs::write(path, serialized)
            .map_err(|error| format!("Failed to write config at {}: {}", path.display(), error))
    }

    /// Bookmark file: flag, then `MARKSYNC_BOOKMARKS`, then config, then the
    /// platform data dir.
    pub fn resolve_bookmarks_path(&self, explicit: Option<PathBuf>) -> PathBuf {
        explicit
            .or_else(|| env::var_os(BOOKMARKS_ENV).map(PathBuf::from))
            .or_else(|| self.bookmarks_path.clone())
            .unwrap_or_else(default_bookmarks_path)
    }

    /// API settings: flag, then `MARKSYNC_API_URL`, then config, then the
    /// built-in default. The API key comes from `MARKSYNC_API_KEY`, then
    /// config.
    pub fn resolve_client_config(
        &self,
        explicit_api_url: Option<String>,
    ) -> Result<ClientConfig, String> {
        let api_base_url = normalize_text_option(explicit_api_url)
            .or_else(|| normalize_text_option(env::var(API_URL_ENV).ok()))
            .or_else(|| self.api_base_url.clone());
        let api_key = normalize_text_option(env::var(API_KEY_ENV).ok())
            .or_else(|| self.api_key.clone());
        ClientConfig::default()
            .with_api_base_url(api_base_url)
            .with_api_key(api_key)
            .normalized()
    }

    fn normalize(&mut self) {
        self.api_base_url = normalize_text_option(self.api_base_url.clone())
            .map(|url| url.trim_end_matches('/').to_string());
        self.bookmarks_path = self
            .bookmarks_path
            .take()
            .filter(|path| !path.as_os_str().is_empty());
        self.api_key = normalize_text_option(self.api_key.take());
    }
}

pub fn validate_api_base_url(value: &str) -> Result<String, String> {
    let value = value.trim();
    if is_http_url(value) {
        Ok(value.trim_end_matches('/').to_string())
    } else {
        Err(format!("API base URL must include http:// or https:// (got '{value}')"))
    }
}
