//! HTTP seam of the sync client.

use reqwest::header::{ACCEPT, CONTENT_TYPE};

use super::error::{SyncError, SyncResult};
use crate::config::ClientConfig;

/// Raw response of a single POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Sends one JSON request. Timeouts, retries and cancellation are applied by
/// the caller; implementations only report what happened on the wire.
#[allow(async_fn_in_trait)]
pub trait SyncTransport {
    async fn post_json(&self, path: &str, body: &serde_json::Value)
        -> SyncResult<TransportResponse>;
}

/// [`SyncTransport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    config: ClientConfig,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> SyncResult<Self> {
        let config = config.normalized().map_err(SyncError::Configuration)?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(|error| SyncError::Configuration(error.to_string()))?;
        Ok(Self { config, client })
    }

    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl SyncTransport for HttpTransport {
    async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> SyncResult<TransportResponse> {
        let url = self.config.endpoint(path);
        tracing::debug!(%url, "Sending sync request");

        let mut request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest_error)?;
        Ok(TransportResponse { status, body })
    }
}

fn map_reqwest_error(error: reqwest::Error) -> SyncError {
    if error.is_timeout() {
        SyncError::Timeout
    } else {
        SyncError::Network(error.to_string())
    }
}
