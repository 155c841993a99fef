//! Outbound bookmark sync.
//!
//! [`SyncClient`] turns a selection into wire nodes and posts them to the
//! backend, applying a per-attempt timeout, bounded retries with jittered
//! backoff and caller-driven cancellation.

mod error;
mod transport;

use std::collections::BTreeSet;
use std::time::Duration;

use rand::Rng;
use serde::Deserialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;

pub use error::{SyncError, SyncResult};
pub use transport::{HttpTransport, SyncTransport, TransportResponse};

use crate::config::ClientConfig;
use crate::models::{BookmarkFolder, WireNode};
use crate::tree::{filter_by_selected, to_wire_format};

/// Endpoint taking the whole selection together with a sync key.
pub const DIRECTORY_SYNC_PATH: &str = "/directory/sync";
/// Endpoint taking the selection in chunks.
pub const CHUNKED_UPLOAD_PATH: &str = "/bookmarks/sync";
/// Top-level wire nodes per upload chunk.
pub const CHUNK_SIZE: usize = 500;

/// Backoff schedule between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&ClientConfig::default())
    }
}

impl From<&ClientConfig> for RetryPolicy {
    fn from(config: &ClientConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.backoff_base_ms),
            jitter: Duration::from_millis(config.backoff_jitter_ms),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based): `attempt * base + jitter`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let jitter_ms = u64::try_from(self.jitter.as_millis()).unwrap_or(u64::MAX);
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
        };
        self.base_delay.saturating_mul(attempt) + jitter
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

/// Body every backend endpoint answers with.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResponseEnvelope {
    pub status: EnvelopeStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub code: Option<i64>,
}

/// Outcome of a successful sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Requests that reached the server
    pub chunks: usize,
    /// Folders and URLs sent
    pub nodes: usize,
}

/// Cancels an in-flight sync from the outside.
#[derive(Debug, Clone, Default)]
pub struct SyncHandle {
    token: CancellationToken,
}

impl SyncHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    #[must_use]
    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl From<CancellationToken> for SyncHandle {
    fn from(token: CancellationToken) -> Self {
        Self { token }
    }
}

/// Posts bookmarks to the backend over a [`SyncTransport`].
#[derive(Debug, Clone)]
pub struct SyncClient<T> {
    transport: T,
    policy: RetryPolicy,
    timeout: Duration,
    chunk_size: usize,
}

impl SyncClient<HttpTransport> {
    /// Client talking to `config.api_base_url` over HTTP.
    pub fn http(config: ClientConfig) -> SyncResult<Self> {
        let policy = RetryPolicy::from(&config);
        let timeout = config.timeout();
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(transport, policy, timeout))
    }
}

impl<T: SyncTransport> SyncClient<T> {
    pub const fn new(transport: T, policy: RetryPolicy, timeout: Duration) -> Self {
        Self {
            transport,
            policy,
            timeout,
            chunk_size: CHUNK_SIZE,
        }
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Send the selected part of `tree` to the directory endpoint.
    ///
    /// Reports progress 50 right before the request and 100 once the
    /// request settles, whatever its outcome.
    pub async fn sync_directory(
        &self,
        tree: &[BookmarkFolder],
        selected_ids: &BTreeSet<String>,
        sync_key: &str,
        mut on_progress: impl FnMut(u8),
        token: &CancellationToken,
    ) -> SyncResult<SyncReport> {
        let nodes = selected_wire_nodes(tree, selected_ids)?;
        let sync_key = sync_key.trim();
        if sync_key.is_empty() {
            return Err(SyncError::MissingSyncKey);
        }

        let report = SyncReport {
            chunks: 1,
            nodes: nodes.iter().map(WireNode::node_count).sum(),
        };
        tracing::info!(
            nodes = report.nodes,
            folders = nodes.len(),
            "Starting directory sync"
        );

        on_progress(50);
        let body = json!({ "sync_key": sync_key, "bookmarks": nodes });
        let outcome = self.post(DIRECTORY_SYNC_PATH, &body, token).await;
        on_progress(100);
        outcome?;

        tracing::info!(nodes = report.nodes, "Directory sync finished");
        Ok(report)
    }

    /// Send wire nodes to the chunked endpoint, one request per chunk of
    /// top-level nodes. Progress is reported after each chunk.
    pub async fn upload_chunks(
        &self,
        nodes: &[WireNode],
        mut on_progress: impl FnMut(u8),
        token: &CancellationToken,
    ) -> SyncResult<SyncReport> {
        let total_chunks = nodes.len().div_ceil(self.chunk_size);
        let mut report = SyncReport::default();
        tracing::info!(total_chunks, "Starting chunked upload");

        for (chunk_index, chunk) in nodes.chunks(self.chunk_size).enumerate() {
            let body = json!({
                "bookmarks": chunk,
                "chunk_index": chunk_index,
                "total_chunks": total_chunks,
            });
            self.post(CHUNKED_UPLOAD_PATH, &body, token).await?;

            report.chunks += 1;
            report.nodes += chunk.iter().map(WireNode::node_count).sum::<usize>();
            on_progress(chunk_progress(chunk_index, total_chunks));
            tracing::debug!(chunk_index, total_chunks, "Uploaded chunk");
        }

        tracing::info!(chunks = report.chunks, nodes = report.nodes, "Chunked upload finished");
        Ok(report)
    }

    /// POST with retries. Cancellation wins over both the request and the
    /// backoff sleep.
    pub async fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
        token: &CancellationToken,
    ) -> SyncResult<ResponseEnvelope> {
        let mut attempt = 0;
        loop {
            match self.attempt(path, body, token).await {
                Ok(envelope) => return Ok(envelope),
                Err(error) if error.is_retryable() && attempt < self.policy.max_retries => {
                    attempt += 1;
                    let delay = self.policy.delay_for(attempt);
                    tracing::warn!(
                        path,
                        attempt,
                        max_retries = self.policy.max_retries,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Sync request failed, retrying: {error}"
                    );
                    tokio::select! {
                        () = token.cancelled() => return Err(SyncError::Cancelled),
                        () = tokio::time::sleep(delay) => {}
                    }
                }
                Err(error) => return Err(error),
            }
        }
    }

    async fn attempt(
        &self,
        path: &str,
        body: &serde_json::Value,
        token: &CancellationToken,
    ) -> SyncResult<ResponseEnvelope> {
        if token.is_cancelled() {
            return Err(SyncError::Cancelled);
        }

        let request = tokio::time::timeout(self.timeout, self.transport.post_json(path, body));
        let outcome = tokio::select! {
            biased;
            () = token.cancelled() => return Err(SyncError::Cancelled),
            outcome = request => outcome,
        };
        let response = outcome.map_err(|_| SyncError::Timeout)??;
        parse_response(&response)
    }
}

fn selected_wire_nodes(
    tree: &[BookmarkFolder],
    selected_ids: &BTreeSet<String>,
) -> SyncResult<Vec<WireNode>> {
    if selected_ids.is_empty() {
        return Err(SyncError::EmptySelection);
    }
    let filtered = filter_by_selected(tree, selected_ids);
    if filtered.is_empty() {
        return Err(SyncError::EmptySelection);
    }
    Ok(to_wire_format(&filtered))
}

/// Map a raw response onto the envelope or the matching error.
pub fn parse_response(response: &TransportResponse) -> SyncResult<ResponseEnvelope> {
    match response.status {
        200..=299 => {}
        401 => return Err(SyncError::Unauthorized),
        404 => return Err(SyncError::NotFound),
        status @ 500..=599 => return Err(SyncError::Server { status }),
        status @ 400..=499 => {
            return Err(SyncError::Client {
                status,
                message: error_message(&response.body),
            })
        }
        status => {
            return Err(SyncError::InvalidResponse(format!(
                "unexpected HTTP status {status}"
            )))
        }
    }

    let envelope: ResponseEnvelope = serde_json::from_str(&response.body)
        .map_err(|error| SyncError::InvalidResponse(error.to_string()))?;
    match envelope.status {
        EnvelopeStatus::Success => Ok(envelope),
        EnvelopeStatus::Error => Err(SyncError::Rejected(
            envelope
                .message
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| "The server could not process the request.".to_string()),
        )),
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    detail: Option<String>,
}

fn error_message(body: &str) -> Option<String> {
    let payload = serde_json::from_str::<ErrorBody>(body).ok()?;
    payload
        .message
        .or(payload.detail)
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty())
}

/// `round((index + 1) / total * 100)`, clamped to 100.
fn chunk_progress(index: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = ((index + 1) * 100 + total / 2) / total;
    u8::try_from(percent.min(100)).unwrap_or(100)
}
