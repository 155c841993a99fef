use thiserror::Error;

pub type SyncResult<T> = Result<T, SyncError>;

/// Failures of the sync pipeline, from local guards to remote rejections.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("no bookmarks selected")]
    EmptySelection,
    #[error("sync key is missing")]
    MissingSyncKey,
    #[error("a sync is already running")]
    AlreadyRunning,
    #[error("sync cancelled")]
    Cancelled,
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("unauthorized (401)")]
    Unauthorized,
    #[error("not found (404)")]
    NotFound,
    #[error("server error ({status})")]
    Server { status: u16 },
    #[error("request rejected ({status})")]
    Client {
        status: u16,
        message: Option<String>,
    },
    #[error("server rejected sync: {0}")]
    Rejected(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("invalid sync configuration: {0}")]
    Configuration(String),
}

impl SyncError {
    /// Server failures, dropped connections and timeouts are worth another try.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout | Self::Server { .. }
        )
    }

    /// Human-readable message suitable for an inline error banner.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptySelection => "Select at least one bookmark to send.".to_string(),
            Self::MissingSyncKey => "Enter a sync key first.".to_string(),
            Self::AlreadyRunning => "A sync is already in progress.".to_string(),
            Self::Cancelled => "The transfer was cancelled.".to_string(),
            Self::Timeout => "The server did not respond in time. Please try again.".to_string(),
            Self::Network(_) => "Check your network connection.".to_string(),
            Self::Unauthorized => "The sync key is invalid or has expired.".to_string(),
            Self::NotFound => "The requested resource could not be found.".to_string(),
            Self::Server { .. } => {
                "The server ran into a problem. Please try again in a moment.".to_string()
            }
            Self::Client { status, message } => message
                .clone()
                .unwrap_or_else(|| format!("Server error ({status})")),
            Self::Rejected(message) => message.clone(),
            Self::InvalidResponse(_) => {
                "Something went wrong while processing the request.".to_string()
            }
            Self::Configuration(reason) => format!("Sync is not configured: {reason}"),
        }
    }
}
