//! Error types for marksync-core

use thiserror::Error;

use crate::sync::SyncError;

/// Result type alias using marksync-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in marksync-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// The native bookmark store rejected an operation
    #[error("Bookmark store error: {0}")]
    Store(String),

    /// Bookmark or folder not found
    #[error("Bookmark not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Remote sync failure
    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl Error {
    /// Human-readable message suitable for an inline error banner.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Sync(error) => error.user_message(),
            Self::NotFound(id) => format!("Bookmark '{id}' no longer exists."),
            Self::InvalidInput(reason) => reason.clone(),
            other => other.to_string(),
        }
    }
}
