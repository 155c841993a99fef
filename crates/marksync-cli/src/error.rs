use std::io;

use marksync_core::sync::SyncError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{}", .0.user_message())]
    Core(#[from] marksync_core::Error),
    #[error("{}", .0.user_message())]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Search query cannot be empty")]
    EmptySearchQuery,
    #[error("Nothing to change; pass --title and/or --url")]
    EmptyChanges,
    #[error("Nothing selected; pass --url, --folder or --all")]
    EmptySelection,
    #[error("Unknown bookmark or folder id: {0}")]
    UnknownId(String),
    #[error(
        "Privacy consent is required before bookmarks leave this machine. Run `marksync consent grant` first."
    )]
    ConsentRequired,
    #[error("No sync key provided. Pass --key or set MARKSYNC_SYNC_KEY.")]
    MissingSyncKey,
}
