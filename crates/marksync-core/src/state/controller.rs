use tokio_util::sync::CancellationToken;

use super::{Action, PopupState};
use crate::dnd::{resolve_drop, DropIntent};
use crate::error::{Error, Result};
use crate::models::{BookmarkChanges, BookmarkFolder, BookmarkItem, MoveDestination};
use crate::store::{BookmarkStore, NativeBookmarkStore};
use crate::sync::{SyncClient, SyncError, SyncHandle, SyncReport, SyncTransport};
use crate::tree::{filter_by_selected, to_wire_format};

/// Cancels its sync when dropped, unless disarmed first.
#[derive(Debug)]
pub struct SyncGuard {
    handle: SyncHandle,
    armed: bool,
}

impl SyncGuard {
    #[must_use]
    pub const fn new(handle: SyncHandle) -> Self {
        Self {
            handle,
            armed: true,
        }
    }

    #[must_use]
    pub const fn handle(&self) -> &SyncHandle {
        &self.handle
    }

    /// Let the sync finish on its own.
    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for SyncGuard {
    fn drop(&mut self) {
        if self.armed && !self.handle.is_cancelled() {
            tracing::info!("Cancelling in-flight sync on teardown");
            self.handle.cancel();
        }
    }
}

/// State of one sync while its future is alive. Dropping it unsettled
/// (the caller stopped polling) cancels the request and resets the flags.
struct SyncRun<'a> {
    state: &'a mut PopupState,
    token: CancellationToken,
    settled: bool,
}

impl SyncRun<'_> {
    fn settle(mut self, result: &std::result::Result<SyncReport, SyncError>) {
        self.settled = true;
        match result {
            Ok(report) => {
                self.state.apply(Action::SyncFinished(format!(
                    "Sent {} bookmarks and folders successfully",
                    report.nodes
                )));
            }
            Err(SyncError::Cancelled) => {
                tracing::info!("Sync cancelled");
                self.state.apply(Action::SyncCancelled);
            }
            Err(error) => {
                tracing::warn!("Sync failed: {error}");
                self.state.apply(Action::SyncFailed(error.user_message()));
            }
        }
    }
}

impl Drop for SyncRun<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::info!("Sync abandoned before it settled, cancelling");
            self.token.cancel();
            self.state.apply(Action::SyncCancelled);
        }
    }
}

enum SyncTarget<'a> {
    Directory { sync_key: &'a str },
    Upload,
}

/// Owns the popup state and runs store/sync operations against it.
///
/// Every operation records failures in `state().error` as a user-facing
/// message and also returns them to the caller.
pub struct PopupController<S, T> {
    state: PopupState,
    store: BookmarkStore<S>,
    client: SyncClient<T>,
    guard: Option<SyncGuard>,
}

impl<S: NativeBookmarkStore, T: SyncTransport> PopupController<S, T> {
    pub fn new(store: BookmarkStore<S>, client: SyncClient<T>) -> Self {
        Self {
            state: PopupState::default(),
            store,
            client,
            guard: None,
        }
    }

    pub const fn state(&self) -> &PopupState {
        &self.state
    }

    pub const fn store(&self) -> &BookmarkStore<S> {
        &self.store
    }

    /// Apply a UI action directly.
    pub fn dispatch(&mut self, action: Action) {
        self.state.apply(action);
    }

    pub async fn load(&mut self) -> Result<()> {
        self.state.apply(Action::OperationStarted);
        match self.store.load_all().await {
            Ok(tree) => {
                self.state.apply(Action::TreeLoaded(tree));
                Ok(())
            }
            Err(error) => {
                tracing::warn!("Failed to load bookmarks: {error}");
                self.state.apply(Action::LoadFailed(error.user_message()));
                Err(error)
            }
        }
    }

    pub async fn add_bookmark(
        &mut self,
        title: &str,
        url: &str,
        parent_id: Option<&str>,
    ) -> Result<BookmarkItem> {
        self.state.apply(Action::OperationStarted);
        let result = self.store.create(title, Some(url), parent_id).await;
        self.finish(result, "Bookmark added").await
    }

    pub async fn update_bookmark(
        &mut self,
        id: &str,
        changes: &BookmarkChanges,
    ) -> Result<BookmarkItem> {
        self.state.apply(Action::OperationStarted);
        let result = self.store.update(id, changes).await;
        self.finish(result, "Bookmark updated").await
    }

    pub async fn delete_bookmark(&mut self, id: &str) -> Result<()> {
        self.state.apply(Action::OperationStarted);
        let result = self.store.remove(id).await;
        if result.is_ok() {
            self.state.apply(Action::ItemRemoved(id.to_string()));
        }
        self.finish(result, "Bookmark deleted").await
    }

    /// Delete every selected URL. Returns how many were removed; partial
    /// failures are reported once the rest have been attempted.
    pub async fn delete_selected(&mut self) -> Result<usize> {
        let ids: Vec<String> = self.state.selection.selected_ids().iter().cloned().collect();
        if ids.is_empty() {
            let error = Error::InvalidInput("No bookmarks selected".to_string());
            self.state.apply(Action::OperationFailed(error.user_message()));
            return Err(error);
        }

        self.state.apply(Action::OperationStarted);
        let mut removed = 0;
        let mut last_error = None;
        for id in &ids {
            match self.store.remove(id).await {
                Ok(()) => {
                    removed += 1;
                    self.state.apply(Action::ItemRemoved(id.clone()));
                }
                Err(error) => {
                    tracing::warn!(%id, "Failed to delete bookmark: {error}");
                    last_error = Some(error);
                }
            }
        }

        let result = match last_error {
            None => Ok(removed),
            Some(error) if removed == 0 => Err(error),
            Some(error) => Err(Error::Store(format!(
                "Deleted {removed} of {} bookmarks: {}",
                ids.len(),
                error.user_message()
            ))),
        };
        let message = format!("Deleted {removed} bookmarks");
        self.finish(result, &message).await
    }

    pub async fn move_bookmark(
        &mut self,
        id: &str,
        destination: &MoveDestination,
    ) -> Result<BookmarkItem> {
        self.state.apply(Action::OperationStarted);
        let result = self.store.move_item(id, destination).await;
        self.finish(result, "Bookmark moved").await
    }

    /// Resolve a drop against the current tree and move accordingly.
    /// Drops that resolve to nothing are ignored.
    pub async fn drop_item(&mut self, intent: &DropIntent) -> Result<Option<BookmarkItem>> {
        let Some(destination) = resolve_drop(&self.state.bookmarks, intent) else {
            tracing::debug!(item_id = intent.item_id(), "Ignoring drop");
            return Ok(None);
        };
        self.move_bookmark(intent.item_id(), &destination)
            .await
            .map(Some)
    }

    pub async fn create_folder(
        &mut self,
        title: &str,
        parent_id: Option<&str>,
    ) -> Result<BookmarkFolder> {
        self.state.apply(Action::OperationStarted);
        let result = self.store.create_folder(title, parent_id).await;
        self.finish(result, "Folder created").await
    }

    /// Remove a folder with everything under it.
    pub async fn delete_folder(&mut self, id: &str) -> Result<()> {
        self.state.apply(Action::OperationStarted);
        let result = self.store.remove_subtree(id).await;
        if result.is_ok() {
            self.state.apply(Action::ItemRemoved(id.to_string()));
        }
        self.finish(result, "Folder deleted").await
    }

    /// Arm a cancellation handle for the next sync.
    pub fn begin_sync(&mut self) -> std::result::Result<SyncHandle, SyncError> {
        if self.state.is_loading {
            return Err(SyncError::AlreadyRunning);
        }
        let handle = SyncHandle::new();
        self.replace_guard(Some(SyncGuard::new(handle.clone())));
        Ok(handle)
    }

    /// Cancel the armed or running sync, if any.
    pub fn cancel_sync(&mut self) {
        if let Some(guard) = self.guard.take() {
            guard.handle().cancel();
            guard.disarm();
        }
    }

    /// Send the selected bookmarks to the directory endpoint.
    pub async fn sync(&mut self, sync_key: &str, token: CancellationToken) -> Result<SyncReport> {
        self.run_sync(SyncTarget::Directory { sync_key }, token).await
    }

    /// Send the selected bookmarks to the chunked upload endpoint.
    pub async fn upload(&mut self, token: CancellationToken) -> Result<SyncReport> {
        self.run_sync(SyncTarget::Upload, token).await
    }

    async fn run_sync(&mut self, target: SyncTarget<'_>, token: CancellationToken) -> Result<SyncReport> {
        if self.state.is_loading {
            return Err(SyncError::AlreadyRunning.into());
        }
        self.replace_guard(Some(SyncGuard::new(SyncHandle::from(token.clone()))));
        self.state.apply(Action::SyncStarted);

        let tree = self.state.bookmarks.clone();
        let selected = self.state.selection.selected_ids().clone();
        let client = &self.client;
        let mut run = SyncRun {
            state: &mut self.state,
            token: token.clone(),
            settled: false,
        };

        let result = {
            let on_progress = |progress| run.state.apply(Action::SyncProgress(progress));
            match target {
                SyncTarget::Directory { sync_key } => {
                    client
                        .sync_directory(&tree, &selected, sync_key, on_progress, &token)
                        .await
                }
                SyncTarget::Upload => {
                    if selected.is_empty() {
                        Err(SyncError::EmptySelection)
                    } else {
                        let nodes = to_wire_format(&filter_by_selected(&tree, &selected));
                        client.upload_chunks(&nodes, on_progress, &token).await
                    }
                }
            }
        };
        run.settle(&result);
        self.replace_guard(None);
        result.map_err(Error::from)
    }

    fn replace_guard(&mut self, guard: Option<SyncGuard>) {
        if let Some(previous) = std::mem::replace(&mut self.guard, guard) {
            previous.disarm();
        }
    }

    /// Reload after a store call and record the outcome.
    async fn finish<R>(&mut self, result: Result<R>, success: &str) -> Result<R> {
        let outcome = match result {
            Ok(value) => match self.store.load_all().await {
                Ok(tree) => {
                    self.state.apply(Action::TreeLoaded(tree));
                    Ok(value)
                }
                Err(error) => Err(error),
            },
            Err(error) => Err(error),
        };

        match outcome {
            Ok(value) => {
                self.state
                    .apply(Action::OperationFinished(Some(success.to_string())));
                Ok(value)
            }
            Err(error) => {
                tracing::warn!("Bookmark operation failed: {error}");
                self.state.apply(Action::OperationFailed(error.user_message()));
                Err(error)
            }
        }
    }
}
