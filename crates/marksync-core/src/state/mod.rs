//! Popup state and its pure transitions.
//!
//! [`PopupState`] is a plain value; [`reduce`] computes the next state for an
//! [`Action`]. [`PopupController`] drives the transitions around store and
//! sync calls.

mod controller;

use std::collections::BTreeSet;

pub use controller::{PopupController, SyncGuard};

use crate::models::{BookmarkFolder, BookmarkTree};
use crate::selection::Selection;
use crate::sync::SyncError;
use crate::tree::{
    collect_folder_ids, count_urls, count_urls_in_folders, filter_by_query, filter_selected_folders,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
    Info,
}

/// Transient banner shown after an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: MessageKind,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: MessageKind::Success,
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: MessageKind::Info,
        }
    }
}

/// Selected folder as listed in the sync panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderSummary {
    pub id: String,
    pub name: String,
    pub url_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopupState {
    pub bookmarks: BookmarkTree,
    pub selection: Selection,
    pub expanded_folder_ids: BTreeSet<String>,
    pub is_loading: bool,
    /// 0..=100 while a sync runs, 0 otherwise
    pub sync_progress: u8,
    pub search_query: String,
    pub error: Option<String>,
    pub message: Option<StatusMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Fresh tree from the store; selection and expansion are reconciled
    TreeLoaded(BookmarkTree),
    LoadFailed(String),
    ToggleUrl(String),
    ToggleFolderContents(String),
    ToggleFolderForSync(String),
    SelectAll,
    DeselectAll,
    ToggleExpanded(String),
    ExpandAll,
    CollapseAll,
    SetSearchQuery(String),
    OperationStarted,
    /// Optional success banner
    OperationFinished(Option<String>),
    OperationFailed(String),
    SyncStarted,
    SyncProgress(u8),
    SyncFinished(String),
    SyncFailed(String),
    SyncCancelled,
    ClearError,
    /// A bookmark or folder was deleted
    ItemRemoved(String),
}

/// Next state after `action`.
#[must_use]
pub fn reduce(mut state: PopupState, action: Action) -> PopupState {
    state.apply(action);
    state
}

impl PopupState {
    /// In-place form of [`reduce`].
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::TreeLoaded(tree) => {
                self.selection.retain_existing(&tree);
                let folder_ids = collect_folder_ids(&tree);
                self.expanded_folder_ids.retain(|id| folder_ids.contains(id));
                self.bookmarks = tree;
                self.is_loading = false;
            }
            Action::LoadFailed(message) | Action::OperationFailed(message) => {
                self.is_loading = false;
                self.error = Some(message);
            }
            Action::ToggleUrl(id) => self.selection.toggle_url(&self.bookmarks, &id),
            Action::ToggleFolderContents(id) => {
                self.selection.toggle_folder_contents(&self.bookmarks, &id);
            }
            Action::ToggleFolderForSync(id) => {
                self.selection.toggle_folder_for_sync(&self.bookmarks, &id);
            }
            Action::SelectAll => self.selection.select_all(&self.bookmarks),
            Action::DeselectAll => self.selection.deselect_all(),
            Action::ToggleExpanded(id) => {
                if !self.expanded_folder_ids.remove(&id) {
                    self.expanded_folder_ids.insert(id);
                }
            }
            Action::ExpandAll => self.expanded_folder_ids = collect_folder_ids(&self.bookmarks),
            Action::CollapseAll => self.expanded_folder_ids.clear(),
            Action::SetSearchQuery(query) => self.search_query = query,
            Action::OperationStarted => {
                self.is_loading = true;
                self.error = None;
            }
            Action::OperationFinished(text) => {
                self.is_loading = false;
                self.message = text.map(StatusMessage::success);
            }
            Action::SyncStarted => {
                self.is_loading = true;
                self.sync_progress = 0;
                self.error = None;
                self.message = Some(StatusMessage::info("Sending bookmarks..."));
            }
            Action::SyncProgress(progress) => self.sync_progress = progress.min(100),
            Action::SyncFinished(text) => {
                self.is_loading = false;
                self.sync_progress = 0;
                self.message = Some(StatusMessage::success(text));
            }
            Action::SyncFailed(message) => {
                self.is_loading = false;
                self.sync_progress = 0;
                self.message = None;
                self.error = Some(message);
            }
            Action::SyncCancelled => {
                self.is_loading = false;
                self.sync_progress = 0;
                self.message = None;
                self.error = Some(SyncError::Cancelled.user_message());
            }
            Action::ClearError => self.error = None,
            Action::ItemRemoved(id) => {
                self.selection.forget(&id);
                self.expanded_folder_ids.remove(&id);
            }
        }
    }

    /// Tree filtered by the current search query.
    #[must_use]
    pub fn visible_tree(&self) -> BookmarkTree {
        filter_by_query(&self.bookmarks, &self.search_query)
    }

    /// Folder-selected subtrees, with their unselected ancestors as empty
    /// shells.
    #[must_use]
    pub fn selected_folder_tree(&self) -> BookmarkTree {
        filter_selected_folders(&self.bookmarks, self.selection.selected_folder_ids())
    }

    /// Outermost folder-selected folders with their total URL counts.
    #[must_use]
    pub fn selected_folder_summary(&self) -> Vec<FolderSummary> {
        let mut summary = Vec::new();
        collect_summary(
            &self.selected_folder_tree(),
            self.selection.selected_folder_ids(),
            &mut summary,
        );
        summary
    }

    /// URLs covered by folder-level selection, each counted once.
    #[must_use]
    pub fn selected_folder_url_count(&self) -> usize {
        count_urls_in_folders(&self.bookmarks, self.selection.selected_folder_ids())
    }

    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.selection.selected_ids().len()
    }
}

fn collect_summary(
    folders: &[BookmarkFolder],
    selected: &BTreeSet<String>,
    summary: &mut Vec<FolderSummary>,
) {
    for folder in folders {
        if selected.contains(&folder.id) {
            summary.push(FolderSummary {
                id: folder.id.clone(),
                name: folder.name.clone(),
                url_count: count_urls(folder),
            });
        } else {
            collect_summary(&folder.folders, selected, summary);
        }
    }
}
