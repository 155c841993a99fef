use std::path::PathBuf;

use marksync_core::config::ClientConfig;
use marksync_core::store::{BookmarkStore, JsonFileBookmarkStore};
use marksync_core::sync::{HttpTransport, SyncClient};
use marksync_core::tree::{find_folder, locate_url};
use marksync_core::{Action, BookmarkFolder, BookmarkItem, PopupController};
use serde::Serialize;

use crate::cli::SelectionArgs;
use crate::error::CliError;

pub type Controller = PopupController<JsonFileBookmarkStore, HttpTransport>;

/// Resolved locations and endpoints shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub bookmarks_path: PathBuf,
    pub settings_path: PathBuf,
    pub client: ClientConfig,
}

#[derive(Debug, Serialize)]
pub struct ItemRow {
    pub id: String,
    pub kind: &'static str,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl From<&BookmarkItem> for ItemRow {
    fn from(item: &BookmarkItem) -> Self {
        match item {
            BookmarkItem::Folder(folder) => Self {
                id: folder.id.clone(),
                kind: "folder",
                title: folder.name.clone(),
                url: None,
            },
            BookmarkItem::Url(url) => Self {
                id: url.id.clone(),
                kind: "url",
                title: url.title.clone(),
                url: Some(url.url.clone()),
            },
        }
    }
}

/// Open the bookmark file and load the tree.
pub async fn open_controller(context: &Context) -> Result<Controller, CliError> {
    let native = JsonFileBookmarkStore::open(&context.bookmarks_path)?;
    let client = SyncClient::http(context.client.clone())?;
    let mut controller = PopupController::new(BookmarkStore::new(native), client);
    controller.load().await?;
    Ok(controller)
}

/// Apply `--url`, `--folder` and `--all` to the controller's selection.
pub fn apply_selection(controller: &mut Controller, selection: &SelectionArgs) -> Result<(), CliError> {
    if selection.is_empty() {
        return Err(CliError::EmptySelection);
    }
    if selection.all {
        controller.dispatch(Action::SelectAll);
    }

    for id in &selection.urls {
        let state = controller.state();
        if locate_url(&state.bookmarks, id).is_none() {
            return Err(CliError::UnknownId(id.clone()));
        }
        if !state.selection.is_selected(id) {
            controller.dispatch(Action::ToggleUrl(id.clone()));
        }
    }

    for id in &selection.folders {
        let state = controller.state();
        if find_folder(&state.bookmarks, id).is_none() {
            return Err(CliError::UnknownId(id.clone()));
        }
        if !state.selection.is_folder_selected(id) {
            controller.dispatch(Action::ToggleFolderForSync(id.clone()));
        }
    }
    Ok(())
}

/// Indented listing: folders end with `/`, URLs show their address.
pub fn format_tree_lines(tree: &[BookmarkFolder]) -> Vec<String> {
    let mut lines = Vec::new();
    push_folder_lines(tree, 0, &mut lines);
    lines
}

fn push_folder_lines(folders: &[BookmarkFolder], depth: usize, lines: &mut Vec<String>) {
    for folder in folders {
        let indent = "  ".repeat(depth);
        lines.push(format!("{indent}[{}] {}/", folder.id, folder.name));
        push_folder_lines(&folder.folders, depth + 1, lines);
        for url in &folder.urls {
            lines.push(format!("{indent}  [{}] {} <{}>", url.id, url.title, url.url));
        }
    }
}

pub fn normalize_search_query(query: &str) -> Result<String, CliError> {
    let query = query.trim();
    if query.is_empty() {
        Err(CliError::EmptySearchQuery)
    } else {
        Ok(query.to_string())
    }
}
