//! Bookmark store facade over the browser's native bookmark API.
//!
//! The native API is modelled by [`NativeBookmarkStore`]; [`BookmarkStore`]
//! validates input, converts native nodes into folders/URLs and normalizes the
//! tree shape on load.

mod file;
mod memory;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{
    BookmarkChanges, BookmarkFolder, BookmarkItem, BookmarkTree, BookmarkUrl, MoveDestination,
};

pub use file::JsonFileBookmarkStore;
pub use memory::{MemoryBookmarkStore, StoreSnapshot};

/// Id the native store gives its "Other bookmarks" container.
pub const OTHER_BOOKMARKS_ID: &str = "2";
/// Id of the synthetic folder created when stray URLs have nowhere to go.
pub const ORPHAN_FOLDER_ID: &str = "orphan-urls";
const OTHER_BOOKMARKS_NAMES: [&str; 3] = ["Other Bookmarks", "Other bookmarks", "기타 북마크"];

/// A node as the native bookmark API reports it. Nodes with a `url` are
/// bookmarks; everything else is a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NativeNode>>,
}

impl NativeNode {
    #[must_use]
    pub fn folder(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            index: None,
            url: None,
            title: title.into(),
            date_added: None,
            children: Some(Vec::new()),
        }
    }

    #[must_use]
    pub fn bookmark(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            index: None,
            url: Some(url.into()),
            title: title.into(),
            date_added: None,
            children: None,
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<Self>) -> Self {
        self.children = Some(children);
        self
    }

    #[must_use]
    pub const fn is_folder(&self) -> bool {
        self.url.is_none()
    }
}

/// Arguments for creating a bookmark or, when `url` is `None`, a folder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateDetails {
    pub parent_id: Option<String>,
    pub index: Option<usize>,
    pub title: String,
    pub url: Option<String>,
}

/// The browser's bookmark API, reduced to the calls marksync needs.
#[allow(async_fn_in_trait)]
pub trait NativeBookmarkStore {
    /// Whole tree; a single root whose children are the top-level containers
    async fn get_tree(&self) -> Result<Vec<NativeNode>>;

    /// Create a bookmark or folder
    async fn create(&self, details: CreateDetails) -> Result<NativeNode>;

    /// Change title and/or url
    async fn update(&self, id: &str, changes: &BookmarkChanges) -> Result<NativeNode>;

    /// Remove a bookmark or an empty folder
    async fn remove(&self, id: &str) -> Result<()>;

    /// Remove a folder and everything under it
    async fn remove_tree(&self, id: &str) -> Result<()>;

    /// Reparent and/or reorder a node
    async fn move_node(&self, id: &str, destination: &MoveDestination) -> Result<NativeNode>;

    /// Nodes whose title or url contains `query`
    async fn search(&self, query: &str) -> Result<Vec<NativeNode>>;
}

/// CRUD and tree loading with validation and normalization.
#[derive(Debug, Clone)]
pub struct BookmarkStore<S> {
    native: S,
}

impl<S: NativeBookmarkStore> BookmarkStore<S> {
    pub const fn new(native: S) -> Self {
        Self { native }
    }

    pub const fn native(&self) -> &S {
        &self.native
    }

    /// Load and normalize the whole tree.
    pub async fn load_all(&self) -> Result<BookmarkTree> {
        let roots = self.native.get_tree().await?;
        Ok(normalize_roots(roots))
    }

    pub async fn create(
        &self,
        title: &str,
        url: Option<&str>,
        parent_id: Option<&str>,
    ) -> Result<BookmarkItem> {
        let title = validate_title(title)?;
        let url = url.map(validate_url).transpose()?;
        let node = self
            .native
            .create(CreateDetails {
                parent_id: parent_id.map(str::to_string),
                index: None,
                title,
                url,
            })
            .await?;
        Ok(convert_node(node))
    }

    pub async fn update(&self, id: &str, changes: &BookmarkChanges) -> Result<BookmarkItem> {
        if changes.is_empty() {
            return Err(Error::InvalidInput("Nothing to update".to_string()));
        }
        let changes = BookmarkChanges {
            title: changes.title.as_deref().map(validate_title).transpose()?,
            url: changes.url.as_deref().map(validate_url).transpose()?,
        };
        let node = self.native.update(id, &changes).await?;
        Ok(convert_node(node))
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        self.native.remove(id).await
    }

    pub async fn remove_subtree(&self, id: &str) -> Result<()> {
        self.native.remove_tree(id).await
    }

    pub async fn move_item(&self, id: &str, destination: &MoveDestination) -> Result<BookmarkItem> {
        let node = self.native.move_node(id, destination).await?;
        Ok(convert_node(node))
    }

    pub async fn create_folder(&self, title: &str, parent_id: Option<&str>) -> Result<BookmarkFolder> {
        let title = validate_title(title)?;
        let node = self
            .native
            .create(CreateDetails {
                parent_id: parent_id.map(str::to_string),
                index: None,
                title,
                url: None,
            })
            .await?;
        convert_node(node)
            .into_folder()
            .ok_or_else(|| Error::Store("Failed to create folder".to_string()))
    }

    pub async fn search(&self, query: &str) -> Result<Vec<BookmarkItem>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let nodes = self.native.search(query).await?;
        Ok(nodes.into_iter().map(convert_node).collect())
    }
}

/// Convert a native node (and its subtree) into a folder or URL.
pub fn convert_node(node: NativeNode) -> BookmarkItem {
    match node.url {
        Some(url) => BookmarkItem::Url(BookmarkUrl {
            id: node.id,
            title: node.title,
            url,
            tags: Vec::new(),
            is_checked: false,
        }),
        None => {
            let mut folder = BookmarkFolder::new(node.id, node.title);
            for child in node.children.unwrap_or_default() {
                match convert_node(child) {
                    BookmarkItem::Folder(sub) => folder.folders.push(sub),
                    BookmarkItem::Url(url) => folder.urls.push(url),
                }
            }
            BookmarkItem::Folder(folder)
        }
    }
}

/// Turn the native root list into the top-level folder list.
///
/// URLs sitting directly under the root are attached to the "Other
/// bookmarks" container (or the last folder), and top-level folders sharing a
/// display name are merged.
pub fn normalize_roots(roots: Vec<NativeNode>) -> BookmarkTree {
    let top_level = roots
        .into_iter()
        .next()
        .and_then(|root| root.children)
        .unwrap_or_default();

    let mut folders = Vec::new();
    let mut orphans = Vec::new();
    for node in top_level {
        match convert_node(node) {
            BookmarkItem::Folder(folder) => folders.push(folder),
            BookmarkItem::Url(url) => orphans.push(url),
        }
    }

    if !orphans.is_empty() {
        tracing::warn!(
            count = orphans.len(),
            "Found bookmarks directly under the root; attaching them to a top-level folder"
        );
        attach_orphans(&mut folders, orphans);
    }

    merge_duplicate_folders(folders)
}

fn attach_orphans(folders: &mut BookmarkTree, orphans: Vec<BookmarkUrl>) {
    let target = folders
        .iter()
        .position(|folder| {
            folder.id == OTHER_BOOKMARKS_ID || OTHER_BOOKMARKS_NAMES.contains(&folder.name.as_str())
        })
        .or_else(|| folders.len().checked_sub(1));

    match target {
        Some(index) => folders[index].urls.extend(orphans),
        None => folders.push(
            BookmarkFolder::new(ORPHAN_FOLDER_ID, OTHER_BOOKMARKS_NAMES[0]).with_urls(orphans),
        ),
    }
}

fn merge_duplicate_folders(folders: BookmarkTree) -> BookmarkTree {
    let mut merged: BookmarkTree = Vec::with_capacity(folders.len());
    let mut by_name: HashMap<String, usize> = HashMap::new();

    for folder in folders {
        let Some(&index) = by_name.get(&folder.name) else {
            by_name.insert(folder.name.clone(), merged.len());
            merged.push(folder);
            continue;
        };

        tracing::warn!(
            name = %folder.name,
            duplicate_id = %folder.id,
            "Merging duplicate top-level folder"
        );
        let existing = &mut merged[index];
        for url in folder.urls {
            if !existing.urls.contains(&url) {
                existing.urls.push(url);
            }
        }
        for sub in folder.folders {
            if !existing.folders.contains(&sub) {
                existing.folders.push(sub);
            }
        }
    }

    merged
}

fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        Err(Error::InvalidInput("Title is required".to_string()))
    } else {
        Ok(title.to_string())
    }
}

fn validate_url(raw: &str) -> Result<String> {
    let raw = raw.trim();
    let parsed = url::Url::parse(raw)
        .map_err(|error| Error::InvalidInput(format!("Invalid URL '{raw}': {error}")))?;
    if parsed.scheme() == "javascript" {
        return Err(Error::InvalidInput(format!(
            "Invalid URL '{raw}': javascript URLs are not allowed"
        )));
    }
    Ok(raw.to_string())
}
