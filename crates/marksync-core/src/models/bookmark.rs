//! Bookmark tree model

use serde::{Deserialize, Serialize};

/// A bookmark leaf entry, owned by exactly one folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkUrl {
    /// Identifier issued by the native store
    pub id: String,
    /// Display title
    pub title: String,
    /// Bookmarked address
    pub url: String,
    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Checkbox state carried from the native conversion
    #[serde(default)]
    pub is_checked: bool,
}

impl BookmarkUrl {
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
            tags: Vec::new(),
            is_checked: false,
        }
    }
}

/// A folder owning ordered child URLs and child folders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkFolder {
    /// Identifier issued by the native store
    pub id: String,
    /// Display name
    pub name: String,
    /// Expansion hint from the native conversion
    #[serde(default)]
    pub is_expanded: bool,
    /// Nested folders, in native order
    #[serde(default)]
    pub folders: Vec<BookmarkFolder>,
    /// Direct URL children, in native order
    #[serde(default)]
    pub urls: Vec<BookmarkUrl>,
}

impl BookmarkFolder {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_expanded: false,
            folders: Vec::new(),
            urls: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_urls(mut self, urls: Vec<BookmarkUrl>) -> Self {
        self.urls = urls;
        self
    }

    #[must_use]
    pub fn with_folders(mut self, folders: Vec<BookmarkFolder>) -> Self {
        self.folders = folders;
        self
    }

    /// True when the folder has neither URLs nor sub-folders.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty() && self.folders.is_empty()
    }
}

/// The synthetic root: an ordered list of top-level folders.
pub type BookmarkTree = Vec<BookmarkFolder>;

/// Either kind of tree node, as returned by store CRUD and search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BookmarkItem {
    Folder(BookmarkFolder),
    Url(BookmarkUrl),
}

impl BookmarkItem {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Folder(folder) => &folder.id,
            Self::Url(url) => &url.id,
        }
    }

    /// Folder name or URL title.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Folder(folder) => &folder.name,
            Self::Url(url) => &url.title,
        }
    }

    #[must_use]
    pub const fn is_folder(&self) -> bool {
        matches!(self, Self::Folder(_))
    }

    #[must_use]
    pub fn into_folder(self) -> Option<BookmarkFolder> {
        match self {
            Self::Folder(folder) => Some(folder),
            Self::Url(_) => None,
        }
    }
}

/// Title/url edits applied by an update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl BookmarkChanges {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.url.is_none()
    }
}

/// Target position for a move. `index` counts folders and URLs together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveDestination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl MoveDestination {
    #[must_use]
    pub fn into_folder(parent_id: impl Into<String>) -> Self {
        Self {
            parent_id: Some(parent_id.into()),
            index: None,
        }
    }

    #[must_use]
    pub fn at(parent_id: impl Into<String>, index: usize) -> Self {
        Self {
            parent_id: Some(parent_id.into()),
            index: Some(index),
        }
    }
}
