//! Native bookmark store persisted to a JSON file.

use std::path::{Path, PathBuf};

use super::memory::{MemoryBookmarkStore, StoreSnapshot};
use super::{CreateDetails, NativeBookmarkStore, NativeNode};
use crate::error::Result;
use crate::models::{BookmarkChanges, MoveDestination};

/// [`MemoryBookmarkStore`] that writes its snapshot back to disk after every
/// successful mutation.
#[derive(Debug)]
pub struct JsonFileBookmarkStore {
    path: PathBuf,
    inner: MemoryBookmarkStore,
}

impl JsonFileBookmarkStore {
    /// Open `path`, starting from the default layout when the file is absent.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let snapshot = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str::<StoreSnapshot>(&raw)?
        } else {
            tracing::debug!(path = %path.display(), "Bookmark file missing; starting empty");
            StoreSnapshot::default()
        };

        Ok(Self {
            path,
            inner: MemoryBookmarkStore::from_snapshot(snapshot),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_string_pretty(&self.inner.snapshot()?)?;
        std::fs::write(&self.path, serialized)?;
        Ok(())
    }
}

impl NativeBookmarkStore for JsonFileBookmarkStore {
    async fn get_tree(&self) -> Result<Vec<NativeNode>> {
        self.inner.get_tree().await
    }

    async fn create(&self, details: CreateDetails) -> Result<NativeNode> {
        let node = self.inner.create(details).await?;
        self.persist()?;
        Ok(node)
    }

    async fn update(&self, id: &str, changes: &BookmarkChanges) -> Result<NativeNode> {
        let node = self.inner.update(id, changes).await?;
        self.persist()?;
        Ok(node)
    }

    async fn remove(&self, id: &str) -> Result<()> {
        self.inner.remove(id).await?;
        self.persist()
    }

    async fn remove_tree(&self, id: &str) -> Result<()> {
        self.inner.remove_tree(id).await?;
        self.persist()
    }

    async fn move_node(&self, id: &str, destination: &MoveDestination) -> Result<NativeNode> {
        let node = self.inner.move_node(id, destination).await?;
        self.persist()?;
        Ok(node)
    }

    async fn search(&self, query: &str) -> Result<Vec<NativeNode>> {
        self.inner.search(query).await
    }
}
