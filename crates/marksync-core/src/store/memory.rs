//! In-process native bookmark store with browser-like rules.

use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use super::{CreateDetails, NativeBookmarkStore, NativeNode, OTHER_BOOKMARKS_ID};
use crate::error::{Error, Result};
use crate::models::{BookmarkChanges, MoveDestination};
use crate::util::{contains_ignore_case, unix_timestamp_millis};

const ROOT_ID: &str = "0";

/// Serializable state of a [`MemoryBookmarkStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub next_id: u64,
    pub root: NativeNode,
}

impl Default for StoreSnapshot {
    /// Root `0` holding the three permanent containers.
    fn default() -> Self {
        let mut root = NativeNode::folder(ROOT_ID, "").with_children(vec![
            NativeNode::folder("1", "Bookmarks bar"),
            NativeNode::folder(OTHER_BOOKMARKS_ID, "Other bookmarks"),
            NativeNode::folder("3", "Mobile bookmarks"),
        ]);
        reindex(&mut root, None);
        Self { next_id: 4, root }
    }
}

/// Bookmark tree held in memory.
///
/// Each folder keeps its sub-folders ahead of its URLs, so a URL's native
/// index is always `sub-folder count + position among URLs`.
///
/// Mirrors the native API's constraints: the root and its permanent
/// containers cannot be removed or moved, non-empty folders need
/// `remove_tree`, and a folder cannot move into its own subtree.
#[derive(Debug, Default)]
pub struct MemoryBookmarkStore {
    state: Mutex<StoreSnapshot>,
}

impl MemoryBookmarkStore {
    #[must_use]
    pub fn from_snapshot(mut snapshot: StoreSnapshot) -> Self {
        order_folders_first(&mut snapshot.root);
        reindex(&mut snapshot.root, None);
        Self {
            state: Mutex::new(snapshot),
        }
    }

    /// Copy of the current state, for persistence.
    pub fn snapshot(&self) -> Result<StoreSnapshot> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreSnapshot>> {
        self.state
            .lock()
            .map_err(|_| Error::Store("bookmark store lock poisoned".to_string()))
    }

    fn create_sync(&self, details: CreateDetails) -> Result<NativeNode> {
        let mut state = self.lock()?;
        let id = state.next_id.to_string();
        let parent_id = details
            .parent_id
            .unwrap_or_else(|| OTHER_BOOKMARKS_ID.to_string());
        ensure_not_root(&parent_id)?;

        let mut node = match details.url {
            Some(url) => NativeNode::bookmark(id.clone(), details.title, url),
            None => NativeNode::folder(id.clone(), details.title),
        };
        node.date_added = Some(unix_timestamp_millis());

        let parent = find_mut(&mut state.root, &parent_id)
            .ok_or_else(|| Error::NotFound(parent_id.clone()))?;
        let children = parent
            .children
            .as_mut()
            .ok_or_else(|| Error::Store(format!("Parent {parent_id} is not a folder")))?;
        let index = insertion_index(children, node.is_folder(), details.index);
        children.insert(index, node);

        state.next_id += 1;
        reindex(&mut state.root, None);
        cloned_node(&state.root, &id)
    }

    fn update_sync(&self, id: &str, changes: &BookmarkChanges) -> Result<NativeNode> {
        ensure_not_root(id)?;
        let mut state = self.lock()?;
        let node = find_mut(&mut state.root, id).ok_or_else(|| Error::NotFound(id.to_string()))?;

        if let Some(url) = &changes.url {
            if node.is_folder() {
                return Err(Error::InvalidInput("Folders cannot have a URL".to_string()));
            }
            node.url = Some(url.clone());
        }
        if let Some(title) = &changes.title {
            node.title.clone_from(title);
        }
        cloned_node(&state.root, id)
    }

    fn remove_sync(&self, id: &str, recursive: bool) -> Result<()> {
        let mut state = self.lock()?;
        ensure_removable(&state.root, id)?;

        let node = find(&state.root, id).ok_or_else(|| Error::NotFound(id.to_string()))?;
        let has_children = node.children.as_ref().is_some_and(|children| !children.is_empty());
        if has_children && !recursive {
            return Err(Error::Store(format!(
                "Can't remove non-empty folder {id} (use recursive removal)"
            )));
        }

        detach(&mut state.root, id);
        reindex(&mut state.root, None);
        Ok(())
    }

    fn move_sync(&self, id: &str, destination: &MoveDestination) -> Result<NativeNode> {
        let mut state = self.lock()?;
        ensure_removable(&state.root, id)?;

        let node = find(&state.root, id).ok_or_else(|| Error::NotFound(id.to_string()))?;
        let current_parent = node.parent_id.clone().unwrap_or_default();
        let current_index = node.index.unwrap_or_default();
        let parent_id = destination
            .parent_id
            .clone()
            .unwrap_or_else(|| current_parent.clone());
        ensure_not_root(&parent_id)?;
        if find(node, &parent_id).is_some() {
            return Err(Error::Store(format!(
                "Can't move {id} into itself or one of its descendants"
            )));
        }

        let parent = find(&state.root, &parent_id).ok_or_else(|| Error::NotFound(parent_id.clone()))?;
        if !parent.is_folder() {
            return Err(Error::Store(format!("Parent {parent_id} is not a folder")));
        }

        let Some((detached, _, _)) = detach(&mut state.root, id) else {
            return Err(Error::NotFound(id.to_string()));
        };
        let mut index = destination.index;
        if parent_id == current_parent {
            // Indexes refer to positions before the node was taken out.
            index = index.map(|index| if index > current_index { index - 1 } else { index });
        }

        let children = find_mut(&mut state.root, &parent_id)
            .and_then(|parent| parent.children.as_mut())
            .ok_or_else(|| Error::NotFound(parent_id.clone()))?;
        let index = insertion_index(children, detached.is_folder(), index);
        children.insert(index, detached);

        reindex(&mut state.root, None);
        cloned_node(&state.root, id)
    }

    fn search_sync(&self, query: &str) -> Result<Vec<NativeNode>> {
        let state = self.lock()?;
        let query = query.to_lowercase();
        let mut hits = Vec::new();
        collect_matches(&state.root, &query, &mut hits);
        Ok(hits)
    }
}

impl NativeBookmarkStore for MemoryBookmarkStore {
    async fn get_tree(&self) -> Result<Vec<NativeNode>> {
        Ok(vec![self.lock()?.root.clone()])
    }

    async fn create(&self, details: CreateDetails) -> Result<NativeNode> {
        self.create_sync(details)
    }

    async fn update(&self, id: &str, changes: &BookmarkChanges) -> Result<NativeNode> {
        self.update_sync(id, changes)
    }

    async fn remove(&self, id: &str) -> Result<()> {
        self.remove_sync(id, false)
    }

    async fn remove_tree(&self, id: &str) -> Result<()> {
        self.remove_sync(id, true)
    }

    async fn move_node(&self, id: &str, destination: &MoveDestination) -> Result<NativeNode> {
        self.move_sync(id, destination)
    }

    async fn search(&self, query: &str) -> Result<Vec<NativeNode>> {
        self.search_sync(query)
    }
}

fn ensure_not_root(id: &str) -> Result<()> {
    if id == ROOT_ID {
        Err(Error::Store("Can't modify the root bookmark folder".to_string()))
    } else {
        Ok(())
    }
}

fn ensure_removable(root: &NativeNode, id: &str) -> Result<()> {
    ensure_not_root(id)?;
    let permanent = root
        .children
        .iter()
        .flatten()
        .any(|child| child.id == id);
    if permanent {
        Err(Error::Store(format!("Can't modify the permanent folder {id}")))
    } else {
        Ok(())
    }
}

fn find<'a>(node: &'a NativeNode, id: &str) -> Option<&'a NativeNode> {
    if node.id == id {
        return Some(node);
    }
    node.children
        .as_ref()?
        .iter()
        .find_map(|child| find(child, id))
}

fn find_mut<'a>(node: &'a mut NativeNode, id: &str) -> Option<&'a mut NativeNode> {
    if node.id == id {
        return Some(node);
    }
    node.children
        .as_mut()?
        .iter_mut()
        .find_map(|child| find_mut(child, id))
}

/// Take `id` out of the tree; returns the node, its old parent and index.
fn detach(node: &mut NativeNode, id: &str) -> Option<(NativeNode, String, usize)> {
    let children = node.children.as_mut()?;
    if let Some(position) = children.iter().position(|child| child.id == id) {
        return Some((children.remove(position), node.id.clone(), position));
    }
    children.iter_mut().find_map(|child| detach(child, id))
}

/// Position for a new child: folders stay inside the leading folder block,
/// URLs after it. `None` appends to the matching block.
fn insertion_index(children: &[NativeNode], is_folder: bool, requested: Option<usize>) -> usize {
    let folder_count = children.iter().filter(|child| child.is_folder()).count();
    if is_folder {
        requested.map_or(folder_count, |index| index.min(folder_count))
    } else {
        requested.map_or(children.len(), |index| {
            index.clamp(folder_count, children.len())
        })
    }
}

fn order_folders_first(node: &mut NativeNode) {
    if let Some(children) = node.children.as_mut() {
        children.sort_by_key(|child| !child.is_folder());
        children.iter_mut().for_each(order_folders_first);
    }
}

/// Refresh `parent_id`/`index` on every node.
fn reindex(node: &mut NativeNode, parent_id: Option<&str>) {
    node.parent_id = parent_id.map(str::to_string);
    let id = node.id.clone();
    if let Some(children) = node.children.as_mut() {
        for (index, child) in children.iter_mut().enumerate() {
            child.index = Some(index);
            reindex(child, Some(&id));
        }
    }
}

fn cloned_node(root: &NativeNode, id: &str) -> Result<NativeNode> {
    find(root, id)
        .cloned()
        .ok_or_else(|| Error::NotFound(id.to_string()))
}

fn collect_matches(node: &NativeNode, query: &str, hits: &mut Vec<NativeNode>) {
    for child in node.children.iter().flatten() {
        let url_matches = child
            .url
            .as_deref()
            .is_some_and(|url| contains_ignore_case(url, query));
        if contains_ignore_case(&child.title, query) || url_matches {
            hits.push(NativeNode {
                children: None,
                ..child.clone()
            });
        }
        collect_matches(child, query, hits);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn details(parent: &str, title: &str, url: Option<&str>) -> CreateDetails {
        CreateDetails {
            parent_id: Some(parent.to_string()),
            index: None,
            title: title.to_string(),
            url: url.map(str::to_string),
        }
    }

    fn child_ids(store: &MemoryBookmarkStore, parent: &str) -> Vec<String> {
        let snapshot = store.snapshot().unwrap();
        find(&snapshot.root, parent)
            .and_then(|node| node.children.clone())
            .unwrap_or_default()
            .into_iter()
            .map(|child| child.id)
            .collect()
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids_and_defaults_to_other_bookmarks() {
        let store = MemoryBookmarkStore::default();
        let created = store
            .create(CreateDetails {
                title: "A".to_string(),
                url: Some("https://a.com".to_string()),
                ..CreateDetails::default()
            })
            .await
            .unwrap();

        assert_eq!(created.id, "4");
        assert_eq!(created.parent_id.as_deref(), Some(OTHER_BOOKMARKS_ID));
        assert_eq!(created.index, Some(0));
        assert!(created.date_added.is_some());
    }

    #[tokio::test]
    async fn remove_requires_recursive_flag_for_non_empty_folders() {
        let store = MemoryBookmarkStore::default();
        let folder = store.create(details("1", "Docs", None)).await.unwrap();
        store
            .create(details(&folder.id, "A", Some("https://a.com")))
            .await
            .unwrap();

        assert!(matches!(store.remove(&folder.id).await, Err(Error::Store(_))));
        store.remove_tree(&folder.id).await.unwrap();
        assert!(child_ids(&store, "1").is_empty());
    }

    #[tokio::test]
    async fn permanent_folders_cannot_be_removed_or_moved() {
        let store = MemoryBookmarkStore::default();
        assert!(store.remove_tree("1").await.is_err());
        assert!(store.remove_tree(ROOT_ID).await.is_err());
        assert!(store
            .move_node("2", &MoveDestination::into_folder("1"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn move_within_parent_uses_pre_removal_indexes() {
        let store = MemoryBookmarkStore::default();
        for title in ["a", "b", "c"] {
            store
                .create(details("1", title, Some("https://x.com")))
                .await
                .unwrap();
        }
        // ids 4, 5, 6 in that order; move "4" to sit before "6".
        store
            .move_node("4", &MoveDestination::at("1", 2))
            .await
            .unwrap();
        assert_eq!(child_ids(&store, "1"), vec!["5", "4", "6"]);

        store
            .move_node("6", &MoveDestination::at("1", 0))
            .await
            .unwrap();
        assert_eq!(child_ids(&store, "1"), vec!["6", "5", "4"]);
    }

    #[tokio::test]
    async fn folders_stay_ahead_of_urls() {
        let store = MemoryBookmarkStore::default();
        store
            .create(details("1", "A", Some("https://a.com")))
            .await
            .unwrap();
        store.create(details("1", "Sub", None)).await.unwrap();
        store
            .create(details("1", "B", Some("https://b.com")))
            .await
            .unwrap();
        assert_eq!(child_ids(&store, "1"), vec!["5", "4", "6"]);

        // A URL asked to sit in the folder block lands right after it.
        store.move_node("6", &MoveDestination::at("1", 0)).await.unwrap();
        assert_eq!(child_ids(&store, "1"), vec!["5", "6", "4"]);
    }

    #[test]
    fn snapshots_are_reordered_folders_first() {
        let root = NativeNode::folder(ROOT_ID, "").with_children(vec![
            NativeNode::folder("1", "Bar").with_children(vec![
                NativeNode::bookmark("7", "A", "https://a.com"),
                NativeNode::folder("8", "Sub"),
                NativeNode::bookmark("9", "B", "https://b.com"),
            ]),
        ]);
        let store = MemoryBookmarkStore::from_snapshot(StoreSnapshot { next_id: 10, root });
        assert_eq!(child_ids(&store, "1"), vec!["8", "7", "9"]);
    }

    #[tokio::test]
    async fn move_rejects_cycles() {
        let store = MemoryBookmarkStore::default();
        let outer = store.create(details("1", "Outer", None)).await.unwrap();
        let inner = store.create(details(&outer.id, "Inner", None)).await.unwrap();

        let result = store
            .move_node(&outer.id, &MoveDestination::into_folder(inner.id.clone()))
            .await;
        assert!(matches!(result, Err(Error::Store(_))));
    }

    #[tokio::test]
    async fn move_across_folders_appends_by_default() {
        let store = MemoryBookmarkStore::default();
        let item = store
            .create(details("1", "A", Some("https://a.com")))
            .await
            .unwrap();
        let moved = store
            .move_node(&item.id, &MoveDestination::into_folder(OTHER_BOOKMARKS_ID))
            .await
            .unwrap();
        assert_eq!(moved.parent_id.as_deref(), Some(OTHER_BOOKMARKS_ID));
        assert!(child_ids(&store, "1").is_empty());
    }

    #[tokio::test]
    async fn update_rejects_url_on_folder() {
        let store = MemoryBookmarkStore::default();
        let folder = store.create(details("1", "Docs", None)).await.unwrap();
        let changes = BookmarkChanges {
            title: None,
            url: Some("https://a.com".to_string()),
        };
        assert!(matches!(
            store.update(&folder.id, &changes).await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn search_matches_titles_and_urls_case_insensitively() {
        let store = MemoryBookmarkStore::default();
        store
            .create(details("1", "Rust Book", Some("https://doc.rust-lang.org")))
            .await
            .unwrap();
        store
            .create(details("1", "Tokio", Some("https://tokio.rs")))
            .await
            .unwrap();

        let hits = store.search("rust").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Rust Book");
        assert_eq!(store.search("TOKIO.RS").await.unwrap().len(), 1);
    }
}
