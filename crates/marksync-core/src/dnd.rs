//! Drag-and-drop intents resolved into store move destinations.

use crate::models::{BookmarkFolder, MoveDestination};
use crate::tree::{find_folder, locate_url};

/// What the gesture layer reports when the pointer is released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropIntent {
    /// Item released over a folder header
    OnFolder { item_id: String, folder_id: String },
    /// Item released over another bookmark
    OnItem { item_id: String, target_id: String },
}

impl DropIntent {
    #[must_use]
    pub fn item_id(&self) -> &str {
        match self {
            Self::OnFolder { item_id, .. } | Self::OnItem { item_id, .. } => item_id,
        }
    }
}

/// Translate a drop into a move, or `None` when nothing should happen.
///
/// The native store indexes a folder's sub-folders before its URLs, so a
/// position next to a sibling URL is `sub-folder count + URL index`.
pub fn resolve_drop(tree: &[BookmarkFolder], intent: &DropIntent) -> Option<MoveDestination> {
    match intent {
        DropIntent::OnFolder { item_id, folder_id } => {
            (item_id != folder_id).then(|| MoveDestination::into_folder(folder_id.clone()))
        }
        DropIntent::OnItem { item_id, target_id } => {
            if item_id == target_id {
                return None;
            }
            let target = locate_url(tree, target_id)?;
            let folder_count = find_folder(tree, &target.parent_id)
                .map_or(0, |folder| folder.folders.len());
            Some(MoveDestination::at(
                target.parent_id,
                folder_count + target.index,
            ))
        }
    }
}
