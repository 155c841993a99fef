//! URL-level and folder-level selection with propagation rules.
//!
//! Both sets live in one struct and every operation updates them together, so
//! the folder set can never claim a folder whose URLs are not all selected.

use std::collections::BTreeSet;

use crate::models::BookmarkFolder;
use crate::tree::{
    collect_folder_ids, collect_folder_url_ids, collect_url_ids, descendant_folder_ids,
    find_ancestor_folder_ids, find_folder, find_folder_ancestor_ids,
};

/// Tri-state for folder checkboxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    None,
    Partial,
    All,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected_ids: BTreeSet<String>,
    selected_folder_ids: BTreeSet<String>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected URL ids.
    #[must_use]
    pub const fn selected_ids(&self) -> &BTreeSet<String> {
        &self.selected_ids
    }

    /// Folder ids marked for whole-subtree sync.
    #[must_use]
    pub const fn selected_folder_ids(&self) -> &BTreeSet<String> {
        &self.selected_folder_ids
    }

    #[must_use]
    pub fn is_selected(&self, url_id: &str) -> bool {
        self.selected_ids.contains(url_id)
    }

    #[must_use]
    pub fn is_folder_selected(&self, folder_id: &str) -> bool {
        self.selected_folder_ids.contains(folder_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected_ids.is_empty() && self.selected_folder_ids.is_empty()
    }

    /// Flip one URL. Deselecting also clears folder-level selection on every
    /// ancestor; selecting never promotes ancestors.
    pub fn toggle_url(&mut self, tree: &[BookmarkFolder], url_id: &str) {
        if self.selected_ids.remove(url_id) {
            if let Some(ancestors) = find_ancestor_folder_ids(tree, url_id) {
                for folder_id in &ancestors {
                    self.selected_folder_ids.remove(folder_id);
                }
            }
        } else {
            self.selected_ids.insert(url_id.to_string());
        }
    }

    /// Snap a folder's URLs to all-selected, or to none when they already are.
    pub fn toggle_folder_contents(&mut self, tree: &[BookmarkFolder], folder_id: &str) {
        let url_ids = collect_folder_url_ids(tree, folder_id);
        if url_ids.is_empty() {
            return;
        }

        if url_ids.is_subset(&self.selected_ids) {
            for id in &url_ids {
                self.selected_ids.remove(id);
            }
            self.clear_folder_flags(tree, folder_id);
        } else {
            self.selected_ids.extend(url_ids);
        }
    }

    /// Flip folder-level selection for a folder and everything under it.
    pub fn toggle_folder_for_sync(&mut self, tree: &[BookmarkFolder], folder_id: &str) {
        if find_folder(tree, folder_id).is_none() {
            return;
        }

        let url_ids = collect_folder_url_ids(tree, folder_id);
        if self.selected_folder_ids.contains(folder_id) {
            for id in &url_ids {
                self.selected_ids.remove(id);
            }
            self.clear_folder_flags(tree, folder_id);
        } else {
            self.selected_folder_ids.insert(folder_id.to_string());
            self.selected_folder_ids
                .extend(descendant_folder_ids(tree, folder_id));
            self.selected_ids.extend(url_ids);
        }
    }

    /// Select every URL in the tree.
    pub fn select_all(&mut self, tree: &[BookmarkFolder]) {
        self.selected_ids = collect_url_ids(tree);
    }

    /// Clear URL selection. Folder flags go too, since none of them can be
    /// complete any more.
    pub fn deselect_all(&mut self) {
        self.selected_ids.clear();
        self.selected_folder_ids.clear();
    }

    /// Forget a removed item.
    pub fn forget(&mut self, id: &str) {
        self.selected_ids.remove(id);
        self.selected_folder_ids.remove(id);
    }

    /// Reconcile with a freshly loaded tree: drop vanished ids and folder
    /// flags whose folder is no longer fully selected.
    pub fn retain_existing(&mut self, tree: &[BookmarkFolder]) {
        let url_ids = collect_url_ids(tree);
        let folder_ids = collect_folder_ids(tree);

        self.selected_ids.retain(|id| url_ids.contains(id));
        let selected_ids = &self.selected_ids;
        self.selected_folder_ids.retain(|id| {
            folder_ids.contains(id) && collect_folder_url_ids(tree, id).is_subset(selected_ids)
        });
    }

    /// Every folder-selected folder has all of its URLs selected.
    #[must_use]
    pub fn is_consistent(&self, tree: &[BookmarkFolder]) -> bool {
        self.selected_folder_ids
            .iter()
            .all(|id| collect_folder_url_ids(tree, id).is_subset(&self.selected_ids))
    }

    #[must_use]
    pub fn folder_check_state(&self, tree: &[BookmarkFolder], folder_id: &str) -> CheckState {
        let url_ids = collect_folder_url_ids(tree, folder_id);
        let selected = url_ids
            .iter()
            .filter(|id| self.selected_ids.contains(*id))
            .count();

        if selected == 0 {
            CheckState::None
        } else if selected == url_ids.len() {
            CheckState::All
        } else {
            CheckState::Partial
        }
    }

    fn clear_folder_flags(&mut self, tree: &[BookmarkFolder], folder_id: &str) {
        self.selected_folder_ids.remove(folder_id);
        for id in descendant_folder_ids(tree, folder_id) {
            self.selected_folder_ids.remove(&id);
        }
        if let Some(ancestors) = find_folder_ancestor_ids(tree, folder_id) {
            for id in &ancestors {
                self.selected_folder_ids.remove(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{BookmarkFolder, BookmarkUrl};
    use crate::tree::fixtures::{ids, sample_tree};

    #[test]
    fn toggle_url_twice_is_an_involution() {
        let tree = sample_tree();
        for url_id in collect_url_ids(&tree) {
            let mut selection = Selection::new();
            selection.toggle_url(&tree, "u6");
            let before = selection.clone();
            selection.toggle_url(&tree, &url_id);
            selection.toggle_url(&tree, &url_id);
            assert_eq!(
                selection.is_selected(&url_id),
                before.is_selected(&url_id),
                "{url_id}"
            );
        }
    }

    #[test]
    fn deselecting_a_url_clears_every_ancestor_folder() {
        let tree = sample_tree();
        let mut selection = Selection::new();
        selection.toggle_folder_for_sync(&tree, "1");
        assert!(selection.is_folder_selected("1"));
        assert!(selection.is_folder_selected("100"));

        selection.toggle_url(&tree, "u4");

        assert!(!selection.is_folder_selected("1"));
        assert!(!selection.is_folder_selected("10"));
        assert!(!selection.is_folder_selected("100"));
        assert!(selection.is_folder_selected("11"));
        assert!(selection.is_selected("u5"));
        assert!(selection.is_consistent(&tree));
    }

    #[test]
    fn selecting_a_url_does_not_promote_its_folder() {
        let tree = vec![BookmarkFolder::new("1", "Bar")
            .with_urls(vec![BookmarkUrl::new("u1", "A", "https://a.com")])];
        let mut selection = Selection::new();
        selection.toggle_url(&tree, "u1");
        assert!(selection.selected_folder_ids().is_empty());
    }

    #[test]
    fn toggle_folder_contents_snaps_to_all_or_none() {
        let tree = sample_tree();
        let mut selection = Selection::new();

        selection.toggle_url(&tree, "u3");
        assert_eq!(selection.folder_check_state(&tree, "10"), CheckState::Partial);

        selection.toggle_folder_contents(&tree, "10");
        assert_eq!(selection.folder_check_state(&tree, "10"), CheckState::All);

        selection.toggle_folder_contents(&tree, "10");
        assert_eq!(selection.folder_check_state(&tree, "10"), CheckState::None);
        assert!(selection.selected_ids().is_empty());
    }

    #[test]
    fn toggle_folder_contents_ignores_empty_and_unknown_folders() {
        let tree = sample_tree();
        let mut selection = Selection::new();
        selection.toggle_folder_contents(&tree, "11");
        selection.toggle_folder_contents(&tree, "missing");
        assert!(selection.is_empty());
    }

    #[test]
    fn collapsing_contents_drops_folder_flags() {
        let tree = sample_tree();
        let mut selection = Selection::new();
        selection.toggle_folder_for_sync(&tree, "1");
        selection.toggle_folder_contents(&tree, "100");

        assert!(!selection.is_folder_selected("100"));
        assert!(!selection.is_folder_selected("10"));
        assert!(!selection.is_folder_selected("1"));
        assert!(selection.is_consistent(&tree));
    }

    #[test]
    fn toggle_folder_for_sync_cascades_both_ways() {
        let tree = sample_tree();
        let mut selection = Selection::new();

        selection.toggle_folder_for_sync(&tree, "10");
        assert_eq!(selection.selected_folder_ids(), &ids(&["10", "100"]));
        assert_eq!(selection.selected_ids(), &ids(&["u3", "u4", "u5"]));

        selection.toggle_folder_for_sync(&tree, "10");
        assert!(selection.is_empty());
    }

    #[test]
    fn unselecting_a_subfolder_clears_its_ancestors() {
        let tree = sample_tree();
        let mut selection = Selection::new();
        selection.toggle_folder_for_sync(&tree, "1");
        selection.toggle_folder_for_sync(&tree, "100");

        assert_eq!(selection.selected_folder_ids(), &ids(&["11"]));
        assert_eq!(selection.selected_ids(), &ids(&["u1", "u2", "u3"]));
        assert!(selection.is_consistent(&tree));
    }

    #[test]
    fn select_all_then_collapse_scenario() {
        let tree = vec![BookmarkFolder::new("1", "Bar")
            .with_urls(vec![BookmarkUrl::new("u1", "A", "https://a.com")])];
        let mut selection = Selection::new();

        selection.toggle_url(&tree, "u1");
        selection.select_all(&tree);
        assert_eq!(selection.selected_ids(), &ids(&["u1"]));

        selection.toggle_folder_contents(&tree, "1");
        assert!(selection.selected_ids().is_empty());
    }

    #[test]
    fn deselect_all_clears_both_sets() {
        let tree = sample_tree();
        let mut selection = Selection::new();
        selection.toggle_folder_for_sync(&tree, "2");
        selection.deselect_all();
        assert!(selection.is_empty());
    }

    #[test]
    fn retain_existing_drops_vanished_ids_and_incomplete_folders() {
        let mut tree = sample_tree();
        let mut selection = Selection::new();
        selection.toggle_folder_for_sync(&tree, "2");
        selection.toggle_url(&tree, "u1");

        tree[1]
            .urls
            .push(BookmarkUrl::new("u7", "Delta", "https://delta.example"));
        tree[0].urls.retain(|url| url.id != "u1");
        selection.retain_existing(&tree);

        assert_eq!(selection.selected_ids(), &ids(&["u6"]));
        assert!(selection.selected_folder_ids().is_empty());
    }

    #[test]
    fn invariant_holds_across_toggle_sequences() {
        let tree = sample_tree();
        let url_ids: Vec<String> = collect_url_ids(&tree).into_iter().collect();
        let folder_ids: Vec<String> = collect_folder_ids(&tree).into_iter().collect();

        // Deterministic walk over mixed operations.
        let mut state: u64 = 0x2545_F491_4F6C_DD1D;
        let mut selection = Selection::new();
        for _ in 0..2_000 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let pick = usize::try_from(state % 1_000).unwrap();
            match state % 5 {
                0 => selection.toggle_url(&tree, &url_ids[pick % url_ids.len()]),
                1 => selection.toggle_folder_contents(&tree, &folder_ids[pick % folder_ids.len()]),
                2 => selection.toggle_folder_for_sync(&tree, &folder_ids[pick % folder_ids.len()]),
                3 if pick % 7 == 0 => selection.deselect_all(),
                _ => selection.select_all(&tree),
            }
            assert!(selection.is_consistent(&tree));
        }
    }
}
