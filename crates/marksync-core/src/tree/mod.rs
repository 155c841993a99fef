//! Pure functions over the bookmark tree.
//!
//! Everything here takes the synthetic root (`&[BookmarkFolder]`) and either
//! answers a lookup or builds a new tree; nothing mutates its input.

use std::collections::BTreeSet;

use crate::models::{BookmarkFolder, BookmarkTree, WireNode, UNTITLED_FOLDER};
use crate::util::contains_ignore_case;

/// Where a URL sits inside its parent folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlLocation {
    pub parent_id: String,
    /// Index among the parent's URLs (sub-folders not counted)
    pub index: usize,
}

/// A folder entry for parent pickers, in pre-order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderOption {
    pub id: String,
    pub name: String,
    pub depth: usize,
}

/// Every URL id anywhere under `tree`.
pub fn collect_url_ids(tree: &[BookmarkFolder]) -> BTreeSet<String> {
    let mut ids = BTreeSet::new();
    extend_url_ids(tree, &mut ids);
    ids
}

fn extend_url_ids(folders: &[BookmarkFolder], ids: &mut BTreeSet<String>) {
    for folder in folders {
        ids.extend(folder.urls.iter().map(|url| url.id.clone()));
        extend_url_ids(&folder.folders, ids);
    }
}

/// Depth-first lookup; the first folder with `folder_id` wins.
pub fn find_folder<'a>(tree: &'a [BookmarkFolder], folder_id: &str) -> Option<&'a BookmarkFolder> {
    for folder in tree {
        if folder.id == folder_id {
            return Some(folder);
        }
        if let Some(found) = find_folder(&folder.folders, folder_id) {
            return Some(found);
        }
    }
    None
}

/// URL ids directly in `folder_id` plus all URL ids in its descendants.
///
/// Empty when the folder does not exist.
pub fn collect_folder_url_ids(tree: &[BookmarkFolder], folder_id: &str) -> BTreeSet<String> {
    find_folder(tree, folder_id).map_or_else(BTreeSet::new, |folder| {
        collect_url_ids(std::slice::from_ref(folder))
    })
}

/// Folder ids from the root down to the folder directly containing `url_id`.
pub fn find_ancestor_folder_ids(tree: &[BookmarkFolder], url_id: &str) -> Option<Vec<String>> {
    let mut path = Vec::new();
    ancestor_path(tree, &mut path, &|folder: &BookmarkFolder| {
        folder.urls.iter().any(|url| url.id == url_id)
    })
    .then_some(path)
}

/// Folder ids strictly above `folder_id`, root first. Top-level folders yield
/// an empty path.
pub fn find_folder_ancestor_ids(tree: &[BookmarkFolder], folder_id: &str) -> Option<Vec<String>> {
    let mut path = Vec::new();
    let found = ancestor_path(tree, &mut path, &|folder: &BookmarkFolder| {
        folder.folders.iter().any(|child| child.id == folder_id)
    });
    if found {
        return Some(path);
    }
    tree.iter()
        .any(|folder| folder.id == folder_id)
        .then(Vec::new)
}

/// Pushes folder ids onto `path` until `is_target` accepts one; leaves the
/// accepted folder as the last entry.
fn ancestor_path(
    folders: &[BookmarkFolder],
    path: &mut Vec<String>,
    is_target: &dyn Fn(&BookmarkFolder) -> bool,
) -> bool {
    for folder in folders {
        path.push(folder.id.clone());
        if is_target(folder) || ancestor_path(&folder.folders, path, is_target) {
            return true;
        }
        path.pop();
    }
    false
}

/// All folder ids strictly under `folder_id`, any depth.
pub fn descendant_folder_ids(tree: &[BookmarkFolder], folder_id: &str) -> BTreeSet<String> {
    let mut ids = BTreeSet::new();
    if let Some(folder) = find_folder(tree, folder_id) {
        extend_folder_ids(&folder.folders, &mut ids);
    }
    ids
}

/// Every folder id in `tree`, including the top level.
pub fn collect_folder_ids(tree: &[BookmarkFolder]) -> BTreeSet<String> {
    let mut ids = BTreeSet::new();
    extend_folder_ids(tree, &mut ids);
    ids
}

fn extend_folder_ids(folders: &[BookmarkFolder], ids: &mut BTreeSet<String>) {
    for folder in folders {
        ids.insert(folder.id.clone());
        extend_folder_ids(&folder.folders, ids);
    }
}

/// Parent folder and URL-relative index of `url_id`.
pub fn locate_url(tree: &[BookmarkFolder], url_id: &str) -> Option<UrlLocation> {
    for folder in tree {
        if let Some(index) = folder.urls.iter().position(|url| url.id == url_id) {
            return Some(UrlLocation {
                parent_id: folder.id.clone(),
                index,
            });
        }
        if let Some(found) = locate_url(&folder.folders, url_id) {
            return Some(found);
        }
    }
    None
}

/// Keep only selected URLs and the folders leading to them.
///
/// A folder survives iff it has a selected URL or a surviving sub-folder.
pub fn filter_by_selected(tree: &[BookmarkFolder], selected: &BTreeSet<String>) -> BookmarkTree {
    tree.iter()
        .filter_map(|folder| {
            let urls: Vec<_> = folder
                .urls
                .iter()
                .filter(|url| selected.contains(&url.id))
                .cloned()
                .collect();
            let folders = filter_by_selected(&folder.folders, selected);

            if urls.is_empty() && folders.is_empty() {
                None
            } else {
                Some(BookmarkFolder {
                    urls,
                    folders,
                    ..folder.clone()
                })
            }
        })
        .collect()
}

/// Keep selected folders whole; unselected folders survive with no URLs when
/// something beneath them is selected.
pub fn filter_selected_folders(
    tree: &[BookmarkFolder],
    selected_folder_ids: &BTreeSet<String>,
) -> BookmarkTree {
    tree.iter()
        .filter_map(|folder| {
            if selected_folder_ids.contains(&folder.id) {
                return Some(folder.clone());
            }
            let folders = filter_selected_folders(&folder.folders, selected_folder_ids);
            (!folders.is_empty()).then(|| BookmarkFolder {
                id: folder.id.clone(),
                name: folder.name.clone(),
                is_expanded: folder.is_expanded,
                folders,
                urls: Vec::new(),
            })
        })
        .collect()
}

/// Case-insensitive search over URL titles, URL addresses and folder names.
pub fn filter_by_query(tree: &[BookmarkFolder], query: &str) -> BookmarkTree {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return tree.to_vec();
    }
    filter_by_lowered_query(tree, &query)
}

fn filter_by_lowered_query(tree: &[BookmarkFolder], query: &str) -> BookmarkTree {
    tree.iter()
        .filter_map(|folder| {
            let urls: Vec<_> = folder
                .urls
                .iter()
                .filter(|url| {
                    contains_ignore_case(&url.title, query) || contains_ignore_case(&url.url, query)
                })
                .cloned()
                .collect();
            let folders = filter_by_lowered_query(&folder.folders, query);
            let name_matches = contains_ignore_case(&folder.name, query);

            (name_matches || !urls.is_empty() || !folders.is_empty()).then(|| BookmarkFolder {
                urls,
                folders,
                ..folder.clone()
            })
        })
        .collect()
}

/// Number of URLs in `folder` and all of its descendants.
pub fn count_urls(folder: &BookmarkFolder) -> usize {
    folder.urls.len() + folder.folders.iter().map(count_urls).sum::<usize>()
}

/// URLs covered by the selected folders. A selected folder counts its whole
/// subtree once; unselected folders are searched for selected descendants.
pub fn count_urls_in_folders(tree: &[BookmarkFolder], folder_ids: &BTreeSet<String>) -> usize {
    tree.iter()
        .map(|folder| {
            if folder_ids.contains(&folder.id) {
                count_urls(folder)
            } else {
                count_urls_in_folders(&folder.folders, folder_ids)
            }
        })
        .sum()
}

/// Every folder in pre-order with its nesting depth.
pub fn flatten_folders(tree: &[BookmarkFolder]) -> Vec<FolderOption> {
    let mut options = Vec::new();
    push_folder_options(tree, 0, &mut options);
    options
}

fn push_folder_options(folders: &[BookmarkFolder], depth: usize, options: &mut Vec<FolderOption>) {
    for folder in folders {
        options.push(FolderOption {
            id: folder.id.clone(),
            name: folder.name.clone(),
            depth,
        });
        push_folder_options(&folder.folders, depth + 1, options);
    }
}

/// Convert folders to wire nodes: own URLs first, then sub-folders.
pub fn to_wire_format(tree: &[BookmarkFolder]) -> Vec<WireNode> {
    tree.iter().map(folder_to_wire).collect()
}

fn folder_to_wire(folder: &BookmarkFolder) -> WireNode {
    let title = if folder.name.is_empty() {
        UNTITLED_FOLDER.to_string()
    } else {
        folder.name.clone()
    };

    let children = folder
        .urls
        .iter()
        .map(|url| WireNode {
            id: url.id.clone(),
            title: url.title.clone(),
            url: Some(url.url.clone()),
            children: Vec::new(),
        })
        .chain(folder.folders.iter().map(folder_to_wire))
        .collect();

    WireNode {
        id: folder.id.clone(),
        title,
        url: None,
        children,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{BookmarkFolder, BookmarkTree, BookmarkUrl};

    /// ```text
    /// 1 Bar            [u1, u2]
    ///   10 Rust        [u3]
    ///     100 Async    [u4, u5]
    ///   11 Empty       []
    /// 2 Other          [u6]
    /// ```
    pub fn sample_tree() -> BookmarkTree {
        vec![
            BookmarkFolder::new("1", "Bar")
                .with_urls(vec![
                    BookmarkUrl::new("u1", "Alpha", "https://alpha.example"),
                    BookmarkUrl::new("u2", "Beta", "https://beta.example"),
                ])
                .with_folders(vec![
                    BookmarkFolder::new("10", "Rust")
                        .with_urls(vec![BookmarkUrl::new(
                            "u3",
                            "The Book",
                            "https://doc.rust-lang.org/book",
                        )])
                        .with_folders(vec![BookmarkFolder::new("100", "Async").with_urls(
                            vec![
                                BookmarkUrl::new("u4", "Tokio", "https://tokio.rs"),
                                BookmarkUrl::new("u5", "Async Book", "https://rust-lang.github.io/async-book"),
                            ],
                        )]),
                    BookmarkFolder::new("11", "Empty"),
                ]),
            BookmarkFolder::new("2", "Other")
                .with_urls(vec![BookmarkUrl::new("u6", "Gamma", "https://gamma.example")]),
        ]
    }

    pub fn ids(values: &[&str]) -> std::collections::BTreeSet<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::fixtures::{ids, sample_tree};
    use super::*;
    use crate::models::BookmarkUrl;

    #[test]
    fn collect_url_ids_walks_every_level() {
        assert_eq!(
            collect_url_ids(&sample_tree()),
            ids(&["u1", "u2", "u3", "u4", "u5", "u6"])
        );
    }

    #[test]
    fn collect_folder_url_ids_includes_descendants() {
        let tree = sample_tree();
        assert_eq!(collect_folder_url_ids(&tree, "10"), ids(&["u3", "u4", "u5"]));
        assert_eq!(collect_folder_url_ids(&tree, "11"), ids(&[]));
        assert_eq!(collect_folder_url_ids(&tree, "missing"), ids(&[]));
    }

    #[test]
    fn find_ancestor_folder_ids_returns_root_to_leaf_path() {
        let tree = sample_tree();
        assert_eq!(
            find_ancestor_folder_ids(&tree, "u5"),
            Some(vec!["1".to_string(), "10".to_string(), "100".to_string()])
        );
        assert_eq!(find_ancestor_folder_ids(&tree, "u6"), Some(vec!["2".to_string()]));
        assert_eq!(find_ancestor_folder_ids(&tree, "nope"), None);
    }

    #[test]
    fn find_folder_ancestor_ids_excludes_the_folder_itself() {
        let tree = sample_tree();
        assert_eq!(
            find_folder_ancestor_ids(&tree, "100"),
            Some(vec!["1".to_string(), "10".to_string()])
        );
        assert_eq!(find_folder_ancestor_ids(&tree, "2"), Some(Vec::new()));
        assert_eq!(find_folder_ancestor_ids(&tree, "nope"), None);
    }

    #[test]
    fn descendant_folder_ids_are_strictly_below() {
        let tree = sample_tree();
        assert_eq!(descendant_folder_ids(&tree, "1"), ids(&["10", "100", "11"]));
        assert_eq!(descendant_folder_ids(&tree, "100"), ids(&[]));
    }

    #[test]
    fn locate_url_reports_url_relative_index() {
        let tree = sample_tree();
        assert_eq!(
            locate_url(&tree, "u2"),
            Some(UrlLocation {
                parent_id: "1".to_string(),
                index: 1
            })
        );
        assert_eq!(locate_url(&tree, "missing"), None);
    }

    #[test]
    fn filter_by_selected_drops_folders_without_selected_content() {
        let tree = sample_tree();
        let filtered = filter_by_selected(&tree, &ids(&["u4"]));

        assert_eq!(filtered.len(), 1);
        let bar = &filtered[0];
        assert_eq!(bar.id, "1");
        assert!(bar.urls.is_empty());
        assert_eq!(bar.folders.len(), 1);
        let rust = &bar.folders[0];
        assert!(rust.urls.is_empty());
        assert_eq!(rust.folders[0].urls, vec![BookmarkUrl::new("u4", "Tokio", "https://tokio.rs")]);
    }

    #[test]
    fn filter_by_selected_never_returns_empty_folders() {
        fn assert_non_empty(folders: &[BookmarkFolder]) {
            for folder in folders {
                assert!(!folder.is_empty(), "folder {} survived empty", folder.id);
                assert_non_empty(&folder.folders);
            }
        }

        let tree = sample_tree();
        let all = collect_url_ids(&tree);
        for id in &all {
            assert_non_empty(&filter_by_selected(&tree, &ids(&[id.as_str()])));
        }
        assert_non_empty(&filter_by_selected(&tree, &all));
        assert!(filter_by_selected(&tree, &ids(&[])).is_empty());
    }

    #[test]
    fn filter_selected_folders_keeps_whole_subtrees() {
        let tree = sample_tree();
        let filtered = filter_selected_folders(&tree, &ids(&["10"]));

        assert_eq!(filtered.len(), 1);
        assert!(filtered[0].urls.is_empty());
        assert_eq!(filtered[0].folders[0], tree[0].folders[0]);
    }

    #[test]
    fn filter_by_query_matches_titles_urls_and_folder_names() {
        let tree = sample_tree();

        let by_title = filter_by_query(&tree, "TOKIO");
        assert_eq!(collect_url_ids(&by_title), ids(&["u4"]));

        let by_url = filter_by_query(&tree, "gamma.example");
        assert_eq!(collect_url_ids(&by_url), ids(&["u6"]));

        let by_folder = filter_by_query(&tree, "empty");
        assert_eq!(by_folder.len(), 1);
        assert_eq!(by_folder[0].folders[0].id, "11");

        assert_eq!(filter_by_query(&tree, "   "), tree);
    }

    #[test]
    fn count_urls_in_folders_counts_each_subtree_once() {
        let tree = sample_tree();
        assert_eq!(count_urls(&tree[0]), 5);
        assert_eq!(count_urls_in_folders(&tree, &ids(&["1", "10"])), 5);
        assert_eq!(count_urls_in_folders(&tree, &ids(&["100", "2"])), 3);
    }

    #[test]
    fn flatten_folders_is_pre_order_with_depth() {
        let options = flatten_folders(&sample_tree());
        let summary: Vec<(&str, usize)> = options
            .iter()
            .map(|option| (option.id.as_str(), option.depth))
            .collect();
        assert_eq!(
            summary,
            vec![("1", 0), ("10", 1), ("100", 2), ("11", 1), ("2", 0)]
        );
    }

    #[test]
    fn to_wire_format_puts_urls_before_subfolders() {
        let wire = to_wire_format(&sample_tree());
        let bar = &wire[0];
        let child_ids: Vec<&str> = bar.children.iter().map(|node| node.id.as_str()).collect();
        assert_eq!(child_ids, vec!["u1", "u2", "10", "11"]);
        assert_eq!(bar.children[0].url.as_deref(), Some("https://alpha.example"));
        assert!(bar.children[0].children.is_empty());
        assert_eq!(bar.children[2].title, "Rust");
        assert_eq!(bar.children[2].url, None);
    }

    #[test]
    fn to_wire_format_preserves_titles_and_order_verbatim() {
        fn walk(folder: &BookmarkFolder, node: &WireNode) {
            assert_eq!(node.id, folder.id);
            assert_eq!(node.title, folder.name);
            let (urls, folders) = node.children.split_at(folder.urls.len());
            for (url, leaf) in folder.urls.iter().zip(urls) {
                assert_eq!(leaf.title, url.title);
                assert_eq!(leaf.url.as_deref(), Some(url.url.as_str()));
            }
            assert_eq!(folders.len(), folder.folders.len());
            for (child, sub) in folder.folders.iter().zip(folders) {
                walk(child, sub);
            }
        }

        let tree = sample_tree();
        for (folder, node) in tree.iter().zip(to_wire_format(&tree)) {
            walk(folder, &node);
        }
    }

    #[test]
    fn to_wire_format_names_untitled_folders() {
        let wire = to_wire_format(&[BookmarkFolder::new("9", "")]);
        assert_eq!(wire[0].title, UNTITLED_FOLDER);
    }
}
