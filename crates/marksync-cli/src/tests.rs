use std::path::Path;

use marksync_core::config::ClientConfig;
use marksync_core::store::{BookmarkStore, JsonFileBookmarkStore};
use marksync_core::tree::find_folder;
use marksync_core::{BookmarkFolder, BookmarkTree, BookmarkUrl};
use pretty_assertions::assert_eq;

use crate::cli::{CompletionShell, ConsentCommands, SelectionArgs};
use crate::commands::add::run_add;
use crate::commands::common::{
    apply_selection, format_tree_lines, normalize_search_query, open_controller, Context,
};
use crate::commands::completions::{render_completions, run_completions};
use crate::commands::consent::run_consent;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::mkdir::run_mkdir;
use crate::commands::move_cmd::run_move;
use crate::commands::rmdir::run_rmdir;
use crate::commands::sync::{ensure_consent, run_sync, run_upload};
use crate::error::CliError;

fn context(dir: &Path) -> Context {
    Context {
        bookmarks_path: dir.join("bookmarks.json"),
        settings_path: dir.join("settings.json"),
        client: ClientConfig::default(),
    }
}

async fn stored_tree(context: &Context) -> BookmarkTree {
    let native = JsonFileBookmarkStore::open(&context.bookmarks_path).unwrap();
    BookmarkStore::new(native).load_all().await.unwrap()
}

fn url_ids(tree: &[BookmarkFolder], folder_id: &str) -> Vec<String> {
    find_folder(tree, folder_id)
        .unwrap()
        .urls
        .iter()
        .map(|url| url.id.clone())
        .collect()
}

#[test]
fn format_tree_lines_indents_nested_folders() {
    let tree = vec![BookmarkFolder::new("1", "Bar")
        .with_folders(vec![BookmarkFolder::new("10", "Rust")
            .with_urls(vec![BookmarkUrl::new("u1", "Tokio", "https://tokio.rs")])])
        .with_urls(vec![BookmarkUrl::new("u2", "Docs", "https://docs.rs")])];

    assert_eq!(
        format_tree_lines(&tree),
        vec![
            "[1] Bar/".to_string(),
            "  [10] Rust/".to_string(),
            "    [u1] Tokio <https://tokio.rs>".to_string(),
            "  [u2] Docs <https://docs.rs>".to_string(),
        ]
    );
}

#[test]
fn normalize_search_query_trims_and_rejects_empty() {
    assert_eq!(normalize_search_query("  rust ").unwrap(), "rust");
    assert!(matches!(
        normalize_search_query("   "),
        Err(CliError::EmptySearchQuery)
    ));
}

#[tokio::test]
async fn add_edit_and_delete_persist_to_the_bookmark_file() {
    let dir = tempfile::tempdir().unwrap();
    let context = context(dir.path());

    run_add("Tokio", "https://tokio.rs", None, &context).await.unwrap();
    run_add("Serde", "https://serde.rs", Some("1"), &context)
        .await
        .unwrap();
    let tree = stored_tree(&context).await;
    assert_eq!(url_ids(&tree, "2"), vec!["4".to_string()]);
    assert_eq!(url_ids(&tree, "1"), vec!["5".to_string()]);

    run_edit("4", Some("Tokio docs".to_string()), None, &context)
        .await
        .unwrap();
    let tree = stored_tree(&context).await;
    assert_eq!(find_folder(&tree, "2").unwrap().urls[0].title, "Tokio docs");

    run_delete(&["4".to_string(), "5".to_string()], &context)
        .await
        .unwrap();
    let tree = stored_tree(&context).await;
    assert!(url_ids(&tree, "1").is_empty());
    assert!(url_ids(&tree, "2").is_empty());
}

#[tokio::test]
async fn edit_without_changes_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_edit("4", Some("  ".to_string()), None, &context(dir.path())).await;
    assert!(matches!(result, Err(CliError::EmptyChanges)));
}

#[tokio::test]
async fn delete_unknown_id_fails_before_touching_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let context = context(dir.path());

    let result = run_delete(&["404".to_string()], &context).await;
    assert!(matches!(result, Err(CliError::UnknownId(id)) if id == "404"));
    assert!(!context.bookmarks_path.exists());
}

#[tokio::test]
async fn move_before_places_item_at_the_target_position() {
    let dir = tempfile::tempdir().unwrap();
    let context = context(dir.path());
    run_add("A", "https://a.example", None, &context).await.unwrap();
    run_add("B", "https://b.example", None, &context).await.unwrap();

    run_move("5", None, None, Some("4".to_string()), &context)
        .await
        .unwrap();
    assert_eq!(
        url_ids(&stored_tree(&context).await, "2"),
        vec!["5".to_string(), "4".to_string()]
    );

    run_move("4", Some("1".to_string()), None, None, &context)
        .await
        .unwrap();
    let tree = stored_tree(&context).await;
    assert_eq!(url_ids(&tree, "1"), vec!["4".to_string()]);
    assert_eq!(url_ids(&tree, "2"), vec!["5".to_string()]);
}

#[tokio::test]
async fn move_before_skips_over_sub_folders() {
    let dir = tempfile::tempdir().unwrap();
    let context = context(dir.path());
    run_add("A", "https://a.example", Some("1"), &context)
        .await
        .unwrap();
    run_mkdir("Sub", Some("1"), &context).await.unwrap();
    run_add("B", "https://b.example", Some("1"), &context)
        .await
        .unwrap();

    run_move("6", None, None, Some("4".to_string()), &context)
        .await
        .unwrap();
    let tree = stored_tree(&context).await;
    assert_eq!(url_ids(&tree, "1"), vec!["6".to_string(), "4".to_string()]);
    assert!(find_folder(&tree, "5").is_some());
}

#[tokio::test]
async fn mkdir_and_rmdir_manage_folders() {
    let dir = tempfile::tempdir().unwrap();
    let context = context(dir.path());

    run_mkdir("Reading", Some("1"), &context).await.unwrap();
    run_add("Post", "https://blog.example", Some("4"), &context)
        .await
        .unwrap();
    let tree = stored_tree(&context).await;
    assert_eq!(url_ids(&tree, "4"), vec!["5".to_string()]);

    run_rmdir("4", &context).await.unwrap();
    assert!(find_folder(&stored_tree(&context).await, "4").is_none());

    let result = run_rmdir("4", &context).await;
    assert!(matches!(result, Err(CliError::UnknownId(_))));
}

#[tokio::test]
async fn apply_selection_combines_urls_and_folders() {
    let dir = tempfile::tempdir().unwrap();
    let context = context(dir.path());
    run_add("A", "https://a.example", Some("1"), &context)
        .await
        .unwrap();
    run_add("B", "https://b.example", Some("2"), &context)
        .await
        .unwrap();

    let mut controller = open_controller(&context).await.unwrap();
    let selection = SelectionArgs {
        urls: vec!["4".to_string()],
        folders: vec!["2".to_string()],
        all: false,
    };
    apply_selection(&mut controller, &selection).unwrap();

    let state = controller.state();
    assert_eq!(state.selected_count(), 2);
    assert!(state.selection.is_folder_selected("2"));
    assert!(!state.selection.is_folder_selected("1"));
}

#[tokio::test]
async fn apply_selection_rejects_unknown_ids() {
    let dir = tempfile::tempdir().unwrap();
    let mut controller = open_controller(&context(dir.path())).await.unwrap();

    let selection = SelectionArgs {
        folders: vec!["77".to_string()],
        ..SelectionArgs::default()
    };
    let result = apply_selection(&mut controller, &selection);
    assert!(matches!(result, Err(CliError::UnknownId(id)) if id == "77"));
}

#[tokio::test]
async fn sync_requires_consent() {
    let dir = tempfile::tempdir().unwrap();
    let context = context(dir.path());
    let selection = SelectionArgs {
        all: true,
        ..SelectionArgs::default()
    };

    let result = run_sync(Some("key".to_string()), &selection, &context).await;
    assert!(matches!(result, Err(CliError::ConsentRequired)));
    let result = run_upload(&selection, &context).await;
    assert!(matches!(result, Err(CliError::ConsentRequired)));
}

#[tokio::test]
async fn consent_grant_and_revoke_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let context = context(dir.path());

    run_consent(ConsentCommands::Grant, &context).await.unwrap();
    ensure_consent(&context).await.unwrap();

    let result = run_sync(
        Some("key".to_string()),
        &SelectionArgs::default(),
        &context,
    )
    .await;
    assert!(matches!(result, Err(CliError::EmptySelection)));

    run_consent(ConsentCommands::Revoke, &context).await.unwrap();
    assert!(matches!(
        ensure_consent(&context).await,
        Err(CliError::ConsentRequired)
    ));
}

#[test]
fn completions_are_written_for_the_marksync_binary() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("marksync.bash");

    run_completions(CompletionShell::Bash, Some(&output)).unwrap();
    let script = std::fs::read_to_string(output).unwrap();
    assert!(script.contains("marksync"));
    assert!(script.contains("upload"));
}

#[test]
fn fish_completions_list_subcommands() {
    let script = String::from_utf8(render_completions(CompletionShell::Fish)).unwrap();
    assert!(script.contains("complete -c marksync"));
    assert!(script.contains("rmdir"));
}
