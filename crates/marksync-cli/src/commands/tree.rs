use marksync_core::tree::flatten_folders;
use marksync_core::Action;

use crate::commands::common::{format_tree_lines, open_controller, Context};
use crate::error::CliError;

pub async fn run_tree(
    query: Option<String>,
    folders_only: bool,
    as_json: bool,
    context: &Context,
) -> Result<(), CliError> {
    let mut controller = open_controller(context).await?;
    if let Some(query) = query {
        controller.dispatch(Action::SetSearchQuery(query));
    }
    let visible = controller.state().visible_tree();

    if folders_only {
        for option in flatten_folders(&visible) {
            println!("{}[{}] {}", "  ".repeat(option.depth), option.id, option.name);
        }
        return Ok(());
    }

    if as_json {
        println!("{}", serde_json::to_string_pretty(&visible)?);
        return Ok(());
    }

    if visible.is_empty() {
        println!("No bookmarks found.");
        return Ok(());
    }
    for line in format_tree_lines(&visible) {
        println!("{line}");
    }
    Ok(())
}
