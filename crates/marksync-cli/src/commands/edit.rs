use marksync_core::models::BookmarkChanges;
use marksync_core::util::normalize_text_option;

use crate::commands::common::{open_controller, Context};
use crate::error::CliError;

pub async fn run_edit(
    id: &str,
    title: Option<String>,
    url: Option<String>,
    context: &Context,
) -> Result<(), CliError> {
    let changes = BookmarkChanges {
        title: normalize_text_option(title),
        url: normalize_text_option(url),
    };
    if changes.is_empty() {
        return Err(CliError::EmptyChanges);
    }

    let mut controller = open_controller(context).await?;
    let updated = controller.update_bookmark(id, &changes).await?;
    println!("{}", updated.id());
    Ok(())
}
