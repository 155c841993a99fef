use marksync_core::tree::locate_url;
use marksync_core::Action;

use crate::commands::common::{open_controller, Context};
use crate::error::CliError;

pub async fn run_delete(ids: &[String], context: &Context) -> Result<(), CliError> {
    let mut controller = open_controller(context).await?;

    for id in ids {
        let state = controller.state();
        if locate_url(&state.bookmarks, id).is_none() {
            return Err(CliError::UnknownId(id.clone()));
        }
        if !state.selection.is_selected(id) {
            controller.dispatch(Action::ToggleUrl(id.clone()));
        }
    }

    let removed = controller.delete_selected().await?;
    println!("Deleted {removed} bookmark(s)");
    Ok(())
}
