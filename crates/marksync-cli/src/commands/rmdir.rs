use marksync_core::tree::find_folder;

use crate::commands::common::{open_controller, Context};
use crate::error::CliError;

pub async fn run_rmdir(id: &str, context: &Context) -> Result<(), CliError> {
    let mut controller = open_controller(context).await?;
    if find_folder(&controller.state().bookmarks, id).is_none() {
        return Err(CliError::UnknownId(id.to_string()));
    }

    controller.delete_folder(id).await?;
    println!("Deleted folder {id}");
    Ok(())
}
